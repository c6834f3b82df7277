use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One row of an issuance CSV; the recipient column is a base58 pubkey,
/// everything else mirrors the node fields verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CsvEntry {
    pub recipient: String,
    pub vesting_start_time: u64,
    pub cliff_time: u64,
    pub frequency: u64,
    pub cliff_unlock_amount: u64,
    pub amount_per_period: u64,
    pub number_of_period: u64,
    pub update_recipient_mode: u8,
    pub cancel_mode: u8,
}

impl CsvEntry {
    /// Load all rows of a headed CSV file, preserving file order.
    pub fn new_from_file(path: &Path) -> Result<Vec<Self>> {
        let mut reader = csv::Reader::from_path(path)?;
        let mut entries = Vec::new();
        for row in reader.deserialize() {
            let entry: CsvEntry = row?;
            entries.push(entry);
        }
        Ok(entries)
    }
}
