use std::str::FromStr;

use anchor_lang::solana_program::hash::{hashv, Hash};
use anchor_lang::solana_program::pubkey::Pubkey;
use serde::{Deserialize, Serialize};

use crate::constants::{ENCODED_NODE_LEN, LEAF_PREFIX};
use crate::csv_entry::CsvEntry;
use crate::error::{MerkleTreeError, Result};

/// One vesting entitlement, the leaf payload of the tree. Immutable once
/// encoded; amending a grant means building a new node set and a new root.
#[derive(Debug, Clone, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
    /// Wallet entitled to claim; signs the claim on the consuming side.
    pub recipient: Pubkey,
    /// Vesting start timestamp (Unix seconds).
    pub vesting_start_time: u64,
    /// Cliff timestamp; must be strictly after `vesting_start_time`.
    pub cliff_time: u64,
    /// Seconds per unlock period; must be non-zero.
    pub frequency: u64,
    /// Token base units unlocked at the cliff.
    pub cliff_unlock_amount: u64,
    /// Token base units unlocked per period.
    pub amount_per_period: u64,
    /// Number of unlock periods.
    pub number_of_period: u64,
    /// Opaque mode byte, passed through to the consuming program unchanged.
    pub update_recipient_mode: u8,
    /// Opaque mode byte, passed through to the consuming program unchanged.
    pub cancel_mode: u8,
}

impl TreeNode {
    /// Canonical fixed-layout encoding: field concatenation in declaration
    /// order, numeric fields little-endian fixed-width, no padding and no
    /// length prefixes. Total over the type; validation is a separate step.
    pub fn encode(&self) -> [u8; ENCODED_NODE_LEN] {
        let mut out = [0u8; ENCODED_NODE_LEN];
        out[0..32].copy_from_slice(self.recipient.as_ref());
        out[32..40].copy_from_slice(&self.vesting_start_time.to_le_bytes());
        out[40..48].copy_from_slice(&self.cliff_time.to_le_bytes());
        out[48..56].copy_from_slice(&self.frequency.to_le_bytes());
        out[56..64].copy_from_slice(&self.cliff_unlock_amount.to_le_bytes());
        out[64..72].copy_from_slice(&self.amount_per_period.to_le_bytes());
        out[72..80].copy_from_slice(&self.number_of_period.to_le_bytes());
        out[80] = self.update_recipient_mode;
        out[81] = self.cancel_mode;
        out
    }

    /// Inner digest: the canonical encoding collapsed to 32 bytes.
    pub fn hash(&self) -> Hash {
        hashv(&[&self.encode()])
    }

    /// Domain-separated leaf digest: `H(0x00 ++ H(encode))`.
    pub fn leaf_hash(&self) -> [u8; 32] {
        hashv(&[LEAF_PREFIX, &self.hash().to_bytes()]).to_bytes()
    }

    /// Precondition checks run before any hashing at tree construction.
    pub fn validate(&self) -> Result<()> {
        if self.vesting_start_time >= self.cliff_time {
            return Err(MerkleTreeError::InvalidVestingTime);
        }
        if self.frequency == 0 {
            return Err(MerkleTreeError::FrequencyIsZero);
        }
        // Total claim must be representable; surfaces overflow up front.
        self.total_amount()?;
        Ok(())
    }

    /// Total claimable amount for this recipient:
    /// cliff unlock + per-period amount over all periods.
    pub fn total_amount(&self) -> Result<u64> {
        self.amount_per_period
            .checked_mul(self.number_of_period)
            .and_then(|periodic| periodic.checked_add(self.cliff_unlock_amount))
            .ok_or(MerkleTreeError::MathOverflow)
    }

    /// Build a node from one CSV row; the recipient column is base58.
    pub fn from_csv(entry: CsvEntry) -> Result<Self> {
        let recipient = Pubkey::from_str(entry.recipient.as_str())
            .map_err(|_| MerkleTreeError::InvalidPubkey(entry.recipient.clone()))?;
        Ok(Self {
            recipient,
            vesting_start_time: entry.vesting_start_time,
            cliff_time: entry.cliff_time,
            frequency: entry.frequency,
            cliff_unlock_amount: entry.cliff_unlock_amount,
            amount_per_period: entry.amount_per_period,
            number_of_period: entry.number_of_period,
            update_recipient_mode: entry.update_recipient_mode,
            cancel_mode: entry.cancel_mode,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(start: u64, cliff: u64, freq: u64) -> TreeNode {
        TreeNode {
            recipient: Pubkey::new_unique(),
            vesting_start_time: start,
            cliff_time: cliff,
            frequency: freq,
            cliff_unlock_amount: 100,
            amount_per_period: 100,
            number_of_period: 200,
            update_recipient_mode: 0,
            cancel_mode: 0,
        }
    }

    #[test]
    fn encoding_is_deterministic_and_injective_per_field() {
        let a = node(0, 200, 10);
        assert_eq!(a.encode(), a.clone().encode());

        // Flipping any single field must change the encoding.
        let mut b = a.clone();
        b.cancel_mode = 1;
        assert_ne!(a.encode(), b.encode());

        let mut c = a.clone();
        c.number_of_period = 201;
        assert_ne!(a.encode(), c.encode());
    }

    #[test]
    fn encoding_layout_is_little_endian() {
        let n = node(0x0102, 0x0304, 1);
        let bytes = n.encode();
        assert_eq!(bytes.len(), ENCODED_NODE_LEN);
        assert_eq!(&bytes[0..32], n.recipient.as_ref());
        assert_eq!(&bytes[32..40], &0x0102u64.to_le_bytes());
        assert_eq!(&bytes[40..48], &0x0304u64.to_le_bytes());
        assert_eq!(bytes[81], n.cancel_mode);
    }

    #[test]
    fn leaf_hash_differs_from_inner_hash() {
        let n = node(0, 200, 10);
        assert_ne!(n.leaf_hash(), n.hash().to_bytes());
        // Leaf digest is the prefixed second pass over the inner digest.
        let expected = hashv(&[LEAF_PREFIX, &n.hash().to_bytes()]).to_bytes();
        assert_eq!(n.leaf_hash(), expected);
    }

    #[test]
    fn validate_rejects_start_at_or_after_cliff() {
        assert!(matches!(
            node(200, 200, 10).validate(),
            Err(MerkleTreeError::InvalidVestingTime)
        ));
        assert!(matches!(
            node(201, 200, 10).validate(),
            Err(MerkleTreeError::InvalidVestingTime)
        ));
        assert!(node(199, 200, 10).validate().is_ok());
    }

    #[test]
    fn validate_rejects_zero_frequency() {
        assert!(matches!(
            node(0, 200, 0).validate(),
            Err(MerkleTreeError::FrequencyIsZero)
        ));
    }

    #[test]
    fn total_amount_checks_overflow() {
        let mut n = node(0, 200, 10);
        assert_eq!(n.total_amount().unwrap(), 100 + 100 * 200);

        n.amount_per_period = u64::MAX;
        n.number_of_period = 2;
        assert!(matches!(
            n.total_amount(),
            Err(MerkleTreeError::MathOverflow)
        ));
        assert!(matches!(n.validate(), Err(MerkleTreeError::MathOverflow)));
    }

    #[test]
    fn from_csv_rejects_bad_pubkey() {
        let entry = CsvEntry {
            recipient: "not-a-pubkey".to_string(),
            vesting_start_time: 0,
            cliff_time: 200,
            frequency: 10,
            cliff_unlock_amount: 100,
            amount_per_period: 100,
            number_of_period: 200,
            update_recipient_mode: 0,
            cancel_mode: 0,
        };
        assert!(matches!(
            TreeNode::from_csv(entry),
            Err(MerkleTreeError::InvalidPubkey(_))
        ));
    }
}
