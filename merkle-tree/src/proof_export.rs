use std::fs::File;
use std::io::Write;
use std::path::Path;

use anchor_lang::solana_program::pubkey::Pubkey;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::node::TreeNode;
use crate::tree::VestingMerkleTree;

/// Everything one recipient needs to submit a claim: their record fields
/// plus the sibling path, tagged with the tree they belong to. Distributed
/// off-chain (API, file drop) by the issuance tooling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProof {
    /// Identifier of the merkle tree the proof was extracted from.
    pub merkle_tree: String,
    pub recipient: Pubkey,
    pub vesting_start_time: u64,
    pub cliff_time: u64,
    pub frequency: u64,
    pub cliff_unlock_amount: u64,
    pub amount_per_period: u64,
    pub number_of_period: u64,
    pub update_recipient_mode: u8,
    pub cancel_mode: u8,
    /// Sibling path, leaf layer first.
    pub proof: Vec<[u8; 32]>,
}

impl UserProof {
    fn from_node(merkle_tree: String, node: &TreeNode, proof: Vec<[u8; 32]>) -> Self {
        Self {
            merkle_tree,
            recipient: node.recipient,
            vesting_start_time: node.vesting_start_time,
            cliff_time: node.cliff_time,
            frequency: node.frequency,
            cliff_unlock_amount: node.cliff_unlock_amount,
            amount_per_period: node.amount_per_period,
            number_of_period: node.number_of_period,
            update_recipient_mode: node.update_recipient_mode,
            cancel_mode: node.cancel_mode,
            proof,
        }
    }

    /// Extract the claim package for one recipient.
    pub fn for_recipient(
        tree: &VestingMerkleTree,
        merkle_tree: String,
        recipient: &Pubkey,
    ) -> Result<Self> {
        let node = tree.get_node(recipient)?;
        let proof = tree.proof_for_recipient(recipient)?;
        Ok(Self::from_node(merkle_tree, node, proof))
    }

    /// Extract claim packages for every recipient, in committed order.
    pub fn for_all(tree: &VestingMerkleTree, merkle_tree: String) -> Result<Vec<Self>> {
        tree.tree_nodes
            .iter()
            .enumerate()
            .map(|(index, node)| {
                let proof = tree.get_proof(index)?;
                Ok(Self::from_node(merkle_tree.clone(), node, proof))
            })
            .collect()
    }

    /// Rebuild the leaf payload; claim-side code verifies this against the
    /// committed root with the bundled proof.
    pub fn to_node(&self) -> TreeNode {
        TreeNode {
            recipient: self.recipient,
            vesting_start_time: self.vesting_start_time,
            cliff_time: self.cliff_time,
            frequency: self.frequency,
            cliff_unlock_amount: self.cliff_unlock_amount,
            amount_per_period: self.amount_per_period,
            number_of_period: self.number_of_period,
            update_recipient_mode: self.update_recipient_mode,
            cancel_mode: self.cancel_mode,
        }
    }

    /// Write the claim package as pretty-printed JSON.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let serialized = serde_json::to_string_pretty(self)?;
        let mut file = File::create(path)?;
        file.write_all(serialized.as_bytes())?;
        Ok(())
    }
}
