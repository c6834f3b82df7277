use anchor_lang::solana_program::pubkey::Pubkey;
use serde::{Deserialize, Serialize};

use crate::error::{MerkleTreeError, Result};
use crate::node::TreeNode;
use crate::tree::VestingMerkleTree;

/// Issuer-side view of the committed root for one batch grant, mirroring
/// the commitment fields of the on-chain escrow account. The hosting
/// program owns authorization and the atomicity of the root write; this
/// type owns the transition rule itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootRegistry {
    /// Batch issuer; the only party the hosting program lets rotate.
    pub creator: Pubkey,
    /// Currently committed root.
    pub root: [u8; 32],
    /// Cumulative claim ceiling for the committed node set.
    pub max_claim_amount: u64,
    /// Bumped on every accepted rotation; never reset.
    pub version: u64,
}

impl RootRegistry {
    /// Open a registry entry over a freshly built tree.
    pub fn new(creator: Pubkey, tree: &VestingMerkleTree) -> Self {
        Self {
            creator,
            root: tree.merkle_root,
            max_claim_amount: tree.max_claim_amount,
            version: tree.version,
        }
    }

    /// True when rotating to `new_root` would not change the commitment.
    pub fn is_noop(&self, new_root: &[u8; 32]) -> bool {
        self.root == *new_root
    }

    /// Replace the committed root. No-op rotations are rejected so version
    /// bookkeeping can never be bumped by an unchanged grant set, and a
    /// rotation to the same set surfaces as an error instead of a silent
    /// success. On rejection the registry is left untouched.
    pub fn rotate(&mut self, new_root: [u8; 32], max_claim_amount: u64) -> Result<()> {
        if self.is_noop(&new_root) {
            return Err(MerkleTreeError::DuplicateRoot);
        }
        self.root = new_root;
        self.max_claim_amount = max_claim_amount;
        self.version = self
            .version
            .checked_add(1)
            .ok_or(MerkleTreeError::MathOverflow)?;
        tracing::debug!(version = self.version, root = ?self.root, "rotated merkle root");
        Ok(())
    }

    /// Build a tree over an amended node list and rotate to its root,
    /// returning the new tree so fresh proofs can be distributed.
    ///
    /// Claims already settled against the previous root are unaffected. A
    /// node absent from `tree_nodes` simply stops producing valid proofs —
    /// that is the removal mechanism; adding a recipient means passing the
    /// old set plus the new node(s).
    pub fn rotate_to_records(&mut self, tree_nodes: Vec<TreeNode>) -> Result<VestingMerkleTree> {
        let next_version = self
            .version
            .checked_add(1)
            .ok_or(MerkleTreeError::MathOverflow)?;
        let tree = VestingMerkleTree::new(tree_nodes, next_version)?;
        self.rotate(tree.merkle_root, tree.max_claim_amount)?;
        Ok(tree)
    }
}
