use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::Path;

use anchor_lang::solana_program::hash::hashv;
use anchor_lang::solana_program::pubkey::Pubkey;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::constants::MAX_TREE_NODES;
use crate::error::{MerkleTreeError, Result};
use crate::node::TreeNode;
use crate::verify::verify;

/// Parent digest of two nodes: `H(min(a,b) ++ max(a,b))` by byte-wise
/// lexicographic order. Argument order does not matter, so proofs are plain
/// sibling lists with no left/right tags; they assert membership, never
/// position.
pub fn combine(a: &[u8; 32], b: &[u8; 32]) -> [u8; 32] {
    if a <= b {
        hashv(&[a, b]).to_bytes()
    } else {
        hashv(&[b, a]).to_bytes()
    }
}

/// Merkle tree over a batch of vesting grants. Built once from a validated
/// node list; the root is what the issuer persists on-chain, the per-node
/// sibling paths are what recipients present to claim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VestingMerkleTree {
    /// The merkle root, persisted on-chain by the issuer.
    pub merkle_root: [u8; 32],
    /// Issuer-assigned batch version; bumped on every root rotation.
    pub version: u64,
    /// Cumulative claim ceiling over all nodes (overflow-checked sum).
    pub max_claim_amount: u64,
    /// Node count at construction.
    pub max_nodes: u64,
    /// Leaf payloads in caller-supplied order; the order is committed as-is.
    pub tree_nodes: Vec<TreeNode>,
    /// Hash layers, leaf layer first. Rebuilt on load, never serialized.
    #[serde(skip)]
    layers: Vec<Vec<[u8; 32]>>,
}

impl VestingMerkleTree {
    /// Build a tree over `tree_nodes` in the given order.
    ///
    /// Every node is validated before anything is hashed; the first
    /// violation aborts the whole batch so a partially built tree is never
    /// observable.
    pub fn new(tree_nodes: Vec<TreeNode>, version: u64) -> Result<Self> {
        if tree_nodes.is_empty() {
            return Err(MerkleTreeError::EmptyNodes);
        }
        if tree_nodes.len() as u64 > MAX_TREE_NODES {
            return Err(MerkleTreeError::TooManyNodes(tree_nodes.len() as u64));
        }

        let mut seen: IndexSet<Pubkey> = IndexSet::with_capacity(tree_nodes.len());
        let mut max_claim_amount: u64 = 0;
        for node in &tree_nodes {
            node.validate()?;
            if !seen.insert(node.recipient) {
                return Err(MerkleTreeError::DuplicateRecipient(node.recipient));
            }
            max_claim_amount = max_claim_amount
                .checked_add(node.total_amount()?)
                .ok_or(MerkleTreeError::MathOverflow)?;
        }

        let leaves: Vec<[u8; 32]> = tree_nodes.iter().map(TreeNode::leaf_hash).collect();
        let layers = build_layers(leaves);
        let merkle_root = layers
            .last()
            .and_then(|top| top.first())
            .copied()
            .ok_or(MerkleTreeError::EmptyNodes)?;

        let tree = Self {
            merkle_root,
            version,
            max_claim_amount,
            max_nodes: tree_nodes.len() as u64,
            tree_nodes,
            layers,
        };
        tracing::info!(
            version,
            nodes = tree.max_nodes,
            max_claim_amount,
            root = ?tree.merkle_root,
            "built vesting merkle tree"
        );
        Ok(tree)
    }

    pub fn get_root(&self) -> [u8; 32] {
        self.merkle_root
    }

    pub fn get_max_total_claim(&self) -> u64 {
        self.max_claim_amount
    }

    /// Sibling path for leaf `index`, leaf layer first. A layer where the
    /// node was the unpaired carry contributes no sibling.
    pub fn get_proof(&self, index: usize) -> Result<Vec<[u8; 32]>> {
        if index >= self.tree_nodes.len() {
            return Err(MerkleTreeError::IndexOutOfBounds(index));
        }
        let (_, lower_layers) = self
            .layers
            .split_last()
            .ok_or(MerkleTreeError::EmptyNodes)?;

        let mut proof = Vec::new();
        let mut idx = index;
        for layer in lower_layers {
            let sibling = idx ^ 1;
            if sibling < layer.len() {
                proof.push(layer[sibling]);
            }
            idx /= 2;
        }
        Ok(proof)
    }

    /// Position of a recipient in the committed order.
    pub fn node_index(&self, recipient: &Pubkey) -> Option<usize> {
        self.tree_nodes
            .iter()
            .position(|node| node.recipient == *recipient)
    }

    pub fn get_node(&self, recipient: &Pubkey) -> Result<&TreeNode> {
        self.node_index(recipient)
            .map(|index| &self.tree_nodes[index])
            .ok_or(MerkleTreeError::NodeNotFound(*recipient))
    }

    pub fn proof_for_recipient(&self, recipient: &Pubkey) -> Result<Vec<[u8; 32]>> {
        let index = self
            .node_index(recipient)
            .ok_or(MerkleTreeError::NodeNotFound(*recipient))?;
        self.get_proof(index)
    }

    /// Re-derive every commitment invariant from the stored nodes: counts,
    /// claim ceiling, root, and a full proof check for every leaf.
    pub fn validate(&self) -> Result<()> {
        if self.max_nodes != self.tree_nodes.len() as u64 {
            return Err(MerkleTreeError::ValidationFailed(format!(
                "node count {} does not match max_nodes {}",
                self.tree_nodes.len(),
                self.max_nodes
            )));
        }

        let rebuilt = Self::new(self.tree_nodes.clone(), self.version)?;
        if rebuilt.merkle_root != self.merkle_root {
            return Err(MerkleTreeError::ValidationFailed(
                "merkle root does not match stored nodes".to_string(),
            ));
        }
        if rebuilt.max_claim_amount != self.max_claim_amount {
            return Err(MerkleTreeError::ValidationFailed(format!(
                "claim ceiling {} does not match stored {}",
                rebuilt.max_claim_amount, self.max_claim_amount
            )));
        }

        for (index, node) in rebuilt.tree_nodes.iter().enumerate() {
            let proof = rebuilt.get_proof(index)?;
            if !verify(&proof, rebuilt.merkle_root, node.leaf_hash()) {
                return Err(MerkleTreeError::InvalidMerkleProof);
            }
        }
        Ok(())
    }

    /// Load a serialized tree, rebuild its hash layers and cross-check the
    /// stored root and totals against the rebuilt ones.
    pub fn new_from_file(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let stored: VestingMerkleTree = serde_json::from_reader(BufReader::new(file))?;
        let tree = Self::new(stored.tree_nodes, stored.version)?;
        if tree.merkle_root != stored.merkle_root {
            return Err(MerkleTreeError::ValidationFailed(
                "stored root does not match rebuilt root".to_string(),
            ));
        }
        if tree.max_claim_amount != stored.max_claim_amount || tree.max_nodes != stored.max_nodes {
            return Err(MerkleTreeError::ValidationFailed(
                "stored totals do not match rebuilt tree".to_string(),
            ));
        }
        Ok(tree)
    }

    /// Write the tree as pretty-printed JSON.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let serialized = serde_json::to_string_pretty(self)?;
        let mut file = File::create(path)?;
        file.write_all(serialized.as_bytes())?;
        Ok(())
    }

    /// Keyed copy of the node list for fast recipient lookup.
    pub fn convert_to_hashmap(&self) -> HashMap<Pubkey, TreeNode> {
        self.tree_nodes
            .iter()
            .map(|node| (node.recipient, node.clone()))
            .collect()
    }
}

fn build_layers(leaves: Vec<[u8; 32]>) -> Vec<Vec<[u8; 32]>> {
    let mut layers = Vec::new();
    let mut current = leaves;
    while current.len() > 1 {
        let mut next = Vec::with_capacity(current.len().div_ceil(2));
        for pair in current.chunks(2) {
            if let [a, b] = pair {
                next.push(combine(a, b));
            } else {
                // Odd layer: the unpaired hash carries forward unchanged.
                next.push(pair[0]);
            }
        }
        layers.push(current);
        current = next;
    }
    layers.push(current);
    layers
}
