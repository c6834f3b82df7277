use anchor_lang::solana_program::pubkey::Pubkey;
use thiserror::Error;

use crate::constants::MAX_TREE_NODES;

/// Custom error codes for the vesting merkle tree crate.
#[derive(Debug, Error)]
pub enum MerkleTreeError {
    #[error("cliff time must be strictly after vesting start time")]
    InvalidVestingTime,

    #[error("frequency is zero")]
    FrequencyIsZero,

    #[error("duplicate recipient {0}")]
    DuplicateRecipient(Pubkey),

    #[error("tree has {0} nodes, max is {MAX_TREE_NODES}")]
    TooManyNodes(u64),

    #[error("cannot build a tree from zero nodes")]
    EmptyNodes,

    #[error("math operation overflow")]
    MathOverflow,

    #[error("recipient {0} not found in tree")]
    NodeNotFound(Pubkey),

    #[error("leaf index {0} out of bounds")]
    IndexOutOfBounds(usize),

    #[error("tree validation failed: {0}")]
    ValidationFailed(String),

    #[error("invalid merkle proof")]
    InvalidMerkleProof,

    #[error("new root matches the current root")]
    DuplicateRoot,

    #[error("invalid recipient pubkey {0}")]
    InvalidPubkey(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = core::result::Result<T, MerkleTreeError>;
