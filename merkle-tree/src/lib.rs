//! Merkle commitment scheme for batch vesting grants.
//!
//! A single 32-byte root committed on-chain authorizes an unbounded number
//! of off-chain-defined vesting grants. Issuance tooling builds a
//! [`VestingMerkleTree`] over one [`TreeNode`] per recipient and persists
//! the root; each recipient later claims by presenting their record plus a
//! sibling path, which the consuming program checks with [`verify`] against
//! the stored root. Amending the grant set (adding or removing recipients)
//! means building a new tree and rotating the committed root through
//! [`RootRegistry`]; no-op rotations are rejected.
//!
//! Hash scheme: SHA-256 throughout. Leaves are domain-separated with a
//! `0x00` prefix over the hash of the record's canonical encoding; internal
//! nodes combine children as a sorted pair, so proofs carry no left/right
//! structure. An odd node at any layer is carried forward unchanged.

pub mod constants;
pub mod csv_entry;
pub mod error;
pub mod node;
pub mod proof_export;
pub mod rotation;
pub mod tree;
pub mod verify;

pub use csv_entry::CsvEntry;
pub use error::{MerkleTreeError, Result};
pub use node::TreeNode;
pub use proof_export::UserProof;
pub use rotation::RootRegistry;
pub use tree::{combine, VestingMerkleTree};
pub use verify::{verify, verify_node};
