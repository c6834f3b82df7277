//! Crate-wide constants for the commitment scheme.

/// Single-byte domain prefix hashed in front of leaf digests so that a leaf
/// can never be confused with an internal node (second-preimage defence).
/// Internal nodes carry no prefix.
pub const LEAF_PREFIX: &[u8] = &[0];

/// Max leaves in a tree; keeps tree height at 32 or below.
pub const MAX_TREE_NODES: u64 = (1u64 << 32) - 1;

/// Byte length of a canonically encoded node: 32-byte recipient, six u64
/// fields little-endian, two single-byte mode fields.
pub const ENCODED_NODE_LEN: usize = 32 + 6 * 8 + 2;
