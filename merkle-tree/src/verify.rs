//! Proof verification, the consuming side of the commitment. The on-chain
//! program runs the same fold against its stored root before honouring a
//! claim.

use crate::node::TreeNode;
use crate::tree::combine;

/// Fold `proof` over `leaf` with the sorted-pair rule and compare against
/// `root`. A mismatch is the normal "invalid or stale proof" outcome, hence
/// a plain boolean rather than an error.
pub fn verify(proof: &[[u8; 32]], root: [u8; 32], leaf: [u8; 32]) -> bool {
    let mut computed = leaf;
    for sibling in proof {
        computed = combine(&computed, sibling);
    }
    computed == root
}

/// Recompute the leaf digest from a node, then fold its proof.
pub fn verify_node(node: &TreeNode, proof: &[[u8; 32]], root: [u8; 32]) -> bool {
    verify(proof, root, node.leaf_hash())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::VestingMerkleTree;
    use anchor_lang::solana_program::pubkey::Pubkey;

    fn node(seed: u8) -> TreeNode {
        TreeNode {
            recipient: Pubkey::new_from_array([seed; 32]),
            vesting_start_time: 0,
            cliff_time: 200,
            frequency: 10,
            cliff_unlock_amount: 100,
            amount_per_period: 100,
            number_of_period: 200,
            update_recipient_mode: 0,
            cancel_mode: 0,
        }
    }

    #[test]
    fn single_record_scenario() {
        let record = node(1);
        let tree = VestingMerkleTree::new(vec![record.clone()], 0).unwrap();
        assert_eq!(tree.merkle_root, record.leaf_hash());

        // Empty proof verifies against the tree's own root and nothing else.
        assert!(verify_node(&record, &[], tree.merkle_root));
        let other_root = [0xAB; 32];
        assert!(!verify_node(&record, &[], other_root));
    }

    #[test]
    fn two_record_scenario() {
        let (a, b) = (node(1), node(2));
        let tree = VestingMerkleTree::new(vec![a.clone(), b.clone()], 0).unwrap();
        assert_eq!(tree.merkle_root, combine(&a.leaf_hash(), &b.leaf_hash()));
        assert_eq!(tree.get_proof(0).unwrap(), vec![b.leaf_hash()]);
        assert_eq!(tree.get_proof(1).unwrap(), vec![a.leaf_hash()]);

        // Swapping construction order keeps the same root.
        let swapped = VestingMerkleTree::new(vec![b.clone(), a.clone()], 0).unwrap();
        assert_eq!(swapped.merkle_root, tree.merkle_root);

        assert!(verify_node(&a, &tree.get_proof(0).unwrap(), tree.merkle_root));
        assert!(verify_node(&b, &tree.get_proof(1).unwrap(), tree.merkle_root));
    }

    #[test]
    fn mutated_record_is_rejected() {
        let tree = VestingMerkleTree::new(vec![node(1), node(2), node(3)], 0).unwrap();
        let proof = tree.get_proof(1).unwrap();
        let root = tree.merkle_root;
        assert!(verify_node(&tree.tree_nodes[1], &proof, root));

        // Any single-field change breaks the leaf digest.
        let mut mutated = tree.tree_nodes[1].clone();
        mutated.cliff_unlock_amount ^= 1;
        assert!(!verify_node(&mutated, &proof, root));

        let mut mutated = tree.tree_nodes[1].clone();
        mutated.cancel_mode ^= 1;
        assert!(!verify_node(&mutated, &proof, root));
    }

    #[test]
    fn mutated_proof_or_root_is_rejected() {
        let tree = VestingMerkleTree::new(vec![node(1), node(2), node(3), node(4)], 0).unwrap();
        let record = &tree.tree_nodes[2];
        let proof = tree.get_proof(2).unwrap();
        let root = tree.merkle_root;

        // Flip one bit in each proof element in turn.
        for position in 0..proof.len() {
            let mut tampered = proof.clone();
            tampered[position][0] ^= 1;
            assert!(!verify_node(record, &tampered, root));
        }

        // Reordering the sibling path also fails.
        let mut reversed = proof.clone();
        reversed.reverse();
        assert!(!verify_node(record, &reversed, root));

        let mut bad_root = root;
        bad_root[31] ^= 1;
        assert!(!verify_node(record, &proof, bad_root));
    }
}
