//! # Merkle Aggregation
//!
//! Builds the full node array of a binary Merkle tree: the leaves first,
//! then each level bottom-up, ending with the root. The combine function is
//! supplied by the caller, so the same builder serves 32-byte SHA3-256 trees
//! and 64-byte SHA3-512 trees alike.
//!
//! When a level has an odd number of nodes, the last node is paired with
//! itself (`combine(last, last)`). It is never promoted unhashed.

use tracing::trace;

use crate::error::ValidationError;

/// Builds the tree and returns every node, root last.
///
/// For `n` leaves the output holds the `n` leaves followed by every interior
/// level in order; ten leaves produce `10 + 5 + 3 + 2 + 1 = 21` nodes. A
/// single leaf is returned as-is and doubles as the root.
///
/// All leaves must have the same length.
///
/// ```
/// use bitmark_protocol::crypto::hash::sha3_256_pair;
/// use bitmark_protocol::crypto::merkle::build_tree;
///
/// let leaves = vec![vec![1u8; 32], vec![2u8; 32], vec![3u8; 32]];
/// let tree = build_tree(&leaves, sha3_256_pair).unwrap();
/// assert_eq!(tree.len(), 3 + 2 + 1);
/// ```
pub fn build_tree<L, F>(leaves: &[L], combine: F) -> Result<Vec<Vec<u8>>, ValidationError>
where
    L: AsRef<[u8]>,
    F: Fn(&[u8], &[u8]) -> Vec<u8>,
{
    let first = leaves.first().ok_or(ValidationError::EmptyLeaves)?;
    let leaf_len = first.as_ref().len();
    if leaf_len == 0 {
        return Err(ValidationError::LeafLength {
            index: 0,
            expected: 1,
            actual: 0,
        });
    }
    for (index, leaf) in leaves.iter().enumerate() {
        let actual = leaf.as_ref().len();
        if actual != leaf_len {
            return Err(ValidationError::LeafLength {
                index,
                expected: leaf_len,
                actual,
            });
        }
    }

    let mut tree: Vec<Vec<u8>> = Vec::with_capacity(2 * leaves.len());
    tree.extend(leaves.iter().map(|leaf| leaf.as_ref().to_vec()));

    let mut level_start = 0;
    let mut level_len = leaves.len();
    while level_len > 1 {
        let level_end = level_start + level_len;
        let mut i = level_start;
        while i < level_end {
            let left = &tree[i];
            // Odd tail: the last node is its own partner.
            let right = if i + 1 < level_end { &tree[i + 1] } else { left };
            let parent = combine(left.as_slice(), right.as_slice());
            tree.push(parent);
            i += 2;
        }
        level_start = level_end;
        level_len = (level_len + 1) / 2;
    }

    trace!(leaves = leaves.len(), nodes = tree.len(), "merkle tree built");
    Ok(tree)
}

/// Builds the tree and returns only its root.
pub fn merkle_root<L, F>(leaves: &[L], combine: F) -> Result<Vec<u8>, ValidationError>
where
    L: AsRef<[u8]>,
    F: Fn(&[u8], &[u8]) -> Vec<u8>,
{
    let mut tree = build_tree(leaves, combine)?;
    tree.pop().ok_or(ValidationError::EmptyLeaves)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::hash::{sha3_256, sha3_256_pair};

    fn leaves(n: u8) -> Vec<[u8; 32]> {
        (0..n).map(|i| sha3_256(&[i])).collect()
    }

    #[test]
    fn empty_input_is_rejected() {
        let none: Vec<Vec<u8>> = Vec::new();
        assert_eq!(
            build_tree(&none, sha3_256_pair),
            Err(ValidationError::EmptyLeaves)
        );
    }

    #[test]
    fn single_leaf_is_its_own_root() {
        let input = leaves(1);
        let tree = build_tree(&input, |_, _| panic!("combine must not be called")).unwrap();
        assert_eq!(tree, vec![input[0].to_vec()]);
    }

    #[test]
    fn two_leaves_hash_once() {
        let input = leaves(2);
        let tree = build_tree(&input, sha3_256_pair).unwrap();
        assert_eq!(tree.len(), 3);
        assert_eq!(tree[2], sha3_256_pair(&input[0], &input[1]));
    }

    #[test]
    fn odd_level_pairs_last_node_with_itself() {
        let input = leaves(3);
        let tree = build_tree(&input, sha3_256_pair).unwrap();
        assert_eq!(tree.len(), 6);
        assert_eq!(tree[3], sha3_256_pair(&input[0], &input[1]));
        assert_eq!(tree[4], sha3_256_pair(&input[2], &input[2]));
        assert_eq!(tree[5], sha3_256_pair(&tree[3], &tree[4]));
    }

    #[test]
    fn ten_leaves_produce_twenty_one_nodes() {
        let tree = build_tree(&leaves(10), sha3_256_pair).unwrap();
        assert_eq!(tree.len(), 21);
    }

    #[test]
    fn rebuild_is_identical() {
        let input = leaves(7);
        let a = build_tree(&input, sha3_256_pair).unwrap();
        let b = build_tree(&input, sha3_256_pair).unwrap();
        assert_eq!(a, b);
        assert_eq!(merkle_root(&input, sha3_256_pair).unwrap(), a[a.len() - 1]);
    }

    #[test]
    fn uneven_leaves_are_rejected() {
        let input = vec![vec![0u8; 32], vec![0u8; 31]];
        assert_eq!(
            build_tree(&input, sha3_256_pair),
            Err(ValidationError::LeafLength {
                index: 1,
                expected: 32,
                actual: 31
            })
        );
    }
}
