use crate::core::Uint256;
use crate::utils::sha256d_pair;

/// Walk from `leaf` up to a merkle root using the sibling hashes in `branch`.
///
/// Bit `i` of `index` says which side the running hash sits on at level `i`:
/// 1 means the sibling is on the left. Bits above `branch.len()` are not read.
pub fn get_merkle_root(leaf: &Uint256, branch: &[Uint256], index: u32) -> Uint256 {
    let mut hash = *leaf.as_bytes();
    let mut index = index;

    for sibling in branch {
        hash = if index & 1 == 1 {
            sha256d_pair(sibling.as_bytes(), &hash)
        } else {
            sha256d_pair(&hash, sibling.as_bytes())
        };
        index >>= 1;
    }

    Uint256::from(hash)
}

/// Like [`get_merkle_root`], but `None` when the path climbs as a right child
/// whose left sibling is the same hash.
///
/// Odd levels duplicate their last node on the right, so a right child equal
/// to its sibling is that duplicate and names no real leaf.
pub fn checked_merkle_root(leaf: &Uint256, branch: &[Uint256], index: u32) -> Option<Uint256> {
    let mut hash = *leaf.as_bytes();
    let mut index = index;

    for sibling in branch {
        hash = if index & 1 == 1 {
            if sibling.as_bytes() == &hash {
                return None;
            }
            sha256d_pair(sibling.as_bytes(), &hash)
        } else {
            sha256d_pair(&hash, sibling.as_bytes())
        };
        index >>= 1;
    }

    Some(Uint256::from(hash))
}

/// Bitcoin-style merkle tree kept level by level, leaves first.
///
/// Odd levels pair their last element with itself.
#[derive(Debug, Clone)]
pub struct MerkleTree {
    levels: Vec<Vec<Uint256>>,
}

impl MerkleTree {
    pub fn from_hashes(leaves: &[Uint256]) -> MerkleTree {
        let mut levels = vec![leaves.to_vec()];

        while levels.last().map_or(false, |level| level.len() > 1) {
            let current = &levels[levels.len() - 1];
            let next: Vec<Uint256> = current
                .chunks(2)
                .map(|pair| {
                    let left = pair[0];
                    // Odd number of nodes - duplicate the last one
                    let right = pair.get(1).copied().unwrap_or(left);
                    Uint256::from(sha256d_pair(left.as_bytes(), right.as_bytes()))
                })
                .collect();
            levels.push(next);
        }

        MerkleTree { levels }
    }

    /// Root of the tree; the zero hash for an empty tree
    pub fn root(&self) -> Uint256 {
        self.levels
            .last()
            .and_then(|level| level.first())
            .copied()
            .unwrap_or(Uint256::ZERO)
    }

    pub fn leaf_count(&self) -> usize {
        self.levels.first().map_or(0, Vec::len)
    }

    pub fn depth(&self) -> usize {
        self.levels.len().saturating_sub(1)
    }

    /// Sibling path for the leaf at `index`, ready for [`get_merkle_root`]
    pub fn branch(&self, index: usize) -> Option<Vec<Uint256>> {
        if index >= self.leaf_count() {
            return None;
        }

        let mut branch = Vec::with_capacity(self.depth());
        let mut position = index;
        for level in &self.levels[..self.depth()] {
            let sibling = position ^ 1;
            branch.push(level.get(sibling).copied().unwrap_or(level[position]));
            position >>= 1;
        }

        Some(branch)
    }
}

/// Merkle root of a list of leaf hashes (a single leaf is its own root)
pub fn compute_merkle_root(leaves: &[Uint256]) -> Uint256 {
    MerkleTree::from_hashes(leaves).root()
}

/// Sibling path for `leaves[index]`; `None` when `index` is out of range
pub fn merkle_branch(leaves: &[Uint256], index: usize) -> Option<Vec<Uint256>> {
    MerkleTree::from_hashes(leaves).branch(index)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(byte: u8) -> Uint256 {
        Uint256::from([byte; 32])
    }

    #[test]
    fn test_empty_branch_returns_leaf() {
        let tx = leaf(0x42);
        assert_eq!(get_merkle_root(&tx, &[], 0), tx);
        // Index bits are never read without a branch
        assert_eq!(get_merkle_root(&tx, &[], 7), tx);
    }

    #[test]
    fn test_single_leaf_root_is_leaf() {
        assert_eq!(compute_merkle_root(&[leaf(0x42)]), leaf(0x42));
        assert_eq!(compute_merkle_root(&[]), Uint256::ZERO);
    }

    #[test]
    fn test_two_leaf_root() {
        let root = compute_merkle_root(&[leaf(0x11), leaf(0x22)]);
        let expected = Uint256::from(sha256d_pair(&[0x11; 32], &[0x22; 32]));
        assert_eq!(root, expected);
    }

    #[test]
    fn test_three_leaf_root_duplicates_last() {
        let root = compute_merkle_root(&[leaf(0x11), leaf(0x22), leaf(0x33)]);

        let h12 = sha256d_pair(&[0x11; 32], &[0x22; 32]);
        let h33 = sha256d_pair(&[0x33; 32], &[0x33; 32]);
        assert_eq!(root, Uint256::from(sha256d_pair(&h12, &h33)));
    }

    #[test]
    fn test_branch_reconstructs_root_for_every_leaf() {
        for count in 1..=9u8 {
            let leaves: Vec<Uint256> = (0..count).map(leaf).collect();
            let tree = MerkleTree::from_hashes(&leaves);
            let root = tree.root();

            for (index, hash) in leaves.iter().enumerate() {
                let branch = tree.branch(index).unwrap();
                assert_eq!(branch.len(), tree.depth());
                assert_eq!(
                    get_merkle_root(hash, &branch, index as u32),
                    root,
                    "leaf {index} of {count}"
                );
            }
        }
    }

    #[test]
    fn test_index_selects_combination_order() {
        let tx = leaf(0x01);
        let sibling = leaf(0x02);
        let as_left = get_merkle_root(&tx, &[sibling], 0);
        let as_right = get_merkle_root(&tx, &[sibling], 1);
        assert_ne!(as_left, as_right);
        assert_eq!(as_right, Uint256::from(sha256d_pair(&[0x02; 32], &[0x01; 32])));
    }

    #[test]
    fn test_checked_root_rejects_duplicated_right_node() {
        let leaves: Vec<Uint256> = (0..5u8).map(leaf).collect();
        let tree = MerkleTree::from_hashes(&leaves);
        let branch = tree.branch(4).unwrap();

        assert_eq!(checked_merkle_root(&leaves[4], &branch, 4), Some(tree.root()));
        // Index 5 reaches the same root through the duplicate of leaf 4
        assert_eq!(get_merkle_root(&leaves[4], &branch, 5), tree.root());
        assert_eq!(checked_merkle_root(&leaves[4], &branch, 5), None);
    }

    #[test]
    fn test_checked_root_accepts_every_real_leaf() {
        for count in 1..=9u8 {
            let leaves: Vec<Uint256> = (0..count).map(leaf).collect();
            let tree = MerkleTree::from_hashes(&leaves);
            for (index, hash) in leaves.iter().enumerate() {
                let branch = tree.branch(index).unwrap();
                assert_eq!(
                    checked_merkle_root(hash, &branch, index as u32),
                    Some(tree.root()),
                    "leaf {index} of {count}"
                );
            }
        }
    }

    #[test]
    fn test_branch_out_of_range() {
        assert!(merkle_branch(&[leaf(1), leaf(2)], 2).is_none());
        assert!(merkle_branch(&[], 0).is_none());
    }
}
