//! Bitcoin-style merged-mining record
//!
//! An [`AuxPow`] proves that a parent-chain block committed to an auxiliary
//! chain's block hash: the parent coinbase script embeds the root of the
//! auxiliary merkle tree, the coinbase sits at index 0 of the parent block,
//! and the auxiliary chain's slot in that tree is fixed by its chain id.

use crate::core::btc::{BtcHeader, BtcTx};
use crate::core::merkle::get_merkle_root;
use crate::core::Uint256;
use crate::error::{DecodeResult, Result};
use crate::utils::{read_len, read_u32, write_u32, write_var_uint};
use log::debug;
use std::io::{Read, Write};

/// Default chain id the main chain is merge-mined under
pub const AUX_POW_CHAIN_ID: u32 = 1224;

/// Marker that precedes the auxiliary merkle root in a parent coinbase script
pub const MERGED_MINING_HEADER: [u8; 4] = [0xfa, 0xbe, b'm', b'm'];

/// Without the marker the root must start within this many script bytes
const MAX_ROOT_OFFSET_WITHOUT_HEADER: usize = 20;

/// Deepest auxiliary or coinbase branch accepted off the wire
const MAX_AUX_BRANCH_LEN: u64 = 32;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuxPow {
    pub parent_coinbase: BtcTx,
    pub parent_hash: Uint256,
    pub coinbase_branch: Vec<Uint256>,
    pub coinbase_index: u32,
    pub aux_branch: Vec<Uint256>,
    pub aux_index: u32,
    pub parent_header: BtcHeader,
}

/// Slot a chain must occupy in the auxiliary merkle tree of height `height`
pub fn expected_index(nonce: u32, chain_id: u32, height: usize) -> u32 {
    let mut rand = nonce;
    rand = rand.wrapping_mul(1_103_515_245).wrapping_add(12_345);
    rand = rand.wrapping_add(chain_id);
    rand = rand.wrapping_mul(1_103_515_245).wrapping_add(12_345);

    match 1u32.checked_shl(height as u32) {
        Some(modulus) => rand % modulus,
        None => rand,
    }
}

/// Coinbase script fragment committing to `aux_root` (mining side)
pub fn merged_mining_script(aux_root: &Uint256, tree_size: u32, nonce: u32) -> Vec<u8> {
    let mut script = Vec::with_capacity(4 + 32 + 8);
    script.extend_from_slice(&MERGED_MINING_HEADER);
    script.extend_from_slice(&aux_root.reversed());
    script.extend_from_slice(&tree_size.to_le_bytes());
    script.extend_from_slice(&nonce.to_le_bytes());
    script
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

fn write_branch<W: Write + ?Sized>(w: &mut W, branch: &[Uint256]) -> Result<()> {
    write_var_uint(w, branch.len() as u64)?;
    for hash in branch {
        hash.serialize(w)?;
    }
    Ok(())
}

fn read_branch<R: Read + ?Sized>(r: &mut R, what: &'static str) -> DecodeResult<Vec<Uint256>> {
    let count = read_len(r, what, MAX_AUX_BRANCH_LEN)?;
    let mut branch = Vec::with_capacity(count);
    for _ in 0..count {
        branch.push(Uint256::deserialize(r)?);
    }
    Ok(branch)
}

impl AuxPow {
    pub fn new(
        parent_coinbase: BtcTx,
        coinbase_branch: Vec<Uint256>,
        aux_branch: Vec<Uint256>,
        aux_index: u32,
        parent_header: BtcHeader,
    ) -> AuxPow {
        AuxPow {
            parent_hash: parent_header.hash(),
            parent_coinbase,
            coinbase_branch,
            coinbase_index: 0,
            aux_branch,
            aux_index,
            parent_header,
        }
    }

    /// Parent block whose coinbase commits to `aux_hash` as the only
    /// merge-mined chain (auxiliary tree of height 0)
    pub fn single_chain(aux_hash: &Uint256) -> AuxPow {
        let coinbase = BtcTx::new_coinbase(merged_mining_script(aux_hash, 1, 0), vec![]);
        let parent_header = BtcHeader {
            merkle_root: coinbase.hash(),
            ..Default::default()
        };
        AuxPow::new(coinbase, vec![], vec![], 0, parent_header)
    }

    /// Check that the parent block commits to `aux_hash` for `chain_id`.
    ///
    /// Parent-header difficulty is not judged here.
    pub fn check(&self, aux_hash: &Uint256, chain_id: u32) -> bool {
        if self.coinbase_index != 0 {
            debug!("aux pow rejected: coinbase index {} is not 0", self.coinbase_index);
            return false;
        }

        let aux_root = get_merkle_root(aux_hash, &self.aux_branch, self.aux_index);

        let coinbase_root =
            get_merkle_root(&self.parent_coinbase.hash(), &self.coinbase_branch, 0);
        if coinbase_root != self.parent_header.merkle_root {
            debug!("aux pow rejected: parent coinbase not in parent block");
            return false;
        }

        let Some(first_input) = self.parent_coinbase.inputs.first() else {
            debug!("aux pow rejected: parent coinbase has no inputs");
            return false;
        };
        let script = first_input.signature_script.as_slice();

        let root_bytes = aux_root.reversed();
        let Some(root_pos) = find(script, &root_bytes) else {
            debug!("aux pow rejected: aux merkle root missing from coinbase script");
            return false;
        };

        match find(script, &MERGED_MINING_HEADER) {
            Some(header_pos) => {
                if find(&script[header_pos + 1..], &MERGED_MINING_HEADER).is_some() {
                    debug!("aux pow rejected: multiple merged mining headers");
                    return false;
                }
                if header_pos + MERGED_MINING_HEADER.len() != root_pos {
                    debug!("aux pow rejected: merged mining header not just before root");
                    return false;
                }
            }
            None => {
                if root_pos > MAX_ROOT_OFFSET_WITHOUT_HEADER {
                    debug!("aux pow rejected: aux merkle root too late in coinbase script");
                    return false;
                }
            }
        }

        let tail = &script[root_pos + root_bytes.len()..];
        if tail.len() < 8 {
            debug!("aux pow rejected: missing tree size and nonce");
            return false;
        }

        let height = self.aux_branch.len();
        let tree_size = u32::from_le_bytes([tail[0], tail[1], tail[2], tail[3]]);
        if Some(tree_size) != 1u32.checked_shl(height as u32) {
            debug!("aux pow rejected: tree size {tree_size} does not match branch height {height}");
            return false;
        }

        let nonce = u32::from_le_bytes([tail[4], tail[5], tail[6], tail[7]]);
        if self.aux_index != expected_index(nonce, chain_id, height) {
            debug!("aux pow rejected: aux index {} is not the chain's slot", self.aux_index);
            return false;
        }

        true
    }

    pub fn serialize<W: Write + ?Sized>(&self, w: &mut W) -> Result<()> {
        self.parent_coinbase.serialize(w)?;
        self.parent_hash.serialize(w)?;
        write_branch(w, &self.coinbase_branch)?;
        write_u32(w, self.coinbase_index)?;
        write_branch(w, &self.aux_branch)?;
        write_u32(w, self.aux_index)?;
        self.parent_header.serialize(w)
    }

    pub fn deserialize<R: Read + ?Sized>(r: &mut R) -> DecodeResult<AuxPow> {
        Ok(AuxPow {
            parent_coinbase: BtcTx::deserialize(r)?,
            parent_hash: Uint256::deserialize(r)?,
            coinbase_branch: read_branch(r, "parent coinbase branch")?,
            coinbase_index: read_u32(r)?,
            aux_branch: read_branch(r, "aux branch")?,
            aux_index: read_u32(r)?,
            parent_header: BtcHeader::deserialize(r)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::btc::BtcTxOut;
    use crate::core::merkle::MerkleTree;
    use std::io::Cursor;

    /// Parent block whose coinbase commits to `aux_hash` alone (tree height 0)
    fn single_chain_aux_pow(aux_hash: &Uint256, script_prefix: &[u8]) -> AuxPow {
        let mut script = script_prefix.to_vec();
        script.extend(merged_mining_script(aux_hash, 1, 0));
        let coinbase = BtcTx::new_coinbase(
            script,
            vec![BtcTxOut {
                value: 625_000_000,
                pk_script: vec![0x51],
            }],
        );
        let header = BtcHeader {
            version: 0x2000_0000,
            merkle_root: coinbase.hash(),
            timestamp: 1_700_000_000,
            bits: 0x1703_4219,
            ..Default::default()
        };
        AuxPow::new(coinbase, vec![], vec![], 0, header)
    }

    #[test]
    fn test_expected_index_is_deterministic_and_bounded() {
        for height in 0..6 {
            let index = expected_index(7, AUX_POW_CHAIN_ID, height);
            assert!(index < (1 << height));
            assert_eq!(index, expected_index(7, AUX_POW_CHAIN_ID, height));
        }
        assert_eq!(expected_index(123, AUX_POW_CHAIN_ID, 0), 0);
    }

    #[test]
    fn test_valid_single_chain_commitment() {
        let aux_hash = Uint256::hash_of(b"main block header");
        let aux_pow = single_chain_aux_pow(&aux_hash, &[0x03, 0x40, 0x0d, 0x03]);
        assert!(aux_pow.check(&aux_hash, AUX_POW_CHAIN_ID));
        assert!(!aux_pow.check(&Uint256::hash_of(b"other"), AUX_POW_CHAIN_ID));
    }

    #[test]
    fn test_multi_chain_commitment_uses_chain_slot() {
        let aux_hash = Uint256::hash_of(b"main block header");
        let height = 3;
        let nonce = 0x5eed;
        let slot = expected_index(nonce, AUX_POW_CHAIN_ID, height) as usize;

        let mut leaves: Vec<Uint256> = (0..8u8).map(|i| Uint256::from([i; 32])).collect();
        leaves[slot] = aux_hash;
        let tree = MerkleTree::from_hashes(&leaves);

        let coinbase = BtcTx::new_coinbase(merged_mining_script(&tree.root(), 8, nonce), vec![]);
        let header = BtcHeader {
            merkle_root: coinbase.hash(),
            ..Default::default()
        };
        let aux_pow = AuxPow::new(
            coinbase,
            vec![],
            tree.branch(slot).unwrap(),
            slot as u32,
            header,
        );

        assert!(aux_pow.check(&aux_hash, AUX_POW_CHAIN_ID));
        // Another chain id maps to a different slot (or the same one by chance)
        let other_slot = expected_index(nonce, 1, height) as usize;
        assert_eq!(aux_pow.check(&aux_hash, 1), other_slot == slot);
    }

    #[test]
    fn test_coinbase_must_be_in_parent_block() {
        let aux_hash = Uint256::hash_of(b"main block header");
        let mut aux_pow = single_chain_aux_pow(&aux_hash, &[]);
        aux_pow.parent_header.merkle_root = Uint256::from([0xee; 32]);
        assert!(!aux_pow.check(&aux_hash, AUX_POW_CHAIN_ID));
    }

    #[test]
    fn test_nonzero_coinbase_index_rejected() {
        let aux_hash = Uint256::hash_of(b"main block header");
        let mut aux_pow = single_chain_aux_pow(&aux_hash, &[]);
        aux_pow.coinbase_index = 1;
        assert!(!aux_pow.check(&aux_hash, AUX_POW_CHAIN_ID));
    }

    #[test]
    fn test_duplicate_merged_mining_header_rejected() {
        let aux_hash = Uint256::hash_of(b"main block header");
        let aux_pow = single_chain_aux_pow(&aux_hash, &MERGED_MINING_HEADER);
        assert!(!aux_pow.check(&aux_hash, AUX_POW_CHAIN_ID));
    }

    #[test]
    fn test_root_without_header_must_be_early() {
        let aux_hash = Uint256::hash_of(b"main block header");
        let build = |prefix_len: usize| {
            let mut script = vec![0x01; prefix_len];
            script.extend_from_slice(&aux_hash.reversed());
            script.extend_from_slice(&1u32.to_le_bytes());
            script.extend_from_slice(&0u32.to_le_bytes());
            let coinbase = BtcTx::new_coinbase(script, vec![]);
            let header = BtcHeader {
                merkle_root: coinbase.hash(),
                ..Default::default()
            };
            AuxPow::new(coinbase, vec![], vec![], 0, header)
        };

        assert!(build(20).check(&aux_hash, AUX_POW_CHAIN_ID));
        assert!(!build(21).check(&aux_hash, AUX_POW_CHAIN_ID));
    }

    #[test]
    fn test_wrong_tree_size_rejected() {
        let aux_hash = Uint256::hash_of(b"main block header");
        let coinbase = BtcTx::new_coinbase(merged_mining_script(&aux_hash, 2, 0), vec![]);
        let header = BtcHeader {
            merkle_root: coinbase.hash(),
            ..Default::default()
        };
        let aux_pow = AuxPow::new(coinbase, vec![], vec![], 0, header);
        assert!(!aux_pow.check(&aux_hash, AUX_POW_CHAIN_ID));
    }

    #[test]
    fn test_wire_round_trip() {
        let aux_hash = Uint256::hash_of(b"main block header");
        let aux_pow = single_chain_aux_pow(&aux_hash, &[0x01, 0x02]);

        let mut buf = Vec::new();
        aux_pow.serialize(&mut buf).unwrap();
        let decoded = AuxPow::deserialize(&mut Cursor::new(&buf)).unwrap();
        assert_eq!(decoded, aux_pow);
        assert!(decoded.check(&aux_hash, AUX_POW_CHAIN_ID));

        assert!(AuxPow::deserialize(&mut Cursor::new(&buf[..buf.len() - 1])).is_err());
    }

    #[test]
    fn test_single_chain_helper_validates_for_any_chain_id() {
        let aux_hash = Uint256::hash_of(b"main block header");
        let aux_pow = AuxPow::single_chain(&aux_hash);
        // Height-0 trees have exactly one slot
        assert!(aux_pow.check(&aux_hash, AUX_POW_CHAIN_ID));
        assert!(aux_pow.check(&aux_hash, 7));
    }
}
