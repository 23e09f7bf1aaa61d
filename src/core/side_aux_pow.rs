//! Merge-mining proof for side-chain blocks
//!
//! A [`SideAuxPow`] lets a side chain accept a block as mined without its own
//! hash power. It shows that a main-chain transaction naming the side block's
//! hash was included in a main-chain block, and that the main-chain block
//! carries valid proof-of-work of its own.
//!
//! Construction never validates; [`SideAuxPow::check`] does all the judging:
//!
//! 1. the main header's outer proof validates for the configured chain id,
//! 2. the transaction's merkle path rebuilds the main header's merkle root,
//! 3. the first 32 bytes of the transaction payload equal the claimed hash.

use crate::config::{VerifierConfig, GLOBAL_CONFIG};
use crate::core::header::Header;
use crate::core::merkle::checked_merkle_root;
use crate::core::payload::SIDE_CHAIN_POW_VERSION;
use crate::core::hash::{Uint256, UINT256_SIZE};
use crate::core::transaction::{Transaction, TransactionRegistry};
use crate::error::{AuxPowError, DecodeError, DecodeResult, Result};
use crate::utils::serialization::check_len;
use crate::utils::{read_u32, write_u32};
use log::{debug, warn};
use std::io::{Cursor, Read, Write};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SideAuxPow {
    pub side_aux_merkle_branch: Vec<Uint256>,
    pub side_aux_merkle_index: u32,
    pub side_aux_block_tx: Transaction,
    pub main_block_header: Header,
}

impl SideAuxPow {
    pub fn new(
        side_aux_merkle_branch: Vec<Uint256>,
        side_aux_merkle_index: u32,
        side_aux_block_tx: Transaction,
        main_block_header: Header,
    ) -> SideAuxPow {
        SideAuxPow {
            side_aux_merkle_branch,
            side_aux_merkle_index,
            side_aux_block_tx,
            main_block_header,
        }
    }

    pub fn serialize(&self, w: &mut dyn Write) -> Result<()> {
        self.side_aux_block_tx.serialize(w)?;

        write_u32(w, self.side_aux_merkle_branch.len() as u32)?;
        for branch in &self.side_aux_merkle_branch {
            branch.serialize(w)?;
        }

        write_u32(w, self.side_aux_merkle_index)?;
        self.main_block_header.serialize(w)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        // Writes into a Vec cannot fail
        let _ = self.serialize(&mut buf);
        buf
    }

    /// Decode with the built-in transaction kinds and the global configuration
    pub fn deserialize(r: &mut dyn Read) -> Result<SideAuxPow> {
        Self::deserialize_with(r, TransactionRegistry::global(), &GLOBAL_CONFIG.get())
    }

    pub fn deserialize_with(
        r: &mut dyn Read,
        registry: &TransactionRegistry,
        config: &VerifierConfig,
    ) -> Result<SideAuxPow> {
        Ok(Self::deserialize_at_depth(r, registry, config, 0)?)
    }

    /// Decode a complete proof from `bytes`; leftover bytes are an error
    pub fn from_bytes(bytes: &[u8]) -> Result<SideAuxPow> {
        Self::from_bytes_with(bytes, TransactionRegistry::global(), &GLOBAL_CONFIG.get())
    }

    pub fn from_bytes_with(
        bytes: &[u8],
        registry: &TransactionRegistry,
        config: &VerifierConfig,
    ) -> Result<SideAuxPow> {
        let mut cursor = Cursor::new(bytes);
        let proof = Self::deserialize_with(&mut cursor, registry, config)?;
        let remaining = bytes.len() - cursor.position() as usize;
        if remaining != 0 {
            return Err(DecodeError::TrailingBytes(remaining).into());
        }
        Ok(proof)
    }

    pub(crate) fn deserialize_at_depth(
        r: &mut dyn Read,
        registry: &TransactionRegistry,
        config: &VerifierConfig,
        depth: usize,
    ) -> DecodeResult<SideAuxPow> {
        let mut side_aux_block_tx = registry.decode_kind(r)?;
        side_aux_block_tx.deserialize_body(r)?;

        let count = read_u32(r)?;
        let max = config.max_merkle_depth as u64;
        let count = check_len("side aux merkle branch", count.into(), max)?;
        let mut side_aux_merkle_branch = Vec::with_capacity(count);
        for _ in 0..count {
            side_aux_merkle_branch.push(Uint256::deserialize(r)?);
        }

        let side_aux_merkle_index = read_u32(r)?;
        let main_block_header = Header::deserialize_at_depth(r, registry, config, depth)?;

        Ok(SideAuxPow {
            side_aux_merkle_branch,
            side_aux_merkle_index,
            side_aux_block_tx,
            main_block_header,
        })
    }

    /// Verify this proof for `hash_aux_block` under the global configuration
    pub fn check(&self, hash_aux_block: &Uint256) -> Result<()> {
        self.check_with(hash_aux_block, &GLOBAL_CONFIG.get())
    }

    pub fn check_with(&self, hash_aux_block: &Uint256, config: &VerifierConfig) -> Result<()> {
        let result = self.check_at_depth(hash_aux_block, config, 0);
        if let Err(e) = &result {
            warn!("Side aux pow rejected for block {hash_aux_block}: {e}");
        }
        result
    }

    pub(crate) fn check_at_depth(
        &self,
        hash_aux_block: &Uint256,
        config: &VerifierConfig,
        depth: usize,
    ) -> Result<()> {
        let main_block_header_hash = self.main_block_header.hash();
        if !self
            .main_block_header
            .aux_pow
            .check_at_depth(&main_block_header_hash, config, depth)
        {
            return Err(AuxPowError::OuterProofInvalid);
        }
        debug!("main block header {main_block_header_hash} outer proof ok (depth {depth})");

        let expected = self.main_block_header.merkle_root;
        let computed = self.side_aux_pow_merkle_root(config)?;
        if computed != expected {
            return Err(AuxPowError::MerkleRootMismatch { computed, expected });
        }
        debug!("side aux tx included under merkle root {expected}");

        let found = self.payload_hash()?;
        if found != *hash_aux_block {
            return Err(AuxPowError::HashBindingMismatch {
                expected: *hash_aux_block,
                found,
            });
        }

        Ok(())
    }

    /// Root rebuilt from the transaction hash, branch and index.
    ///
    /// A branch deeper than the configured bound, an index with bits set at
    /// or above the branch height, or a path through a duplicated right node
    /// cannot name a real leaf and is rejected.
    fn side_aux_pow_merkle_root(&self, config: &VerifierConfig) -> Result<Uint256> {
        let depth = self.side_aux_merkle_branch.len();
        let index = self.side_aux_merkle_index;
        let expected = self.main_block_header.merkle_root;

        let index_in_range = u64::from(index) >> depth.min(63) == 0;
        let root = if depth <= config.max_merkle_depth && index_in_range {
            checked_merkle_root(
                &self.side_aux_block_tx.hash(),
                &self.side_aux_merkle_branch,
                index,
            )
        } else {
            None
        };

        root.ok_or_else(|| {
            debug!("merkle index {index} is not a leaf of a depth {depth} tree");
            AuxPowError::MerkleRootMismatch {
                computed: Uint256::ZERO,
                expected,
            }
        })
    }

    /// Side-chain block hash the transaction payload vouches for
    pub fn payload_hash(&self) -> Result<Uint256> {
        let data = self
            .side_aux_block_tx
            .payload()
            .data(SIDE_CHAIN_POW_VERSION);
        let bound = data
            .get(..UINT256_SIZE)
            .ok_or(AuxPowError::PayloadHashDecode { len: data.len() })?;
        Ok(Uint256::from_slice(bound)?)
    }
}
