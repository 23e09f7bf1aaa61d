//! # Side-chain merged-mining proofs
//!
//! A side chain piggybacks on the main chain's proof-of-work: a miner drops a
//! "side mining" transaction carrying the side block's hash into a main-chain
//! block, and the side chain accepts a [`SideAuxPow`] proving that the
//! transaction really sits in a main-chain block which itself carries valid
//! proof-of-work.
//!
//! ## Layout
//! - `core/`: hashes, merkle paths, main-chain transactions and headers, the
//!   Bitcoin-style [`AuxPow`] and the [`SideAuxPow`] itself
//! - `config/`: verifier settings (chain id, sanity bounds)
//! - `error/`: decode and verification errors
//! - `utils/`: hashing and wire helpers
//! - `cli/`: arguments for the `auxpow` binary
//!
//! ## Checking a proof
//! ```no_run
//! use sidechain_auxpow::{SideAuxPow, Uint256};
//!
//! # fn demo(bytes: &[u8], side_hash: Uint256) -> sidechain_auxpow::Result<()> {
//! let proof = SideAuxPow::from_bytes(bytes)?;
//! proof.check(&side_hash)?;
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod utils;

pub use cli::{Command, Opt};
pub use config::{Config, VerifierConfig, GLOBAL_CONFIG};
pub use core::{
    checked_merkle_root, compute_merkle_root, expected_index, get_merkle_root,
    merged_mining_script, merkle_branch, AuxPow, BtcHeader, BtcTx, BtcTxIn, BtcTxOut, CoinBase, Header, MerkleTree, OuterProof,
    Payload, Record, SideAuxPow, SideChainPow, Transaction, TransactionRegistry, TransferAsset,
    TxType, Uint256, AUX_POW_CHAIN_ID, SIDE_CHAIN_POW_VERSION,
};
pub use error::{AuxPowError, DecodeError, DecodeResult, Result};
