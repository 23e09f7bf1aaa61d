//! Core merge-mining functionality
//!
//! The side-chain proof itself plus the main-chain and parent-chain
//! structures it is built from: hashes, transactions, headers, merkle paths
//! and the Bitcoin-style merged-mining record.

pub mod aux_pow;
pub mod btc;
pub mod hash;
pub mod header;
pub mod merkle;
pub mod payload;
pub mod side_aux_pow;
pub mod transaction;

pub use aux_pow::{expected_index, merged_mining_script, AuxPow, AUX_POW_CHAIN_ID};
pub use btc::{BtcHeader, BtcTx, BtcTxIn, BtcTxOut};
pub use hash::Uint256;
pub use header::{Header, OuterProof};
pub use merkle::{
    checked_merkle_root, compute_merkle_root, get_merkle_root, merkle_branch, MerkleTree,
};
pub use payload::{CoinBase, Payload, Record, SideChainPow, TransferAsset, SIDE_CHAIN_POW_VERSION};
pub use side_aux_pow::SideAuxPow;
pub use transaction::{
    Attribute, Input, Output, Program, Transaction, TransactionRegistry, TxType,
};
