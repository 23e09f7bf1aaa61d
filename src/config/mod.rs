//! Configuration management
//!
//! Verification parameters: the chain id the main chain is merge-mined
//! under and the sanity bounds applied to untrusted proofs. Values come
//! from defaults, environment variables or a TOML file.

pub mod settings;

pub use settings::{Config, VerifierConfig, GLOBAL_CONFIG};
