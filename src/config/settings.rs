use crate::core::AUX_POW_CHAIN_ID;
use crate::error::{AuxPowError, Result};
use log::warn;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use std::str::FromStr;
use std::sync::RwLock;

pub static GLOBAL_CONFIG: Lazy<Config> = Lazy::new(Config::new);

/// Deepest merkle branch a proof may carry (2^32 transactions)
pub const MAX_MERKLE_DEPTH: usize = 32;

/// How many merge-mining proofs may be stacked inside each other
pub const MAX_NESTING_DEPTH: usize = 4;

const CHAIN_ID_KEY: &str = "AUXPOW_CHAIN_ID";
const MAX_MERKLE_DEPTH_KEY: &str = "AUXPOW_MAX_MERKLE_DEPTH";
const MAX_NESTING_DEPTH_KEY: &str = "AUXPOW_MAX_NESTING_DEPTH";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VerifierConfig {
    /// Chain id the main chain's outer proof is checked against
    pub chain_id: u32,
    /// Longest merkle branch accepted when decoding or checking a proof
    pub max_merkle_depth: usize,
    /// Deepest stack of nested side proofs accepted
    pub max_nesting_depth: usize,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        VerifierConfig {
            chain_id: AUX_POW_CHAIN_ID,
            max_merkle_depth: MAX_MERKLE_DEPTH,
            max_nesting_depth: MAX_NESTING_DEPTH,
        }
    }
}

fn env_override<T: FromStr>(key: &str, current: T) -> Result<T> {
    match env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| AuxPowError::Config(format!("{key}: cannot parse '{value}'"))),
        Err(_) => Ok(current),
    }
}

impl VerifierConfig {
    /// Defaults overlaid with any `AUXPOW_*` environment variables
    pub fn from_env() -> Result<VerifierConfig> {
        let defaults = VerifierConfig::default();
        let config = VerifierConfig {
            chain_id: env_override(CHAIN_ID_KEY, defaults.chain_id)?,
            max_merkle_depth: env_override(MAX_MERKLE_DEPTH_KEY, defaults.max_merkle_depth)?,
            max_nesting_depth: env_override(MAX_NESTING_DEPTH_KEY, defaults.max_nesting_depth)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML document; missing keys keep their defaults
    pub fn from_toml_str(s: &str) -> Result<VerifierConfig> {
        let config: VerifierConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<VerifierConfig> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AuxPowError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&contents)
    }

    fn validate(&self) -> Result<()> {
        if self.max_merkle_depth > MAX_MERKLE_DEPTH {
            return Err(AuxPowError::Config(format!(
                "max_merkle_depth {} exceeds hard limit {MAX_MERKLE_DEPTH}",
                self.max_merkle_depth
            )));
        }
        Ok(())
    }
}

/// Process-wide verifier settings, replaceable at runtime
pub struct Config {
    inner: RwLock<VerifierConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Config {
        let config = VerifierConfig::from_env().unwrap_or_else(|e| {
            warn!("Ignoring environment configuration: {e}");
            VerifierConfig::default()
        });
        Config {
            inner: RwLock::new(config),
        }
    }

    pub fn get(&self) -> VerifierConfig {
        *self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    pub fn set(&self, config: VerifierConfig) {
        *self.inner.write().unwrap_or_else(|e| e.into_inner()) = config;
    }

    pub fn get_chain_id(&self) -> u32 {
        self.get().chain_id
    }
}
