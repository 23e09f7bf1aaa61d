use crate::config::{VerifierConfig, GLOBAL_CONFIG};
use crate::core::{AuxPow, SideAuxPow, TransactionRegistry, Uint256};
use crate::error::{DecodeError, DecodeResult, Result};
use crate::utils::{read_u32, read_u8, write_u32, write_u8};
use log::debug;
use std::io::{Read, Write};

const PROOF_NONE: u8 = 0;
const PROOF_AUX: u8 = 1;
const PROOF_SIDE: u8 = 2;

/// Proof-of-work a main-chain header carries for itself.
///
/// The nesting is open-ended: a [`OuterProof::Side`] proof's own main header
/// carries another `OuterProof`, which may again be a side proof.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum OuterProof {
    #[default]
    None,
    /// Merge-mined against a Bitcoin-style parent chain
    Aux(AuxPow),
    /// Merge-mined one level further up through another side proof
    Side(Box<SideAuxPow>),
}

impl OuterProof {
    pub fn kind(&self) -> &'static str {
        match self {
            OuterProof::None => "none",
            OuterProof::Aux(_) => "aux",
            OuterProof::Side(_) => "side",
        }
    }

    /// Validate this proof for `header_hash` under `config.chain_id`
    pub fn check(&self, header_hash: &Uint256, config: &VerifierConfig) -> bool {
        self.check_at_depth(header_hash, config, 0)
    }

    pub(crate) fn check_at_depth(
        &self,
        header_hash: &Uint256,
        config: &VerifierConfig,
        depth: usize,
    ) -> bool {
        match self {
            OuterProof::None => {
                debug!("header carries no outer proof");
                false
            }
            OuterProof::Aux(aux_pow) => aux_pow.check(header_hash, config.chain_id),
            OuterProof::Side(side) => {
                if depth >= config.max_nesting_depth {
                    debug!("nested side proof exceeds depth {}", config.max_nesting_depth);
                    return false;
                }
                side.check_at_depth(header_hash, config, depth + 1).is_ok()
            }
        }
    }

    pub fn serialize(&self, w: &mut dyn Write) -> Result<()> {
        match self {
            OuterProof::None => write_u8(w, PROOF_NONE)?,
            OuterProof::Aux(aux_pow) => {
                write_u8(w, PROOF_AUX)?;
                aux_pow.serialize(w)?;
            }
            OuterProof::Side(side) => {
                write_u8(w, PROOF_SIDE)?;
                side.serialize(w)?;
            }
        }
        Ok(())
    }

    pub(crate) fn deserialize_at_depth(
        r: &mut dyn Read,
        registry: &TransactionRegistry,
        config: &VerifierConfig,
        depth: usize,
    ) -> DecodeResult<OuterProof> {
        match read_u8(r)? {
            PROOF_NONE => Ok(OuterProof::None),
            PROOF_AUX => Ok(OuterProof::Aux(AuxPow::deserialize(r)?)),
            PROOF_SIDE => {
                if depth >= config.max_nesting_depth {
                    return Err(DecodeError::NestingTooDeep(config.max_nesting_depth));
                }
                let side = SideAuxPow::deserialize_at_depth(r, registry, config, depth + 1)?;
                Ok(OuterProof::Side(Box::new(side)))
            }
            tag => Err(DecodeError::UnknownProofKind(tag)),
        }
    }
}

/// Main-chain block header
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Header {
    pub version: u32,
    pub previous: Uint256,
    pub merkle_root: Uint256,
    pub timestamp: u32,
    pub bits: u32,
    pub height: u32,
    pub nonce: u32,
    pub aux_pow: OuterProof,
}

impl Header {
    fn serialize_base<W: Write + ?Sized>(&self, w: &mut W) -> Result<()> {
        write_u32(w, self.version)?;
        self.previous.serialize(w)?;
        self.merkle_root.serialize(w)?;
        write_u32(w, self.timestamp)?;
        write_u32(w, self.bits)?;
        write_u32(w, self.height)?;
        write_u32(w, self.nonce)?;
        Ok(())
    }

    /// Header hash over the base fields; the outer proof is not covered
    pub fn hash(&self) -> Uint256 {
        let mut buf = Vec::with_capacity(84);
        // Writes into a Vec cannot fail
        let _ = self.serialize_base(&mut buf);
        Uint256::hash_of(&buf)
    }

    pub fn serialize(&self, w: &mut dyn Write) -> Result<()> {
        self.serialize_base(w)?;
        self.aux_pow.serialize(w)
    }

    /// Decode with the built-in transaction kinds and the global configuration
    pub fn deserialize(r: &mut dyn Read) -> DecodeResult<Header> {
        Self::deserialize_with(r, TransactionRegistry::global(), &GLOBAL_CONFIG.get())
    }

    pub fn deserialize_with(
        r: &mut dyn Read,
        registry: &TransactionRegistry,
        config: &VerifierConfig,
    ) -> DecodeResult<Header> {
        Self::deserialize_at_depth(r, registry, config, 0)
    }

    pub(crate) fn deserialize_at_depth(
        r: &mut dyn Read,
        registry: &TransactionRegistry,
        config: &VerifierConfig,
        depth: usize,
    ) -> DecodeResult<Header> {
        Ok(Header {
            version: read_u32(r)?,
            previous: Uint256::deserialize(r)?,
            merkle_root: Uint256::deserialize(r)?,
            timestamp: read_u32(r)?,
            bits: read_u32(r)?,
            height: read_u32(r)?,
            nonce: read_u32(r)?,
            aux_pow: OuterProof::deserialize_at_depth(r, registry, config, depth)?,
        })
    }
}
