//! Transaction payloads
//!
//! A payload is the kind-specific body of a main-chain transaction. The set of
//! kinds is open: anything implementing [`Payload`] can be registered with a
//! [`TransactionRegistry`](crate::core::TransactionRegistry).

use crate::core::Uint256;
use crate::error::{DecodeResult, Result};
use crate::utils::{
    read_u32, read_var_bytes, read_var_string, write_u32, write_var_bytes, write_var_string,
};
use std::any::Any;
use std::fmt;
use std::io::{Read, Write};

/// Payload version whose data starts with the side-chain block hash
pub const SIDE_CHAIN_POW_VERSION: u8 = 0x00;

/// Capability set every transaction payload kind provides
pub trait Payload: fmt::Debug + Send + Sync {
    /// Render the payload body to bytes for the given version tag
    fn data(&self, version: u8) -> Vec<u8>;

    fn serialize(&self, w: &mut dyn Write, version: u8) -> Result<()>;

    fn deserialize(&mut self, r: &mut dyn Read, version: u8) -> DecodeResult<()>;

    fn box_clone(&self) -> Box<dyn Payload>;

    fn as_any(&self) -> &dyn Any;
}

impl Clone for Box<dyn Payload> {
    fn clone(&self) -> Self {
        self.box_clone()
    }
}

/// Render a payload through its own serializer
fn render(payload: &dyn Payload, version: u8) -> Vec<u8> {
    let mut buf = Vec::new();
    // Writes into a Vec cannot fail
    let _ = payload.serialize(&mut buf, version);
    buf
}

/// Coinbase payload: arbitrary miner data
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoinBase {
    pub content: Vec<u8>,
}

impl Payload for CoinBase {
    fn data(&self, version: u8) -> Vec<u8> {
        render(self, version)
    }

    fn serialize(&self, w: &mut dyn Write, _version: u8) -> Result<()> {
        write_var_bytes(w, &self.content)?;
        Ok(())
    }

    fn deserialize(&mut self, r: &mut dyn Read, _version: u8) -> DecodeResult<()> {
        self.content = read_var_bytes(r)?;
        Ok(())
    }

    fn box_clone(&self) -> Box<dyn Payload> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Plain value transfer; carries no body
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferAsset;

impl Payload for TransferAsset {
    fn data(&self, _version: u8) -> Vec<u8> {
        Vec::new()
    }

    fn serialize(&self, _w: &mut dyn Write, _version: u8) -> Result<()> {
        Ok(())
    }

    fn deserialize(&mut self, _r: &mut dyn Read, _version: u8) -> DecodeResult<()> {
        Ok(())
    }

    fn box_clone(&self) -> Box<dyn Payload> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Typed data record
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    pub record_type: String,
    pub content: Vec<u8>,
}

impl Payload for Record {
    fn data(&self, version: u8) -> Vec<u8> {
        render(self, version)
    }

    fn serialize(&self, w: &mut dyn Write, _version: u8) -> Result<()> {
        write_var_string(w, &self.record_type)?;
        write_var_bytes(w, &self.content)?;
        Ok(())
    }

    fn deserialize(&mut self, r: &mut dyn Read, _version: u8) -> DecodeResult<()> {
        self.record_type = read_var_string(r)?;
        self.content = read_var_bytes(r)?;
        Ok(())
    }

    fn box_clone(&self) -> Box<dyn Payload> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Side-chain proof-of-work announcement posted on the main chain.
///
/// Its data starts with `side_block_hash`, the hash a merge-mining proof binds to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SideChainPow {
    pub side_block_hash: Uint256,
    pub side_genesis_hash: Uint256,
    pub block_height: u32,
    pub signed_data: Vec<u8>,
}

impl SideChainPow {
    pub fn new(side_block_hash: Uint256, side_genesis_hash: Uint256, block_height: u32) -> Self {
        SideChainPow {
            side_block_hash,
            side_genesis_hash,
            block_height,
            signed_data: Vec::new(),
        }
    }

    fn serialize_unsigned(&self, w: &mut dyn Write) -> Result<()> {
        self.side_block_hash.serialize(w)?;
        self.side_genesis_hash.serialize(w)?;
        write_u32(w, self.block_height)?;
        Ok(())
    }
}

impl Payload for SideChainPow {
    fn data(&self, version: u8) -> Vec<u8> {
        render(self, version)
    }

    fn serialize(&self, w: &mut dyn Write, _version: u8) -> Result<()> {
        self.serialize_unsigned(w)?;
        write_var_bytes(w, &self.signed_data)?;
        Ok(())
    }

    fn deserialize(&mut self, r: &mut dyn Read, _version: u8) -> DecodeResult<()> {
        self.side_block_hash = Uint256::deserialize(r)?;
        self.side_genesis_hash = Uint256::deserialize(r)?;
        self.block_height = read_u32(r)?;
        self.signed_data = read_var_bytes(r)?;
        Ok(())
    }

    fn box_clone(&self) -> Box<dyn Payload> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_side_chain_pow_data_starts_with_block_hash() {
        let side_hash = Uint256::hash_of(b"side block 7");
        let mut payload = SideChainPow::new(side_hash, Uint256::hash_of(b"genesis"), 7);
        payload.signed_data = vec![0xaa; 64];

        let data = payload.data(SIDE_CHAIN_POW_VERSION);
        assert_eq!(&data[..32], side_hash.as_bytes());
        assert_eq!(data.len(), 32 + 32 + 4 + 1 + 64);
    }

    #[test]
    fn test_side_chain_pow_decodes_into_empty_instance() {
        let payload = SideChainPow::new(Uint256::from([3u8; 32]), Uint256::from([4u8; 32]), 99);
        let bytes = payload.data(SIDE_CHAIN_POW_VERSION);

        let mut decoded = SideChainPow::default();
        decoded
            .deserialize(&mut Cursor::new(bytes), SIDE_CHAIN_POW_VERSION)
            .unwrap();
        assert_eq!(decoded, payload);
    }

    #[test]
    fn test_record_round_trips_through_boxed_payload() {
        let record: Box<dyn Payload> = Box::new(Record {
            record_type: "memo".to_string(),
            content: b"hello".to_vec(),
        });
        let cloned = record.clone();
        assert_eq!(cloned.data(0), record.data(0));
        assert_eq!(
            cloned.as_any().downcast_ref::<Record>().unwrap().record_type,
            "memo"
        );
    }

    #[test]
    fn test_transfer_asset_has_no_data() {
        assert!(TransferAsset.data(SIDE_CHAIN_POW_VERSION).is_empty());
    }

    #[test]
    fn test_truncated_side_chain_pow_fails() {
        let mut payload = SideChainPow::default();
        let err = payload
            .deserialize(&mut Cursor::new(vec![0u8; 40]), SIDE_CHAIN_POW_VERSION)
            .unwrap_err();
        assert_eq!(err, crate::error::DecodeError::UnexpectedEof);
    }
}
