//! Parent-chain (Bitcoin-style) structures carried inside an [`AuxPow`](crate::core::AuxPow).

use crate::core::Uint256;
use crate::error::{DecodeResult, Result};
use crate::utils::{
    read_i64, read_len, read_u32, read_var_bytes, write_i64, write_u32, write_var_bytes,
    write_var_uint, MAX_LIST_LEN,
};
use std::io::{Read, Write};

pub const BTC_HEADER_SIZE: usize = 80;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BtcTxIn {
    pub prev_hash: Uint256,
    pub prev_index: u32,
    pub signature_script: Vec<u8>,
    pub sequence: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BtcTxOut {
    pub value: i64,
    pub pk_script: Vec<u8>,
}

/// Legacy (non-witness) Bitcoin transaction
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BtcTx {
    pub version: i32,
    pub inputs: Vec<BtcTxIn>,
    pub outputs: Vec<BtcTxOut>,
    pub lock_time: u32,
}

impl BtcTx {
    /// Coinbase transaction whose single input carries `script`
    pub fn new_coinbase(script: Vec<u8>, outputs: Vec<BtcTxOut>) -> BtcTx {
        BtcTx {
            version: 1,
            inputs: vec![BtcTxIn {
                prev_hash: Uint256::ZERO,
                prev_index: u32::MAX,
                signature_script: script,
                sequence: u32::MAX,
            }],
            outputs,
            lock_time: 0,
        }
    }

    pub fn serialize<W: Write + ?Sized>(&self, w: &mut W) -> Result<()> {
        write_u32(w, self.version as u32)?;

        write_var_uint(w, self.inputs.len() as u64)?;
        for input in &self.inputs {
            input.prev_hash.serialize(w)?;
            write_u32(w, input.prev_index)?;
            write_var_bytes(w, &input.signature_script)?;
            write_u32(w, input.sequence)?;
        }

        write_var_uint(w, self.outputs.len() as u64)?;
        for output in &self.outputs {
            write_i64(w, output.value)?;
            write_var_bytes(w, &output.pk_script)?;
        }

        write_u32(w, self.lock_time)?;
        Ok(())
    }

    pub fn deserialize<R: Read + ?Sized>(r: &mut R) -> DecodeResult<BtcTx> {
        let version = read_u32(r)? as i32;

        let count = read_len(r, "parent tx inputs", MAX_LIST_LEN)?;
        let mut inputs = Vec::new();
        for _ in 0..count {
            inputs.push(BtcTxIn {
                prev_hash: Uint256::deserialize(r)?,
                prev_index: read_u32(r)?,
                signature_script: read_var_bytes(r)?,
                sequence: read_u32(r)?,
            });
        }

        let count = read_len(r, "parent tx outputs", MAX_LIST_LEN)?;
        let mut outputs = Vec::new();
        for _ in 0..count {
            outputs.push(BtcTxOut {
                value: read_i64(r)?,
                pk_script: read_var_bytes(r)?,
            });
        }

        let lock_time = read_u32(r)?;
        Ok(BtcTx {
            version,
            inputs,
            outputs,
            lock_time,
        })
    }

    pub fn hash(&self) -> Uint256 {
        let mut buf = Vec::new();
        // Writes into a Vec cannot fail
        let _ = self.serialize(&mut buf);
        Uint256::hash_of(&buf)
    }
}

/// 80-byte Bitcoin block header
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BtcHeader {
    pub version: i32,
    pub prev_block: Uint256,
    pub merkle_root: Uint256,
    pub timestamp: u32,
    pub bits: u32,
    pub nonce: u32,
}

impl BtcHeader {
    pub fn to_bytes(&self) -> [u8; BTC_HEADER_SIZE] {
        let mut header = [0u8; BTC_HEADER_SIZE];
        header[0..4].copy_from_slice(&self.version.to_le_bytes());
        header[4..36].copy_from_slice(self.prev_block.as_bytes());
        header[36..68].copy_from_slice(self.merkle_root.as_bytes());
        header[68..72].copy_from_slice(&self.timestamp.to_le_bytes());
        header[72..76].copy_from_slice(&self.bits.to_le_bytes());
        header[76..80].copy_from_slice(&self.nonce.to_le_bytes());
        header
    }

    pub fn serialize<W: Write + ?Sized>(&self, w: &mut W) -> Result<()> {
        w.write_all(&self.to_bytes())?;
        Ok(())
    }

    pub fn deserialize<R: Read + ?Sized>(r: &mut R) -> DecodeResult<BtcHeader> {
        let mut buf = [0u8; BTC_HEADER_SIZE];
        r.read_exact(&mut buf)?;

        let word = |at: usize| u32::from_le_bytes([buf[at], buf[at + 1], buf[at + 2], buf[at + 3]]);
        Ok(BtcHeader {
            version: word(0) as i32,
            prev_block: Uint256::from_slice(&buf[4..36])?,
            merkle_root: Uint256::from_slice(&buf[36..68])?,
            timestamp: word(68),
            bits: word(72),
            nonce: word(76),
        })
    }

    pub fn hash(&self) -> Uint256 {
        Uint256::hash_of(&self.to_bytes())
    }
}
