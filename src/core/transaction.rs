// Main-chain transactions as seen by a side chain.
// The body shape depends on the transaction type, so decoding is split in two:
// the registry resolves the type to an empty transaction of the right kind,
// then that transaction reads its own body.

use crate::core::payload::{CoinBase, Payload, Record, SideChainPow, TransferAsset};
use crate::core::Uint256;
use crate::error::{DecodeError, DecodeResult, Result};
use crate::utils::{
    read_bytes, read_i64, read_len, read_u16, read_u32, read_u8, read_var_bytes, write_i64,
    write_u16, write_u32, write_u8, write_var_bytes, write_var_uint, MAX_LIST_LEN,
};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fmt;
use std::io::{Cursor, Read, Write};

/// Transaction format version this codec understands
pub const TX_VERSION_09: u8 = 0x09;

pub const PROGRAM_HASH_SIZE: usize = 21;

/// Transaction kind discriminant; the set is open to embedders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TxType(pub u8);

impl TxType {
    pub const COIN_BASE: TxType = TxType(0x00);
    pub const TRANSFER_ASSET: TxType = TxType(0x02);
    pub const RECORD: TxType = TxType(0x03);
    pub const SIDE_CHAIN_POW: TxType = TxType(0x05);

    pub fn name(&self) -> &'static str {
        match *self {
            TxType::COIN_BASE => "CoinBase",
            TxType::TRANSFER_ASSET => "TransferAsset",
            TxType::RECORD => "Record",
            TxType::SIDE_CHAIN_POW => "SideChainPow",
            _ => "Unknown",
        }
    }
}

impl fmt::Display for TxType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(0x{:02x})", self.name(), self.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attribute {
    pub usage: u8,
    pub data: Vec<u8>,
}

/// Reference to a previous output being spent
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Input {
    pub prev_txid: Uint256,
    pub prev_index: u16,
    pub sequence: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Output {
    pub asset_id: Uint256,
    pub value: i64,
    pub output_lock: u32,
    pub program_hash: [u8; PROGRAM_HASH_SIZE],
}

/// Signature program (unlocking code and its parameters)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    pub code: Vec<u8>,
    pub parameter: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct Transaction {
    version: u8,
    tx_type: TxType,
    payload_version: u8,
    payload: Box<dyn Payload>,
    attributes: Vec<Attribute>,
    inputs: Vec<Input>,
    outputs: Vec<Output>,
    lock_time: u32,
    programs: Vec<Program>,
}

impl Transaction {
    pub fn new(tx_type: TxType, payload_version: u8, payload: Box<dyn Payload>) -> Transaction {
        Transaction {
            version: TX_VERSION_09,
            tx_type,
            payload_version,
            payload,
            attributes: vec![],
            inputs: vec![],
            outputs: vec![],
            lock_time: 0,
            programs: vec![],
        }
    }

    /// Transaction announcing a side-chain block on the main chain
    pub fn new_side_chain_pow(payload: SideChainPow) -> Transaction {
        Self::new(
            TxType::SIDE_CHAIN_POW,
            crate::core::SIDE_CHAIN_POW_VERSION,
            Box::new(payload),
        )
    }

    pub fn with_attribute(mut self, usage: u8, data: Vec<u8>) -> Self {
        self.attributes.push(Attribute { usage, data });
        self
    }

    pub fn with_input(mut self, input: Input) -> Self {
        self.inputs.push(input);
        self
    }

    pub fn with_output(mut self, output: Output) -> Self {
        self.outputs.push(output);
        self
    }

    pub fn with_lock_time(mut self, lock_time: u32) -> Self {
        self.lock_time = lock_time;
        self
    }

    pub fn with_program(mut self, program: Program) -> Self {
        self.programs.push(program);
        self
    }

    pub fn get_version(&self) -> u8 {
        self.version
    }

    pub fn get_tx_type(&self) -> TxType {
        self.tx_type
    }

    pub fn get_payload_version(&self) -> u8 {
        self.payload_version
    }

    pub fn payload(&self) -> &dyn Payload {
        self.payload.as_ref()
    }

    pub fn get_attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    pub fn get_inputs(&self) -> &[Input] {
        &self.inputs
    }

    pub fn get_outputs(&self) -> &[Output] {
        &self.outputs
    }

    pub fn get_lock_time(&self) -> u32 {
        self.lock_time
    }

    pub fn get_programs(&self) -> &[Program] {
        &self.programs
    }

    /// Transaction id: double SHA-256 of the unsigned encoding
    pub fn hash(&self) -> Uint256 {
        let mut buf = Vec::new();
        // Writes into a Vec cannot fail
        let _ = self.serialize_unsigned(&mut buf);
        Uint256::hash_of(&buf)
    }

    fn serialize_unsigned(&self, w: &mut dyn Write) -> Result<()> {
        write_u8(w, self.version)?;
        write_u8(w, self.tx_type.0)?;
        write_u8(w, self.payload_version)?;
        self.payload.serialize(w, self.payload_version)?;

        write_var_uint(w, self.attributes.len() as u64)?;
        for attr in &self.attributes {
            write_u8(w, attr.usage)?;
            write_var_bytes(w, &attr.data)?;
        }

        write_var_uint(w, self.inputs.len() as u64)?;
        for input in &self.inputs {
            input.prev_txid.serialize(w)?;
            write_u16(w, input.prev_index)?;
            write_u32(w, input.sequence)?;
        }

        write_var_uint(w, self.outputs.len() as u64)?;
        for output in &self.outputs {
            output.asset_id.serialize(w)?;
            write_i64(w, output.value)?;
            write_u32(w, output.output_lock)?;
            w.write_all(&output.program_hash)?;
        }

        write_u32(w, self.lock_time)?;
        Ok(())
    }

    pub fn serialize(&self, w: &mut dyn Write) -> Result<()> {
        self.serialize_unsigned(w)?;
        write_var_uint(w, self.programs.len() as u64)?;
        for program in &self.programs {
            write_var_bytes(w, &program.code)?;
            write_var_bytes(w, &program.parameter)?;
        }
        Ok(())
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        let _ = self.serialize(&mut buf);
        buf
    }

    /// Read everything after the version and type bytes already consumed by
    /// [`TransactionRegistry::decode_kind`]
    pub fn deserialize_body(&mut self, r: &mut dyn Read) -> DecodeResult<()> {
        self.payload_version = read_u8(r)?;
        self.payload.deserialize(r, self.payload_version)?;

        let count = read_len(r, "attributes", MAX_LIST_LEN)?;
        self.attributes = Vec::new();
        for _ in 0..count {
            let usage = read_u8(r)?;
            let data = read_var_bytes(r)?;
            self.attributes.push(Attribute { usage, data });
        }

        let count = read_len(r, "inputs", MAX_LIST_LEN)?;
        self.inputs = Vec::new();
        for _ in 0..count {
            self.inputs.push(Input {
                prev_txid: Uint256::deserialize(r)?,
                prev_index: read_u16(r)?,
                sequence: read_u32(r)?,
            });
        }

        let count = read_len(r, "outputs", MAX_LIST_LEN)?;
        self.outputs = Vec::new();
        for _ in 0..count {
            let asset_id = Uint256::deserialize(r)?;
            let value = read_i64(r)?;
            let output_lock = read_u32(r)?;
            let mut program_hash = [0u8; PROGRAM_HASH_SIZE];
            program_hash.copy_from_slice(&read_bytes(r, PROGRAM_HASH_SIZE)?);
            self.outputs.push(Output {
                asset_id,
                value,
                output_lock,
                program_hash,
            });
        }

        self.lock_time = read_u32(r)?;

        let count = read_len(r, "programs", MAX_LIST_LEN)?;
        self.programs = Vec::new();
        for _ in 0..count {
            self.programs.push(Program {
                code: read_var_bytes(r)?,
                parameter: read_var_bytes(r)?,
            });
        }

        Ok(())
    }
}

/// Transactions are equal when their canonical encodings are
impl PartialEq for Transaction {
    fn eq(&self, other: &Self) -> bool {
        self.to_bytes() == other.to_bytes()
    }
}

impl Eq for Transaction {}

/// Builds an empty payload of one kind
pub type PayloadConstructor = fn() -> Box<dyn Payload>;

/// Maps transaction type discriminants to payload constructors
#[derive(Debug, Clone)]
pub struct TransactionRegistry {
    constructors: HashMap<TxType, PayloadConstructor>,
}

static DEFAULT_REGISTRY: Lazy<TransactionRegistry> = Lazy::new(TransactionRegistry::new);

impl Default for TransactionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TransactionRegistry {
    /// Registry holding the built-in kinds
    pub fn new() -> TransactionRegistry {
        let mut registry = TransactionRegistry::empty();
        registry.register(TxType::COIN_BASE, || -> Box<dyn Payload> {
            Box::new(CoinBase::default())
        });
        registry.register(TxType::TRANSFER_ASSET, || -> Box<dyn Payload> {
            Box::new(TransferAsset)
        });
        registry.register(TxType::RECORD, || -> Box<dyn Payload> {
            Box::new(Record::default())
        });
        registry.register(TxType::SIDE_CHAIN_POW, || -> Box<dyn Payload> {
            Box::new(SideChainPow::default())
        });
        registry
    }

    pub fn empty() -> TransactionRegistry {
        TransactionRegistry {
            constructors: HashMap::new(),
        }
    }

    /// Process-wide registry with the built-in kinds
    pub fn global() -> &'static TransactionRegistry {
        &DEFAULT_REGISTRY
    }

    /// Add or replace the constructor for a kind
    pub fn register(&mut self, tx_type: TxType, constructor: PayloadConstructor) {
        self.constructors.insert(tx_type, constructor);
    }

    pub fn is_registered(&self, tx_type: TxType) -> bool {
        self.constructors.contains_key(&tx_type)
    }

    /// First step of a transaction decode: read version and type, return an
    /// empty transaction of that kind
    pub fn decode_kind(&self, r: &mut dyn Read) -> DecodeResult<Transaction> {
        let version = read_u8(r)?;
        if version != TX_VERSION_09 {
            return Err(DecodeError::UnsupportedTxVersion(version));
        }

        let tx_type = TxType(read_u8(r)?);
        let constructor = self
            .constructors
            .get(&tx_type)
            .ok_or(DecodeError::UnknownTransactionType(tx_type.0))?;

        let mut tx = Transaction::new(tx_type, 0, constructor());
        tx.version = version;
        Ok(tx)
    }

    /// Full decode: resolve the kind, then let it read its body
    pub fn decode(&self, r: &mut dyn Read) -> DecodeResult<Transaction> {
        let mut tx = self.decode_kind(r)?;
        tx.deserialize_body(r)?;
        Ok(tx)
    }

    pub fn decode_bytes(&self, bytes: &[u8]) -> DecodeResult<Transaction> {
        let mut cursor = Cursor::new(bytes);
        let tx = self.decode(&mut cursor)?;
        let remaining = bytes.len() - cursor.position() as usize;
        if remaining != 0 {
            return Err(DecodeError::TrailingBytes(remaining));
        }
        Ok(tx)
    }
}
