//! Block and header records.

use crate::address::{Address, ADDRESS_SIZE};
use crate::crypto::hash256;
use crate::error::CoreResult;
use crate::io::{BinaryReader, BinaryWriter};
use crate::transaction::Transaction;
use crate::uint256::{UInt256, UINT256_SIZE};
use serde::{Deserialize, Serialize};

/// Upper bound on the number of transactions carried by one block.
const MAX_TRANSACTIONS_PER_BLOCK: usize = 65536;

/// A block header: everything needed to identify a block and to supply the
/// deterministic time/height inputs of an execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    pub version: u32,
    pub prev_hash: UInt256,
    /// Merkle root over the block's transactions.
    pub tx_root: UInt256,
    pub timestamp: u32,
    pub height: u32,
    pub consensus_data: u64,
    /// Address authorized to produce the next block.
    pub next_bookkeeper: Address,
}

impl Header {
    /// Writes the canonical byte form.
    pub fn encode(&self, writer: &mut BinaryWriter) {
        writer.write_u32(self.version);
        writer.write_bytes(self.prev_hash.as_bytes());
        writer.write_bytes(self.tx_root.as_bytes());
        writer.write_u32(self.timestamp);
        writer.write_u32(self.height);
        writer.write_u64(self.consensus_data);
        writer.write_bytes(self.next_bookkeeper.as_bytes());
    }

    /// Reads the canonical byte form.
    pub fn decode(reader: &mut BinaryReader) -> CoreResult<Self> {
        let version = reader.read_u32()?;
        let prev_hash = UInt256::from_bytes(&reader.read_bytes(UINT256_SIZE)?)?;
        let tx_root = UInt256::from_bytes(&reader.read_bytes(UINT256_SIZE)?)?;
        let timestamp = reader.read_u32()?;
        let height = reader.read_u32()?;
        let consensus_data = reader.read_u64()?;
        let next_bookkeeper = Address::from_bytes(&reader.read_bytes(ADDRESS_SIZE)?)?;
        Ok(Self {
            version,
            prev_hash,
            tx_root,
            timestamp,
            height,
            consensus_data,
            next_bookkeeper,
        })
    }

    /// Returns the canonical bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut writer = BinaryWriter::new();
        self.encode(&mut writer);
        writer.into_bytes()
    }

    /// Computes the header hash: double SHA-256 of the canonical bytes.
    pub fn hash(&self) -> UInt256 {
        UInt256::from(hash256(&self.to_bytes()))
    }
}

/// A full block: header plus ordered transactions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub header: Header,
    pub transactions: Vec<Transaction>,
}

impl Block {
    /// Writes the canonical byte form.
    pub fn encode(&self, writer: &mut BinaryWriter) {
        self.header.encode(writer);
        writer.write_var_uint(self.transactions.len() as u64);
        for transaction in &self.transactions {
            transaction.encode(writer);
        }
    }

    /// Reads the canonical byte form.
    pub fn decode(reader: &mut BinaryReader) -> CoreResult<Self> {
        let header = Header::decode(reader)?;
        let count = reader.read_var_uint(MAX_TRANSACTIONS_PER_BLOCK as u64)? as usize;
        let mut transactions = Vec::with_capacity(count);
        for _ in 0..count {
            transactions.push(Transaction::decode(reader)?);
        }
        Ok(Self {
            header,
            transactions,
        })
    }

    /// Returns the canonical bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut writer = BinaryWriter::new();
        self.encode(&mut writer);
        writer.into_bytes()
    }

    /// The block identity is its header hash.
    pub fn hash(&self) -> UInt256 {
        self.header.hash()
    }
}
