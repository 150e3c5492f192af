//! Transaction records and the abstract code-container collaborator.

use crate::address::{Address, ADDRESS_SIZE};
use crate::crypto::hash256;
use crate::error::{CoreError, CoreResult};
use crate::io::{BinaryReader, BinaryWriter};
use crate::uint256::UInt256;
use serde::{Deserialize, Serialize};

/// Upper bound on the encoded size of a transaction payload.
const MAX_PAYLOAD_SIZE: usize = 1024 * 1024;

/// Upper bound on the number of attributes or signers per transaction.
const MAX_LIST_COUNT: usize = 1024;

/// The kind of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum TransactionType {
    /// Deploys a contract.
    Deploy = 0xD0,
    /// Invokes contract code.
    Invoke = 0xD1,
}

impl TryFrom<u8> for TransactionType {
    type Error = CoreError;

    fn try_from(value: u8) -> CoreResult<Self> {
        match value {
            0xD0 => Ok(TransactionType::Deploy),
            0xD1 => Ok(TransactionType::Invoke),
            other => Err(CoreError::invalid_format(format!(
                "unknown transaction type {other:#04x}"
            ))),
        }
    }
}

/// An opaque attribute attached to a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionAttribute {
    /// Discriminator assigned by the transaction author.
    pub usage: u8,
    /// Attribute payload.
    pub data: Vec<u8>,
}

/// A transaction carrying bytecode into the execution core.
///
/// Decoding and signature verification happen upstream; the core only relies
/// on the surface exposed through [`CodeContainer`], plus the `code` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub version: u8,
    pub tx_type: TransactionType,
    pub nonce: u32,
    /// Bytecode executed by the ScriptVM.
    pub code: Vec<u8>,
    pub attributes: Vec<TransactionAttribute>,
    /// Addresses whose signatures were verified upstream.
    pub signers: Vec<Address>,
}

impl Transaction {
    /// Creates an invocation transaction around the given bytecode.
    pub fn invoke(code: Vec<u8>, nonce: u32) -> Self {
        Self {
            version: 0,
            tx_type: TransactionType::Invoke,
            nonce,
            code,
            attributes: Vec::new(),
            signers: Vec::new(),
        }
    }

    /// Writes the canonical byte form.
    pub fn encode(&self, writer: &mut BinaryWriter) {
        writer.write_u8(self.version);
        writer.write_u8(self.tx_type as u8);
        writer.write_u32(self.nonce);
        writer.write_var_bytes(&self.code);
        writer.write_var_uint(self.attributes.len() as u64);
        for attribute in &self.attributes {
            writer.write_u8(attribute.usage);
            writer.write_var_bytes(&attribute.data);
        }
        writer.write_var_uint(self.signers.len() as u64);
        for signer in &self.signers {
            writer.write_bytes(signer.as_bytes());
        }
    }

    /// Reads the canonical byte form.
    pub fn decode(reader: &mut BinaryReader) -> CoreResult<Self> {
        let version = reader.read_u8()?;
        let tx_type = TransactionType::try_from(reader.read_u8()?)?;
        let nonce = reader.read_u32()?;
        let code = reader.read_var_bytes(MAX_PAYLOAD_SIZE)?;
        let attribute_count = reader.read_var_uint(MAX_LIST_COUNT as u64)? as usize;
        let mut attributes = Vec::with_capacity(attribute_count);
        for _ in 0..attribute_count {
            let usage = reader.read_u8()?;
            let data = reader.read_var_bytes(MAX_PAYLOAD_SIZE)?;
            attributes.push(TransactionAttribute { usage, data });
        }
        let signer_count = reader.read_var_uint(MAX_LIST_COUNT as u64)? as usize;
        let mut signers = Vec::with_capacity(signer_count);
        for _ in 0..signer_count {
            let bytes = reader.read_bytes(ADDRESS_SIZE)?;
            signers.push(Address::from_bytes(&bytes)?);
        }
        Ok(Self {
            version,
            tx_type,
            nonce,
            code,
            attributes,
            signers,
        })
    }

    /// Returns the canonical bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut writer = BinaryWriter::new();
        self.encode(&mut writer);
        writer.into_bytes()
    }

    /// Computes the transaction hash: double SHA-256 of the canonical bytes.
    pub fn hash(&self) -> UInt256 {
        UInt256::from(hash256(&self.to_bytes()))
    }
}

/// The surface of a transaction the execution core is allowed to see.
///
/// Implemented by [`Transaction`]; test doubles implement it directly.
pub trait CodeContainer {
    /// Hash identifying this container.
    fn container_hash(&self) -> UInt256;

    /// Raw type discriminator of the container.
    fn container_type(&self) -> u8;

    /// Attributes attached to the container.
    fn attributes(&self) -> &[TransactionAttribute];

    /// Addresses whose signatures over this container were verified upstream.
    fn signature_addresses(&self) -> &[Address];
}

impl CodeContainer for Transaction {
    fn container_hash(&self) -> UInt256 {
        self.hash()
    }

    fn container_type(&self) -> u8 {
        self.tx_type as u8
    }

    fn attributes(&self) -> &[TransactionAttribute] {
        &self.attributes
    }

    fn signature_addresses(&self) -> &[Address] {
        &self.signers
    }
}
