//! Deployed contract records.

use onyx_core::{Address, BinaryReader, BinaryWriter, CoreResult};
use serde::{Deserialize, Serialize};

/// Upper bound on contract code size.
const MAX_CODE_SIZE: usize = 1024 * 1024;

/// Upper bound on each metadata string.
const MAX_METADATA_SIZE: usize = 252;

/// A deployed contract: its code plus the deploy-time metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractState {
    pub code: Vec<u8>,
    /// Whether the contract is entitled to its own storage space.
    pub needs_storage: bool,
    pub name: String,
    pub version: String,
    pub author: String,
    pub email: String,
    pub description: String,
}

impl ContractState {
    /// The contract address is the hash of its code.
    pub fn address(&self) -> Address {
        Address::from_code(&self.code)
    }

    /// Writes the canonical byte form.
    pub fn encode(&self, writer: &mut BinaryWriter) {
        writer.write_var_bytes(&self.code);
        writer.write_u8(self.needs_storage as u8);
        writer.write_var_string(&self.name);
        writer.write_var_string(&self.version);
        writer.write_var_string(&self.author);
        writer.write_var_string(&self.email);
        writer.write_var_string(&self.description);
    }

    /// Reads the canonical byte form.
    pub fn decode(reader: &mut BinaryReader) -> CoreResult<Self> {
        let code = reader.read_var_bytes(MAX_CODE_SIZE)?;
        let needs_storage = reader.read_u8()? != 0;
        let name = reader.read_var_string(MAX_METADATA_SIZE)?;
        let version = reader.read_var_string(MAX_METADATA_SIZE)?;
        let author = reader.read_var_string(MAX_METADATA_SIZE)?;
        let email = reader.read_var_string(MAX_METADATA_SIZE)?;
        let description = reader.read_var_string(MAX_METADATA_SIZE)?;
        Ok(Self {
            code,
            needs_storage,
            name,
            version,
            author,
            email,
            description,
        })
    }

    /// Returns the canonical bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut writer = BinaryWriter::new();
        self.encode(&mut writer);
        writer.into_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_decode() {
        let contract = ContractState {
            code: vec![0x51, 0x66],
            needs_storage: true,
            name: "token".into(),
            version: "1.0".into(),
            author: "dev".into(),
            email: "dev@example.org".into(),
            description: "a token".into(),
        };
        let bytes = contract.to_bytes();
        let mut reader = BinaryReader::new(&bytes);
        let decoded = ContractState::decode(&mut reader).unwrap();
        assert_eq!(contract, decoded);
        assert_eq!(contract.address(), Address::from_code(&[0x51, 0x66]));
    }
}
