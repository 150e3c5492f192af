//! Implementation of the 20-byte script/account address.

use crate::constants::ADDRESS_VERSION;
use crate::crypto::{checksum, hash160};
use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The length of addresses in bytes.
pub const ADDRESS_SIZE: usize = 20;

/// A 20-byte contract or account identifier derived from a script hash.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Address([u8; ADDRESS_SIZE]);

impl Address {
    /// Returns the zero address.
    pub fn zero() -> Self {
        Self::default()
    }

    /// Checks whether every byte is zero.
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|&byte| byte == 0)
    }

    /// Creates an address from exactly 20 bytes.
    pub fn from_bytes(value: &[u8]) -> CoreResult<Self> {
        if value.len() != ADDRESS_SIZE {
            return Err(CoreError::invalid_format(format!(
                "invalid address length: {}",
                value.len()
            )));
        }
        let mut raw = [0u8; ADDRESS_SIZE];
        raw.copy_from_slice(value);
        Ok(Self(raw))
    }

    /// Derives the address of a script: RIPEMD-160 over SHA-256 of the code.
    pub fn from_code(code: &[u8]) -> Self {
        Self(hash160(code))
    }

    /// Borrows the underlying bytes.
    pub fn as_bytes(&self) -> &[u8; ADDRESS_SIZE] {
        &self.0
    }

    /// Copies the bytes into a vector.
    pub fn to_vec(&self) -> Vec<u8> {
        self.0.to_vec()
    }

    /// Encodes the address in Base58Check textual form.
    pub fn to_base58(&self) -> String {
        let mut data = Vec::with_capacity(1 + ADDRESS_SIZE + 4);
        data.push(ADDRESS_VERSION);
        data.extend_from_slice(&self.0);
        let sum = checksum(&data);
        data.extend_from_slice(&sum);
        bs58::encode(data).into_string()
    }

    /// Decodes a Base58Check textual address, verifying version and checksum.
    pub fn from_base58(encoded: &str) -> CoreResult<Self> {
        let data = bs58::decode(encoded)
            .into_vec()
            .map_err(|e| CoreError::invalid_base58(e.to_string()))?;
        if data.len() != 1 + ADDRESS_SIZE + 4 {
            return Err(CoreError::invalid_base58(format!(
                "decoded length {} is not {}",
                data.len(),
                1 + ADDRESS_SIZE + 4
            )));
        }
        if data[0] != ADDRESS_VERSION {
            return Err(CoreError::invalid_base58(format!(
                "unexpected version byte {:#04x}",
                data[0]
            )));
        }
        let (payload, sum) = data.split_at(1 + ADDRESS_SIZE);
        if checksum(payload) != sum {
            return Err(CoreError::invalid_base58("checksum mismatch"));
        }
        Self::from_bytes(&payload[1..])
    }
}

impl From<[u8; ADDRESS_SIZE]> for Address {
    fn from(value: [u8; ADDRESS_SIZE]) -> Self {
        Self(value)
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", hex::encode(self.0))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_base58())
    }
}
