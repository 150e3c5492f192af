//! Implementation of UInt256, the 256-bit block and transaction identifier.

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The length of UInt256 values in bytes.
pub const UINT256_SIZE: usize = 32;

/// A 256-bit identifier, stored as raw little-endian bytes.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UInt256([u8; UINT256_SIZE]);

impl UInt256 {
    /// Returns the zero value.
    pub fn zero() -> Self {
        Self::default()
    }

    /// Checks whether every byte is zero.
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|&byte| byte == 0)
    }

    /// Creates a UInt256 from exactly 32 bytes.
    pub fn from_bytes(value: &[u8]) -> CoreResult<Self> {
        if value.len() != UINT256_SIZE {
            return Err(CoreError::invalid_format(format!(
                "invalid UInt256 length: {}",
                value.len()
            )));
        }
        let mut raw = [0u8; UINT256_SIZE];
        raw.copy_from_slice(value);
        Ok(Self(raw))
    }

    /// Borrows the underlying bytes.
    pub fn as_bytes(&self) -> &[u8; UINT256_SIZE] {
        &self.0
    }

    /// Copies the bytes into a vector.
    pub fn to_vec(&self) -> Vec<u8> {
        self.0.to_vec()
    }
}

impl From<[u8; UINT256_SIZE]> for UInt256 {
    fn from(value: [u8; UINT256_SIZE]) -> Self {
        Self(value)
    }
}

impl fmt::Debug for UInt256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UInt256({})", hex::encode(self.0))
    }
}

impl fmt::Display for UInt256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_bytes_roundtrip() {
        let mut raw = [0u8; UINT256_SIZE];
        raw[0] = 0x42;
        let value = UInt256::from_bytes(&raw).unwrap();
        assert_eq!(value.as_bytes(), &raw);
        assert!(!value.is_zero());
        assert!(UInt256::zero().is_zero());
    }

    #[test]
    fn test_rejects_wrong_length() {
        assert!(UInt256::from_bytes(&[0u8; 20]).is_err());
    }
}
