//! Stored value records.

use onyx_core::constants::STORAGE_ITEM_VERSION;
use onyx_core::{BinaryReader, BinaryWriter, CoreError, CoreResult};
use onyx_vm::limits::MAX_BYTEARRAY_SIZE;

/// A stored value with its record version byte.
///
/// Wire layout: `[version: u8 = 0x01][value: var_bytes]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageItem {
    pub value: Vec<u8>,
}

impl StorageItem {
    /// Wraps a value.
    pub fn new(value: Vec<u8>) -> Self {
        Self { value }
    }

    /// Returns the canonical record bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut writer = BinaryWriter::new();
        writer.write_u8(STORAGE_ITEM_VERSION);
        writer.write_var_bytes(&self.value);
        writer.into_bytes()
    }

    /// Parses a record, rejecting unknown versions.
    pub fn from_bytes(bytes: &[u8]) -> CoreResult<Self> {
        let mut reader = BinaryReader::new(bytes);
        let version = reader.read_u8()?;
        if version != STORAGE_ITEM_VERSION {
            return Err(CoreError::invalid_format(format!(
                "unknown storage item version {version:#04x}"
            )));
        }
        let value = reader.read_var_bytes(MAX_BYTEARRAY_SIZE)?;
        Ok(Self { value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_layout() {
        let item = StorageItem::new(b"v".to_vec());
        let bytes = item.to_bytes();
        assert_eq!(bytes, vec![0x01, 0x01, b'v']);
        assert_eq!(StorageItem::from_bytes(&bytes).unwrap(), item);
    }

    #[test]
    fn test_unknown_version_rejected() {
        assert!(StorageItem::from_bytes(&[0x02, 0x00]).is_err());
    }
}
