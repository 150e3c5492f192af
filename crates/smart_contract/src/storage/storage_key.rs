//! Contract storage keys.

use onyx_core::Address;
use onyx_persistence::DataEntryPrefix;

/// A fully-qualified storage key: the owning contract plus the user key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StorageKey {
    pub contract: Address,
    pub key: Vec<u8>,
}

impl StorageKey {
    /// Creates a storage key.
    pub fn new(contract: Address, key: Vec<u8>) -> Self {
        Self { contract, key }
    }

    /// The ledger key: storage prefix, contract address, user key.
    pub fn to_store_key(&self) -> Vec<u8> {
        let mut suffix = Vec::with_capacity(20 + self.key.len());
        suffix.extend_from_slice(self.contract.as_bytes());
        suffix.extend_from_slice(&self.key);
        DataEntryPrefix::StStorage.key(&suffix)
    }

    /// The ledger key prefix covering every entry of one contract.
    pub fn contract_prefix(contract: &Address) -> Vec<u8> {
        DataEntryPrefix::StStorage.key(contract.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_key_layout() {
        let contract = Address::from_code(b"c");
        let key = StorageKey::new(contract, b"k".to_vec());
        let raw = key.to_store_key();
        assert_eq!(raw[0], 0x05);
        assert_eq!(&raw[1..21], contract.as_bytes());
        assert_eq!(&raw[21..], b"k");
        assert!(raw.starts_with(&StorageKey::contract_prefix(&contract)));
    }
}
