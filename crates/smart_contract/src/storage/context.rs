//! Storage access capabilities.

use onyx_core::Address;

/// The capability to read, and possibly write, one contract's storage.
///
/// Obtained through the storage services by the currently-executing contract
/// for its own address. `as_read_only` downgrades; nothing upgrades.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorageContext {
    pub contract: Address,
    pub read_only: bool,
}

impl StorageContext {
    /// Creates a writable context for `contract`.
    pub fn new(contract: Address) -> Self {
        Self {
            contract,
            read_only: false,
        }
    }

    /// Creates a read-only context for `contract`.
    pub fn read_only(contract: Address) -> Self {
        Self {
            contract,
            read_only: true,
        }
    }

    /// Returns the same capability without write access.
    pub fn as_read_only(&self) -> Self {
        Self {
            contract: self.contract,
            read_only: true,
        }
    }
}
