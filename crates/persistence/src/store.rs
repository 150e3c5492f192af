//! Store interfaces and the in-memory reference store.

use crate::error::StoreResult;
use parking_lot::RwLock;
use std::collections::BTreeMap;

/// A single operation in a write batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOp {
    Put { key: Vec<u8>, value: Vec<u8> },
    Delete { key: Vec<u8> },
}

/// Read access to a ledger store.
///
/// The execution core only ever reads through this seam; all writes travel
/// through a [`crate::CacheDb`] overlay and are applied by the caller.
/// Implementations must be safe for concurrent readers.
pub trait ReadStore: Send + Sync {
    /// Looks up the value stored under `key`.
    fn get(&self, key: &[u8]) -> StoreResult<Option<Vec<u8>>>;

    /// Checks whether `key` exists.
    fn contains(&self, key: &[u8]) -> StoreResult<bool> {
        Ok(self.get(key)?.is_some())
    }

    /// Returns every entry whose key starts with `prefix`, in ascending
    /// lexicographic key order.
    fn seek_prefix(&self, prefix: &[u8]) -> StoreResult<Vec<(Vec<u8>, Vec<u8>)>>;
}

/// Write access to a store, applied as atomic batches.
pub trait WriteStore: ReadStore {
    /// Applies every operation of the batch atomically.
    fn write_batch(&self, batch: Vec<BatchOp>) -> StoreResult<()>;
}

/// An in-memory store backed by an ordered map.
///
/// Serves as the ledger snapshot in tests and as the reference behavior for
/// real backends: ordered iteration, atomic batches, concurrent readers.
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<BTreeMap<Vec<u8>, Vec<u8>>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns true if the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl ReadStore for MemoryStore {
    fn get(&self, key: &[u8]) -> StoreResult<Option<Vec<u8>>> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn seek_prefix(&self, prefix: &[u8]) -> StoreResult<Vec<(Vec<u8>, Vec<u8>)>> {
        let entries = self.entries.read();
        Ok(entries
            .range(prefix.to_vec()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect())
    }
}

impl WriteStore for MemoryStore {
    fn write_batch(&self, batch: Vec<BatchOp>) -> StoreResult<()> {
        let mut entries = self.entries.write();
        for op in batch {
            match op {
                BatchOp::Put { key, value } => {
                    entries.insert(key, value);
                }
                BatchOp::Delete { key } => {
                    entries.remove(&key);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_and_get() {
        let store = MemoryStore::new();
        store
            .write_batch(vec![
                BatchOp::Put {
                    key: vec![1],
                    value: vec![10],
                },
                BatchOp::Put {
                    key: vec![2],
                    value: vec![20],
                },
                BatchOp::Delete { key: vec![1] },
            ])
            .unwrap();
        assert_eq!(store.get(&[1]).unwrap(), None);
        assert_eq!(store.get(&[2]).unwrap(), Some(vec![20]));
        assert!(store.contains(&[2]).unwrap());
    }

    #[test]
    fn test_seek_prefix_ordered() {
        let store = MemoryStore::new();
        store
            .write_batch(vec![
                BatchOp::Put {
                    key: vec![5, 3],
                    value: vec![1],
                },
                BatchOp::Put {
                    key: vec![5, 1],
                    value: vec![2],
                },
                BatchOp::Put {
                    key: vec![6, 0],
                    value: vec![3],
                },
            ])
            .unwrap();
        let found = store.seek_prefix(&[5]).unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].0, vec![5, 1]);
        assert_eq!(found[1].0, vec![5, 3]);
    }
}
