//! Layered copy-on-write overlay above a read-only ledger store.

use crate::error::{StoreError, StoreResult};
use crate::store::{BatchOp, ReadStore};
use log::debug;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// One overlay layer. `None` marks a tombstone for a deleted key.
type Layer = BTreeMap<Vec<u8>, Option<Vec<u8>>>;

/// A transactional overlay above a shared, read-only ledger store.
///
/// Reads walk the layers from newest to oldest and fall through to the
/// backing store; the first write or tombstone found wins. Writes always land
/// in the newest layer. `fork` opens a child layer, `commit` merges it into
/// its parent atomically, and `discard` drops it. Iteration over any single
/// layer is in lexicographic key order, so flattening is deterministic.
pub struct CacheDb {
    layers: Vec<Layer>,
    store: Arc<dyn ReadStore>,
}

impl CacheDb {
    /// Creates an overlay with a single empty layer above `store`.
    pub fn new(store: Arc<dyn ReadStore>) -> Self {
        Self {
            layers: vec![Layer::new()],
            store,
        }
    }

    /// Returns the number of overlay layers.
    pub fn depth(&self) -> usize {
        self.layers.len()
    }

    /// Returns true when no layer holds any write or tombstone.
    pub fn is_clean(&self) -> bool {
        self.layers.iter().all(|layer| layer.is_empty())
    }

    /// Opens a child layer; subsequent writes land in it until it is
    /// committed or discarded.
    pub fn fork(&mut self) {
        self.layers.push(Layer::new());
    }

    /// Merges the newest layer into its parent. The merge is applied as a
    /// whole; no reader of this overlay can observe it half-done.
    pub fn commit(&mut self) -> StoreResult<()> {
        if self.layers.len() < 2 {
            return Err(StoreError::NoParentLayer);
        }
        let child = self
            .layers
            .pop()
            .ok_or_else(|| StoreError::backend("overlay has no layers"))?;
        let parent = self
            .layers
            .last_mut()
            .ok_or_else(|| StoreError::backend("overlay has no parent layer"))?;
        let merged = child.len();
        for (key, write) in child {
            parent.insert(key, write);
        }
        debug!(target: "persistence", "committed overlay layer with {merged} writes");
        Ok(())
    }

    /// Drops the newest layer and everything written into it. On the base
    /// layer this clears the pending writes instead.
    pub fn discard(&mut self) {
        if self.layers.len() > 1 {
            self.layers.pop();
        } else if let Some(layer) = self.layers.last_mut() {
            layer.clear();
        }
    }

    /// Looks up `key`, newest layer first, falling through to the store.
    pub fn get(&self, key: &[u8]) -> StoreResult<Option<Vec<u8>>> {
        for layer in self.layers.iter().rev() {
            if let Some(write) = layer.get(key) {
                return Ok(write.clone());
            }
        }
        self.store.get(key)
    }

    /// Checks whether `key` currently resolves to a value.
    pub fn contains(&self, key: &[u8]) -> StoreResult<bool> {
        Ok(self.get(key)?.is_some())
    }

    /// Writes `value` under `key` in the newest layer.
    pub fn put(&mut self, key: Vec<u8>, value: Vec<u8>) {
        if let Some(layer) = self.layers.last_mut() {
            layer.insert(key, Some(value));
        }
    }

    /// Writes a tombstone for `key` in the newest layer.
    pub fn delete(&mut self, key: Vec<u8>) {
        if let Some(layer) = self.layers.last_mut() {
            layer.insert(key, None);
        }
    }

    /// Returns every live entry whose key starts with `prefix`, merging the
    /// store with all overlay layers, in ascending lexicographic key order.
    pub fn find_prefix(&self, prefix: &[u8]) -> StoreResult<Vec<(Vec<u8>, Vec<u8>)>> {
        let mut merged: BTreeMap<Vec<u8>, Option<Vec<u8>>> = BTreeMap::new();
        for (key, value) in self.store.seek_prefix(prefix)? {
            merged.insert(key, Some(value));
        }
        for layer in &self.layers {
            for (key, write) in layer.range(prefix.to_vec()..) {
                if !key.starts_with(prefix) {
                    break;
                }
                merged.insert(key.clone(), write.clone());
            }
        }
        Ok(merged
            .into_iter()
            .filter_map(|(key, write)| write.map(|value| (key, value)))
            .collect())
    }

    /// Flattens every layer into a single write batch, oldest layer first,
    /// in lexicographic key order within each layer.
    pub fn into_batch(self) -> Vec<BatchOp> {
        let mut flattened: BTreeMap<Vec<u8>, Option<Vec<u8>>> = BTreeMap::new();
        for layer in self.layers {
            for (key, write) in layer {
                flattened.insert(key, write);
            }
        }
        flattened
            .into_iter()
            .map(|(key, write)| match write {
                Some(value) => BatchOp::Put { key, value },
                None => BatchOp::Delete { key },
            })
            .collect()
    }
}

impl fmt::Debug for CacheDb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheDb")
            .field("layers", &self.layers.len())
            .field(
                "writes",
                &self.layers.iter().map(|layer| layer.len()).sum::<usize>(),
            )
            .finish()
    }
}
