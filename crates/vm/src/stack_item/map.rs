//! Insertion-ordered map payload for the `Map` stack item.

use super::StackItem;
use crate::error::{VmError, VmResult};
use indexmap::IndexMap;

/// Map payload: primitive keys compared by canonical byte form, iteration in
/// insertion order. The original key item is kept alongside the value so
/// `KEYS` returns exactly what was inserted.
#[derive(Debug, Clone, Default)]
pub struct VmMap {
    entries: IndexMap<Vec<u8>, (StackItem, StackItem)>,
}

impl VmMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when the map holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn key_bytes(key: &StackItem) -> VmResult<Vec<u8>> {
        if !key.is_primitive() {
            return Err(VmError::fault(format!(
                "{} is not a valid map key",
                key.type_name()
            )));
        }
        key.as_bytes()
    }

    /// Inserts or replaces the value under `key`. Re-inserting an existing
    /// key keeps its original position.
    pub fn insert(&mut self, key: StackItem, value: StackItem) -> VmResult<()> {
        let bytes = Self::key_bytes(&key)?;
        self.entries.insert(bytes, (key, value));
        Ok(())
    }

    /// Looks up the value under `key`.
    pub fn get(&self, key: &StackItem) -> VmResult<Option<StackItem>> {
        let bytes = Self::key_bytes(key)?;
        Ok(self.entries.get(&bytes).map(|(_, value)| value.clone()))
    }

    /// Checks whether `key` is present.
    pub fn contains(&self, key: &StackItem) -> VmResult<bool> {
        let bytes = Self::key_bytes(key)?;
        Ok(self.entries.contains_key(&bytes))
    }

    /// Removes the entry under `key`, preserving the order of the remaining
    /// entries. Returns true when an entry was removed.
    pub fn remove(&mut self, key: &StackItem) -> VmResult<bool> {
        let bytes = Self::key_bytes(key)?;
        Ok(self.entries.shift_remove(&bytes).is_some())
    }

    /// Returns the key items in insertion order.
    pub fn keys(&self) -> Vec<StackItem> {
        self.entries.values().map(|(key, _)| key.clone()).collect()
    }

    /// Returns the value items in insertion order.
    pub fn values(&self) -> Vec<StackItem> {
        self.entries
            .values()
            .map(|(_, value)| value.clone())
            .collect()
    }

    /// Iterates `(key, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&StackItem, &StackItem)> {
        self.entries.values().map(|(key, value)| (key, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_get_remove() {
        let mut map = VmMap::new();
        map.insert(StackItem::from_bytes(b"k".to_vec()), StackItem::from_int(1))
            .unwrap();
        assert_eq!(map.len(), 1);
        assert!(map
            .get(&StackItem::from_bytes(b"k".to_vec()))
            .unwrap()
            .unwrap()
            .equals(&StackItem::from_int(1))
            .unwrap());
        assert!(map.remove(&StackItem::from_bytes(b"k".to_vec())).unwrap());
        assert!(map.is_empty());
    }

    #[test]
    fn test_canonical_key_identity() {
        let mut map = VmMap::new();
        map.insert(StackItem::from_int(1), StackItem::from_int(10))
            .unwrap();
        // Boolean(true) encodes to the same canonical key as Integer(1).
        assert!(map.contains(&StackItem::from_bool(true)).unwrap());
        map.insert(StackItem::from_bool(true), StackItem::from_int(20))
            .unwrap();
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_insertion_order_preserved() {
        let mut map = VmMap::new();
        for value in [3i64, 1, 2] {
            map.insert(StackItem::from_int(value), StackItem::from_int(value * 10))
                .unwrap();
        }
        let keys: Vec<_> = map
            .keys()
            .iter()
            .map(|key| key.as_int().unwrap())
            .collect();
        assert_eq!(
            keys,
            vec![3.into(), 1.into(), 2.into()],
            "iteration must follow insertion order"
        );
    }

    #[test]
    fn test_container_keys_rejected() {
        let mut map = VmMap::new();
        assert!(map
            .insert(StackItem::from_array(vec![]), StackItem::from_int(1))
            .is_err());
        assert!(map.insert(StackItem::new_map(), StackItem::from_int(1)).is_err());
    }
}
