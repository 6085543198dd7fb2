use std::collections::BTreeMap;

use super::{KeyValueStore, StoreError, Visitor};

/// In-memory ordered store. Contents are lost on drop.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: BTreeMap<Vec<u8>, Vec<u8>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        self.entries.insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn delete(&mut self, key: &[u8]) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }

    fn traverse(&self, prefix: &[u8], visitor: Visitor<'_>) -> Result<(), StoreError> {
        for (key, value) in self.entries.range(prefix.to_vec()..) {
            if !key.starts_with(prefix) || !visitor(key, value) {
                break;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_traverse_stays_within_prefix() {
        let mut store = MemoryStore::new();
        store.put(b"a/1", b"x").unwrap();
        store.put(b"b/1", b"y").unwrap();
        store.put(b"b/2", b"z").unwrap();
        store.put(b"c/1", b"w").unwrap();

        let mut seen = Vec::new();
        store
            .traverse(b"b/", &mut |k, v| {
                seen.push((k.to_vec(), v.to_vec()));
                true
            })
            .unwrap();
        assert_eq!(
            seen,
            vec![
                (b"b/1".to_vec(), b"y".to_vec()),
                (b"b/2".to_vec(), b"z".to_vec())
            ]
        );
    }

    #[test]
    fn test_traverse_stops_when_visitor_declines() {
        let mut store = MemoryStore::new();
        for i in 0..5u8 {
            store.put(&[b'k', i], &[i]).unwrap();
        }
        let mut count = 0;
        store
            .traverse(b"k", &mut |_, _| {
                count += 1;
                count < 2
            })
            .unwrap();
        assert_eq!(count, 2);
    }

    #[test]
    fn test_delete_absent_key() {
        let mut store = MemoryStore::new();
        store.delete(b"missing").unwrap();
        assert!(store.get(b"missing").unwrap().is_none());
    }
}
