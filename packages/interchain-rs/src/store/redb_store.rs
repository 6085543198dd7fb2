use redb::{Database, ReadableTable, TableDefinition};
use std::path::Path;

use super::{KeyValueStore, StoreError, Visitor};

const ENTRIES: TableDefinition<&[u8], &[u8]> = TableDefinition::new("INTERCHAIN_EVENTS");

fn backend<E: std::fmt::Display>(e: E) -> StoreError {
    StoreError::Backend(e.to_string())
}

/// Durable store over a single redb file. Every write commits its own
/// transaction.
pub struct RedbStore {
    db: Database,
}

impl RedbStore {
    /// Open the database at `path`, creating it and its table if missing
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let db = Database::create(path.as_ref()).map_err(backend)?;

        let w = db.begin_write().map_err(backend)?;
        {
            w.open_table(ENTRIES).map_err(backend)?;
        }
        w.commit().map_err(backend)?;

        Ok(Self { db })
    }
}

impl KeyValueStore for RedbStore {
    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        let w = self.db.begin_write().map_err(backend)?;
        {
            let mut table = w.open_table(ENTRIES).map_err(backend)?;
            table.insert(key, value).map_err(backend)?;
        }
        w.commit().map_err(backend)
    }

    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        let r = self.db.begin_read().map_err(backend)?;
        let table = r.open_table(ENTRIES).map_err(backend)?;
        let value = table.get(key).map_err(backend)?;
        Ok(value.map(|v| v.value().to_vec()))
    }

    fn delete(&mut self, key: &[u8]) -> Result<(), StoreError> {
        let w = self.db.begin_write().map_err(backend)?;
        {
            let mut table = w.open_table(ENTRIES).map_err(backend)?;
            table.remove(key).map_err(backend)?;
        }
        w.commit().map_err(backend)
    }

    fn traverse(&self, prefix: &[u8], visitor: Visitor<'_>) -> Result<(), StoreError> {
        let r = self.db.begin_read().map_err(backend)?;
        let table = r.open_table(ENTRIES).map_err(backend)?;
        for entry in table.range::<&[u8]>(prefix..).map_err(backend)? {
            let (key, value) = entry.map_err(backend)?;
            let key = key.value();
            if !key.starts_with(prefix) || !visitor(key, value.value()) {
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
    fn test_put_get_delete() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = RedbStore::open(dir.path().join("events.redb")).unwrap();

        store.put(b"icme/10001/1", b"one").unwrap();
        assert_eq!(store.get(b"icme/10001/1").unwrap(), Some(b"one".to_vec()));

        store.delete(b"icme/10001/1").unwrap();
        assert_eq!(store.get(b"icme/10001/1").unwrap(), None);
    }

    #[test]
    fn test_traverse_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = RedbStore::open(dir.path().join("events.redb")).unwrap();
        store.put(b"icme/1/1", b"a").unwrap();
        store.put(b"icme/1/2", b"b").unwrap();
        store.put(b"icme/2/1", b"c").unwrap();

        let mut values = Vec::new();
        store
            .traverse(b"icme/1/", &mut |_, v| {
                values.push(v.to_vec());
                true
            })
            .unwrap();
        assert_eq!(values, vec![b"a".to_vec(), b"b".to_vec()]);
    }
}
