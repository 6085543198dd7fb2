//! Ordered key-value storage backing the event cache
//!
//! The cache only needs four primitives, so any ordered byte-keyed database
//! can sit underneath it. Two backends ship with the crate:
//!
//! - [`MemoryStore`] - `BTreeMap`, for tests and the simulated witness
//! - [`RedbStore`] - single-file durable database

pub mod memory;
pub mod redb_store;

pub use self::memory::MemoryStore;
pub use self::redb_store::RedbStore;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// Failure reported by the underlying database
    #[error("storage backend error: {0}")]
    Backend(String),

    /// A thread panicked while holding the cache lock
    #[error("storage lock poisoned")]
    Poisoned,
}

/// Visitor passed to [`KeyValueStore::traverse`]. Return `false` to stop.
pub type Visitor<'a> = &'a mut dyn FnMut(&[u8], &[u8]) -> bool;

pub trait KeyValueStore: Send {
    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), StoreError>;

    /// `Ok(None)` when the key is absent
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError>;

    /// Deleting an absent key is not an error
    fn delete(&mut self, key: &[u8]) -> Result<(), StoreError>;

    /// Visit every entry whose key starts with `prefix`, in ascending key order
    fn traverse(&self, prefix: &[u8], visitor: Visitor<'_>) -> Result<(), StoreError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        (**self).put(key, value)
    }

    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        (**self).get(key)
    }

    fn delete(&mut self, key: &[u8]) -> Result<(), StoreError> {
        (**self).delete(key)
    }

    fn traverse(&self, prefix: &[u8], visitor: Visitor<'_>) -> Result<(), StoreError> {
        (**self).traverse(prefix, visitor)
    }
}
