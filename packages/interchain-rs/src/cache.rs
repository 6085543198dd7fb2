//! Inter-chain event cache
//!
//! Typed layer over a [`KeyValueStore`] holding witnessed events, the per-type
//! cursors, and voucher burn status records. All keys are human readable:
//!
//! ```text
//! icme/<type>/<nonce>         event envelope
//! icme_ntn/<type>             next transfer nonce
//! icme_lqh/<type>             last queried mainchain height
//! icme_lpuvbn/<type>          last processed unfinalized voucher burn nonce
//! icme_vbs/<type>/<nonce>     voucher burn status record
//! ```
//!
//! Every public operation holds the cache mutex for its full duration. The
//! cache assumes it is the only writer of these prefixes in the backing store.
//!
//! Nonces are unique per type only. Two source chains feeding the same type
//! into one cache would share a key space.

use alloy::primitives::U256;
use alloy_rlp::Decodable;
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

use crate::error::{Error, Result};
use crate::events::{EventType, InterChainMessageEvent};
use crate::store::{KeyValueStore, StoreError};
use crate::voucher_burn::VoucherBurnEventStatusInfo;

const EVENT_PREFIX: &str = "icme";
const NEXT_TRANSFER_NONCE_PREFIX: &str = "icme_ntn";
const LAST_QUERIED_HEIGHT_PREFIX: &str = "icme_lqh";
const LAST_PROCESSED_UNFINALIZED_VOUCHER_BURN_NONCE_PREFIX: &str = "icme_lpuvbn";
const VOUCHER_BURN_STATUS_PREFIX: &str = "icme_vbs";

fn event_key(event_type: EventType, nonce: &U256) -> Vec<u8> {
    format!("{}/{}/{}", EVENT_PREFIX, event_type.code(), nonce).into_bytes()
}

fn event_type_prefix(event_type: EventType) -> Vec<u8> {
    format!("{}/{}/", EVENT_PREFIX, event_type.code()).into_bytes()
}

fn cursor_key(prefix: &str, event_type: EventType) -> Vec<u8> {
    format!("{}/{}", prefix, event_type.code()).into_bytes()
}

fn voucher_burn_status_key(event_type: EventType, nonce: &U256) -> Vec<u8> {
    format!("{}/{}/{}", VOUCHER_BURN_STATUS_PREFIX, event_type.code(), nonce).into_bytes()
}

fn decode_exact<T: Decodable>(bytes: &[u8]) -> Result<T> {
    let buf = &mut &bytes[..];
    let value = T::decode(buf)?;
    if !buf.is_empty() {
        return Err(alloy_rlp::Error::Custom("trailing bytes after record").into());
    }
    Ok(value)
}

pub struct InterChainEventCache {
    store: Mutex<Box<dyn KeyValueStore>>,
}

impl InterChainEventCache {
    pub fn new(store: impl KeyValueStore + 'static) -> Self {
        Self {
            store: Mutex::new(Box::new(store)),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Box<dyn KeyValueStore>>> {
        self.store
            .lock()
            .map_err(|_| Error::from(StoreError::Poisoned))
    }

    // ========================================================================
    // Events
    // ========================================================================

    /// Write an event under its `(type, nonce)` key, replacing any existing
    /// record. Re-inserting the same event is a no-op in effect.
    pub fn insert(&self, event: &InterChainMessageEvent) -> Result<()> {
        let mut store = self.lock()?;
        store.put(&event_key(event.event_type, &event.nonce), &event.encode_rlp())?;
        debug!(id = %event.id(), height = event.block_height, "Cached inter-chain event");
        Ok(())
    }

    /// Write an event only if its key is free. Returns `false` and leaves the
    /// stored record untouched otherwise.
    pub fn insert_if_absent(&self, event: &InterChainMessageEvent) -> Result<bool> {
        let mut store = self.lock()?;
        let key = event_key(event.event_type, &event.nonce);
        if store.get(&key)?.is_some() {
            return Ok(false);
        }
        store.put(&key, &event.encode_rlp())?;
        debug!(id = %event.id(), height = event.block_height, "Cached new inter-chain event");
        Ok(true)
    }

    pub fn delete(&self, event_type: EventType, nonce: &U256) -> Result<()> {
        let mut store = self.lock()?;
        store.delete(&event_key(event_type, nonce))?;
        Ok(())
    }

    /// Fails with `NotFound` when no event is stored under the key
    pub fn get(&self, event_type: EventType, nonce: &U256) -> Result<InterChainMessageEvent> {
        let store = self.lock()?;
        match store.get(&event_key(event_type, nonce))? {
            Some(bytes) => InterChainMessageEvent::decode_rlp(&bytes),
            None => Err(Error::NotFound(format!(
                "inter-chain event {}/{}",
                event_type.code(),
                nonce
            ))),
        }
    }

    pub fn exists(&self, event_type: EventType, nonce: &U256) -> Result<bool> {
        let store = self.lock()?;
        Ok(store.get(&event_key(event_type, nonce))?.is_some())
    }

    /// All stored events of one type, in ascending nonce order
    pub fn events_of_type(&self, event_type: EventType) -> Result<Vec<InterChainMessageEvent>> {
        let store = self.lock()?;
        let mut raw = Vec::new();
        store.traverse(&event_type_prefix(event_type), &mut |_, value| {
            raw.push(value.to_vec());
            true
        })?;
        drop(store);

        // Keys sort lexically, so "10" precedes "9"
        let mut events = raw
            .iter()
            .map(|bytes| InterChainMessageEvent::decode_rlp(bytes))
            .collect::<Result<Vec<_>>>()?;
        crate::events::sort_by_nonce(&mut events);
        Ok(events)
    }

    // ========================================================================
    // Cursors
    // ========================================================================

    fn get_cursor<T: Decodable + Default>(&self, prefix: &str, event_type: EventType) -> Result<T> {
        let store = self.lock()?;
        match store.get(&cursor_key(prefix, event_type))? {
            Some(bytes) => decode_exact(&bytes),
            None => Ok(T::default()),
        }
    }

    fn set_cursor<T: alloy_rlp::Encodable>(
        &self,
        prefix: &str,
        event_type: EventType,
        value: &T,
    ) -> Result<()> {
        let mut store = self.lock()?;
        store.put(&cursor_key(prefix, event_type), &alloy_rlp::encode(value))?;
        Ok(())
    }

    /// Height up to which the witness has scanned for this type; 0 if unset
    pub fn get_last_queried_height(&self, event_type: EventType) -> Result<u64> {
        self.get_cursor(LAST_QUERIED_HEIGHT_PREFIX, event_type)
    }

    pub fn set_last_queried_height(&self, event_type: EventType, height: u64) -> Result<()> {
        self.set_cursor(LAST_QUERIED_HEIGHT_PREFIX, event_type, &height)?;
        debug!(event_type = %event_type, height, "Updated last queried height");
        Ok(())
    }

    pub fn get_next_transfer_nonce(&self, event_type: EventType) -> Result<U256> {
        self.get_cursor(NEXT_TRANSFER_NONCE_PREFIX, event_type)
    }

    pub fn set_next_transfer_nonce(&self, event_type: EventType, nonce: U256) -> Result<()> {
        self.set_cursor(NEXT_TRANSFER_NONCE_PREFIX, event_type, &nonce)
    }

    pub fn get_last_processed_unfinalized_voucher_burn_nonce(
        &self,
        event_type: EventType,
    ) -> Result<U256> {
        self.get_cursor(LAST_PROCESSED_UNFINALIZED_VOUCHER_BURN_NONCE_PREFIX, event_type)
    }

    pub fn set_last_processed_unfinalized_voucher_burn_nonce(
        &self,
        event_type: EventType,
        nonce: U256,
    ) -> Result<()> {
        self.set_cursor(
            LAST_PROCESSED_UNFINALIZED_VOUCHER_BURN_NONCE_PREFIX,
            event_type,
            &nonce,
        )
    }

    // ========================================================================
    // Voucher burn status
    // ========================================================================

    /// Fails with `NotFound` when no status record exists
    pub fn get_voucher_burn_status(
        &self,
        event_type: EventType,
        nonce: &U256,
    ) -> Result<VoucherBurnEventStatusInfo> {
        self.find_voucher_burn_status(event_type, nonce)?
            .ok_or_else(|| {
                Error::NotFound(format!(
                    "voucher burn status {}/{}",
                    event_type.code(),
                    nonce
                ))
            })
    }

    pub fn find_voucher_burn_status(
        &self,
        event_type: EventType,
        nonce: &U256,
    ) -> Result<Option<VoucherBurnEventStatusInfo>> {
        let store = self.lock()?;
        store
            .get(&voucher_burn_status_key(event_type, nonce))?
            .map(|bytes| decode_exact(&bytes))
            .transpose()
    }

    /// Store a status record under the type and nonce it carries. Transition
    /// rules are not checked here; see `VoucherBurnTracker`.
    pub fn set_voucher_burn_status(&self, info: &VoucherBurnEventStatusInfo) -> Result<()> {
        let mut store = self.lock()?;
        store.put(
            &voucher_burn_status_key(info.event_type, &info.nonce),
            &alloy_rlp::encode(info),
        )?;
        debug!(
            event_type = %info.event_type,
            nonce = %info.nonce,
            status = %info.status,
            retried = info.retried_time,
            "Stored voucher burn status"
        );
        Ok(())
    }

    /// Read-modify-write of one status record under a single lock hold.
    ///
    /// `update` receives the stored record (if any) and returns the record to
    /// persist; an error from it leaves the store untouched. The cache lock is
    /// held while `update` runs and is not reentrant, so `update` must not call
    /// back into this cache.
    pub(crate) fn update_voucher_burn_status<F>(
        &self,
        event_type: EventType,
        nonce: &U256,
        update: F,
    ) -> Result<VoucherBurnEventStatusInfo>
    where
        F: FnOnce(Option<VoucherBurnEventStatusInfo>) -> Result<VoucherBurnEventStatusInfo>,
    {
        let mut store = self.lock()?;
        let key = voucher_burn_status_key(event_type, nonce);
        let current = store
            .get(&key)?
            .map(|bytes| decode_exact(&bytes))
            .transpose()?;
        let next = update(current)?;
        store.put(&key, &alloy_rlp::encode(&next))?;
        debug!(
            event_type = %event_type,
            nonce = %nonce,
            status = %next.status,
            retried = next.retried_time,
            "Updated voucher burn status"
        );
        Ok(next)
    }

    /// Whether a status record exists. Checks the status key space, not the
    /// event key space.
    pub fn voucher_burn_nonce_exists(&self, event_type: EventType, nonce: &U256) -> Result<bool> {
        let store = self.lock()?;
        Ok(store
            .get(&voucher_burn_status_key(event_type, nonce))?
            .is_some())
    }
}
