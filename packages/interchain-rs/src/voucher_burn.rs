//! Voucher burn status tracking
//!
//! Each witnessed voucher burn gets a status record:
//!
//! ```text
//! Pending -> Processed -> Finalized
//!    |           |
//!    +-> Failed <+
//!          |
//!          +-> Pending (retry, RetriedTime + 1)
//! ```
//!
//! `InterChainEventCache::set_voucher_burn_status` stores whatever it is given.
//! [`VoucherBurnTracker`] is the checked path and rejects illegal transitions.

use alloy::primitives::U256;
use alloy_rlp::{BufMut, Decodable, Encodable, RlpDecodable, RlpEncodable};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

use crate::cache::InterChainEventCache;
use crate::error::{Error, Result};
use crate::events::{EventType, InterChainMessageEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum VoucherBurnStatus {
    #[default]
    Pending,
    Processed,
    Finalized,
    Failed,
}

impl VoucherBurnStatus {
    pub const fn code(&self) -> u8 {
        match self {
            VoucherBurnStatus::Pending => 0,
            VoucherBurnStatus::Processed => 1,
            VoucherBurnStatus::Finalized => 2,
            VoucherBurnStatus::Failed => 3,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(VoucherBurnStatus::Pending),
            1 => Some(VoucherBurnStatus::Processed),
            2 => Some(VoucherBurnStatus::Finalized),
            3 => Some(VoucherBurnStatus::Failed),
            _ => None,
        }
    }

    pub fn can_transition_to(&self, next: VoucherBurnStatus) -> bool {
        use VoucherBurnStatus::*;
        matches!(
            (self, next),
            (Pending, Processed)
                | (Pending, Failed)
                | (Processed, Finalized)
                | (Processed, Failed)
                | (Failed, Pending)
        )
    }

    /// The burn has been credited on this chain
    pub fn is_credited(&self) -> bool {
        matches!(self, VoucherBurnStatus::Processed | VoucherBurnStatus::Finalized)
    }
}

impl fmt::Display for VoucherBurnStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            VoucherBurnStatus::Pending => "pending",
            VoucherBurnStatus::Processed => "processed",
            VoucherBurnStatus::Finalized => "finalized",
            VoucherBurnStatus::Failed => "failed",
        };
        f.write_str(s)
    }
}

impl Encodable for VoucherBurnStatus {
    fn encode(&self, out: &mut dyn BufMut) {
        self.code().encode(out)
    }

    fn length(&self) -> usize {
        self.code().length()
    }
}

impl Decodable for VoucherBurnStatus {
    fn decode(buf: &mut &[u8]) -> alloy_rlp::Result<Self> {
        let code = u8::decode(buf)?;
        VoucherBurnStatus::from_code(code)
            .ok_or(alloy_rlp::Error::Custom("unknown voucher burn status"))
    }
}

/// Persisted status record, keyed by its own type and nonce
#[derive(Debug, Clone, PartialEq, Eq, RlpEncodable, RlpDecodable)]
pub struct VoucherBurnEventStatusInfo {
    pub event_type: EventType,
    pub nonce: U256,
    pub status: VoucherBurnStatus,
    pub last_processed_block_height: u64,
    pub retried_time: u64,
}

impl VoucherBurnEventStatusInfo {
    pub fn pending(event_type: EventType, nonce: U256) -> Self {
        Self {
            event_type,
            nonce,
            status: VoucherBurnStatus::Pending,
            last_processed_block_height: 0,
            retried_time: 0,
        }
    }

    pub fn id(&self) -> String {
        format!("voucher burn {}/{}", self.event_type.code(), self.nonce)
    }
}

/// Checked lifecycle operations over the cache's status records
#[derive(Clone)]
pub struct VoucherBurnTracker {
    cache: Arc<InterChainEventCache>,
}

impl VoucherBurnTracker {
    pub fn new(cache: Arc<InterChainEventCache>) -> Self {
        Self { cache }
    }

    /// Current record, or a fresh `Pending` one if none was stored yet
    pub fn status(&self, event_type: EventType, nonce: &U256) -> Result<VoucherBurnEventStatusInfo> {
        Ok(self
            .cache
            .find_voucher_burn_status(event_type, nonce)?
            .unwrap_or_else(|| VoucherBurnEventStatusInfo::pending(event_type, *nonce)))
    }

    /// Create a `Pending` record for a newly witnessed burn.
    ///
    /// Returns `false` without touching the store if a record already exists,
    /// so re-scanning a range never resets progress.
    pub fn observe(&self, event: &InterChainMessageEvent) -> Result<bool> {
        if !event.event_type.is_voucher_burn() {
            return Err(Error::WrongEventType {
                expected: EventType::VoucherBurn,
                actual: event.event_type,
            });
        }

        let mut created = false;
        self.cache
            .update_voucher_burn_status(event.event_type, &event.nonce, |current| {
                Ok(current.unwrap_or_else(|| {
                    created = true;
                    VoucherBurnEventStatusInfo::pending(event.event_type, event.nonce)
                }))
            })?;
        Ok(created)
    }

    pub fn mark_processed(
        &self,
        event_type: EventType,
        nonce: &U256,
        block_height: u64,
    ) -> Result<VoucherBurnEventStatusInfo> {
        self.transition(event_type, nonce, VoucherBurnStatus::Processed, block_height)
    }

    pub fn mark_finalized(
        &self,
        event_type: EventType,
        nonce: &U256,
        block_height: u64,
    ) -> Result<VoucherBurnEventStatusInfo> {
        self.transition(event_type, nonce, VoucherBurnStatus::Finalized, block_height)
    }

    pub fn mark_failed(
        &self,
        event_type: EventType,
        nonce: &U256,
        block_height: u64,
    ) -> Result<VoucherBurnEventStatusInfo> {
        let info = self.transition(event_type, nonce, VoucherBurnStatus::Failed, block_height)?;
        warn!(id = %info.id(), retried = info.retried_time, "Voucher burn processing failed");
        Ok(info)
    }

    /// Move a failed burn back to `Pending`, counting the retry
    pub fn retry(&self, event_type: EventType, nonce: &U256) -> Result<VoucherBurnEventStatusInfo> {
        let info = self
            .cache
            .update_voucher_burn_status(event_type, nonce, |current| {
                let mut info = current
                    .unwrap_or_else(|| VoucherBurnEventStatusInfo::pending(event_type, *nonce));
                check_transition(&info, VoucherBurnStatus::Pending)?;
                info.status = VoucherBurnStatus::Pending;
                info.retried_time += 1;
                Ok(info)
            })?;
        info!(id = %info.id(), retried = info.retried_time, "Retrying voucher burn");
        Ok(info)
    }

    /// Fails with `AlreadyProcessed` if the burn was already credited
    pub fn ensure_not_credited(&self, event_type: EventType, nonce: &U256) -> Result<()> {
        let info = self.status(event_type, nonce)?;
        if info.status.is_credited() {
            return Err(Error::AlreadyProcessed(info.id()));
        }
        Ok(())
    }

    fn transition(
        &self,
        event_type: EventType,
        nonce: &U256,
        to: VoucherBurnStatus,
        block_height: u64,
    ) -> Result<VoucherBurnEventStatusInfo> {
        self.cache
            .update_voucher_burn_status(event_type, nonce, |current| {
                let mut info = current
                    .unwrap_or_else(|| VoucherBurnEventStatusInfo::pending(event_type, *nonce));
                check_transition(&info, to)?;
                info.status = to;
                info.last_processed_block_height = block_height;
                Ok(info)
            })
    }
}

fn check_transition(info: &VoucherBurnEventStatusInfo, to: VoucherBurnStatus) -> Result<()> {
    if info.status.can_transition_to(to) {
        Ok(())
    } else {
        Err(Error::InvalidStatusTransition {
            id: info.id(),
            from: info.status,
            to,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::testing::fixtures;

    fn tracker() -> (Arc<InterChainEventCache>, VoucherBurnTracker) {
        let cache = Arc::new(InterChainEventCache::new(MemoryStore::new()));
        (cache.clone(), VoucherBurnTracker::new(cache))
    }

    #[test]
    fn test_transition_table() {
        use VoucherBurnStatus::*;
        assert!(Pending.can_transition_to(Processed));
        assert!(Processed.can_transition_to(Finalized));
        assert!(Failed.can_transition_to(Pending));
        assert!(!Finalized.can_transition_to(Pending));
        assert!(!Finalized.can_transition_to(Failed));
        assert!(!Pending.can_transition_to(Finalized));
        assert!(!Failed.can_transition_to(Processed));
    }

    #[test]
    fn test_status_record_rlp() {
        let info = VoucherBurnEventStatusInfo {
            event_type: EventType::Tnt20VoucherBurn,
            nonce: U256::from(12u64),
            status: VoucherBurnStatus::Failed,
            last_processed_block_height: 4000,
            retried_time: 2,
        };
        let bytes = alloy_rlp::encode(&info);
        assert_eq!(
            VoucherBurnEventStatusInfo::decode(&mut bytes.as_slice()).unwrap(),
            info
        );
    }

    #[test]
    fn test_fresh_burn_defaults_to_pending() {
        let (cache, tracker) = tracker();
        let burn = fixtures::tfuel_voucher_burn_event(1, 10);

        let info = tracker.status(burn.event_type, &burn.nonce).unwrap();
        assert_eq!(info.status, VoucherBurnStatus::Pending);
        assert_eq!(info.retried_time, 0);

        assert!(tracker.observe(&burn).unwrap());
        assert!(cache
            .voucher_burn_nonce_exists(burn.event_type, &burn.nonce)
            .unwrap());
    }

    #[test]
    fn test_observe_does_not_reset_progress() {
        let (_, tracker) = tracker();
        let burn = fixtures::tfuel_voucher_burn_event(1, 10);
        tracker.observe(&burn).unwrap();
        tracker
            .mark_processed(burn.event_type, &burn.nonce, 100)
            .unwrap();

        assert!(!tracker.observe(&burn).unwrap());
        assert_eq!(
            tracker.status(burn.event_type, &burn.nonce).unwrap().status,
            VoucherBurnStatus::Processed
        );
    }

    #[test]
    fn test_observe_rejects_non_burn() {
        let (_, tracker) = tracker();
        assert!(matches!(
            tracker.observe(&fixtures::tfuel_lock_event(1, 1)),
            Err(Error::WrongEventType { .. })
        ));
    }

    #[test]
    fn test_full_lifecycle() {
        let (cache, tracker) = tracker();
        let burn = fixtures::tfuel_voucher_burn_event(2, 10);
        tracker.observe(&burn).unwrap();

        tracker
            .mark_processed(burn.event_type, &burn.nonce, 100)
            .unwrap();
        let info = tracker
            .mark_finalized(burn.event_type, &burn.nonce, 110)
            .unwrap();
        assert_eq!(info.status, VoucherBurnStatus::Finalized);
        assert_eq!(info.last_processed_block_height, 110);
        assert_eq!(
            cache
                .get_voucher_burn_status(burn.event_type, &burn.nonce)
                .unwrap(),
            info
        );

        // Finalized is terminal
        assert!(matches!(
            tracker.mark_failed(burn.event_type, &burn.nonce, 120),
            Err(Error::InvalidStatusTransition { .. })
        ));
        assert!(matches!(
            tracker.ensure_not_credited(burn.event_type, &burn.nonce),
            Err(Error::AlreadyProcessed(_))
        ));
    }

    #[test]
    fn test_retry_counts_only_explicit_retries() {
        let (_, tracker) = tracker();
        let burn = fixtures::tfuel_voucher_burn_event(3, 10);
        let (t, n) = (burn.event_type, burn.nonce);
        tracker.observe(&burn).unwrap();

        tracker.mark_failed(t, &n, 100).unwrap();
        assert_eq!(tracker.status(t, &n).unwrap().retried_time, 0);

        let info = tracker.retry(t, &n).unwrap();
        assert_eq!(info.status, VoucherBurnStatus::Pending);
        assert_eq!(info.retried_time, 1);

        tracker.mark_processed(t, &n, 105).unwrap();
        assert_eq!(tracker.status(t, &n).unwrap().retried_time, 1);

        // Retry is only legal from Failed
        assert!(matches!(
            tracker.retry(t, &n),
            Err(Error::InvalidStatusTransition { .. })
        ));
        assert_eq!(tracker.status(t, &n).unwrap().retried_time, 1);
    }

    #[test]
    fn test_raw_setter_does_not_enforce_transitions() {
        let (cache, tracker) = tracker();
        let mut info = VoucherBurnEventStatusInfo::pending(EventType::TFuelVoucherBurn, U256::from(9u64));
        info.status = VoucherBurnStatus::Finalized;
        cache.set_voucher_burn_status(&info).unwrap();

        info.status = VoucherBurnStatus::Pending;
        cache.set_voucher_burn_status(&info).unwrap();
        assert!(tracker
            .ensure_not_credited(info.event_type, &info.nonce)
            .is_ok());
    }
}
