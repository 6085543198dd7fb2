//! Mainchain log polling
//!
//! Each [`EventSubscription`] has its own persisted cursor
//! (`last queried height`). One cycle for a subscription:
//!
//! 1. window = `(cursor, min(head - confirmations, cursor + max_block_range)]`
//! 2. fetch logs for the subscription's contract and topic in the window
//! 3. decode, validate and insert each log in `(block, log index)` order
//! 4. persist the window end as the new cursor
//!
//! A log that cannot be decoded aborts the subscription's cycle before step 4,
//! so the window is re-scanned next tick. Insert overwrites by key, which
//! keeps the re-scan free of duplicates. Logs that decode but carry a bad
//! denom or a spoofed chain ID are skipped and never inserted. Locks and
//! burns addressed to a different subchain are ignored, since nonces are
//! only unique per type within one subchain's traffic.

use alloy::primitives::{Address, B256};
use alloy::rpc::types::Filter;
use async_trait::async_trait;
use eyre::{eyre, Result, WrapErr};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::client::MainchainClient;
use super::decode::envelope_from_log;
use super::{ChainWitness, ValidatorSet, ValidatorSetCache, DEFAULT_BLOCKS_PER_DYNASTY};
use crate::cache::InterChainEventCache;
use crate::events::{EventType, InterChainMessageEvent, ParsedEvent};
use crate::metrics;
use crate::types::ChainId;
use crate::voucher_burn::VoucherBurnTracker;

/// Witness configuration
#[derive(Debug, Clone)]
pub struct WitnessConfig {
    /// Chain ID of the witnessed mainchain
    pub mainchain_chain_id: ChainId,
    /// Chain ID of the subchain this witness serves
    pub subchain_id: ChainId,
    /// Sleep between poll cycles
    pub poll_interval: Duration,
    /// Blocks behind head before a log is considered final
    pub confirmations: u64,
    /// Maximum block range per log query
    pub max_block_range: u64,
    /// First block to scan when a subscription has no cursor yet
    pub start_height: u64,
    pub blocks_per_dynasty: u64,
    pub channel_watch_list: Vec<ChainId>,
}

impl Default for WitnessConfig {
    fn default() -> Self {
        Self {
            mainchain_chain_id: ChainId::from_u64(366),
            subchain_id: ChainId::from_u64(360777),
            poll_interval: Duration::from_millis(1000),
            confirmations: 1,
            max_block_range: 5_000,
            start_height: 0,
            blocks_per_dynasty: DEFAULT_BLOCKS_PER_DYNASTY,
            channel_watch_list: Vec::new(),
        }
    }
}

/// One event type watched on one token-bank contract
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventSubscription {
    pub event_type: EventType,
    pub contract: Address,
    pub topic: B256,
}

impl EventSubscription {
    pub fn new(event_type: EventType, contract: Address) -> Result<Self> {
        let topic = event_type
            .topic()
            .ok_or_else(|| eyre!("{} is not emitted as a token-bank log", event_type))?;
        Ok(Self {
            event_type,
            contract,
            topic,
        })
    }

    /// Lock and voucher burn subscriptions for the three token banks
    pub fn token_banks(tfuel: Address, tnt20: Address, tnt721: Address) -> Vec<Self> {
        let pairs = [
            (EventType::TFuelTokenLock, tfuel),
            (EventType::TFuelVoucherBurn, tfuel),
            (EventType::Tnt20TokenLock, tnt20),
            (EventType::Tnt20VoucherBurn, tnt20),
            (EventType::Tnt721TokenLock, tnt721),
            (EventType::Tnt721VoucherBurn, tnt721),
        ];
        pairs
            .into_iter()
            .filter_map(|(t, contract)| Self::new(t, contract).ok())
            .collect()
    }
}

/// Result of one subscription's poll
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollOutcome {
    pub from_block: u64,
    pub to_block: u64,
    pub inserted: usize,
    pub skipped: usize,
    /// Locks and burns whose target is another subchain
    pub ignored: usize,
}

/// Polls the mainchain and records token-bank events in the cache
pub struct MainchainWitness {
    client: Arc<dyn MainchainClient>,
    cache: Arc<InterChainEventCache>,
    tracker: VoucherBurnTracker,
    subscriptions: Vec<EventSubscription>,
    config: WitnessConfig,
    validator_sets: ValidatorSetCache,
}

impl MainchainWitness {
    pub fn new(
        client: Arc<dyn MainchainClient>,
        cache: Arc<InterChainEventCache>,
        config: WitnessConfig,
        subscriptions: Vec<EventSubscription>,
    ) -> Self {
        Self {
            client,
            tracker: VoucherBurnTracker::new(cache.clone()),
            cache,
            subscriptions,
            config,
            validator_sets: ValidatorSetCache::default(),
        }
    }

    pub fn subscriptions(&self) -> &[EventSubscription] {
        &self.subscriptions
    }

    pub fn config(&self) -> &WitnessConfig {
        &self.config
    }

    /// Poll every subscription once.
    ///
    /// A failing subscription is logged and left for the next cycle; the
    /// others still run. Only a failure to read the head is returned.
    pub async fn poll_cycle(&self) -> Result<Vec<(EventType, Result<PollOutcome>)>> {
        let head = self.client.block_number().await?;
        metrics::set_mainchain_height(head);

        let mut results = Vec::with_capacity(self.subscriptions.len());
        for sub in &self.subscriptions {
            let result = self.poll_subscription(sub, head).await;
            if let Err(e) = &result {
                metrics::record_poll_failure(sub.event_type);
                warn!(
                    event_type = %sub.event_type,
                    contract = %sub.contract,
                    error = %e,
                    "Poll cycle failed, cursor not advanced"
                );
            }
            results.push((sub.event_type, result));
        }
        Ok(results)
    }

    /// Poll one subscription against a known head
    pub async fn poll_subscription(&self, sub: &EventSubscription, head: u64) -> Result<PollOutcome> {
        let event_type = sub.event_type;
        let cursor = self
            .cache
            .get_last_queried_height(event_type)?
            .max(self.config.start_height.saturating_sub(1));

        let safe_head = head.saturating_sub(self.config.confirmations);
        if safe_head <= cursor {
            debug!(event_type = %event_type, cursor, safe_head, "No new mainchain blocks");
            return Ok(PollOutcome {
                from_block: cursor,
                to_block: cursor,
                ..Default::default()
            });
        }

        let from_block = cursor + 1;
        let to_block = safe_head.min(cursor.saturating_add(self.config.max_block_range.max(1)));

        let filter = Filter::new()
            .address(sub.contract)
            .event_signature(sub.topic)
            .from_block(from_block)
            .to_block(to_block);

        let mut logs = self.client.get_logs(&filter).await.wrap_err_with(|| {
            format!(
                "Failed to get {} logs from block {} to {}",
                event_type, from_block, to_block
            )
        })?;
        logs.sort_by_key(|log| (log.block_number, log.log_index));

        let mut outcome = PollOutcome {
            from_block,
            to_block,
            ..Default::default()
        };

        for log in &logs {
            let envelope = envelope_from_log(event_type, &self.config.mainchain_chain_id, log)
                .wrap_err_with(|| {
                    format!(
                        "Failed to decode {} log at block {:?} index {:?}",
                        event_type, log.block_number, log.log_index
                    )
                })?;

            if self.addressed_elsewhere(&envelope) {
                debug!(
                    id = %envelope.id(),
                    target = %envelope.target_chain_id,
                    subchain = %self.config.subchain_id,
                    "Ignoring inter-chain event for another subchain"
                );
                outcome.ignored += 1;
                continue;
            }

            if let Err(e) = ParsedEvent::parse(&envelope) {
                if e.is_validation() {
                    metrics::record_log_skipped(event_type);
                    warn!(
                        id = %envelope.id(),
                        tx_hash = ?log.transaction_hash,
                        error = %e,
                        "Skipping invalid inter-chain event"
                    );
                    outcome.skipped += 1;
                    continue;
                }
                return Err(e.into());
            }

            self.cache.insert(&envelope)?;
            if event_type.is_voucher_burn() {
                self.tracker.observe(&envelope)?;
            }
            metrics::record_event_witnessed(event_type);
            outcome.inserted += 1;
        }

        // Only after every event in the window is stored
        self.cache.set_last_queried_height(event_type, to_block)?;
        metrics::set_last_queried_height(event_type, to_block);

        if outcome.inserted > 0 || outcome.skipped > 0 || outcome.ignored > 0 {
            info!(
                event_type = %event_type,
                from_block,
                to_block,
                inserted = outcome.inserted,
                skipped = outcome.skipped,
                ignored = outcome.ignored,
                "Witnessed inter-chain events"
            );
        } else {
            debug!(event_type = %event_type, from_block, to_block, "No inter-chain events in range");
        }

        Ok(outcome)
    }

    /// Lock and burn logs carry their destination; unlocks always land on the
    /// mainchain and are kept.
    fn addressed_elsewhere(&self, envelope: &InterChainMessageEvent) -> bool {
        (envelope.event_type.is_token_lock() || envelope.event_type.is_voucher_burn())
            && envelope.target_chain_id != self.config.subchain_id
    }

    /// Spawn the polling loop
    pub fn start(self: Arc<Self>) -> WitnessHandle {
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
        let join = tokio::spawn(async move { self.run(shutdown_rx).await });
        WitnessHandle {
            shutdown: shutdown_tx,
            join,
        }
    }

    async fn run(&self, mut shutdown: mpsc::Receiver<()>) {
        info!(
            mainchain = %self.config.mainchain_chain_id,
            subchain = %self.config.subchain_id,
            subscriptions = self.subscriptions.len(),
            poll_interval_ms = self.config.poll_interval.as_millis() as u64,
            "Mainchain witness started"
        );

        loop {
            if let Err(e) = self.poll_cycle().await {
                warn!(error = %e, "Failed to read mainchain head, retrying next tick");
            }

            tokio::select! {
                _ = shutdown.recv() => break,
                _ = tokio::time::sleep(self.config.poll_interval) => {}
            }
        }

        info!("Mainchain witness stopped");
    }
}

#[async_trait]
impl ChainWitness for MainchainWitness {
    async fn mainchain_block_height(&self) -> Result<u64> {
        self.client.block_number().await
    }

    async fn validator_set_by_dynasty(&self, dynasty: u64) -> Result<ValidatorSet> {
        let subchain = self.config.subchain_id;
        self.validator_set_by_dynasty_for_chain(&subchain, dynasty)
            .await
    }

    async fn validator_set_by_dynasty_for_chain(
        &self,
        chain: &ChainId,
        dynasty: u64,
    ) -> Result<ValidatorSet> {
        if let Some(set) = self.validator_sets.get(chain, dynasty) {
            return Ok(set);
        }
        let set = self.client.validator_set(chain, dynasty).await?;
        self.validator_sets.put(*chain, set.clone());
        Ok(set)
    }

    fn inter_chain_event_cache(&self) -> Arc<InterChainEventCache> {
        self.cache.clone()
    }

    fn inter_subchain_channel_watch_list(&self) -> Vec<ChainId> {
        self.config.channel_watch_list.clone()
    }
}

/// Handle to a running witness loop
pub struct WitnessHandle {
    shutdown: mpsc::Sender<()>,
    join: JoinHandle<()>,
}

impl WitnessHandle {
    pub(crate) fn new(shutdown: mpsc::Sender<()>, join: JoinHandle<()>) -> Self {
        Self { shutdown, join }
    }

    /// Ask the loop to exit after its current cycle
    pub async fn stop(&self) {
        let _ = self.shutdown.send(()).await;
    }

    /// Wait for the loop to exit
    pub async fn wait(self) -> Result<()> {
        self.join
            .await
            .map_err(|e| eyre!("witness task panicked: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::testing::{fixtures, MockMainchainClient};
    use crate::voucher_burn::VoucherBurnStatus;
    use alloy::primitives::U256;

    const TFUEL_BANK: Address = Address::repeat_byte(0xb1);

    fn witness(client: Arc<MockMainchainClient>) -> (Arc<InterChainEventCache>, MainchainWitness) {
        let cache = Arc::new(InterChainEventCache::new(MemoryStore::new()));
        let config = WitnessConfig {
            mainchain_chain_id: ChainId::from_u64(fixtures::MAINCHAIN_ID),
            subchain_id: ChainId::from_u64(fixtures::SUBCHAIN_ID),
            confirmations: 0,
            max_block_range: 1_000,
            ..Default::default()
        };
        let subs = vec![
            EventSubscription::new(EventType::TFuelTokenLock, TFUEL_BANK).unwrap(),
            EventSubscription::new(EventType::TFuelVoucherBurn, TFUEL_BANK).unwrap(),
        ];
        let witness = MainchainWitness::new(client, cache.clone(), config, subs);
        (cache, witness)
    }

    fn lock_sub() -> EventSubscription {
        EventSubscription::new(EventType::TFuelTokenLock, TFUEL_BANK).unwrap()
    }

    fn push_lock(client: &MockMainchainClient, nonce: u64, block: u64, index: u64) {
        let payload = fixtures::tfuel_lock_payload(fixtures::MAINCHAIN_ID, nonce, 1_000 * nonce);
        client.push_log(fixtures::log_for(
            EventType::TFuelTokenLock,
            TFUEL_BANK,
            crate::events::SubEvent::encode_payload(&payload),
            block,
            index,
        ));
    }

    #[test]
    fn test_subscription_requires_log_type() {
        assert!(EventSubscription::new(EventType::TFuelTransfer, TFUEL_BANK).is_err());
        assert_eq!(
            EventSubscription::token_banks(Address::ZERO, Address::ZERO, Address::ZERO).len(),
            6
        );
    }

    #[tokio::test]
    async fn test_cursor_advances_to_window_end() {
        let client = Arc::new(MockMainchainClient::new(200));
        push_lock(&client, 1, 50, 0);
        push_lock(&client, 2, 120, 3);
        let (cache, witness) = witness(client.clone());

        let outcome = witness.poll_subscription(&lock_sub(), 200).await.unwrap();
        assert_eq!(outcome.from_block, 1);
        assert_eq!(outcome.to_block, 200);
        assert_eq!(outcome.inserted, 2);
        assert_eq!(
            cache.get_last_queried_height(EventType::TFuelTokenLock).unwrap(),
            200
        );
        assert!(cache
            .exists(EventType::TFuelTokenLock, &U256::from(2u64))
            .unwrap());
    }

    #[tokio::test]
    async fn test_window_respects_confirmations_and_range() {
        let client = Arc::new(MockMainchainClient::new(10_000));
        let cache = Arc::new(InterChainEventCache::new(MemoryStore::new()));
        let config = WitnessConfig {
            mainchain_chain_id: ChainId::from_u64(fixtures::MAINCHAIN_ID),
            confirmations: 12,
            max_block_range: 500,
            start_height: 101,
            ..Default::default()
        };
        let witness = MainchainWitness::new(client.clone(), cache.clone(), config, vec![lock_sub()]);

        let outcome = witness.poll_subscription(&lock_sub(), 10_000).await.unwrap();
        assert_eq!((outcome.from_block, outcome.to_block), (101, 600));

        cache
            .set_last_queried_height(EventType::TFuelTokenLock, 9_980)
            .unwrap();
        let outcome = witness.poll_subscription(&lock_sub(), 10_000).await.unwrap();
        assert_eq!((outcome.from_block, outcome.to_block), (9_981, 9_988));

        // Nothing new once the cursor reaches the confirmed head
        let outcome = witness.poll_subscription(&lock_sub(), 10_000).await.unwrap();
        assert_eq!(outcome.inserted, 0);
        assert_eq!(
            cache.get_last_queried_height(EventType::TFuelTokenLock).unwrap(),
            9_988
        );
    }

    #[tokio::test]
    async fn test_decode_failure_aborts_and_rescan_is_idempotent() {
        let client = Arc::new(MockMainchainClient::new(100));
        push_lock(&client, 1, 10, 0);
        push_lock(&client, 2, 20, 0);
        client.push_log(fixtures::log_for(
            EventType::TFuelTokenLock,
            TFUEL_BANK,
            vec![0xff; 7],
            30,
            0,
        ));
        push_lock(&client, 3, 40, 0);
        let (cache, witness) = witness(client.clone());

        assert!(witness.poll_subscription(&lock_sub(), 100).await.is_err());
        assert_eq!(
            cache.get_last_queried_height(EventType::TFuelTokenLock).unwrap(),
            0
        );
        // Events before the bad log were stored
        assert_eq!(cache.events_of_type(EventType::TFuelTokenLock).unwrap().len(), 2);

        client.remove_logs_at(30);
        let outcome = witness.poll_subscription(&lock_sub(), 100).await.unwrap();
        assert_eq!(outcome.inserted, 3);
        assert_eq!(
            cache.get_last_queried_height(EventType::TFuelTokenLock).unwrap(),
            100
        );
        assert_eq!(cache.events_of_type(EventType::TFuelTokenLock).unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_rpc_failure_leaves_cursor() {
        let client = Arc::new(MockMainchainClient::new(100));
        push_lock(&client, 1, 10, 0);
        client.fail_get_logs(true);
        let (cache, witness) = witness(client.clone());

        let results = witness.poll_cycle().await.unwrap();
        assert!(results.iter().all(|(_, r)| r.is_err()));
        assert_eq!(
            cache.get_last_queried_height(EventType::TFuelTokenLock).unwrap(),
            0
        );

        client.fail_get_logs(false);
        let results = witness.poll_cycle().await.unwrap();
        assert!(results.iter().all(|(_, r)| r.is_ok()));
        assert!(cache
            .exists(EventType::TFuelTokenLock, &U256::from(1u64))
            .unwrap());
    }

    #[tokio::test]
    async fn test_spoofed_log_skipped() {
        let client = Arc::new(MockMainchainClient::new(100));
        // Denom claims origin 999 but the lock was witnessed on the mainchain
        let payload = fixtures::tfuel_lock_payload(999, 7, 1);
        client.push_log(fixtures::log_for(
            EventType::TFuelTokenLock,
            TFUEL_BANK,
            crate::events::SubEvent::encode_payload(&payload),
            10,
            0,
        ));
        push_lock(&client, 8, 11, 0);
        let (cache, witness) = witness(client.clone());

        let outcome = witness.poll_subscription(&lock_sub(), 100).await.unwrap();
        assert_eq!(outcome.skipped, 1);
        assert_eq!(outcome.inserted, 1);
        assert!(!cache
            .exists(EventType::TFuelTokenLock, &U256::from(7u64))
            .unwrap());
        assert_eq!(
            cache.get_last_queried_height(EventType::TFuelTokenLock).unwrap(),
            100
        );
    }

    #[tokio::test]
    async fn test_lock_for_other_subchain_ignored() {
        let client = Arc::new(MockMainchainClient::new(100));
        let mut payload = fixtures::tfuel_lock_payload(fixtures::MAINCHAIN_ID, 3, 10);
        payload.target_chain_id = ChainId::from_u64(360888);
        client.push_log(fixtures::log_for(
            EventType::TFuelTokenLock,
            TFUEL_BANK,
            crate::events::SubEvent::encode_payload(&payload),
            10,
            0,
        ));
        push_lock(&client, 4, 12, 0);
        let (cache, witness) = witness(client.clone());

        let outcome = witness.poll_subscription(&lock_sub(), 100).await.unwrap();
        assert_eq!(outcome.ignored, 1);
        assert_eq!(outcome.skipped, 0);
        assert_eq!(outcome.inserted, 1);
        assert!(!cache
            .exists(EventType::TFuelTokenLock, &U256::from(3u64))
            .unwrap());
        assert_eq!(
            cache.get_last_queried_height(EventType::TFuelTokenLock).unwrap(),
            100
        );
    }

    #[tokio::test]
    async fn test_burn_for_other_subchain_not_tracked() {
        let client = Arc::new(MockMainchainClient::new(100));
        let mut payload = fixtures::tfuel_voucher_burn_payload(6, 250);
        payload.target_chain_id = ChainId::from_u64(360888);
        client.push_log(fixtures::log_for(
            EventType::TFuelVoucherBurn,
            TFUEL_BANK,
            crate::events::SubEvent::encode_payload(&payload),
            42,
            0,
        ));
        let (cache, witness) = witness(client.clone());

        let sub = EventSubscription::new(EventType::TFuelVoucherBurn, TFUEL_BANK).unwrap();
        let outcome = witness.poll_subscription(&sub, 100).await.unwrap();
        assert_eq!(outcome.ignored, 1);
        assert!(!cache
            .voucher_burn_nonce_exists(EventType::TFuelVoucherBurn, &U256::from(6u64))
            .unwrap());
    }

    #[tokio::test]
    async fn test_voucher_burn_starts_pending() {
        let client = Arc::new(MockMainchainClient::new(100));
        let payload = fixtures::tfuel_voucher_burn_payload(5, 250);
        client.push_log(fixtures::log_for(
            EventType::TFuelVoucherBurn,
            TFUEL_BANK,
            crate::events::SubEvent::encode_payload(&payload),
            42,
            0,
        ));
        let (cache, witness) = witness(client.clone());

        witness.poll_cycle().await.unwrap();
        let info = cache
            .get_voucher_burn_status(EventType::TFuelVoucherBurn, &U256::from(5u64))
            .unwrap();
        assert_eq!(info.status, VoucherBurnStatus::Pending);
        assert_eq!(info.retried_time, 0);
    }

    #[tokio::test]
    async fn test_validator_sets_cached_per_dynasty() {
        let client = Arc::new(MockMainchainClient::new(100));
        let subchain = ChainId::from_u64(fixtures::SUBCHAIN_ID);
        client.set_validator_set(subchain, fixtures::single_validator_set(3));
        let (_, witness) = witness(client.clone());

        let set = witness.validator_set_by_dynasty(3).await.unwrap();
        assert_eq!(set.len(), 1);
        witness.validator_set_by_dynasty(3).await.unwrap();
        assert_eq!(client.validator_set_queries(), 1);
    }

    #[tokio::test]
    async fn test_start_stop() {
        let client = Arc::new(MockMainchainClient::new(100));
        push_lock(&client, 1, 10, 0);
        let (cache, witness) = witness(client.clone());
        let handle = Arc::new(witness).start();

        // The first cycle runs before the first sleep
        for _ in 0..50 {
            if cache
                .exists(EventType::TFuelTokenLock, &U256::from(1u64))
                .unwrap()
            {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        handle.stop().await;
        handle.wait().await.unwrap();
        assert!(cache
            .exists(EventType::TFuelTokenLock, &U256::from(1u64))
            .unwrap());
    }
}
