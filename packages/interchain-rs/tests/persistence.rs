//! Cache contents survive closing and reopening the redb file

use alloy::primitives::{Address, U256};
use interchain_rs::events::CrossChainTFuelTokenLockedEvent;
use interchain_rs::{
    tfuel_denom, ChainId, EventType, InterChainEventCache, InterChainMessageEvent, ParsedEvent,
    RedbStore, SimulatedMainchainWitness, SubEvent, VoucherBurnStatus, VoucherBurnTracker,
    WitnessConfig,
};
use std::sync::Arc;
use std::time::Duration;

const MAINCHAIN: u64 = 366;
const SUBCHAIN: u64 = 360777;

fn lock_event(nonce: u64) -> InterChainMessageEvent {
    let payload = CrossChainTFuelTokenLockedEvent {
        target_chain_id: ChainId::from_u64(SUBCHAIN),
        denom: tfuel_denom(&ChainId::from_u64(MAINCHAIN)),
        source_chain_token_sender: Address::repeat_byte(0x01),
        target_chain_voucher_receiver: Address::repeat_byte(0x02),
        locked_amount: U256::from(1_000u64),
        token_lock_nonce: U256::from(nonce),
    };
    InterChainMessageEvent::new(
        EventType::TFuelTokenLock,
        ChainId::from_u64(MAINCHAIN),
        ChainId::from_u64(SUBCHAIN),
        Address::repeat_byte(0x01),
        Address::repeat_byte(0x02),
        payload.encode_payload(),
        U256::from(nonce),
        500 + nonce,
    )
}

#[test]
fn test_reopened_store_keeps_events_and_cursors() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("witness.redb");

    {
        let cache = Arc::new(InterChainEventCache::new(RedbStore::open(&path).unwrap()));
        cache.insert(&lock_event(1)).unwrap();
        cache.insert(&lock_event(2)).unwrap();
        cache
            .set_last_queried_height(EventType::TFuelTokenLock, 777)
            .unwrap();
        cache
            .set_next_transfer_nonce(EventType::TFuelTransfer, U256::from(9u64))
            .unwrap();

        let tracker = VoucherBurnTracker::new(cache.clone());
        tracker
            .mark_processed(EventType::TFuelVoucherBurn, &U256::from(4u64), 800)
            .unwrap();
    }

    let cache = Arc::new(InterChainEventCache::new(RedbStore::open(&path).unwrap()));

    let events = cache.events_of_type(EventType::TFuelTokenLock).unwrap();
    assert_eq!(events, vec![lock_event(1), lock_event(2)]);
    assert!(ParsedEvent::parse(&events[0]).is_ok());

    assert_eq!(
        cache.get_last_queried_height(EventType::TFuelTokenLock).unwrap(),
        777
    );
    assert_eq!(
        cache.get_next_transfer_nonce(EventType::TFuelTransfer).unwrap(),
        U256::from(9u64)
    );

    let tracker = VoucherBurnTracker::new(cache.clone());
    assert_eq!(
        tracker
            .status(EventType::TFuelVoucherBurn, &U256::from(4u64))
            .unwrap()
            .status,
        VoucherBurnStatus::Processed
    );
}

#[tokio::test]
async fn test_simulated_witness_resumes_nonces_after_restart() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init()
        .ok();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sim.redb");

    {
        let cache = Arc::new(InterChainEventCache::new(RedbStore::open(&path).unwrap()));
        let witness = Arc::new(SimulatedMainchainWitness::new(
            cache.clone(),
            WitnessConfig {
                poll_interval: Duration::from_millis(5),
                ..Default::default()
            },
        ));
        let handle = witness.start();
        for _ in 0..100 {
            if cache.events_of_type(EventType::TFuelTransfer).unwrap().len() >= 2 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        handle.stop().await;
        handle.wait().await.unwrap();
    }

    let cache = Arc::new(InterChainEventCache::new(RedbStore::open(&path).unwrap()));
    let before = cache.events_of_type(EventType::TFuelTransfer).unwrap().len();
    assert!(before >= 2);
    assert_eq!(cache.events_of_type(EventType::Tnt721Transfer).unwrap().len(), 1);

    let witness = SimulatedMainchainWitness::new(cache.clone(), WitnessConfig::default());
    witness.tick().unwrap();

    let events = cache.events_of_type(EventType::TFuelTransfer).unwrap();
    assert_eq!(events.len(), before + 3);
    assert_eq!(events.last().unwrap().nonce, U256::from(before as u64 + 3));
    assert_eq!(cache.events_of_type(EventType::Tnt721Transfer).unwrap().len(), 1);
}
