//! Simulated mainchain for local subchain development
//!
//! Heights advance with wall-clock time and every tick writes a batch of
//! mainchain-to-subchain transfer events straight into the cache. There is
//! one validator with a fixed stake for every chain and dynasty.

use alloy::primitives::{address, Address, U256};
use async_trait::async_trait;
use eyre::Result;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::watcher::{WitnessConfig, WitnessHandle};
use super::{calculate_dynasty, ChainWitness, Validator, ValidatorSet, ValidatorSetCache};
use crate::cache::InterChainEventCache;
use crate::denom::{tfuel_denom, tnt20_denom, tnt721_denom};
use crate::events::{
    CrossChainTFuelTransferEvent, CrossChainTNT20TransferEvent, CrossChainTNT721TransferEvent,
    EventType, InterChainMessageEvent, SubEvent,
};
use crate::types::ChainId;

pub const SIM_VALIDATOR: Address = address!("2E833968E5bB786Ae419c4d13189fB081Cc43bab");
pub const SIM_VALIDATOR_STAKE: u64 = 100_000_000;

/// Simulated mainchain block time
pub const SIM_BLOCK_INTERVAL: Duration = Duration::from_millis(2000);

const TDROP_CONTRACT: Address = address!("1336739B05C7Ab8a526D40DCC0d04a826b5f8B03");
const RTK_CONTRACT: Address = address!("15cc4c3f21417c392119054c8fe5895146e1a493");
const NFT_CONTRACT: Address = address!("0480c1097197831a1e4e9d64574f0048f8e35628");
const NFT_TOKEN_ID: u64 = 2076;
const NFT_TOKEN_URI: &str = "https://api.thetadrop.com/type/type_qyh516vms3hz4b24n8x8wcq3pgf.json?nft_id=nft_n5gr1291uge56ydf1cv0kvguaxzw";

const WEI_PER_TOKEN: u64 = 1_000_000_000_000_000_000;

const TFUEL_TRANSFERS_PER_TICK: usize = 3;

struct SimToken {
    contract: Address,
    name: &'static str,
    symbol: &'static str,
    decimals: u8,
    /// Whole tokens moved per transfer
    whole: u64,
    /// Base units added on top of `whole`
    extra: u64,
}

impl SimToken {
    fn amount(&self) -> U256 {
        U256::from(self.whole) * U256::from(10u64).pow(U256::from(self.decimals))
            + U256::from(self.extra)
    }
}

const SIM_TNT20_TOKENS: [SimToken; 2] = [
    SimToken {
        contract: TDROP_CONTRACT,
        name: "TDrop",
        symbol: "TDROP",
        decimals: 18,
        whole: 66,
        extra: 0,
    },
    SimToken {
        contract: RTK_CONTRACT,
        name: "Random Token",
        symbol: "RTK",
        decimals: 6,
        whole: 0,
        extra: 9_999_999,
    },
];

/// What one [`SimulatedMainchainWitness::tick`] wrote
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickOutcome {
    pub block_height: u64,
    pub inserted: usize,
}

pub struct SimulatedMainchainWitness {
    cache: Arc<InterChainEventCache>,
    config: WitnessConfig,
    started_at: Instant,
    validator_sets: ValidatorSetCache,
}

impl SimulatedMainchainWitness {
    pub fn new(cache: Arc<InterChainEventCache>, config: WitnessConfig) -> Self {
        Self {
            cache,
            config,
            started_at: Instant::now(),
            validator_sets: ValidatorSetCache::default(),
        }
    }

    pub fn config(&self) -> &WitnessConfig {
        &self.config
    }

    /// Synthetic height derived from time since construction
    pub fn mainchain_height(&self) -> u64 {
        (self.started_at.elapsed().as_millis() / SIM_BLOCK_INTERVAL.as_millis()) as u64
    }

    /// Emit one round of transfers: three TFuel transfers and one transfer
    /// of each simulated TNT20 token every tick, and a single TNT721 transfer
    /// over the lifetime of the cache.
    pub fn tick(&self) -> crate::Result<TickOutcome> {
        let height = self.mainchain_height();
        let mainchain = self.config.mainchain_chain_id;
        let subchain = self.config.subchain_id;
        let mut inserted = 0;

        for _ in 0..TFUEL_TRANSFERS_PER_TICK {
            let nonce = self.next_nonce(EventType::TFuelTransfer)?;
            let tfuel = CrossChainTFuelTransferEvent {
                target_chain_id: subchain,
                mainchain_token_sender: SIM_VALIDATOR,
                subchain_token_receiver: SIM_VALIDATOR,
                denom: tfuel_denom(&mainchain),
                locked_amount: U256::from(88u64) * U256::from(WEI_PER_TOKEN),
                nonce,
            };
            inserted += self.emit(&tfuel, nonce, height)?;
        }

        for token in SIM_TNT20_TOKENS {
            let nonce = self.next_nonce(EventType::Tnt20Transfer)?;
            let tnt20 = CrossChainTNT20TransferEvent {
                target_chain_id: subchain,
                mainchain_token_sender: SIM_VALIDATOR,
                subchain_token_receiver: SIM_VALIDATOR,
                denom: tnt20_denom(&mainchain, &token.contract),
                locked_amount: token.amount(),
                tnt20_contract: token.contract,
                name: token.name.to_string(),
                symbol: token.symbol.to_string(),
                decimals: token.decimals,
                nonce,
            };
            inserted += self.emit(&tnt20, nonce, height)?;
        }

        let nonce = self.next_nonce(EventType::Tnt721Transfer)?;
        if nonce == U256::from(1u64) {
            let tnt721 = CrossChainTNT721TransferEvent {
                target_chain_id: subchain,
                mainchain_token_sender: SIM_VALIDATOR,
                subchain_token_receiver: SIM_VALIDATOR,
                denom: tnt721_denom(&mainchain, &NFT_CONTRACT),
                name: "American Idol 20th Season Finalists".to_string(),
                symbol: "AI20".to_string(),
                token_id: U256::from(NFT_TOKEN_ID),
                token_uri: NFT_TOKEN_URI.to_string(),
                nonce,
            };
            inserted += self.emit(&tnt721, nonce, height)?;
        }

        debug!(block_height = height, inserted, "Simulated mainchain tick");
        Ok(TickOutcome {
            block_height: height,
            inserted,
        })
    }

    /// Stored transfer nonces start at 1
    fn next_nonce(&self, event_type: EventType) -> crate::Result<U256> {
        let nonce = self.cache.get_next_transfer_nonce(event_type)?;
        Ok(nonce.max(U256::from(1u64)))
    }

    fn emit<E: SubEvent>(&self, payload: &E, nonce: U256, height: u64) -> crate::Result<usize> {
        let envelope = InterChainMessageEvent::new(
            E::EVENT_TYPE,
            self.config.mainchain_chain_id,
            self.config.subchain_id,
            SIM_VALIDATOR,
            SIM_VALIDATOR,
            payload.encode_payload(),
            nonce,
            height,
        );
        let inserted = self.cache.insert_if_absent(&envelope)?;
        self.cache
            .set_next_transfer_nonce(E::EVENT_TYPE, nonce + U256::from(1u64))?;
        if inserted {
            crate::metrics::record_event_witnessed(E::EVENT_TYPE);
        }
        Ok(usize::from(inserted))
    }

    /// Spawn the tick loop
    pub fn start(self: Arc<Self>) -> WitnessHandle {
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
        let join = tokio::spawn(async move { self.run(shutdown_rx).await });
        WitnessHandle::new(shutdown_tx, join)
    }

    async fn run(&self, mut shutdown: mpsc::Receiver<()>) {
        info!(
            mainchain = %self.config.mainchain_chain_id,
            subchain = %self.config.subchain_id,
            tick_ms = self.config.poll_interval.as_millis() as u64,
            "Simulated mainchain witness started"
        );

        let mut witnessed_dynasty = None;
        loop {
            let height = self.mainchain_height();
            crate::metrics::set_mainchain_height(height);

            let dynasty = calculate_dynasty(height, self.config.blocks_per_dynasty);
            if witnessed_dynasty.map_or(true, |d| dynasty > d) {
                witnessed_dynasty = Some(dynasty);
                info!(dynasty, "Updated the witnessed dynasty");
            }

            if let Err(e) = self.tick() {
                warn!(error = %e, "Simulated tick failed");
            }

            tokio::select! {
                _ = shutdown.recv() => break,
                _ = tokio::time::sleep(self.config.poll_interval) => {}
            }
        }

        info!("Simulated mainchain witness stopped");
    }
}

#[async_trait]
impl ChainWitness for SimulatedMainchainWitness {
    async fn mainchain_block_height(&self) -> Result<u64> {
        Ok(self.mainchain_height())
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
        let set = ValidatorSet::new(
            dynasty,
            vec![Validator {
                address: SIM_VALIDATOR,
                stake: U256::from(SIM_VALIDATOR_STAKE),
            }],
        );
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
