//! Mainchain witness
//!
//! Observes token-bank logs on the mainchain and feeds them into the
//! [`InterChainEventCache`]. Consumers on the subchain side see the witness
//! through the [`ChainWitness`] trait:
//!
//! - [`MainchainWitness`] - polls a real chain through a [`MainchainClient`]
//! - [`SimulatedMainchainWitness`] - synthesizes heights and transfers locally

pub mod client;
pub mod decode;
pub mod sim;
pub mod watcher;

pub use client::{MainchainClient, RpcMainchainClient};
pub use sim::SimulatedMainchainWitness;
pub use watcher::{EventSubscription, MainchainWitness, WitnessConfig, WitnessHandle};

use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use eyre::{eyre, Result};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::warn;

use crate::cache::InterChainEventCache;
use crate::types::ChainId;

/// Blocks per validator-set epoch when not configured
pub const DEFAULT_BLOCKS_PER_DYNASTY: u64 = 100;

pub fn calculate_dynasty(height: u64, blocks_per_dynasty: u64) -> u64 {
    height / blocks_per_dynasty.max(1)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validator {
    pub address: Address,
    pub stake: U256,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatorSet {
    pub dynasty: u64,
    pub validators: Vec<Validator>,
}

impl ValidatorSet {
    pub fn new(dynasty: u64, validators: Vec<Validator>) -> Self {
        Self {
            dynasty,
            validators,
        }
    }

    /// Pair registrar output; the two arrays must be the same length
    pub fn from_registrar(dynasty: u64, addresses: Vec<Address>, stakes: Vec<U256>) -> Result<Self> {
        if addresses.len() != stakes.len() {
            return Err(eyre!(
                "validator set for dynasty {} has {} addresses but {} stakes",
                dynasty,
                addresses.len(),
                stakes.len()
            ));
        }
        let validators = addresses
            .into_iter()
            .zip(stakes)
            .map(|(address, stake)| Validator { address, stake })
            .collect();
        Ok(Self::new(dynasty, validators))
    }

    pub fn total_stake(&self) -> U256 {
        self.validators
            .iter()
            .fold(U256::ZERO, |acc, v| acc.saturating_add(v.stake))
    }

    pub fn len(&self) -> usize {
        self.validators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }
}

/// Validator sets kept in memory before the oldest fetch is evicted
pub const DEFAULT_VALIDATOR_SET_CACHE_SIZE: usize = 256;

/// Validator sets already fetched, keyed by chain and dynasty.
///
/// Bounded: once `max_size` sets are held, inserting a new key evicts the
/// one inserted longest ago.
pub struct ValidatorSetCache {
    inner: Mutex<BoundedSets>,
}

struct BoundedSets {
    sets: HashMap<(ChainId, u64), ValidatorSet>,
    order: VecDeque<(ChainId, u64)>,
    max_size: usize,
}

impl Default for ValidatorSetCache {
    fn default() -> Self {
        Self::new(DEFAULT_VALIDATOR_SET_CACHE_SIZE)
    }
}

impl ValidatorSetCache {
    pub fn new(max_size: usize) -> Self {
        Self {
            inner: Mutex::new(BoundedSets {
                sets: HashMap::new(),
                order: VecDeque::new(),
                max_size: max_size.max(1),
            }),
        }
    }

    pub fn get(&self, chain: &ChainId, dynasty: u64) -> Option<ValidatorSet> {
        self.lock().sets.get(&(*chain, dynasty)).cloned()
    }

    pub fn put(&self, chain: ChainId, set: ValidatorSet) {
        let key = (chain, set.dynasty);
        let mut inner = self.lock();
        if inner.sets.insert(key, set).is_some() {
            return;
        }
        inner.order.push_back(key);
        while inner.sets.len() > inner.max_size {
            match inner.order.pop_front() {
                Some(oldest) => {
                    inner.sets.remove(&oldest);
                }
                None => break,
            }
        }
    }

    pub fn len(&self) -> usize {
        self.lock().sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // Entries are whole values, so a panic elsewhere cannot leave one half written.
    fn lock(&self) -> MutexGuard<'_, BoundedSets> {
        self.inner.lock().unwrap_or_else(|poisoned| {
            warn!("Validator set cache lock poisoned, recovering");
            poisoned.into_inner()
        })
    }
}

/// What the subchain's consensus layer needs from a mainchain witness
#[async_trait]
pub trait ChainWitness: Send + Sync {
    async fn mainchain_block_height(&self) -> Result<u64>;

    /// Validator set of this witness's own subchain
    async fn validator_set_by_dynasty(&self, dynasty: u64) -> Result<ValidatorSet>;

    async fn validator_set_by_dynasty_for_chain(
        &self,
        chain: &ChainId,
        dynasty: u64,
    ) -> Result<ValidatorSet>;

    fn inter_chain_event_cache(&self) -> Arc<InterChainEventCache>;

    /// Other subchains this subchain has open channels with
    fn inter_subchain_channel_watch_list(&self) -> Vec<ChainId>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calculate_dynasty() {
        assert_eq!(calculate_dynasty(0, 100), 0);
        assert_eq!(calculate_dynasty(99, 100), 0);
        assert_eq!(calculate_dynasty(100, 100), 1);
        assert_eq!(calculate_dynasty(12_345, 100), 123);
        assert_eq!(calculate_dynasty(5, 0), 5);
    }

    #[test]
    fn test_validator_set_from_registrar() {
        let set = ValidatorSet::from_registrar(
            3,
            vec![Address::repeat_byte(1), Address::repeat_byte(2)],
            vec![U256::from(10u64), U256::from(32u64)],
        )
        .unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.total_stake(), U256::from(42u64));

        assert!(ValidatorSet::from_registrar(3, vec![Address::ZERO], vec![]).is_err());
    }

    #[test]
    fn test_validator_set_cache() {
        let cache = ValidatorSetCache::default();
        let chain = ChainId::from_u64(360777);
        assert!(cache.get(&chain, 1).is_none());

        cache.put(chain, ValidatorSet::new(1, vec![]));
        assert!(cache.get(&chain, 1).is_some());
        assert!(cache.get(&chain, 2).is_none());
        assert!(cache.get(&ChainId::from_u64(1), 1).is_none());
    }

    #[test]
    fn test_validator_set_cache_evicts_oldest() {
        let cache = ValidatorSetCache::new(3);
        let chain = ChainId::from_u64(360777);
        for dynasty in 1..=4 {
            cache.put(chain, ValidatorSet::new(dynasty, vec![]));
        }
        assert_eq!(cache.len(), 3);
        assert!(cache.get(&chain, 1).is_none());
        assert!(cache.get(&chain, 2).is_some());
        assert!(cache.get(&chain, 4).is_some());
    }

    #[test]
    fn test_validator_set_cache_replace_keeps_size() {
        let cache = ValidatorSetCache::new(2);
        let chain = ChainId::from_u64(360777);
        cache.put(chain, ValidatorSet::new(1, vec![]));
        cache.put(chain, ValidatorSet::new(2, vec![]));
        cache.put(
            chain,
            ValidatorSet::new(
                1,
                vec![Validator {
                    address: Address::repeat_byte(7),
                    stake: U256::from(5u64),
                }],
            ),
        );
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(&chain, 1).unwrap().len(), 1);
        assert!(cache.get(&chain, 2).is_some());
    }

    #[test]
    fn test_validator_set_cache_survives_poisoned_lock() {
        let cache = Arc::new(ValidatorSetCache::default());
        let chain = ChainId::from_u64(360777);
        cache.put(chain, ValidatorSet::new(1, vec![]));

        let poisoner = cache.clone();
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.inner.lock().unwrap();
            panic!("poison the lock");
        })
        .join();

        assert!(cache.get(&chain, 1).is_some());
        cache.put(chain, ValidatorSet::new(2, vec![]));
        assert_eq!(cache.len(), 2);
    }
}
