//! In-memory mainchain
//!
//! Serves `eth_getLogs` from a list of logs, honouring the filter's block
//! range, address and topic-0. Failures can be switched on to exercise the
//! witness's retry path.

use alloy::rpc::types::{Filter, Log};
use async_trait::async_trait;
use eyre::{eyre, Result};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::types::ChainId;
use crate::witness::{MainchainClient, ValidatorSet};

#[derive(Default)]
pub struct MockMainchainClient {
    head: AtomicU64,
    logs: Mutex<Vec<Log>>,
    validator_sets: Mutex<HashMap<(ChainId, u64), ValidatorSet>>,
    fail_get_logs: AtomicBool,
    validator_set_queries: AtomicUsize,
}

impl MockMainchainClient {
    pub fn new(head: u64) -> Self {
        Self {
            head: AtomicU64::new(head),
            ..Default::default()
        }
    }

    pub fn set_head(&self, head: u64) {
        self.head.store(head, Ordering::SeqCst);
    }

    pub fn push_log(&self, log: Log) {
        self.logs.lock().unwrap().push(log);
    }

    /// Drop every log emitted at `block_number`
    pub fn remove_logs_at(&self, block_number: u64) {
        self.logs
            .lock()
            .unwrap()
            .retain(|log| log.block_number != Some(block_number));
    }

    pub fn fail_get_logs(&self, fail: bool) {
        self.fail_get_logs.store(fail, Ordering::SeqCst);
    }

    pub fn set_validator_set(&self, chain: ChainId, set: ValidatorSet) {
        self.validator_sets
            .lock()
            .unwrap()
            .insert((chain, set.dynasty), set);
    }

    pub fn validator_set_queries(&self) -> usize {
        self.validator_set_queries.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MainchainClient for MockMainchainClient {
    async fn block_number(&self) -> Result<u64> {
        Ok(self.head.load(Ordering::SeqCst))
    }

    async fn get_logs(&self, filter: &Filter) -> Result<Vec<Log>> {
        if self.fail_get_logs.load(Ordering::SeqCst) {
            return Err(eyre!("connection refused"));
        }
        let from = filter.get_from_block().unwrap_or(0);
        let to = filter.get_to_block().unwrap_or(u64::MAX);

        let logs = self.logs.lock().unwrap();
        Ok(logs
            .iter()
            .filter(|log| {
                let block = log.block_number.unwrap_or(0);
                let topic_matches = log
                    .topics()
                    .first()
                    .map(|t| filter.topics[0].matches(t))
                    .unwrap_or(false);
                block >= from
                    && block <= to
                    && filter.address.matches(&log.address())
                    && topic_matches
            })
            .cloned()
            .collect())
    }

    async fn validator_set(&self, chain: &ChainId, dynasty: u64) -> Result<ValidatorSet> {
        self.validator_set_queries.fetch_add(1, Ordering::SeqCst);
        self.validator_sets
            .lock()
            .unwrap()
            .get(&(*chain, dynasty))
            .cloned()
            .ok_or_else(|| eyre!("no validator set for chain {} dynasty {}", chain, dynasty))
    }
}
