//! Mainchain RPC access
//!
//! The witness only needs three calls from the mainchain. They sit behind
//! [`MainchainClient`] so the polling loop can run against a mock in tests.

use alloy::{
    primitives::Address,
    providers::{Provider, ProviderBuilder, RootProvider},
    rpc::types::{Filter, Log},
    transports::http::{Client, Http},
};
use async_trait::async_trait;
use eyre::{eyre, Result, WrapErr};

use super::ValidatorSet;
use crate::events::contracts::ChainRegistrar;
use crate::types::ChainId;

#[async_trait]
pub trait MainchainClient: Send + Sync {
    /// Latest block number
    async fn block_number(&self) -> Result<u64>;

    /// `eth_getLogs`
    async fn get_logs(&self, filter: &Filter) -> Result<Vec<Log>>;

    /// Registered validators of `chain` for `dynasty`
    async fn validator_set(&self, chain: &ChainId, dynasty: u64) -> Result<ValidatorSet>;
}

/// JSON-RPC client over HTTP
pub struct RpcMainchainClient {
    provider: RootProvider<Http<Client>>,
    chain_registrar: Address,
}

impl RpcMainchainClient {
    pub fn new(rpc_url: &str, chain_registrar: Address) -> Result<Self> {
        let provider = ProviderBuilder::new().on_http(
            rpc_url
                .parse()
                .map_err(|e| eyre!("Invalid RPC URL: {}", e))?,
        );

        Ok(Self {
            provider,
            chain_registrar,
        })
    }

    pub fn provider(&self) -> &RootProvider<Http<Client>> {
        &self.provider
    }
}

#[async_trait]
impl MainchainClient for RpcMainchainClient {
    async fn block_number(&self) -> Result<u64> {
        let block = self
            .provider
            .get_block_number()
            .await
            .wrap_err("Failed to get mainchain block number")?;
        Ok(block)
    }

    async fn get_logs(&self, filter: &Filter) -> Result<Vec<Log>> {
        self.provider
            .get_logs(filter)
            .await
            .wrap_err("Failed to get mainchain logs")
    }

    async fn validator_set(&self, chain: &ChainId, dynasty: u64) -> Result<ValidatorSet> {
        let registrar = ChainRegistrar::new(self.chain_registrar, &self.provider);
        let result = registrar
            .getValidatorSet(chain.as_u256(), alloy::primitives::U256::from(dynasty))
            .call()
            .await
            .map_err(|e| {
                eyre!(
                    "Failed to query validator set for chain {} dynasty {}: {}",
                    chain,
                    dynasty,
                    e
                )
            })?;

        ValidatorSet::from_registrar(dynasty, result.validators, result.shareAmounts)
    }
}
