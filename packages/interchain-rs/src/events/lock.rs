//! Token lock sub-events
//!
//! A lock happens on the chain the token was issued on, so the denom's origin
//! must equal the envelope's source chain ID.

use alloy::primitives::{Address, U256};
use alloy::sol_types::SolEvent;

use super::contracts::{TFuelTokenLocked, TNT20TokenLocked, TNT721TokenLocked};
use super::{
    decode_event_data, parse_sub_event, EventType, InterChainMessageEvent, OriginSide, SubEvent,
};
use crate::error::Result;
use crate::types::ChainId;

/// Payload of a `TFuelTokenLocked` log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrossChainTFuelTokenLockedEvent {
    /// Chain on which vouchers will be minted
    pub target_chain_id: ChainId,
    pub denom: String,
    pub source_chain_token_sender: Address,
    pub target_chain_voucher_receiver: Address,
    pub locked_amount: U256,
    pub token_lock_nonce: U256,
}

impl SubEvent for CrossChainTFuelTokenLockedEvent {
    const EVENT_TYPE: EventType = EventType::TFuelTokenLock;
    const ORIGIN_SIDE: OriginSide = OriginSide::Source;

    fn decode_payload(data: &[u8]) -> Result<Self> {
        let e: TFuelTokenLocked = decode_event_data(Self::EVENT_TYPE, data)?;
        Ok(Self {
            target_chain_id: e.targetChainID.into(),
            denom: e.denom,
            source_chain_token_sender: e.sourceChainTokenSender,
            target_chain_voucher_receiver: e.targetChainVoucherReceiver,
            locked_amount: e.lockedAmount,
            token_lock_nonce: e.tokenLockNonce,
        })
    }

    fn encode_payload(&self) -> Vec<u8> {
        TFuelTokenLocked {
            targetChainID: self.target_chain_id.as_u256(),
            denom: self.denom.clone(),
            sourceChainTokenSender: self.source_chain_token_sender,
            targetChainVoucherReceiver: self.target_chain_voucher_receiver,
            lockedAmount: self.locked_amount,
            tokenLockNonce: self.token_lock_nonce,
        }
        .encode_data()
    }

    fn denom(&self) -> &str {
        &self.denom
    }

    fn set_denom(&mut self, denom: String) {
        self.denom = denom;
    }
}

/// Payload of a `TNT20TokenLocked` log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrossChainTNT20TokenLockedEvent {
    pub target_chain_id: ChainId,
    pub denom: String,
    pub source_chain_token_sender: Address,
    pub target_chain_voucher_receiver: Address,
    pub locked_amount: U256,
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub token_lock_nonce: U256,
}

impl SubEvent for CrossChainTNT20TokenLockedEvent {
    const EVENT_TYPE: EventType = EventType::Tnt20TokenLock;
    const ORIGIN_SIDE: OriginSide = OriginSide::Source;

    fn decode_payload(data: &[u8]) -> Result<Self> {
        let e: TNT20TokenLocked = decode_event_data(Self::EVENT_TYPE, data)?;
        Ok(Self {
            target_chain_id: e.targetChainID.into(),
            denom: e.denom,
            source_chain_token_sender: e.sourceChainTokenSender,
            target_chain_voucher_receiver: e.targetChainVoucherReceiver,
            locked_amount: e.lockedAmount,
            name: e.name,
            symbol: e.symbol,
            decimals: e.decimals,
            token_lock_nonce: e.tokenLockNonce,
        })
    }

    fn encode_payload(&self) -> Vec<u8> {
        TNT20TokenLocked {
            targetChainID: self.target_chain_id.as_u256(),
            denom: self.denom.clone(),
            sourceChainTokenSender: self.source_chain_token_sender,
            targetChainVoucherReceiver: self.target_chain_voucher_receiver,
            lockedAmount: self.locked_amount,
            name: self.name.clone(),
            symbol: self.symbol.clone(),
            decimals: self.decimals,
            tokenLockNonce: self.token_lock_nonce,
        }
        .encode_data()
    }

    fn denom(&self) -> &str {
        &self.denom
    }

    fn set_denom(&mut self, denom: String) {
        self.denom = denom;
    }
}

/// Payload of a `TNT721TokenLocked` log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrossChainTNT721TokenLockedEvent {
    pub target_chain_id: ChainId,
    pub denom: String,
    pub source_chain_token_sender: Address,
    pub target_chain_voucher_receiver: Address,
    pub token_id: U256,
    pub token_uri: String,
    pub name: String,
    pub symbol: String,
    pub token_lock_nonce: U256,
}

impl SubEvent for CrossChainTNT721TokenLockedEvent {
    const EVENT_TYPE: EventType = EventType::Tnt721TokenLock;
    const ORIGIN_SIDE: OriginSide = OriginSide::Source;

    fn decode_payload(data: &[u8]) -> Result<Self> {
        let e: TNT721TokenLocked = decode_event_data(Self::EVENT_TYPE, data)?;
        Ok(Self {
            target_chain_id: e.targetChainID.into(),
            denom: e.denom,
            source_chain_token_sender: e.sourceChainTokenSender,
            target_chain_voucher_receiver: e.targetChainVoucherReceiver,
            token_id: e.tokenID,
            token_uri: e.tokenURI,
            name: e.name,
            symbol: e.symbol,
            token_lock_nonce: e.tokenLockNonce,
        })
    }

    fn encode_payload(&self) -> Vec<u8> {
        TNT721TokenLocked {
            targetChainID: self.target_chain_id.as_u256(),
            denom: self.denom.clone(),
            sourceChainTokenSender: self.source_chain_token_sender,
            targetChainVoucherReceiver: self.target_chain_voucher_receiver,
            tokenID: self.token_id,
            tokenURI: self.token_uri.clone(),
            name: self.name.clone(),
            symbol: self.symbol.clone(),
            tokenLockNonce: self.token_lock_nonce,
        }
        .encode_data()
    }

    fn denom(&self) -> &str {
        &self.denom
    }

    fn set_denom(&mut self, denom: String) {
        self.denom = denom;
    }
}

pub fn parse_to_cross_chain_tfuel_token_locked_event(
    event: &InterChainMessageEvent,
) -> Result<CrossChainTFuelTokenLockedEvent> {
    parse_sub_event(event)
}

pub fn parse_to_cross_chain_tnt20_token_locked_event(
    event: &InterChainMessageEvent,
) -> Result<CrossChainTNT20TokenLockedEvent> {
    parse_sub_event(event)
}

pub fn parse_to_cross_chain_tnt721_token_locked_event(
    event: &InterChainMessageEvent,
) -> Result<CrossChainTNT721TokenLockedEvent> {
    parse_sub_event(event)
}
