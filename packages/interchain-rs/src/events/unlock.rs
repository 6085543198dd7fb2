//! Token unlock sub-events
//!
//! Unlocks release authentic tokens after a voucher burn elsewhere. The denom
//! must originate from the envelope's target chain: a token can only be
//! unlocked on the chain where it was locked.

use alloy::primitives::{Address, U256};
use alloy::sol_types::SolEvent;

use super::contracts::{TFuelTokenUnlocked, TNT20TokenUnlocked, TNT721TokenUnlocked};
use super::{
    decode_event_data, parse_sub_event, EventType, InterChainMessageEvent, OriginSide, SubEvent,
};
use crate::error::Result;
use crate::types::ChainId;

/// Payload of a `TFuelTokenUnlocked` log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrossChainTFuelTokenUnlockedEvent {
    /// Chain on which the voucher burn happened
    pub source_chain_id: ChainId,
    pub denom: String,
    pub target_chain_token_receiver: Address,
    pub unlocked_amount: U256,
    pub source_chain_voucher_burn_nonce: U256,
    pub token_unlock_nonce: U256,
}

impl SubEvent for CrossChainTFuelTokenUnlockedEvent {
    const EVENT_TYPE: EventType = EventType::TFuelTokenUnlock;
    const ORIGIN_SIDE: OriginSide = OriginSide::Target;

    fn decode_payload(data: &[u8]) -> Result<Self> {
        let e: TFuelTokenUnlocked = decode_event_data(Self::EVENT_TYPE, data)?;
        Ok(Self {
            source_chain_id: e.sourceChainID.into(),
            denom: e.denom,
            target_chain_token_receiver: e.targetChainTokenReceiver,
            unlocked_amount: e.unlockedAmount,
            source_chain_voucher_burn_nonce: e.sourceChainVoucherBurnNonce,
            token_unlock_nonce: e.tokenUnlockNonce,
        })
    }

    fn encode_payload(&self) -> Vec<u8> {
        TFuelTokenUnlocked {
            sourceChainID: self.source_chain_id.as_u256(),
            denom: self.denom.clone(),
            targetChainTokenReceiver: self.target_chain_token_receiver,
            unlockedAmount: self.unlocked_amount,
            sourceChainVoucherBurnNonce: self.source_chain_voucher_burn_nonce,
            tokenUnlockNonce: self.token_unlock_nonce,
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

/// Payload of a `TNT20TokenUnlocked` log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrossChainTNT20TokenUnlockedEvent {
    pub source_chain_id: ChainId,
    pub denom: String,
    pub target_chain_token_receiver: Address,
    pub unlocked_amount: U256,
    pub source_chain_voucher_burn_nonce: U256,
    pub token_unlock_nonce: U256,
}

impl SubEvent for CrossChainTNT20TokenUnlockedEvent {
    const EVENT_TYPE: EventType = EventType::Tnt20TokenUnlock;
    const ORIGIN_SIDE: OriginSide = OriginSide::Target;

    fn decode_payload(data: &[u8]) -> Result<Self> {
        let e: TNT20TokenUnlocked = decode_event_data(Self::EVENT_TYPE, data)?;
        Ok(Self {
            source_chain_id: e.sourceChainID.into(),
            denom: e.denom,
            target_chain_token_receiver: e.targetChainTokenReceiver,
            unlocked_amount: e.unlockedAmount,
            source_chain_voucher_burn_nonce: e.sourceChainVoucherBurnNonce,
            token_unlock_nonce: e.tokenUnlockNonce,
        })
    }

    fn encode_payload(&self) -> Vec<u8> {
        TNT20TokenUnlocked {
            sourceChainID: self.source_chain_id.as_u256(),
            denom: self.denom.clone(),
            targetChainTokenReceiver: self.target_chain_token_receiver,
            unlockedAmount: self.unlocked_amount,
            sourceChainVoucherBurnNonce: self.source_chain_voucher_burn_nonce,
            tokenUnlockNonce: self.token_unlock_nonce,
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

/// Payload of a `TNT721TokenUnlocked` log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrossChainTNT721TokenUnlockedEvent {
    pub source_chain_id: ChainId,
    pub denom: String,
    pub target_chain_token_receiver: Address,
    pub token_id: U256,
    pub source_chain_voucher_burn_nonce: U256,
    pub token_unlock_nonce: U256,
}

impl SubEvent for CrossChainTNT721TokenUnlockedEvent {
    const EVENT_TYPE: EventType = EventType::Tnt721TokenUnlock;
    const ORIGIN_SIDE: OriginSide = OriginSide::Target;

    fn decode_payload(data: &[u8]) -> Result<Self> {
        let e: TNT721TokenUnlocked = decode_event_data(Self::EVENT_TYPE, data)?;
        Ok(Self {
            source_chain_id: e.sourceChainID.into(),
            denom: e.denom,
            target_chain_token_receiver: e.targetChainTokenReceiver,
            token_id: e.tokenID,
            source_chain_voucher_burn_nonce: e.sourceChainVoucherBurnNonce,
            token_unlock_nonce: e.tokenUnlockNonce,
        })
    }

    fn encode_payload(&self) -> Vec<u8> {
        TNT721TokenUnlocked {
            sourceChainID: self.source_chain_id.as_u256(),
            denom: self.denom.clone(),
            targetChainTokenReceiver: self.target_chain_token_receiver,
            tokenID: self.token_id,
            sourceChainVoucherBurnNonce: self.source_chain_voucher_burn_nonce,
            tokenUnlockNonce: self.token_unlock_nonce,
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

pub fn parse_to_cross_chain_tfuel_token_unlocked_event(
    event: &InterChainMessageEvent,
) -> Result<CrossChainTFuelTokenUnlockedEvent> {
    parse_sub_event(event)
}

pub fn parse_to_cross_chain_tnt20_token_unlocked_event(
    event: &InterChainMessageEvent,
) -> Result<CrossChainTNT20TokenUnlockedEvent> {
    parse_sub_event(event)
}

pub fn parse_to_cross_chain_tnt721_token_unlocked_event(
    event: &InterChainMessageEvent,
) -> Result<CrossChainTNT721TokenUnlockedEvent> {
    parse_sub_event(event)
}
