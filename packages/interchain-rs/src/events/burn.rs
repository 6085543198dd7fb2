//! Voucher burn sub-events
//!
//! Burning a voucher authorizes an unlock on the token's origin chain, which
//! must be the envelope's target chain.

use alloy::primitives::{Address, U256};
use alloy::sol_types::SolEvent;

use super::contracts::{TFuelVoucherBurned, TNT20VoucherBurned, TNT721VoucherBurned};
use super::{
    decode_event_data, parse_sub_event, EventType, InterChainMessageEvent, OriginSide, SubEvent,
};
use crate::error::Result;
use crate::types::ChainId;

/// Payload of a `TFuelVoucherBurned` log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrossChainTFuelVoucherBurnedEvent {
    /// Chain on which the authentic token will be unlocked
    pub target_chain_id: ChainId,
    pub denom: String,
    pub source_chain_voucher_owner: Address,
    pub target_chain_token_receiver: Address,
    pub burned_amount: U256,
    pub voucher_burn_nonce: U256,
}

impl SubEvent for CrossChainTFuelVoucherBurnedEvent {
    const EVENT_TYPE: EventType = EventType::TFuelVoucherBurn;
    const ORIGIN_SIDE: OriginSide = OriginSide::Target;

    fn decode_payload(data: &[u8]) -> Result<Self> {
        let e: TFuelVoucherBurned = decode_event_data(Self::EVENT_TYPE, data)?;
        Ok(Self {
            target_chain_id: e.targetChainID.into(),
            denom: e.denom,
            source_chain_voucher_owner: e.sourceChainVoucherOwner,
            target_chain_token_receiver: e.targetChainTokenReceiver,
            burned_amount: e.burnedAmount,
            voucher_burn_nonce: e.voucherBurnNonce,
        })
    }

    fn encode_payload(&self) -> Vec<u8> {
        TFuelVoucherBurned {
            targetChainID: self.target_chain_id.as_u256(),
            denom: self.denom.clone(),
            sourceChainVoucherOwner: self.source_chain_voucher_owner,
            targetChainTokenReceiver: self.target_chain_token_receiver,
            burnedAmount: self.burned_amount,
            voucherBurnNonce: self.voucher_burn_nonce,
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

/// Payload of a `TNT20VoucherBurned` log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrossChainTNT20VoucherBurnedEvent {
    pub target_chain_id: ChainId,
    pub denom: String,
    pub source_chain_voucher_owner: Address,
    pub target_chain_token_receiver: Address,
    pub burned_amount: U256,
    pub voucher_burn_nonce: U256,
}

impl SubEvent for CrossChainTNT20VoucherBurnedEvent {
    const EVENT_TYPE: EventType = EventType::Tnt20VoucherBurn;
    const ORIGIN_SIDE: OriginSide = OriginSide::Target;

    fn decode_payload(data: &[u8]) -> Result<Self> {
        let e: TNT20VoucherBurned = decode_event_data(Self::EVENT_TYPE, data)?;
        Ok(Self {
            target_chain_id: e.targetChainID.into(),
            denom: e.denom,
            source_chain_voucher_owner: e.sourceChainVoucherOwner,
            target_chain_token_receiver: e.targetChainTokenReceiver,
            burned_amount: e.burnedAmount,
            voucher_burn_nonce: e.voucherBurnNonce,
        })
    }

    fn encode_payload(&self) -> Vec<u8> {
        TNT20VoucherBurned {
            targetChainID: self.target_chain_id.as_u256(),
            denom: self.denom.clone(),
            sourceChainVoucherOwner: self.source_chain_voucher_owner,
            targetChainTokenReceiver: self.target_chain_token_receiver,
            burnedAmount: self.burned_amount,
            voucherBurnNonce: self.voucher_burn_nonce,
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

/// Payload of a `TNT721VoucherBurned` log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrossChainTNT721VoucherBurnedEvent {
    pub target_chain_id: ChainId,
    pub denom: String,
    pub source_chain_voucher_owner: Address,
    pub target_chain_token_receiver: Address,
    pub token_id: U256,
    pub voucher_burn_nonce: U256,
}

impl SubEvent for CrossChainTNT721VoucherBurnedEvent {
    const EVENT_TYPE: EventType = EventType::Tnt721VoucherBurn;
    const ORIGIN_SIDE: OriginSide = OriginSide::Target;

    fn decode_payload(data: &[u8]) -> Result<Self> {
        let e: TNT721VoucherBurned = decode_event_data(Self::EVENT_TYPE, data)?;
        Ok(Self {
            target_chain_id: e.targetChainID.into(),
            denom: e.denom,
            source_chain_voucher_owner: e.sourceChainVoucherOwner,
            target_chain_token_receiver: e.targetChainTokenReceiver,
            token_id: e.tokenID,
            voucher_burn_nonce: e.voucherBurnNonce,
        })
    }

    fn encode_payload(&self) -> Vec<u8> {
        TNT721VoucherBurned {
            targetChainID: self.target_chain_id.as_u256(),
            denom: self.denom.clone(),
            sourceChainVoucherOwner: self.source_chain_voucher_owner,
            targetChainTokenReceiver: self.target_chain_token_receiver,
            tokenID: self.token_id,
            voucherBurnNonce: self.voucher_burn_nonce,
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

pub fn parse_to_cross_chain_tfuel_voucher_burned_event(
    event: &InterChainMessageEvent,
) -> Result<CrossChainTFuelVoucherBurnedEvent> {
    parse_sub_event(event)
}

pub fn parse_to_cross_chain_tnt20_voucher_burned_event(
    event: &InterChainMessageEvent,
) -> Result<CrossChainTNT20VoucherBurnedEvent> {
    parse_sub_event(event)
}

pub fn parse_to_cross_chain_tnt721_voucher_burned_event(
    event: &InterChainMessageEvent,
) -> Result<CrossChainTNT721VoucherBurnedEvent> {
    parse_sub_event(event)
}
