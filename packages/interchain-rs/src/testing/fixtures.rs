//! Canned payloads, envelopes and logs

use alloy::primitives::{Address, Bytes, LogData, U256};
use alloy::rpc::types::Log;

use crate::denom::tfuel_denom;
use crate::events::{
    CrossChainTFuelTokenLockedEvent, CrossChainTFuelVoucherBurnedEvent, EventType,
    InterChainMessageEvent, SubEvent,
};
use crate::types::ChainId;
use crate::witness::sim::{SIM_VALIDATOR, SIM_VALIDATOR_STAKE};
use crate::witness::{Validator, ValidatorSet};

pub const MAINCHAIN_ID: u64 = 366;
pub const SUBCHAIN_ID: u64 = 360777;

pub const ALICE: Address = Address::repeat_byte(0xa1);
pub const BOB: Address = Address::repeat_byte(0xb0);

/// TFuel lock towards the subchain whose denom originates on `origin_chain`
pub fn tfuel_lock_payload(origin_chain: u64, nonce: u64, amount: u64) -> CrossChainTFuelTokenLockedEvent {
    CrossChainTFuelTokenLockedEvent {
        target_chain_id: ChainId::from_u64(SUBCHAIN_ID),
        denom: tfuel_denom(&ChainId::from_u64(origin_chain)),
        source_chain_token_sender: ALICE,
        target_chain_voucher_receiver: BOB,
        locked_amount: U256::from(amount),
        token_lock_nonce: U256::from(nonce),
    }
}

/// Valid TFuel lock envelope witnessed on the mainchain
pub fn tfuel_lock_event(nonce: u64, amount: u64) -> InterChainMessageEvent {
    let payload = tfuel_lock_payload(MAINCHAIN_ID, nonce, amount);
    InterChainMessageEvent::new(
        EventType::TFuelTokenLock,
        ChainId::from_u64(MAINCHAIN_ID),
        ChainId::from_u64(SUBCHAIN_ID),
        ALICE,
        BOB,
        payload.encode_payload(),
        U256::from(nonce),
        100 + nonce,
    )
}

/// Burn on the mainchain of vouchers for the subchain's native coin
pub fn tfuel_voucher_burn_payload(nonce: u64, amount: u64) -> CrossChainTFuelVoucherBurnedEvent {
    CrossChainTFuelVoucherBurnedEvent {
        target_chain_id: ChainId::from_u64(SUBCHAIN_ID),
        denom: tfuel_denom(&ChainId::from_u64(SUBCHAIN_ID)),
        source_chain_voucher_owner: BOB,
        target_chain_token_receiver: ALICE,
        burned_amount: U256::from(amount),
        voucher_burn_nonce: U256::from(nonce),
    }
}

pub fn tfuel_voucher_burn_event(nonce: u64, amount: u64) -> InterChainMessageEvent {
    let payload = tfuel_voucher_burn_payload(nonce, amount);
    InterChainMessageEvent::new(
        EventType::TFuelVoucherBurn,
        ChainId::from_u64(MAINCHAIN_ID),
        ChainId::from_u64(SUBCHAIN_ID),
        BOB,
        ALICE,
        payload.encode_payload(),
        U256::from(nonce),
        100 + nonce,
    )
}

/// RPC log as a token bank would emit it for `event_type`
pub fn log_for(
    event_type: EventType,
    contract: Address,
    data: Vec<u8>,
    block_number: u64,
    log_index: u64,
) -> Log {
    let topics = event_type.topic().into_iter().collect();
    Log {
        inner: alloy::primitives::Log {
            address: contract,
            data: LogData::new_unchecked(topics, Bytes::from(data)),
        },
        block_number: Some(block_number),
        log_index: Some(log_index),
        ..Default::default()
    }
}

pub fn single_validator_set(dynasty: u64) -> ValidatorSet {
    ValidatorSet::new(
        dynasty,
        vec![Validator {
            address: SIM_VALIDATOR,
            stake: U256::from(SIM_VALIDATOR_STAKE),
        }],
    )
}
