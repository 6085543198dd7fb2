//! Token-bank log to envelope conversion
//!
//! Only the log's data section and block number are consumed. Which side of
//! the envelope the witnessed chain lands on depends on the family:
//!
//! | Family       | source chain      | target chain      | sender       | nonce                |
//! |--------------|-------------------|-------------------|--------------|----------------------|
//! | lock         | witnessed chain   | payload target    | token sender | `tokenLockNonce`     |
//! | voucher burn | witnessed chain   | payload target    | voucher owner| `voucherBurnNonce`   |
//! | unlock       | payload source    | witnessed chain   | zero address | `tokenUnlockNonce`   |

use alloy::primitives::{Address, U256};
use alloy::rpc::types::Log;

use crate::error::{Error, Result};
use crate::events::{
    CrossChainTFuelTokenLockedEvent, CrossChainTFuelTokenUnlockedEvent,
    CrossChainTFuelVoucherBurnedEvent, CrossChainTNT20TokenLockedEvent,
    CrossChainTNT20TokenUnlockedEvent, CrossChainTNT20VoucherBurnedEvent,
    CrossChainTNT721TokenLockedEvent, CrossChainTNT721TokenUnlockedEvent,
    CrossChainTNT721VoucherBurnedEvent, EventType, InterChainMessageEvent, SubEvent,
};
use crate::types::ChainId;

struct Parties {
    source: ChainId,
    target: ChainId,
    sender: Address,
    receiver: Address,
    nonce: U256,
}

/// Build the envelope for a token-bank log of `event_type` seen on
/// `witnessed_chain`.
///
/// Fails with `PayloadDecode` if the data does not match the type's layout.
/// The denom is not validated here; run the result through `ParsedEvent::parse`.
pub fn envelope_from_log(
    event_type: EventType,
    witnessed_chain: &ChainId,
    log: &Log,
) -> Result<InterChainMessageEvent> {
    let block_height = log
        .block_number
        .ok_or_else(|| Error::payload(event_type, "log has no block number"))?;
    let data = log.data().data.as_ref();
    let chain = *witnessed_chain;

    let parties = match event_type {
        EventType::TFuelTokenLock => {
            let e = CrossChainTFuelTokenLockedEvent::decode_payload(data)?;
            Parties {
                source: chain,
                target: e.target_chain_id,
                sender: e.source_chain_token_sender,
                receiver: e.target_chain_voucher_receiver,
                nonce: e.token_lock_nonce,
            }
        }
        EventType::Tnt20TokenLock => {
            let e = CrossChainTNT20TokenLockedEvent::decode_payload(data)?;
            Parties {
                source: chain,
                target: e.target_chain_id,
                sender: e.source_chain_token_sender,
                receiver: e.target_chain_voucher_receiver,
                nonce: e.token_lock_nonce,
            }
        }
        EventType::Tnt721TokenLock => {
            let e = CrossChainTNT721TokenLockedEvent::decode_payload(data)?;
            Parties {
                source: chain,
                target: e.target_chain_id,
                sender: e.source_chain_token_sender,
                receiver: e.target_chain_voucher_receiver,
                nonce: e.token_lock_nonce,
            }
        }
        EventType::TFuelVoucherBurn => {
            let e = CrossChainTFuelVoucherBurnedEvent::decode_payload(data)?;
            Parties {
                source: chain,
                target: e.target_chain_id,
                sender: e.source_chain_voucher_owner,
                receiver: e.target_chain_token_receiver,
                nonce: e.voucher_burn_nonce,
            }
        }
        EventType::Tnt20VoucherBurn => {
            let e = CrossChainTNT20VoucherBurnedEvent::decode_payload(data)?;
            Parties {
                source: chain,
                target: e.target_chain_id,
                sender: e.source_chain_voucher_owner,
                receiver: e.target_chain_token_receiver,
                nonce: e.voucher_burn_nonce,
            }
        }
        EventType::Tnt721VoucherBurn => {
            let e = CrossChainTNT721VoucherBurnedEvent::decode_payload(data)?;
            Parties {
                source: chain,
                target: e.target_chain_id,
                sender: e.source_chain_voucher_owner,
                receiver: e.target_chain_token_receiver,
                nonce: e.voucher_burn_nonce,
            }
        }
        EventType::TFuelTokenUnlock => {
            let e = CrossChainTFuelTokenUnlockedEvent::decode_payload(data)?;
            Parties {
                source: e.source_chain_id,
                target: chain,
                sender: Address::ZERO,
                receiver: e.target_chain_token_receiver,
                nonce: e.token_unlock_nonce,
            }
        }
        EventType::Tnt20TokenUnlock => {
            let e = CrossChainTNT20TokenUnlockedEvent::decode_payload(data)?;
            Parties {
                source: e.source_chain_id,
                target: chain,
                sender: Address::ZERO,
                receiver: e.target_chain_token_receiver,
                nonce: e.token_unlock_nonce,
            }
        }
        EventType::Tnt721TokenUnlock => {
            let e = CrossChainTNT721TokenUnlockedEvent::decode_payload(data)?;
            Parties {
                source: e.source_chain_id,
                target: chain,
                sender: Address::ZERO,
                receiver: e.target_chain_token_receiver,
                nonce: e.token_unlock_nonce,
            }
        }
        EventType::Unknown
        | EventType::TFuelTransfer
        | EventType::Tnt20Transfer
        | EventType::Tnt721Transfer
        | EventType::TokenLock
        | EventType::VoucherBurn
        | EventType::TokenUnlock => {
            return Err(Error::payload(
                event_type,
                "type is not emitted as a token-bank log",
            ))
        }
    };

    Ok(InterChainMessageEvent::new(
        event_type,
        parties.source,
        parties.target,
        parties.sender,
        parties.receiver,
        data.to_vec(),
        parties.nonce,
        block_height,
    ))
}
