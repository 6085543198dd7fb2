//! Inter-chain message events
//!
//! `InterChainMessageEvent` is the envelope every witnessed cross-chain action
//! travels in. Its `data` field holds a type-specific payload which the
//! `parse_to_*` functions decode into typed sub-events, validating the embedded
//! denom against the envelope's chain IDs along the way.
//!
//! | Family       | Marker | TFuel | TNT20 | TNT721 | Payload encoding |
//! |--------------|--------|-------|-------|--------|------------------|
//! | Transfer     |        | 1     | 2     | 3      | RLP              |
//! | Token lock   | 10000  | 10001 | 10002 | 10003  | ABI event data   |
//! | Voucher burn | 20000  | 20001 | 20002 | 20003  | ABI event data   |
//! | Token unlock | 40000  | 40001 | 40002 | 40003  | ABI event data   |

pub mod burn;
pub mod contracts;
pub mod lock;
pub mod transfer;
pub mod unlock;

use alloy::primitives::{Address, Bytes, LogData, B256, U256};
use alloy::sol_types::SolEvent;
use alloy_rlp::{BufMut, Decodable, Encodable, Header, RlpEncodable};
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::denom::{extract_origin_chain_id, normalize_denom, validate_denom};
use crate::error::{Error, Result};
use crate::hash::event_selector;
use crate::types::ChainId;

pub use burn::{
    parse_to_cross_chain_tfuel_voucher_burned_event,
    parse_to_cross_chain_tnt20_voucher_burned_event,
    parse_to_cross_chain_tnt721_voucher_burned_event, CrossChainTFuelVoucherBurnedEvent,
    CrossChainTNT20VoucherBurnedEvent, CrossChainTNT721VoucherBurnedEvent,
};
pub use lock::{
    parse_to_cross_chain_tfuel_token_locked_event, parse_to_cross_chain_tnt20_token_locked_event,
    parse_to_cross_chain_tnt721_token_locked_event, CrossChainTFuelTokenLockedEvent,
    CrossChainTNT20TokenLockedEvent, CrossChainTNT721TokenLockedEvent,
};
pub use transfer::{
    parse_to_cross_chain_tfuel_transfer_event, parse_to_cross_chain_tnt20_transfer_event,
    parse_to_cross_chain_tnt721_transfer_event, CrossChainTFuelTransferEvent,
    CrossChainTNT20TransferEvent, CrossChainTNT721TransferEvent,
};
pub use unlock::{
    parse_to_cross_chain_tfuel_token_unlocked_event,
    parse_to_cross_chain_tnt20_token_unlocked_event,
    parse_to_cross_chain_tnt721_token_unlocked_event, CrossChainTFuelTokenUnlockedEvent,
    CrossChainTNT20TokenUnlockedEvent, CrossChainTNT721TokenUnlockedEvent,
};

// ============================================================================
// Event Type
// ============================================================================

/// Kind of a witnessed cross-chain action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventType {
    Unknown,

    TFuelTransfer,
    Tnt20Transfer,
    Tnt721Transfer,

    TokenLock,
    TFuelTokenLock,
    Tnt20TokenLock,
    Tnt721TokenLock,

    VoucherBurn,
    TFuelVoucherBurn,
    Tnt20VoucherBurn,
    Tnt721VoucherBurn,

    TokenUnlock,
    TFuelTokenUnlock,
    Tnt20TokenUnlock,
    Tnt721TokenUnlock,
}

impl EventType {
    pub const ALL: [EventType; 16] = [
        EventType::Unknown,
        EventType::TFuelTransfer,
        EventType::Tnt20Transfer,
        EventType::Tnt721Transfer,
        EventType::TokenLock,
        EventType::TFuelTokenLock,
        EventType::Tnt20TokenLock,
        EventType::Tnt721TokenLock,
        EventType::VoucherBurn,
        EventType::TFuelVoucherBurn,
        EventType::Tnt20VoucherBurn,
        EventType::Tnt721VoucherBurn,
        EventType::TokenUnlock,
        EventType::TFuelTokenUnlock,
        EventType::Tnt20TokenUnlock,
        EventType::Tnt721TokenUnlock,
    ];

    pub const fn code(&self) -> u64 {
        match self {
            EventType::Unknown => 0,
            EventType::TFuelTransfer => 1,
            EventType::Tnt20Transfer => 2,
            EventType::Tnt721Transfer => 3,
            EventType::TokenLock => 10000,
            EventType::TFuelTokenLock => 10001,
            EventType::Tnt20TokenLock => 10002,
            EventType::Tnt721TokenLock => 10003,
            EventType::VoucherBurn => 20000,
            EventType::TFuelVoucherBurn => 20001,
            EventType::Tnt20VoucherBurn => 20002,
            EventType::Tnt721VoucherBurn => 20003,
            EventType::TokenUnlock => 40000,
            EventType::TFuelTokenUnlock => 40001,
            EventType::Tnt20TokenUnlock => 40002,
            EventType::Tnt721TokenUnlock => 40003,
        }
    }

    pub fn from_code(code: u64) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.code() == code)
    }

    pub fn is_token_lock(&self) -> bool {
        matches!(
            self,
            EventType::TFuelTokenLock | EventType::Tnt20TokenLock | EventType::Tnt721TokenLock
        )
    }

    pub fn is_voucher_burn(&self) -> bool {
        matches!(
            self,
            EventType::TFuelVoucherBurn | EventType::Tnt20VoucherBurn | EventType::Tnt721VoucherBurn
        )
    }

    /// Canonical event signature of the token-bank log carrying this type
    pub fn signature(&self) -> Option<&'static str> {
        match self {
            EventType::TFuelTokenLock => Some(
                "TFuelTokenLocked(uint256,string,address,address,uint256,uint256)",
            ),
            EventType::Tnt20TokenLock => Some(
                "TNT20TokenLocked(uint256,string,address,address,uint256,string,string,uint8,uint256)",
            ),
            EventType::Tnt721TokenLock => Some(
                "TNT721TokenLocked(uint256,string,address,address,uint256,string,string,string,uint256)",
            ),
            EventType::TFuelVoucherBurn => Some(
                "TFuelVoucherBurned(uint256,string,address,address,uint256,uint256)",
            ),
            EventType::Tnt20VoucherBurn => Some(
                "TNT20VoucherBurned(uint256,string,address,address,uint256,uint256)",
            ),
            EventType::Tnt721VoucherBurn => Some(
                "TNT721VoucherBurned(uint256,string,address,address,uint256,uint256)",
            ),
            EventType::TFuelTokenUnlock => Some(
                "TFuelTokenUnlocked(uint256,string,address,uint256,uint256,uint256)",
            ),
            EventType::Tnt20TokenUnlock => Some(
                "TNT20TokenUnlocked(uint256,string,address,uint256,uint256,uint256)",
            ),
            EventType::Tnt721TokenUnlock => Some(
                "TNT721TokenUnlocked(uint256,string,address,uint256,uint256,uint256)",
            ),
            _ => None,
        }
    }

    /// Topic-0 selector for this type's log, if it is emitted as one
    pub fn topic(&self) -> Option<B256> {
        TOPICS.get(self).copied()
    }
}

lazy_static! {
    static ref TOPICS: HashMap<EventType, B256> = EventType::ALL
        .iter()
        .filter_map(|t| t.signature().map(|sig| (*t, event_selector(sig))))
        .collect();
}

impl TryFrom<u64> for EventType {
    type Error = Error;

    fn try_from(code: u64) -> Result<Self> {
        EventType::from_code(code).ok_or(Error::UnknownEventType(code))
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EventType::Unknown => "Unknown",
            EventType::TFuelTransfer => "TFuelTransfer",
            EventType::Tnt20Transfer => "TNT20Transfer",
            EventType::Tnt721Transfer => "TNT721Transfer",
            EventType::TokenLock => "TokenLock",
            EventType::TFuelTokenLock => "TFuelTokenLock",
            EventType::Tnt20TokenLock => "TNT20TokenLock",
            EventType::Tnt721TokenLock => "TNT721TokenLock",
            EventType::VoucherBurn => "VoucherBurn",
            EventType::TFuelVoucherBurn => "TFuelVoucherBurn",
            EventType::Tnt20VoucherBurn => "TNT20VoucherBurn",
            EventType::Tnt721VoucherBurn => "TNT721VoucherBurn",
            EventType::TokenUnlock => "TokenUnlock",
            EventType::TFuelTokenUnlock => "TFuelTokenUnlock",
            EventType::Tnt20TokenUnlock => "TNT20TokenUnlock",
            EventType::Tnt721TokenUnlock => "TNT721TokenUnlock",
        };
        write!(f, "{}({})", name, self.code())
    }
}

impl Encodable for EventType {
    fn encode(&self, out: &mut dyn BufMut) {
        self.code().encode(out)
    }

    fn length(&self) -> usize {
        self.code().length()
    }
}

impl Decodable for EventType {
    fn decode(buf: &mut &[u8]) -> alloy_rlp::Result<Self> {
        let code = u64::decode(buf)?;
        EventType::from_code(code).ok_or(alloy_rlp::Error::Custom(
            "unknown inter-chain message event type",
        ))
    }
}

// ============================================================================
// Envelope
// ============================================================================

/// Canonical envelope for any witnessed cross-chain action.
///
/// Persisted as an RLP list with the fields in declaration order. Changing
/// the order breaks every record already on disk.
#[derive(Debug, Clone, PartialEq, Eq, RlpEncodable)]
pub struct InterChainMessageEvent {
    pub event_type: EventType,
    pub source_chain_id: ChainId,
    pub target_chain_id: ChainId,
    /// Sender of the message on the source chain
    pub sender: Address,
    /// Receiver of the message on the target chain
    pub receiver: Address,
    pub data: Bytes,
    pub nonce: U256,
    pub block_height: u64,
}

impl InterChainMessageEvent {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        event_type: EventType,
        source_chain_id: ChainId,
        target_chain_id: ChainId,
        sender: Address,
        receiver: Address,
        data: impl Into<Bytes>,
        nonce: U256,
        block_height: u64,
    ) -> Self {
        Self {
            event_type,
            source_chain_id,
            target_chain_id,
            sender,
            receiver,
            data: data.into(),
            nonce,
            block_height,
        }
    }

    /// Dedup key. Nonces are unique per type, not per source chain.
    pub fn identity(&self) -> (EventType, U256) {
        (self.event_type, self.nonce)
    }

    /// Human readable identity, `<type code>/<nonce>`
    pub fn id(&self) -> String {
        format!("{}/{}", self.event_type.code(), self.nonce)
    }

    pub fn encode_rlp(&self) -> Vec<u8> {
        alloy_rlp::encode(self)
    }

    /// Decode a stored envelope. The input must hold exactly one RLP list.
    pub fn decode_rlp(bytes: &[u8]) -> Result<Self> {
        let buf = &mut &bytes[..];
        let header = Header::decode(buf)?;
        if !header.list {
            return Err(alloy_rlp::Error::UnexpectedString.into());
        }
        if buf.len() < header.payload_length {
            return Err(alloy_rlp::Error::InputTooShort.into());
        }
        if buf.len() > header.payload_length {
            return Err(alloy_rlp::Error::Custom("trailing bytes after envelope").into());
        }

        let event_type = EventType::try_from(u64::decode(buf)?)?;
        let event = Self {
            event_type,
            source_chain_id: ChainId::decode(buf)?,
            target_chain_id: ChainId::decode(buf)?,
            sender: Address::decode(buf)?,
            receiver: Address::decode(buf)?,
            data: Bytes::decode(buf)?,
            nonce: U256::decode(buf)?,
            block_height: u64::decode(buf)?,
        };

        if !buf.is_empty() {
            return Err(alloy_rlp::Error::Custom("unexpected fields after envelope").into());
        }
        Ok(event)
    }
}

impl fmt::Display for InterChainMessageEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "InterChainMessageEvent{{type: {}, source: {}, target: {}, sender: {}, receiver: {}, nonce: {}, height: {}, data: 0x{}}}",
            self.event_type,
            self.source_chain_id,
            self.target_chain_id,
            self.sender,
            self.receiver,
            self.nonce,
            self.block_height,
            hex::encode(&self.data),
        )
    }
}

/// Sort events by ascending nonce
pub fn sort_by_nonce(events: &mut [InterChainMessageEvent]) {
    events.sort_by(|a, b| a.nonce.cmp(&b.nonce));
}

// ============================================================================
// Sub-event parsing
// ============================================================================

/// Which envelope chain ID a sub-event's denom must originate from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OriginSide {
    /// Lock and transfer: the token leaves the chain it was issued on
    Source,
    /// Unlock and voucher burn: the token returns to the chain it was issued on
    Target,
}

/// A typed projection of `InterChainMessageEvent::data`
pub trait SubEvent: Sized {
    const EVENT_TYPE: EventType;
    const ORIGIN_SIDE: OriginSide;

    fn decode_payload(data: &[u8]) -> Result<Self>;
    fn encode_payload(&self) -> Vec<u8>;
    fn denom(&self) -> &str;
    fn set_denom(&mut self, denom: String);
}

/// Type check, decode, denom validation and origin cross-check
pub fn parse_sub_event<E: SubEvent>(envelope: &InterChainMessageEvent) -> Result<E> {
    if envelope.event_type != E::EVENT_TYPE {
        return Err(Error::WrongEventType {
            expected: E::EVENT_TYPE,
            actual: envelope.event_type,
        });
    }

    let mut event = E::decode_payload(&envelope.data)?;

    let denom = normalize_denom(event.denom());
    validate_denom(&denom)?;
    let origin = extract_origin_chain_id(&denom)?;
    let expected = match E::ORIGIN_SIDE {
        OriginSide::Source => envelope.source_chain_id,
        OriginSide::Target => envelope.target_chain_id,
    };
    if origin != expected {
        return Err(Error::ChainIdMismatch {
            event_type: E::EVENT_TYPE,
            expected,
            origin,
        });
    }

    event.set_denom(denom);
    Ok(event)
}

/// Decode non-indexed ABI event data into a `sol!` event
pub(crate) fn decode_event_data<E: SolEvent>(event_type: EventType, data: &[u8]) -> Result<E> {
    let log = LogData::new_unchecked(vec![E::SIGNATURE_HASH], Bytes::copy_from_slice(data));
    E::decode_log_data(&log, true).map_err(|e| Error::payload(event_type, e))
}

/// Any sub-event, tagged by type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedEvent {
    TFuelTransfer(CrossChainTFuelTransferEvent),
    Tnt20Transfer(CrossChainTNT20TransferEvent),
    Tnt721Transfer(CrossChainTNT721TransferEvent),
    TFuelTokenLock(CrossChainTFuelTokenLockedEvent),
    Tnt20TokenLock(CrossChainTNT20TokenLockedEvent),
    Tnt721TokenLock(CrossChainTNT721TokenLockedEvent),
    TFuelVoucherBurn(CrossChainTFuelVoucherBurnedEvent),
    Tnt20VoucherBurn(CrossChainTNT20VoucherBurnedEvent),
    Tnt721VoucherBurn(CrossChainTNT721VoucherBurnedEvent),
    TFuelTokenUnlock(CrossChainTFuelTokenUnlockedEvent),
    Tnt20TokenUnlock(CrossChainTNT20TokenUnlockedEvent),
    Tnt721TokenUnlock(CrossChainTNT721TokenUnlockedEvent),
}

impl ParsedEvent {
    /// Dispatch to the parser for the envelope's type.
    ///
    /// Family markers and `Unknown` carry no payload layout and are rejected
    /// with `WrongEventType`.
    pub fn parse(envelope: &InterChainMessageEvent) -> Result<Self> {
        let parsed = match envelope.event_type {
            EventType::TFuelTransfer => {
                ParsedEvent::TFuelTransfer(parse_to_cross_chain_tfuel_transfer_event(envelope)?)
            }
            EventType::Tnt20Transfer => {
                ParsedEvent::Tnt20Transfer(parse_to_cross_chain_tnt20_transfer_event(envelope)?)
            }
            EventType::Tnt721Transfer => {
                ParsedEvent::Tnt721Transfer(parse_to_cross_chain_tnt721_transfer_event(envelope)?)
            }
            EventType::TFuelTokenLock => ParsedEvent::TFuelTokenLock(
                parse_to_cross_chain_tfuel_token_locked_event(envelope)?,
            ),
            EventType::Tnt20TokenLock => ParsedEvent::Tnt20TokenLock(
                parse_to_cross_chain_tnt20_token_locked_event(envelope)?,
            ),
            EventType::Tnt721TokenLock => ParsedEvent::Tnt721TokenLock(
                parse_to_cross_chain_tnt721_token_locked_event(envelope)?,
            ),
            EventType::TFuelVoucherBurn => ParsedEvent::TFuelVoucherBurn(
                parse_to_cross_chain_tfuel_voucher_burned_event(envelope)?,
            ),
            EventType::Tnt20VoucherBurn => ParsedEvent::Tnt20VoucherBurn(
                parse_to_cross_chain_tnt20_voucher_burned_event(envelope)?,
            ),
            EventType::Tnt721VoucherBurn => ParsedEvent::Tnt721VoucherBurn(
                parse_to_cross_chain_tnt721_voucher_burned_event(envelope)?,
            ),
            EventType::TFuelTokenUnlock => ParsedEvent::TFuelTokenUnlock(
                parse_to_cross_chain_tfuel_token_unlocked_event(envelope)?,
            ),
            EventType::Tnt20TokenUnlock => ParsedEvent::Tnt20TokenUnlock(
                parse_to_cross_chain_tnt20_token_unlocked_event(envelope)?,
            ),
            EventType::Tnt721TokenUnlock => ParsedEvent::Tnt721TokenUnlock(
                parse_to_cross_chain_tnt721_token_unlocked_event(envelope)?,
            ),
            EventType::Unknown
            | EventType::TokenLock
            | EventType::VoucherBurn
            | EventType::TokenUnlock => {
                return Err(Error::WrongEventType {
                    expected: EventType::Unknown,
                    actual: envelope.event_type,
                })
            }
        };
        Ok(parsed)
    }

    pub fn denom(&self) -> &str {
        match self {
            ParsedEvent::TFuelTransfer(e) => e.denom(),
            ParsedEvent::Tnt20Transfer(e) => e.denom(),
            ParsedEvent::Tnt721Transfer(e) => e.denom(),
            ParsedEvent::TFuelTokenLock(e) => e.denom(),
            ParsedEvent::Tnt20TokenLock(e) => e.denom(),
            ParsedEvent::Tnt721TokenLock(e) => e.denom(),
            ParsedEvent::TFuelVoucherBurn(e) => e.denom(),
            ParsedEvent::Tnt20VoucherBurn(e) => e.denom(),
            ParsedEvent::Tnt721VoucherBurn(e) => e.denom(),
            ParsedEvent::TFuelTokenUnlock(e) => e.denom(),
            ParsedEvent::Tnt20TokenUnlock(e) => e.denom(),
            ParsedEvent::Tnt721TokenUnlock(e) => e.denom(),
        }
    }
}
