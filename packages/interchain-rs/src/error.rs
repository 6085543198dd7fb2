//! Error taxonomy for parsing, validating and storing inter-chain events.

use thiserror::Error;

use crate::events::EventType;
use crate::store::StoreError;
use crate::types::ChainId;
use crate::voucher_burn::VoucherBurnStatus;

/// Result alias used across the library
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    /// Denom does not follow `<chainID>/<tokenType>/<address>` or is not lower case
    #[error("invalid denom {denom:?}: {reason}")]
    MalformedDenom { denom: String, reason: &'static str },

    /// Token-type segment is numeric but not one of 0, 20, 721
    #[error("invalid denom {0:?}: unknown token type")]
    UnknownTokenType(String),

    /// Raw type code has no corresponding `EventType`
    #[error("unknown inter-chain message event type: {0}")]
    UnknownEventType(u64),

    #[error("invalid inter-chain message event type: expected {expected}, got {actual}")]
    WrongEventType {
        expected: EventType,
        actual: EventType,
    },

    #[error("failed to decode {event_type} payload: {reason}")]
    PayloadDecode {
        event_type: EventType,
        reason: String,
    },

    /// Denom origin does not match the chain the event claims to settle on
    #[error("chain ID mismatch for {event_type}: event expects {expected}, denom originates from {origin}")]
    ChainIdMismatch {
        event_type: EventType,
        expected: ChainId,
        origin: ChainId,
    },

    /// Stored envelope or status record is not valid RLP
    #[error("RLP decoding failed: {0}")]
    Rlp(#[from] alloy_rlp::Error),

    #[error("{0} not found")]
    NotFound(String),

    #[error(transparent)]
    Storage(#[from] StoreError),

    #[error("{0} has already been processed")]
    AlreadyProcessed(String),

    #[error("invalid voucher burn status transition for {id}: {from} -> {to}")]
    InvalidStatusTransition {
        id: String,
        from: VoucherBurnStatus,
        to: VoucherBurnStatus,
    },
}

impl Error {
    pub(crate) fn payload(event_type: EventType, reason: impl ToString) -> Self {
        Error::PayloadDecode {
            event_type,
            reason: reason.to_string(),
        }
    }

    /// True for rejections of a well-formed payload (bad denom, spoofed chain).
    ///
    /// The witness skips these logs instead of aborting its cycle.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::MalformedDenom { .. } | Error::UnknownTokenType(_) | Error::ChainIdMismatch { .. }
        )
    }
}
