//! Interchain-RS: Cross-Chain Messaging Core for the Subchain Bridge
//!
//! This crate holds the pieces shared by every process that moves tokens
//! between the mainchain and its subchains:
//!
//! - **Denom Codec** - `<origin chain>/<token type>/<contract>` token identity
//! - **Events** - The inter-chain message envelope and its typed payloads
//! - **Event Cache** - Durable per-type event store with polling cursors
//! - **Voucher Burn Tracker** - Processing status of burned vouchers
//! - **Witness** - Mainchain log poller and a simulated mainchain
//!
//! ## Usage
//!
//! ```toml
//! [dependencies]
//! interchain-rs = { path = "../interchain-rs" }
//! ```
//!
//! ## Feature Flags
//!
//! - `testing` - Expose fixtures and an in-memory mainchain client

pub mod cache;
pub mod denom;
pub mod error;
pub mod events;
pub mod hash;
pub mod metrics;
pub mod store;
pub mod types;
pub mod voucher_burn;
pub mod witness;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use cache::InterChainEventCache;
pub use denom::{
    build_denom, extract_origin_chain_id, extract_token_type, is_hex_address, normalize_denom,
    tfuel_denom, tnt20_denom, tnt721_denom, validate_denom, Denom,
};
pub use error::{Error, Result};
pub use events::{EventType, InterChainMessageEvent, ParsedEvent, SubEvent};
pub use hash::{bytes32_to_hex, event_selector, keccak256};
pub use store::{KeyValueStore, MemoryStore, RedbStore, StoreError};
pub use types::{ChainId, TokenType};
pub use voucher_burn::{VoucherBurnEventStatusInfo, VoucherBurnStatus, VoucherBurnTracker};
pub use witness::{
    ChainWitness, EventSubscription, MainchainClient, MainchainWitness, RpcMainchainClient,
    SimulatedMainchainWitness, WitnessConfig, WitnessHandle,
};
