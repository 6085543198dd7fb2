//! Testing Utilities Module
//!
//! Helpers for unit and integration tests of the witness and cache. Enabled
//! for this crate's own tests and, for dependents, with the `testing` feature.
//!
//! ## Submodules
//!
//! - `fixtures` - Canned payloads, envelopes and logs
//! - `mock_client` - In-memory `MainchainClient`

pub mod fixtures;
pub mod mock_client;

pub use mock_client::MockMainchainClient;
