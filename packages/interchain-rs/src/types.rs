//! Common types for inter-chain events
//!
//! Chain identifiers and token types shared by the denom codec, the event
//! envelope and the witness.

use alloy::primitives::U256;
use alloy_rlp::{BufMut, Decodable, Encodable};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Chain ID
// ============================================================================

/// Numeric chain identifier.
///
/// Stored and compared as a 256-bit unsigned integer. The string interchange
/// format is the plain decimal rendering (no sign, no `0x`), which is also what
/// appears as the first segment of a denom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ChainId(pub U256);

impl ChainId {
    pub const fn new(id: U256) -> Self {
        ChainId(id)
    }

    pub fn from_u64(id: u64) -> Self {
        ChainId(U256::from(id))
    }

    pub fn as_u256(&self) -> U256 {
        self.0
    }

    /// Parse the decimal interchange format
    pub fn from_decimal(s: &str) -> Option<Self> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        U256::from_str_radix(s, 10).ok().map(ChainId)
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error returned when a chain ID string is not a decimal integer
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid chain ID {0:?}: expected a decimal integer")]
pub struct ParseChainIdError(pub String);

impl FromStr for ChainId {
    type Err = ParseChainIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ChainId::from_decimal(s).ok_or_else(|| ParseChainIdError(s.to_string()))
    }
}

impl From<u64> for ChainId {
    fn from(id: u64) -> Self {
        ChainId::from_u64(id)
    }
}

impl From<U256> for ChainId {
    fn from(id: U256) -> Self {
        ChainId(id)
    }
}

impl Serialize for ChainId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ChainId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl Encodable for ChainId {
    fn encode(&self, out: &mut dyn BufMut) {
        self.0.encode(out)
    }

    fn length(&self) -> usize {
        self.0.length()
    }
}

impl Decodable for ChainId {
    fn decode(buf: &mut &[u8]) -> alloy_rlp::Result<Self> {
        U256::decode(buf).map(ChainId)
    }
}

// ============================================================================
// Token Type
// ============================================================================

/// Cross-chain token standard, identified by its numeric code in a denom
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenType {
    /// Native coin (code 0)
    Tfuel,
    /// Fungible token standard (code 20)
    Tnt20,
    /// Non-fungible token standard (code 721)
    Tnt721,
}

impl TokenType {
    pub const fn code(&self) -> u32 {
        match self {
            TokenType::Tfuel => 0,
            TokenType::Tnt20 => 20,
            TokenType::Tnt721 => 721,
        }
    }

    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            0 => Some(TokenType::Tfuel),
            20 => Some(TokenType::Tnt20),
            721 => Some(TokenType::Tnt721),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TokenType::Tfuel => "tfuel",
            TokenType::Tnt20 => "tnt20",
            TokenType::Tnt721 => "tnt721",
        }
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_id_decimal_interchange() {
        let id: ChainId = "360777".parse().unwrap();
        assert_eq!(id, ChainId::from_u64(360777));
        assert_eq!(id.to_string(), "360777");
    }

    #[test]
    fn test_chain_id_rejects_non_decimal() {
        assert!("".parse::<ChainId>().is_err());
        assert!("0x16".parse::<ChainId>().is_err());
        assert!("-1".parse::<ChainId>().is_err());
        assert!("12a".parse::<ChainId>().is_err());
    }

    #[test]
    fn test_chain_id_serde_as_string() {
        let id = ChainId::from_u64(366);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"366\"");
        let back: ChainId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_token_type_codes() {
        for t in [TokenType::Tfuel, TokenType::Tnt20, TokenType::Tnt721] {
            assert_eq!(TokenType::from_code(t.code()), Some(t));
        }
        assert_eq!(TokenType::from_code(1155), None);
    }
}
