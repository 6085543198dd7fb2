//! Denom codec
//!
//! A denom is the canonical identifier of a cross-chain token:
//!
//! ```text
//! <origin chain ID>/<token type code>/<contract address>
//! 360777/0/0x0000000000000000000000000000000000000000   (TFuel)
//! 360777/20/0x4fb87c52bb6d194f78cd4896e3e574028fedbab9  (TNT20)
//! ```
//!
//! Denoms are always stored lower case so that the same token cannot be
//! registered twice under different spellings.

use alloy::primitives::Address;
use std::fmt;

use crate::error::{Error, Result};
use crate::types::{ChainId, TokenType};

/// Contract address component of every TFuel denom
pub const TFUEL_ADDRESS_PLACEHOLDER: &str = "0x0000000000000000000000000000000000000000";

/// Format and lower-case a denom triple
pub fn build_denom(token_type: TokenType, origin_chain_id: &ChainId, contract: &Address) -> String {
    format!("{}/{}/{}", origin_chain_id, token_type.code(), contract).to_lowercase()
}

pub fn tfuel_denom(origin_chain_id: &ChainId) -> String {
    build_denom(TokenType::Tfuel, origin_chain_id, &Address::ZERO)
}

pub fn tnt20_denom(origin_chain_id: &ChainId, contract: &Address) -> String {
    build_denom(TokenType::Tnt20, origin_chain_id, contract)
}

pub fn tnt721_denom(origin_chain_id: &ChainId, contract: &Address) -> String {
    build_denom(TokenType::Tnt721, origin_chain_id, contract)
}

/// Lower-case a denom received from an external producer
pub fn normalize_denom(denom: &str) -> String {
    denom.to_lowercase()
}

/// Check that a denom is lower case, well formed, and that its address
/// component matches the rule for its token type.
pub fn validate_denom(denom: &str) -> Result<()> {
    if denom != denom.to_lowercase() {
        return Err(malformed(denom, "must be lower case"));
    }

    let [_, _, address] = split(denom)?;
    extract_origin_chain_id(denom)?;

    match extract_token_type(denom)? {
        TokenType::Tfuel => {
            if address != TFUEL_ADDRESS_PLACEHOLDER {
                return Err(malformed(denom, "TFuel denom must use the zero address"));
            }
        }
        TokenType::Tnt20 | TokenType::Tnt721 => {
            if !is_hex_address(address) {
                return Err(malformed(denom, "contract address is not a hex address"));
            }
        }
    }

    Ok(())
}

/// Origin chain ID (first segment) of a denom
pub fn extract_origin_chain_id(denom: &str) -> Result<ChainId> {
    let [chain_id, _, _] = split(denom)?;
    if !is_canonical_decimal(chain_id) {
        return Err(malformed(denom, "origin chain ID is not a canonical decimal integer"));
    }
    ChainId::from_decimal(chain_id)
        .ok_or_else(|| malformed(denom, "origin chain ID is not a decimal integer"))
}

/// Token type (second segment) of a denom
pub fn extract_token_type(denom: &str) -> Result<TokenType> {
    let [_, code, _] = split(denom)?;
    if !is_canonical_decimal(code) {
        return Err(malformed(denom, "failed to parse token type"));
    }
    code.parse::<u32>()
        .ok()
        .and_then(TokenType::from_code)
        .ok_or_else(|| Error::UnknownTokenType(denom.to_string()))
}

/// `0x` followed by exactly 40 hex digits
pub fn is_hex_address(s: &str) -> bool {
    s.strip_prefix("0x")
        .is_some_and(|hex| hex.len() == 40 && hex.bytes().all(|b| b.is_ascii_hexdigit()))
}

/// Digits only, no sign, no leading zero unless the value is zero
fn is_canonical_decimal(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) && (s == "0" || !s.starts_with('0'))
}

fn split(denom: &str) -> Result<[&str; 3]> {
    let parts: Vec<&str> = denom.split('/').collect();
    match parts.as_slice() {
        [chain_id, code, address] => Ok([chain_id, code, address]),
        _ => Err(malformed(denom, "expected <chainID>/<tokenType>/<address>")),
    }
}

fn malformed(denom: &str, reason: &'static str) -> Error {
    Error::MalformedDenom {
        denom: denom.to_string(),
        reason,
    }
}

/// A validated, parsed denom
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Denom {
    pub origin_chain_id: ChainId,
    pub token_type: TokenType,
    pub contract: Address,
}

impl Denom {
    pub fn parse(denom: &str) -> Result<Self> {
        validate_denom(denom)?;
        let [_, _, address] = split(denom)?;
        let contract = address
            .parse()
            .map_err(|_| malformed(denom, "contract address is not a hex address"))?;
        Ok(Self {
            origin_chain_id: extract_origin_chain_id(denom)?,
            token_type: extract_token_type(denom)?,
            contract,
        })
    }
}

impl fmt::Display for Denom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&build_denom(self.token_type, &self.origin_chain_id, &self.contract))
    }
}
