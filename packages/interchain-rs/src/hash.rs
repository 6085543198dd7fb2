//! Hashing helpers
//!
//! Event-topic selectors are the keccak-256 hash of the canonical event
//! signature, e.g. `keccak256("TFuelTokenLocked(uint256,string,address,address,uint256,uint256)")`.

use alloy::primitives::B256;
use tiny_keccak::{Hasher, Keccak};

/// Compute keccak256 hash of data
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    hasher.update(data);
    let mut output = [0u8; 32];
    hasher.finalize(&mut output);
    output
}

/// Topic-0 selector for an event signature string
pub fn event_selector(signature: &str) -> B256 {
    B256::from(keccak256(signature.as_bytes()))
}

/// Convert bytes32 to hex string with 0x prefix
pub fn bytes32_to_hex(bytes: &[u8; 32]) -> String {
    format!("0x{}", hex::encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keccak256_empty() {
        // keccak256 of empty input is a well-known constant
        assert_eq!(
            bytes32_to_hex(&keccak256(b"")),
            "0xc5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }

    #[test]
    fn test_event_selector_matches_erc20_transfer() {
        assert_eq!(
            bytes32_to_hex(&event_selector("Transfer(address,address,uint256)").0),
            "0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef"
        );
    }
}
