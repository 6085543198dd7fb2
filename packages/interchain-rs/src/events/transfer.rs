//! Transfer sub-events
//!
//! Transfers are produced by the simulated mainchain rather than a token-bank
//! log, and their payloads are RLP lists instead of ABI event data. Like a
//! lock, the denom must originate from the envelope's source chain.

use alloy::primitives::{Address, U256};
use alloy_rlp::{Decodable, RlpDecodable, RlpEncodable};

use super::{parse_sub_event, EventType, InterChainMessageEvent, OriginSide, SubEvent};
use crate::error::{Error, Result};
use crate::types::ChainId;

fn decode_rlp_payload<T: Decodable>(event_type: EventType, data: &[u8]) -> Result<T> {
    let buf = &mut &data[..];
    let decoded = T::decode(buf).map_err(|e| Error::payload(event_type, e))?;
    if !buf.is_empty() {
        return Err(Error::payload(event_type, "trailing bytes after payload"));
    }
    Ok(decoded)
}

#[derive(Debug, Clone, PartialEq, Eq, RlpEncodable, RlpDecodable)]
pub struct CrossChainTFuelTransferEvent {
    pub target_chain_id: ChainId,
    pub mainchain_token_sender: Address,
    pub subchain_token_receiver: Address,
    pub denom: String,
    pub locked_amount: U256,
    pub nonce: U256,
}

impl SubEvent for CrossChainTFuelTransferEvent {
    const EVENT_TYPE: EventType = EventType::TFuelTransfer;
    const ORIGIN_SIDE: OriginSide = OriginSide::Source;

    fn decode_payload(data: &[u8]) -> Result<Self> {
        decode_rlp_payload(Self::EVENT_TYPE, data)
    }

    fn encode_payload(&self) -> Vec<u8> {
        alloy_rlp::encode(self)
    }

    fn denom(&self) -> &str {
        &self.denom
    }

    fn set_denom(&mut self, denom: String) {
        self.denom = denom;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, RlpEncodable, RlpDecodable)]
pub struct CrossChainTNT20TransferEvent {
    pub target_chain_id: ChainId,
    pub mainchain_token_sender: Address,
    pub subchain_token_receiver: Address,
    pub denom: String,
    pub locked_amount: U256,
    pub tnt20_contract: Address,
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub nonce: U256,
}

impl SubEvent for CrossChainTNT20TransferEvent {
    const EVENT_TYPE: EventType = EventType::Tnt20Transfer;
    const ORIGIN_SIDE: OriginSide = OriginSide::Source;

    fn decode_payload(data: &[u8]) -> Result<Self> {
        decode_rlp_payload(Self::EVENT_TYPE, data)
    }

    fn encode_payload(&self) -> Vec<u8> {
        alloy_rlp::encode(self)
    }

    fn denom(&self) -> &str {
        &self.denom
    }

    fn set_denom(&mut self, denom: String) {
        self.denom = denom;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, RlpEncodable, RlpDecodable)]
pub struct CrossChainTNT721TransferEvent {
    pub target_chain_id: ChainId,
    pub mainchain_token_sender: Address,
    pub subchain_token_receiver: Address,
    pub denom: String,
    pub name: String,
    pub symbol: String,
    pub token_id: U256,
    pub token_uri: String,
    pub nonce: U256,
}

impl SubEvent for CrossChainTNT721TransferEvent {
    const EVENT_TYPE: EventType = EventType::Tnt721Transfer;
    const ORIGIN_SIDE: OriginSide = OriginSide::Source;

    fn decode_payload(data: &[u8]) -> Result<Self> {
        decode_rlp_payload(Self::EVENT_TYPE, data)
    }

    fn encode_payload(&self) -> Vec<u8> {
        alloy_rlp::encode(self)
    }

    fn denom(&self) -> &str {
        &self.denom
    }

    fn set_denom(&mut self, denom: String) {
        self.denom = denom;
    }
}

pub fn parse_to_cross_chain_tfuel_transfer_event(
    event: &InterChainMessageEvent,
) -> Result<CrossChainTFuelTransferEvent> {
    parse_sub_event(event)
}

pub fn parse_to_cross_chain_tnt20_transfer_event(
    event: &InterChainMessageEvent,
) -> Result<CrossChainTNT20TransferEvent> {
    parse_sub_event(event)
}

pub fn parse_to_cross_chain_tnt721_transfer_event(
    event: &InterChainMessageEvent,
) -> Result<CrossChainTNT721TransferEvent> {
    parse_sub_event(event)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::denom::{tfuel_denom, tnt721_denom};

    #[test]
    fn test_tnt721_transfer_parses() {
        let mainchain = ChainId::from_u64(366);
        let subchain = ChainId::from_u64(360777);
        let contract = Address::repeat_byte(0xab);
        let payload = CrossChainTNT721TransferEvent {
            target_chain_id: subchain,
            mainchain_token_sender: Address::repeat_byte(0x01),
            subchain_token_receiver: Address::repeat_byte(0x02),
            denom: tnt721_denom(&mainchain, &contract),
            name: "Sim NFT".to_string(),
            symbol: "SNFT".to_string(),
            token_id: U256::from(9u64),
            token_uri: "https://example.org/9".to_string(),
            nonce: U256::from(1u64),
        };
        let envelope = InterChainMessageEvent::new(
            EventType::Tnt721Transfer,
            mainchain,
            subchain,
            payload.mainchain_token_sender,
            payload.subchain_token_receiver,
            payload.encode_payload(),
            payload.nonce,
            10,
        );
        assert_eq!(
            parse_to_cross_chain_tnt721_transfer_event(&envelope).unwrap(),
            payload
        );
    }

    #[test]
    fn test_transfer_payload_with_trailing_bytes_rejected() {
        let mainchain = ChainId::from_u64(366);
        let payload = CrossChainTFuelTransferEvent {
            target_chain_id: ChainId::from_u64(360777),
            mainchain_token_sender: Address::ZERO,
            subchain_token_receiver: Address::ZERO,
            denom: tfuel_denom(&mainchain),
            locked_amount: U256::from(1u64),
            nonce: U256::from(1u64),
        };
        let mut data = payload.encode_payload();
        data.push(0x01);
        assert!(matches!(
            CrossChainTFuelTransferEvent::decode_payload(&data),
            Err(Error::PayloadDecode { .. })
        ));
    }
}
