//! Token bank and chain registrar ABI definitions
//!
//! Uses alloy's sol! macro to generate the event layouts the token banks emit.
//! Every field is non-indexed, so the whole payload travels in the log's data
//! section and in `InterChainMessageEvent::data`.

#![allow(clippy::too_many_arguments)]

use alloy::sol;

sol! {
    // ========================================================================
    // Token Lock (emitted on the chain where the authentic token lives)
    // ========================================================================

    #[derive(Debug, PartialEq, Eq)]
    event TFuelTokenLocked(
        uint256 targetChainID,
        string denom,
        address sourceChainTokenSender,
        address targetChainVoucherReceiver,
        uint256 lockedAmount,
        uint256 tokenLockNonce
    );

    #[derive(Debug, PartialEq, Eq)]
    event TNT20TokenLocked(
        uint256 targetChainID,
        string denom,
        address sourceChainTokenSender,
        address targetChainVoucherReceiver,
        uint256 lockedAmount,
        string name,
        string symbol,
        uint8 decimals,
        uint256 tokenLockNonce
    );

    #[derive(Debug, PartialEq, Eq)]
    event TNT721TokenLocked(
        uint256 targetChainID,
        string denom,
        address sourceChainTokenSender,
        address targetChainVoucherReceiver,
        uint256 tokenID,
        string tokenURI,
        string name,
        string symbol,
        uint256 tokenLockNonce
    );

    // ========================================================================
    // Token Unlock (emitted on the origin chain after a voucher burn)
    // ========================================================================

    #[derive(Debug, PartialEq, Eq)]
    event TFuelTokenUnlocked(
        uint256 sourceChainID,
        string denom,
        address targetChainTokenReceiver,
        uint256 unlockedAmount,
        uint256 sourceChainVoucherBurnNonce,
        uint256 tokenUnlockNonce
    );

    #[derive(Debug, PartialEq, Eq)]
    event TNT20TokenUnlocked(
        uint256 sourceChainID,
        string denom,
        address targetChainTokenReceiver,
        uint256 unlockedAmount,
        uint256 sourceChainVoucherBurnNonce,
        uint256 tokenUnlockNonce
    );

    #[derive(Debug, PartialEq, Eq)]
    event TNT721TokenUnlocked(
        uint256 sourceChainID,
        string denom,
        address targetChainTokenReceiver,
        uint256 tokenID,
        uint256 sourceChainVoucherBurnNonce,
        uint256 tokenUnlockNonce
    );

    // ========================================================================
    // Voucher Burn (emitted on the chain holding the vouchers)
    // ========================================================================

    #[derive(Debug, PartialEq, Eq)]
    event TFuelVoucherBurned(
        uint256 targetChainID,
        string denom,
        address sourceChainVoucherOwner,
        address targetChainTokenReceiver,
        uint256 burnedAmount,
        uint256 voucherBurnNonce
    );

    #[derive(Debug, PartialEq, Eq)]
    event TNT20VoucherBurned(
        uint256 targetChainID,
        string denom,
        address sourceChainVoucherOwner,
        address targetChainTokenReceiver,
        uint256 burnedAmount,
        uint256 voucherBurnNonce
    );

    #[derive(Debug, PartialEq, Eq)]
    event TNT721VoucherBurned(
        uint256 targetChainID,
        string denom,
        address sourceChainVoucherOwner,
        address targetChainTokenReceiver,
        uint256 tokenID,
        uint256 voucherBurnNonce
    );
}

sol! {
    /// Chain registrar, queried for per-dynasty validator sets
    #[sol(rpc)]
    contract ChainRegistrar {
        function getValidatorSet(uint256 subchainID, uint256 dynasty)
            external
            view
            returns (address[] validators, uint256[] shareAmounts);
    }
}
