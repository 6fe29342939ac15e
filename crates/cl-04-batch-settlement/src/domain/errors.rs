//! # Batch Errors
//!
//! Everything here is fatal for the call that raised it: no balance, gate or
//! event change survives. Per-item failures inside a batch are reported as
//! events instead.

use cl_01_balance_store::AdjustmentError;
use shared_types::{format_hash, Address, AssetId, Hash, U256};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BatchError {
    /// Bytes are not a canonical encoding of a batch payload.
    #[error("Malformed batch payload: {0}")]
    Malformed(String),

    /// A payload of the wrong kind was presented.
    #[error("Expected a {expected} batch, got {actual}")]
    UnexpectedPayload {
        expected: &'static str,
        actual: &'static str,
    },

    /// Batch has nothing to do.
    #[error("Empty batch")]
    EmptyBatch,

    /// An adjustment names a wallet the batch does not list.
    #[error("Wallet index {index} out of range for {wallets} wallets")]
    WalletIndexOutOfRange { index: u32, wallets: usize },

    /// `trade_hashes` is not parallel to `wallets`.
    #[error("Trade hash lists ({lists}) do not match wallet count ({wallets})")]
    TradeHashCountMismatch { wallets: usize, lists: usize },

    /// An asset list has neither increments nor decrements.
    #[error("Adjustment list for {asset} is empty")]
    EmptyAdjustmentList { asset: AssetId },

    /// `sum(increments) + fee != sum(decrements)` for an asset.
    #[error("Netting failed for {asset}: credits {credits} != debits {debits}")]
    NetNonZero {
        asset: AssetId,
        credits: U256,
        debits: U256,
    },

    /// An asset list sums past `U256::MAX`.
    #[error("Amount overflow in adjustment list for {asset}")]
    AmountOverflow { asset: AssetId },

    /// A settlement batch is already prepared.
    #[error("Settlement in progress: {}", format_hash(.pending))]
    SettlementInProgress { pending: Hash },

    /// `submit`/`rollback` without a prepared batch.
    #[error("No settlement in progress")]
    NoSettlementInProgress,

    /// Submitted bytes are not the prepared batch.
    #[error("Batch hash mismatch: prepared {}, submitted {}", format_hash(.expected), format_hash(.actual))]
    BatchHashMismatch { expected: Hash, actual: Hash },

    /// A decrement that passed the dry run no longer fits at submit time.
    #[error("Settlement inconsistent: {asset} debit of {requested} exceeds balance {balance}")]
    SettlementInconsistent {
        wallet: Address,
        asset: AssetId,
        requested: U256,
        balance: U256,
    },

    /// There is no committed withdrawal batch to roll back, or it is not
    /// the one presented.
    #[error("No matching withdrawal batch to roll back")]
    NoWithdrawalBatch,

    /// Reversing a withdrawal batch would overdraw the fee account.
    #[error("Cannot compensate withdrawal batch: {0}")]
    CompensationFailed(AdjustmentError),

    /// Balance arithmetic failed on a credit.
    #[error(transparent)]
    Balance(#[from] AdjustmentError),
}
