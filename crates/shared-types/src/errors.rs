//! # Item Failure Codes
//!
//! Reasons an individual batch item was skipped. These are carried inside
//! failure events; they never abort the surrounding batch.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a withdrawal or settlement item did not apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error, Serialize, Deserialize)]
pub enum ErrorCode {
    /// The account could not cover the requested debit.
    #[error("insufficient balance")]
    InsufficientBalance,

    /// Neither the account nor its linked signer produced the signature, or a
    /// null signature had no matching sovereign request.
    #[error("invalid signature")]
    InvalidSignature,

    /// The signed nonce was already consumed by an earlier withdrawal.
    #[error("nonce already used")]
    NonceReused,

    /// The withdrawal fee is larger than the amount actually debited.
    #[error("fee exceeds withdrawn amount")]
    FeeExceedsAmount,

    /// Crediting the fee account would overflow.
    #[error("balance overflow")]
    BalanceOverflow,
}

impl ErrorCode {
    /// Stable numeric code, as reported to off-chain consumers.
    pub fn code(&self) -> u16 {
        match self {
            ErrorCode::InsufficientBalance => 603,
            ErrorCode::InvalidSignature => 609,
            ErrorCode::NonceReused => 610,
            ErrorCode::FeeExceedsAmount => 611,
            ErrorCode::BalanceOverflow => 612,
        }
    }

    /// Label used for metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InsufficientBalance => "insufficient_balance",
            ErrorCode::InvalidSignature => "invalid_signature",
            ErrorCode::NonceReused => "nonce_reused",
            ErrorCode::FeeExceedsAmount => "fee_exceeds_amount",
            ErrorCode::BalanceOverflow => "balance_overflow",
        }
    }
}
