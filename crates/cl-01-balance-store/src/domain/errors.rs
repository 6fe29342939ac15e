//! # Adjustment Errors

use shared_types::{Address, AssetId, U256};
use thiserror::Error;

/// Errors raised when a balance cell cannot take a delta.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdjustmentError {
    /// Debit larger than the balance with clamping disabled.
    #[error("Insufficient balance for {asset}: requested {requested}, available {available}")]
    InsufficientBalance {
        account: Address,
        asset: AssetId,
        requested: U256,
        available: U256,
    },

    /// Credit would push the balance past `U256::MAX`.
    #[error("Balance overflow for {asset}: {balance} + {credit}")]
    Overflow {
        account: Address,
        asset: AssetId,
        balance: U256,
        credit: U256,
    },
}
