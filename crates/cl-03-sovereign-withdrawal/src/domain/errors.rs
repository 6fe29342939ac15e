//! # Sovereign Withdrawal Errors

use shared_types::{Timestamp, U256};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SovereignError {
    /// The requested amount exceeds the current balance.
    #[error("Insufficient balance: requested {requested}, available {available}")]
    InsufficientBalance { requested: U256, available: U256 },

    /// A request is pending and its delay has not elapsed.
    #[error("Sovereign withdrawal delay not met: ready at {ready_at}, now {now}")]
    DelayNotMet { ready_at: Timestamp, now: Timestamp },

    /// The owner tried to set a delay below the floor.
    #[error("Sovereign delay {requested}s is below the minimum of {minimum}s")]
    DelayBelowMinimum { requested: u64, minimum: u64 },
}
