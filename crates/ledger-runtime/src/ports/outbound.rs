//! Outbound (Driven) ports for the ledger runtime.
//!
//! Custody moves real funds, the clock drives the sovereign delay and the
//! event sink receives the audit trail of every committed call.

use shared_types::{format_address, Address, AssetId, LedgerEvent, Payout, Timestamp, U256};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CustodyError {
    #[error("{} holds {available} of {asset}, needs {required}", format_address(.account))]
    InsufficientFunds {
        account: Address,
        asset: AssetId,
        required: U256,
        available: U256,
    },

    #[error("Custody unavailable: {0}")]
    Unavailable(String),
}

/// External custody of the funds the ledger accounts for.
///
/// Every call is all-or-nothing: on `Err` no funds have moved.
pub trait Custody: Send + Sync {
    /// Pull `amount` of `asset` from `from` into custody.
    fn transfer_in(&self, from: &Address, asset: &AssetId, amount: U256) -> Result<(), CustodyError>;

    /// Push every payout to its recipient.
    fn transfer_out(&self, payouts: &[Payout]) -> Result<(), CustodyError>;

    /// Pull previously paid-out funds back into custody.
    fn reclaim(&self, payouts: &[Payout]) -> Result<(), CustodyError>;
}

/// Time source for the sovereign delay.
pub trait TimeSource: Send + Sync {
    /// Current time in seconds since the Unix epoch.
    fn now(&self) -> Timestamp;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> Timestamp {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    }
}

/// Receives the events of each committed call, in emission order.
pub trait EventSink: Send + Sync {
    fn publish(&self, events: &[LedgerEvent]);
}

impl<C: Custody + ?Sized> Custody for Arc<C> {
    fn transfer_in(&self, from: &Address, asset: &AssetId, amount: U256) -> Result<(), CustodyError> {
        (**self).transfer_in(from, asset, amount)
    }

    fn transfer_out(&self, payouts: &[Payout]) -> Result<(), CustodyError> {
        (**self).transfer_out(payouts)
    }

    fn reclaim(&self, payouts: &[Payout]) -> Result<(), CustodyError> {
        (**self).reclaim(payouts)
    }
}

impl<T: TimeSource + ?Sized> TimeSource for Arc<T> {
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}

impl<S: EventSink + ?Sized> EventSink for Arc<S> {
    fn publish(&self, events: &[LedgerEvent]) {
        (**self).publish(events)
    }
}

/// Mock time source for testing.
#[cfg(test)]
pub struct MockTimeSource {
    time: std::sync::atomic::AtomicU64,
}

#[cfg(test)]
impl MockTimeSource {
    pub fn new(initial: Timestamp) -> Self {
        Self {
            time: std::sync::atomic::AtomicU64::new(initial),
        }
    }

    pub fn advance(&self, secs: u64) {
        self.time.fetch_add(secs, std::sync::atomic::Ordering::SeqCst);
    }
}

#[cfg(test)]
impl TimeSource for MockTimeSource {
    fn now(&self) -> Timestamp {
        self.time.load(std::sync::atomic::Ordering::SeqCst)
    }
}
