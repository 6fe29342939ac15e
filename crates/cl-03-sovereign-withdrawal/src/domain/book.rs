//! # Sovereign Book
//!
//! At most one pending request per account plus the delay policy. The book
//! only decides; moving funds is the caller's job, so a failed transfer can
//! put the record back with [`SovereignBook::restore`].

use super::entities::SovereignRequest;
use super::errors::SovereignError;
use shared_types::{Address, AssetId, Timestamp, U256};
use std::collections::HashMap;

/// Floor for the sovereign delay: one day.
pub const MIN_SOVEREIGN_DELAY: u64 = 24 * 60 * 60;

/// What a sovereign withdrawal call should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SovereignDecision {
    /// Store this request (new, or replacing an expired mismatching one).
    Record(SovereignRequest),
    /// The pending request has matured and matches: pay it out.
    Complete(SovereignRequest),
}

#[derive(Debug, Clone)]
pub struct SovereignBook {
    requests: HashMap<Address, SovereignRequest>,
    delay: u64,
}

impl SovereignBook {
    pub fn new(delay: u64) -> Result<Self, SovereignError> {
        check_delay(delay)?;
        Ok(Self {
            requests: HashMap::new(),
            delay,
        })
    }

    pub fn delay(&self) -> u64 {
        self.delay
    }

    /// Change the delay. Returns the previous value.
    pub fn set_delay(&mut self, delay: u64) -> Result<u64, SovereignError> {
        check_delay(delay)?;
        Ok(std::mem::replace(&mut self.delay, delay))
    }

    /// Decide what a call `(asset, amount)` from `account` at `now` does.
    ///
    /// `balance` is the account's current balance in `asset`.
    pub fn evaluate(
        &self,
        account: &Address,
        asset: AssetId,
        amount: U256,
        balance: U256,
        now: Timestamp,
    ) -> Result<SovereignDecision, SovereignError> {
        if let Some(pending) = self.requests.get(account) {
            let ready_at = pending.ready_at(self.delay);
            if now < ready_at {
                return Err(SovereignError::DelayNotMet { ready_at, now });
            }
            if pending.matches(&asset, amount) {
                return Ok(SovereignDecision::Complete(*pending));
            }
        }

        if amount > balance {
            return Err(SovereignError::InsufficientBalance {
                requested: amount,
                available: balance,
            });
        }

        Ok(SovereignDecision::Record(SovereignRequest {
            asset,
            amount,
            requested_at: now,
        }))
    }

    /// Store `request`, replacing any earlier one. Returns the replaced request.
    pub fn record(&mut self, account: Address, request: SovereignRequest) -> Option<SovereignRequest> {
        tracing::debug!(
            asset = %request.asset,
            amount = %request.amount,
            requested_at = request.requested_at,
            "sovereign request recorded"
        );
        self.requests.insert(account, request)
    }

    /// Remove and return the pending request of `account`.
    pub fn take(&mut self, account: &Address) -> Option<SovereignRequest> {
        self.requests.remove(account)
    }

    /// Put back a request removed by [`SovereignBook::take`].
    pub fn restore(&mut self, account: Address, request: SovereignRequest) {
        self.requests.insert(account, request);
    }

    pub fn pending(&self, account: &Address) -> Option<SovereignRequest> {
        self.requests.get(account).copied()
    }

    /// Does `account` have a pending request for exactly `(asset, amount)`?
    ///
    /// Used by the operator batch path, which may complete a request before
    /// its delay has elapsed.
    pub fn matches(&self, account: &Address, asset: &AssetId, amount: U256) -> bool {
        self.requests
            .get(account)
            .is_some_and(|pending| pending.matches(asset, amount))
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }
}

fn check_delay(delay: u64) -> Result<(), SovereignError> {
    if delay < MIN_SOVEREIGN_DELAY {
        return Err(SovereignError::DelayBelowMinimum {
            requested: delay,
            minimum: MIN_SOVEREIGN_DELAY,
        });
    }
    Ok(())
}
