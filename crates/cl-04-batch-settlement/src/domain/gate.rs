//! # Batch Gate
//!
//! The `Idle` / `Prepared` state of the settlement protocol plus the hashes
//! of the last committed batches.

use super::errors::BatchError;
use shared_types::Hash;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchState {
    Idle,
    Prepared(Hash),
}

#[derive(Debug, Clone, Default)]
pub struct BatchGate {
    pending: Option<Hash>,
    last_settlement: Option<Hash>,
    last_withdrawal: Option<Hash>,
}

impl BatchGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> BatchState {
        match self.pending {
            Some(hash) => BatchState::Prepared(hash),
            None => BatchState::Idle,
        }
    }

    pub fn ensure_idle(&self) -> Result<(), BatchError> {
        match self.pending {
            Some(pending) => Err(BatchError::SettlementInProgress { pending }),
            None => Ok(()),
        }
    }

    /// `Idle -> Prepared(hash)`.
    pub fn begin(&mut self, hash: Hash) -> Result<(), BatchError> {
        self.ensure_idle()?;
        self.pending = Some(hash);
        Ok(())
    }

    /// Require `Prepared(hash)` without leaving it.
    pub fn expect_pending(&self, hash: &Hash) -> Result<(), BatchError> {
        match self.pending {
            None => Err(BatchError::NoSettlementInProgress),
            Some(expected) if expected != *hash => Err(BatchError::BatchHashMismatch {
                expected,
                actual: *hash,
            }),
            Some(_) => Ok(()),
        }
    }

    /// `Prepared(hash) -> Idle`, recording `hash` as the last settlement.
    pub fn finish(&mut self, hash: Hash) -> Result<(), BatchError> {
        self.expect_pending(&hash)?;
        self.pending = None;
        self.last_settlement = Some(hash);
        Ok(())
    }

    /// `Prepared(_) -> Idle`, discarding the pending hash.
    pub fn abort(&mut self) -> Result<Hash, BatchError> {
        self.pending.take().ok_or(BatchError::NoSettlementInProgress)
    }

    pub fn record_withdrawal(&mut self, hash: Hash) {
        self.last_withdrawal = Some(hash);
    }

    pub fn clear_withdrawal(&mut self) -> Option<Hash> {
        self.last_withdrawal.take()
    }

    pub fn last_settlement(&self) -> Option<Hash> {
        self.last_settlement
    }

    pub fn last_withdrawal(&self) -> Option<Hash> {
        self.last_withdrawal
    }
}
