//! # Settlement Protocol Service
//!
//! Drives the two-phase settlement state machine over a [`BalanceStore`].
//! Withdrawal batches share the gate (they are refused while a settlement
//! is prepared) but are committed by the caller, because they also move
//! funds out of custody.

use crate::domain::entities::SettlementBatch;
use crate::domain::errors::BatchError;
use crate::domain::gate::{BatchGate, BatchState};
use crate::domain::netting::{check_net_zero, validate_structure};
use crate::domain::settlement::{evaluate, Mode};
use cl_01_balance_store::{BalanceReader, BalanceStore, UndoLog};
use shared_types::{format_hash, Address, EventLog, Hash, LedgerEvent};

/// Result of phase one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrepareOutcome {
    /// Every decrement fits; the batch hash is now pending.
    Prepared { batch_hash: Hash },
    /// At least one decrement does not fit; nothing is pending.
    Failed { batch_hash: Hash, failures: u32 },
}

#[derive(Debug, Default)]
pub struct SettlementProtocol {
    gate: BatchGate,
}

impl SettlementProtocol {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> BatchState {
        self.gate.state()
    }

    pub fn gate(&self) -> &BatchGate {
        &self.gate
    }

    /// Fail with `SettlementInProgress` if a batch is prepared.
    pub fn ensure_idle(&self) -> Result<(), BatchError> {
        self.gate.ensure_idle()
    }

    /// Phase one: validate, net, and dry-run `batch` against `reader`.
    ///
    /// Balances are never written. Structural and netting violations are
    /// returned as errors; decrements that do not fit are reported as
    /// `SettlementFailed` events and yield [`PrepareOutcome::Failed`].
    pub fn prepare<R, E>(
        &mut self,
        reader: &R,
        fee_account: Address,
        batch_hash: Hash,
        batch: &SettlementBatch,
        events: &mut E,
    ) -> Result<PrepareOutcome, BatchError>
    where
        R: BalanceReader + ?Sized,
        E: EventLog + ?Sized,
    {
        self.gate.ensure_idle()?;
        validate_structure(batch)?;
        check_net_zero(batch)?;

        let evaluation = evaluate(reader, fee_account, batch, Mode::DryRun, events)?;
        if !evaluation.is_viable() {
            tracing::warn!(
                batch_hash = %format_hash(&batch_hash),
                failures = evaluation.failures,
                "settlement batch failed dry run"
            );
            return Ok(PrepareOutcome::Failed {
                batch_hash,
                failures: evaluation.failures,
            });
        }

        self.gate.begin(batch_hash)?;
        events.emit(LedgerEvent::SettlementPrepared { batch_hash });
        tracing::info!(
            batch_hash = %format_hash(&batch_hash),
            wallets = batch.wallets.len(),
            assets = batch.adjustments.len(),
            "settlement batch prepared"
        );
        Ok(PrepareOutcome::Prepared { batch_hash })
    }

    /// Phase two: apply the prepared batch to `store`.
    ///
    /// `batch_hash` must be the prepared hash. The batch is re-evaluated
    /// strictly; if any decrement no longer fits, nothing is written and the
    /// batch stays prepared.
    pub fn submit<E>(
        &mut self,
        store: &mut BalanceStore,
        fee_account: Address,
        batch_hash: Hash,
        batch: &SettlementBatch,
        events: &mut E,
    ) -> Result<UndoLog, BatchError>
    where
        E: EventLog + ?Sized,
    {
        self.gate.expect_pending(&batch_hash)?;
        validate_structure(batch)?;
        check_net_zero(batch)?;

        let evaluation = evaluate(&*store, fee_account, batch, Mode::Strict, events)?;
        let undo = store.apply(&evaluation.changes);
        self.gate.finish(batch_hash)?;

        events.emit(LedgerEvent::SettlementSubmitted { batch_hash });
        tracing::info!(
            batch_hash = %format_hash(&batch_hash),
            cells = undo.len(),
            "settlement batch submitted"
        );
        Ok(undo)
    }

    /// Discard the prepared batch.
    pub fn rollback<E>(&mut self, events: &mut E) -> Result<Hash, BatchError>
    where
        E: EventLog + ?Sized,
    {
        let batch_hash = self.gate.abort()?;
        events.emit(LedgerEvent::SettlementRolledBack { batch_hash });
        tracing::info!(batch_hash = %format_hash(&batch_hash), "settlement batch rolled back");
        Ok(batch_hash)
    }

    pub fn record_withdrawal(&mut self, batch_hash: Hash) {
        self.gate.record_withdrawal(batch_hash);
    }

    pub fn clear_withdrawal(&mut self) -> Option<Hash> {
        self.gate.clear_withdrawal()
    }
}
