//! # Ledger Events
//!
//! The append-only audit trail. Every state transition of the ledger emits
//! exactly one of these; consumers reconstruct balances and batch outcomes
//! from the stream without reading ledger state.
//!
//! Events are buffered per call and only published once the call commits, so
//! an aborted call never leaves events behind.

use crate::entities::{Address, AssetId, Hash, Timestamp, U256};
use crate::errors::ErrorCode;
use serde::{Deserialize, Serialize};

/// A ledger state transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerEvent {
    // =========================================================================
    // BALANCES
    // =========================================================================
    /// Funds moved into custody and were credited.
    Deposit {
        account: Address,
        asset: AssetId,
        amount: U256,
    },

    /// A debit was clamped to the available balance.
    AmountAdjusted {
        account: Address,
        asset: AssetId,
        requested: U256,
        actual: U256,
    },

    // =========================================================================
    // WITHDRAWALS
    // =========================================================================
    /// A batched withdrawal debited `amount`; `fee` went to the fee account and
    /// the remainder was paid out.
    Withdrawal {
        sequence: u64,
        account: Address,
        asset: AssetId,
        amount: U256,
        fee: U256,
    },

    /// A batched withdrawal was skipped.
    WithdrawalFailed {
        sequence: u64,
        account: Address,
        asset: AssetId,
        requested: U256,
        fee: U256,
        balance: U256,
        error: ErrorCode,
    },

    /// A withdrawal batch finished processing.
    WithdrawalBatchProcessed {
        batch_hash: Hash,
        applied: u32,
        failed: u32,
    },

    /// The most recent withdrawal batch was compensated.
    WithdrawalBatchRolledBack { batch_hash: Hash },

    // =========================================================================
    // SOVEREIGN WITHDRAWALS
    // =========================================================================
    SovereignWithdrawalRequested {
        account: Address,
        asset: AssetId,
        amount: U256,
        requested_at: Timestamp,
    },

    SovereignWithdrawalCompleted {
        account: Address,
        asset: AssetId,
        amount: U256,
    },

    // =========================================================================
    // LINKED SIGNERS
    // =========================================================================
    LinkedSignerSet {
        account: Address,
        signer: Address,
        nonce: u64,
    },

    LinkedSignerRemoved {
        account: Address,
        signer: Address,
    },

    // =========================================================================
    // SETTLEMENT
    // =========================================================================
    /// Phase one accepted the batch; its hash is now pending.
    SettlementPrepared { batch_hash: Hash },

    /// A wallet could not cover a decrement during the dry run.
    SettlementFailed {
        wallet: Address,
        asset: AssetId,
        requested: U256,
        balance: U256,
        trade_hashes: Vec<Hash>,
    },

    /// Phase two applied the pending batch.
    SettlementSubmitted { batch_hash: Hash },

    /// The pending batch was discarded.
    SettlementRolledBack { batch_hash: Hash },

    // =========================================================================
    // ADMINISTRATION
    // =========================================================================
    OperatorChanged { previous: Address, current: Address },

    OwnerChanged { previous: Address, current: Address },

    FeeAccountChanged { previous: Address, current: Address },

    SovereignDelayChanged { previous: u64, current: u64 },
}

impl LedgerEvent {
    /// Short machine-readable name, used for log fields and metric labels.
    pub fn kind(&self) -> &'static str {
        match self {
            LedgerEvent::Deposit { .. } => "deposit",
            LedgerEvent::AmountAdjusted { .. } => "amount_adjusted",
            LedgerEvent::Withdrawal { .. } => "withdrawal",
            LedgerEvent::WithdrawalFailed { .. } => "withdrawal_failed",
            LedgerEvent::WithdrawalBatchProcessed { .. } => "withdrawal_batch_processed",
            LedgerEvent::WithdrawalBatchRolledBack { .. } => "withdrawal_batch_rolled_back",
            LedgerEvent::SovereignWithdrawalRequested { .. } => "sovereign_withdrawal_requested",
            LedgerEvent::SovereignWithdrawalCompleted { .. } => "sovereign_withdrawal_completed",
            LedgerEvent::LinkedSignerSet { .. } => "linked_signer_set",
            LedgerEvent::LinkedSignerRemoved { .. } => "linked_signer_removed",
            LedgerEvent::SettlementPrepared { .. } => "settlement_prepared",
            LedgerEvent::SettlementFailed { .. } => "settlement_failed",
            LedgerEvent::SettlementSubmitted { .. } => "settlement_submitted",
            LedgerEvent::SettlementRolledBack { .. } => "settlement_rolled_back",
            LedgerEvent::OperatorChanged { .. } => "operator_changed",
            LedgerEvent::OwnerChanged { .. } => "owner_changed",
            LedgerEvent::FeeAccountChanged { .. } => "fee_account_changed",
            LedgerEvent::SovereignDelayChanged { .. } => "sovereign_delay_changed",
        }
    }
}

/// Anything that can buffer events emitted during a call.
pub trait EventLog {
    fn emit(&mut self, event: LedgerEvent);
}

impl EventLog for Vec<LedgerEvent> {
    fn emit(&mut self, event: LedgerEvent) {
        self.push(event);
    }
}

/// Discards every event. Used by dry runs whose output is thrown away.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullEventLog;

impl EventLog for NullEventLog {
    fn emit(&mut self, _event: LedgerEvent) {}
}
