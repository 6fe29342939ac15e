//! # Ledger Errors
//!
//! Every variant aborts the call that raised it with no observable state
//! change and no published events.

use super::roles::Role;
use crate::config::ConfigError;
use crate::ports::outbound::CustodyError;
use cl_01_balance_store::AdjustmentError;
use cl_02_authentication::AuthError;
use cl_03_sovereign_withdrawal::SovereignError;
use cl_04_batch_settlement::BatchError;
use shared_types::{format_address, Address};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("{} is not the {role}", format_address(.caller))]
    Unauthorized { caller: Address, role: Role },

    #[error("Zero address is not a valid {0}")]
    ZeroAddress(&'static str),

    #[error("Amount must be non-zero")]
    ZeroAmount,

    #[error("Withdrawal batch rollback is disabled")]
    RollbackDisabled,

    #[error("Custody transfer failed: {0}")]
    Custody(#[from] CustodyError),

    #[error(transparent)]
    Batch(#[from] BatchError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Sovereign(#[from] SovereignError),

    #[error(transparent)]
    Balance(#[from] AdjustmentError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl LedgerError {
    /// Metric label for the rejection.
    pub fn reason(&self) -> &'static str {
        match self {
            LedgerError::Unauthorized { .. } => "unauthorized",
            LedgerError::ZeroAddress(_) => "zero_address",
            LedgerError::ZeroAmount => "zero_amount",
            LedgerError::RollbackDisabled => "rollback_disabled",
            LedgerError::Custody(_) => "custody",
            LedgerError::Batch(BatchError::NetNonZero { .. }) => "net_non_zero",
            LedgerError::Batch(BatchError::BatchHashMismatch { .. }) => "hash_mismatch",
            LedgerError::Batch(BatchError::SettlementInProgress { .. }) => "settlement_in_progress",
            LedgerError::Batch(BatchError::NoSettlementInProgress) => "no_settlement",
            LedgerError::Batch(BatchError::SettlementInconsistent { .. }) => "settlement_inconsistent",
            LedgerError::Batch(_) => "malformed_batch",
            LedgerError::Auth(_) => "authentication",
            LedgerError::Sovereign(SovereignError::DelayNotMet { .. }) => "delay_not_met",
            LedgerError::Sovereign(_) => "sovereign",
            LedgerError::Balance(_) => "balance",
            LedgerError::Config(_) => "config",
        }
    }
}
