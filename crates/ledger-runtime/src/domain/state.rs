//! # Ledger State
//!
//! Everything the ledger persists, owned by one [`crate::LedgerService`].

use super::errors::LedgerError;
use super::roles::Roles;
use cl_01_balance_store::BalanceStore;
use cl_02_authentication::{LinkedSignerRegistry, ReplayGuard};
use cl_03_sovereign_withdrawal::SovereignBook;
use cl_04_batch_settlement::{AppliedWithdrawal, SettlementProtocol};
use shared_types::{Address, Hash};

/// The most recent withdrawal batch, kept for policy-gated rollback.
#[derive(Debug, Clone)]
pub struct CommittedWithdrawals {
    pub batch_hash: Hash,
    /// Fee account at the time the batch ran.
    pub fee_account: Address,
    pub applied: Vec<AppliedWithdrawal>,
}

#[derive(Debug)]
pub struct LedgerState {
    pub balances: BalanceStore,
    pub signers: LinkedSignerRegistry,
    pub replay: ReplayGuard,
    pub sovereign: SovereignBook,
    pub settlement: SettlementProtocol,
    pub roles: Roles,
    pub last_withdrawals: Option<CommittedWithdrawals>,
}

impl LedgerState {
    pub fn new(roles: Roles, sovereign_delay: u64) -> Result<Self, LedgerError> {
        Ok(Self {
            balances: BalanceStore::new(),
            signers: LinkedSignerRegistry::new(),
            replay: ReplayGuard::new(),
            sovereign: SovereignBook::new(sovereign_delay)?,
            settlement: SettlementProtocol::new(),
            roles,
            last_withdrawals: None,
        })
    }
}
