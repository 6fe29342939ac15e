//! # Ledger Runtime
//!
//! The custody ledger as one service: balances, linked signers, sovereign
//! withdrawals and operator batches behind role checks and custody ports.
//!
//! ## Architecture
//!
//! ```text
//!  caller ──▶ LedgerService ──┬──▶ cl-01 balance store (overlays, undo log)
//!                             ├──▶ cl-02 authentication (ECDSA, linked signers)
//!                             ├──▶ cl-03 sovereign book (delay policy)
//!                             └──▶ cl-04 batch protocol (Idle / Prepared)
//!                                     │
//!              ┌──────────────────────┼──────────────────────┐
//!              ▼                      ▼                      ▼
//!          Custody               TimeSource              EventSink
//!    (transfer in / out)      (sovereign delay)     (committed events)
//! ```
//!
//! ## Call Atomicity
//!
//! Balances are debited before funds leave custody. If custody refuses a
//! transfer the call is reverted in full: balances, sovereign records and
//! consumed nonces. Events are buffered and only published once the call
//! has committed.
//!
//! ## Operations
//!
//! | Operation | Caller |
//! |-----------|--------|
//! | `deposit` | anyone |
//! | `link_signer` / `remove_linked_signer` | account |
//! | `request_sovereign_withdrawal` | account |
//! | `process_withdrawal_batch` / `rollback_withdrawal_batch` | operator |
//! | `prepare_settlement_batch` / `submit_settlement_batch` / `rollback_settlement_batch` | operator |
//! | `set_operator` / `set_owner` / `set_fee_account` / `set_sovereign_delay` | owner |

pub mod adapters;
pub mod config;
pub mod domain;
pub mod handle;
pub mod ports;
pub mod service;

pub use adapters::{InMemoryCustody, InMemoryEventLog};
pub use config::{ConfigError, LedgerConfig, WithdrawalRollbackPolicy, DEFAULT_SOVEREIGN_DELAY};
pub use domain::{CommittedWithdrawals, LedgerError, LedgerState, Role, Roles};
pub use handle::LedgerHandle;
pub use ports::{Custody, CustodyError, EventSink, SystemTimeSource, TimeSource};
pub use service::{LedgerService, SovereignOutcome, WithdrawalBatchSummary};
