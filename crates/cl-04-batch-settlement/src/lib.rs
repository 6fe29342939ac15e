//! # Batch Settlement
//!
//! Operator batches against the balance store: two-phase settlement batches
//! and immediate withdrawal batches.
//!
//! ## Settlement State Machine
//!
//! ```text
//!                   prepare(batch) ok
//!    ┌──────┐ ─────────────────────────────▶ ┌──────────────────┐
//!    │ Idle │                                │ Prepared(hash)   │
//!    └──────┘ ◀───────────────────────────── └──────────────────┘
//!        ▲      submit(batch) with same hash     │   │
//!        │                                       │   │ submit with other hash,
//!        └─────────────── rollback() ────────────┘   │ or balances moved:
//!                                                    │ error, stays Prepared
//!                                                    ▼
//! ```
//!
//! ## Phase One: prepare
//!
//! | Step | Failure | Effect |
//! |------|---------|--------|
//! | decode canonical payload | malformed | fatal |
//! | gate is `Idle` | `SettlementInProgress` | fatal |
//! | structure (indices, parallel trade hashes) | malformed | fatal |
//! | net to zero per asset | `NetNonZero` | fatal |
//! | dry-run every decrement | `SettlementFailed` event | batch failed, stays `Idle` |
//!
//! ## Phase Two: submit
//!
//! The submitted bytes must hash to the prepared hash. The batch is then
//! re-evaluated strictly against live balances and applied in listed order:
//! per asset list, fee and increments first, then decrements.
//!
//! ## Withdrawal Batches
//!
//! No two-phase window. Items are authenticated and applied one by one with
//! failure isolation; see [`domain::withdrawal`].

pub mod domain;
pub mod service;

pub use domain::codec::{encode_payload, payload_hash, EncodedBatch};
pub use domain::entities::{
    AssetAdjustments, BatchPayload, SettlementBatch, WalletAdjustment, WithdrawalBatch,
    WithdrawalItem,
};
pub use domain::errors::BatchError;
pub use domain::gate::{BatchGate, BatchState};
pub use domain::withdrawal::{
    compensate, process_withdrawals, AppliedWithdrawal, Authorization, WithdrawalContext,
    WithdrawalReport,
};
pub use service::{PrepareOutcome, SettlementProtocol};
