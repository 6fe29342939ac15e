//! # Balance Store & Adjustment Engine
//!
//! Holds the non-negative balance of every (account, asset) cell and is the
//! only path through which those balances change.
//!
//! ## Layers
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │  adjust / can_adjust      (Adjustment Engine) │
//! └──────────────────────┬───────────────────────┘
//!                        │ BalanceLedger
//!        ┌───────────────┴───────────────┐
//!        ▼                               ▼
//! ┌───────────────┐   reads through ┌──────────────┐
//! │ BalanceOverlay│ ──────────────▶ │ BalanceStore │
//! │  (scratch)    │                 │  (durable)   │
//! └───────┬───────┘                 └──────▲───────┘
//!         │ into_changeset()               │ apply() -> UndoLog
//!         └────────────────────────────────┘
//! ```
//!
//! Batches are evaluated against a [`BalanceOverlay`]; the durable
//! [`BalanceStore`] only changes when a finished [`ChangeSet`] is applied, and
//! every application returns an [`UndoLog`] that restores the previous values
//! if a later step of the same call fails.
//!
//! ## Adjustment Rules
//!
//! | Delta | Balance | Clamp | Result |
//! |-------|---------|-------|--------|
//! | credit `d` | any | - | balance + d |
//! | debit `w` | `w <= have` | - | balance - w |
//! | debit `w` | `w > have` | yes | balance = 0, `AmountAdjusted` emitted |
//! | debit `w` | `w > have` | no | `InsufficientBalance`, no change |

pub mod domain;
pub mod ports;

pub use domain::adjustment::{adjust, can_adjust, resolve_amount};
pub use domain::changeset::{ChangeSet, UndoLog};
pub use domain::errors::AdjustmentError;
pub use domain::overlay::BalanceOverlay;
pub use domain::store::BalanceStore;
pub use ports::{BalanceLedger, BalanceReader};
