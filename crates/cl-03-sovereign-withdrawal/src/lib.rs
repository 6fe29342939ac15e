//! # Sovereign Withdrawal Escape Hatch
//!
//! Lets an account withdraw without the operator: request once, wait out the
//! delay, call again with the same parameters.
//!
//! ## State Machine (per account)
//!
//! ```text
//!               request(asset, amount)
//!  ┌───────────┐ ───────────────────────▶ ┌──────────────────────────┐
//!  │ NoRequest │                          │ Pending(asset, amount, t0)│
//!  └───────────┘ ◀─────────────────────── └──────────────────────────┘
//!        ▲        same params, now >= t0+delay   │  different params,
//!        │        (complete: debit + pay out)    │  now >= t0+delay
//!        │                                       ▼
//!        │                                 Pending(asset', amount', now)
//!        │
//!        └── operator batch item with a null signature matching Pending
//! ```
//!
//! Any call while `now < t0 + delay` fails with `DelayNotMet`, whether or
//! not the parameters match. The delay is owner-configured and never below
//! [`MIN_SOVEREIGN_DELAY`].

pub mod domain;

pub use domain::book::{SovereignBook, SovereignDecision, MIN_SOVEREIGN_DELAY};
pub use domain::entities::SovereignRequest;
pub use domain::errors::SovereignError;
