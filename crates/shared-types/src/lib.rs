//! # Shared Types Crate
//!
//! Identifiers, amounts and events used by every subsystem of the custody
//! ledger.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: account, asset and hash types are defined
//!   once here and re-exported by the subsystem crates.
//! - **Append-only audit trail**: every observable state transition is a
//!   [`LedgerEvent`]; item-level failures travel as [`ErrorCode`] values
//!   inside events rather than as Rust errors.

pub mod entities;
pub mod errors;
pub mod events;

pub use entities::*;
pub use errors::*;
pub use events::*;
