//! Domain layer: roles, persisted state and the error taxonomy.

pub mod errors;
pub mod roles;
pub mod state;

pub use errors::LedgerError;
pub use roles::{Role, Roles};
pub use state::{CommittedWithdrawals, LedgerState};
