//! # Adapter Implementations
//!
//! In-memory implementations of the outbound ports, used by the default
//! runtime and the integration tests.

pub mod custody;
pub mod event_log;

pub use custody::InMemoryCustody;
pub use event_log::InMemoryEventLog;
