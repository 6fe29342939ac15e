//! Ports for the ledger runtime.

pub mod outbound;

pub use outbound::{Custody, CustodyError, EventSink, SystemTimeSource, TimeSource};
