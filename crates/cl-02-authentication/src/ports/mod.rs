//! Ports for the authentication gate.

pub mod outbound;
