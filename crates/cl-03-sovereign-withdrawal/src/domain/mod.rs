//! Domain layer: pending requests and the delay policy.

pub mod book;
pub mod entities;
pub mod errors;
