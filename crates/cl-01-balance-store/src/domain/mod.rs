//! Domain layer: balance cells, scratch overlays and the adjustment rules.

pub mod adjustment;
pub mod changeset;
pub mod errors;
pub mod overlay;
pub mod store;
