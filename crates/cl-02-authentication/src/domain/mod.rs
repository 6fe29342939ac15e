//! Domain layer: signature recovery, typed digests and signer registries.

pub mod digest;
pub mod ecdsa;
pub mod entities;
pub mod errors;
pub mod registry;
