//! # secp256k1 Recovery Adapter

use crate::domain::ecdsa::recover_address;
use crate::domain::entities::EcdsaSignature;
use crate::domain::errors::AuthError;
use crate::ports::outbound::SignatureRecovery;
use shared_types::{Address, Hash};

/// [`SignatureRecovery`] backed by `k256`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EcdsaRecovery;

impl EcdsaRecovery {
    pub fn new() -> Self {
        Self
    }
}

impl SignatureRecovery for EcdsaRecovery {
    fn recover(&self, digest: &Hash, signature: &EcdsaSignature) -> Result<Address, AuthError> {
        recover_address(digest, signature)
    }
}
