//! # Outbound Ports
//!
//! The cryptographic primitive the gate depends on. Injected at construction
//! so tests and alternative schemes can replace secp256k1 recovery.

use crate::domain::entities::EcdsaSignature;
use crate::domain::errors::AuthError;
use shared_types::{Address, Hash};

/// Recover the identity that signed `digest`.
pub trait SignatureRecovery: Send + Sync {
    fn recover(&self, digest: &Hash, signature: &EcdsaSignature) -> Result<Address, AuthError>;
}

/// Recovery that always yields a fixed identity.
#[cfg(test)]
pub struct FixedRecovery(pub Address);

#[cfg(test)]
impl SignatureRecovery for FixedRecovery {
    fn recover(&self, _digest: &Hash, _signature: &EcdsaSignature) -> Result<Address, AuthError> {
        Ok(self.0)
    }
}
