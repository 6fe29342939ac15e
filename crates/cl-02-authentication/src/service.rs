//! # Authenticator
//!
//! The gate itself: recover the signer of a digest and decide whether it is
//! allowed to act for the claimed account.

use crate::domain::entities::EcdsaSignature;
use crate::domain::errors::AuthError;
use crate::ports::outbound::SignatureRecovery;
use shared_types::{format_address, Address, Hash, ZERO_ADDRESS};

/// Authentication gate over an injected recovery strategy.
pub struct Authenticator<R: SignatureRecovery> {
    recovery: R,
}

impl<R: SignatureRecovery> Authenticator<R> {
    pub fn new(recovery: R) -> Self {
        Self { recovery }
    }

    /// Authenticate `signature` over `digest` on behalf of `claimed`.
    ///
    /// Succeeds if the recovered signer is the account itself or its
    /// `delegate`. Returns the identity that signed.
    pub fn authenticate(
        &self,
        claimed: &Address,
        digest: &Hash,
        signature: &EcdsaSignature,
        delegate: Option<&Address>,
    ) -> Result<Address, AuthError> {
        let signer = self.recover_non_null(digest, signature)?;

        if signer == *claimed || delegate == Some(&signer) {
            return Ok(signer);
        }

        tracing::debug!(
            claimed = %format_address(claimed),
            recovered = %format_address(&signer),
            "signature does not belong to account or its linked signer"
        );
        Err(AuthError::SignerMismatch {
            expected: *claimed,
            actual: signer,
        })
    }

    /// Require that exactly `expected` signed `digest`.
    pub fn verify_signer(
        &self,
        expected: &Address,
        digest: &Hash,
        signature: &EcdsaSignature,
    ) -> Result<(), AuthError> {
        let signer = self.recover_non_null(digest, signature)?;
        if signer != *expected {
            return Err(AuthError::SignerMismatch {
                expected: *expected,
                actual: signer,
            });
        }
        Ok(())
    }

    fn recover_non_null(
        &self,
        digest: &Hash,
        signature: &EcdsaSignature,
    ) -> Result<Address, AuthError> {
        if signature.is_null() {
            return Err(AuthError::NullSignature);
        }
        let signer = self.recovery.recover(digest, signature)?;
        if signer == ZERO_ADDRESS {
            return Err(AuthError::NullSigner);
        }
        Ok(signer)
    }
}
