//! # Authentication Errors

use shared_types::Address;
use thiserror::Error;

/// Errors that can occur while authenticating an instruction.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    /// The signature bytes do not encode a valid scalar pair
    #[error("Invalid signature format")]
    InvalidFormat,

    /// Signature has high S value (EIP-2 malleability protection)
    #[error("Malleable signature (high S value)")]
    MalleableSignature,

    /// Invalid recovery ID (v must be 0, 1, 27, or 28)
    #[error("Invalid recovery ID: {0}")]
    InvalidRecoveryId(u8),

    /// Failed to recover public key from signature
    #[error("Failed to recover public key")]
    RecoveryFailed,

    /// The all-zero sentinel was presented where a real signature is required
    #[error("Null signature")]
    NullSignature,

    /// Recovery produced the null identity
    #[error("Recovered the null signer")]
    NullSigner,

    /// Recovered signer is neither the account nor its linked signer
    #[error("Signer mismatch: expected {expected:?}, got {actual:?}")]
    SignerMismatch { expected: Address, actual: Address },

    /// Linked-signer nonce did not increase
    #[error("Stale nonce: last used {last}, got {given}")]
    StaleNonce { last: u64, given: u64 },

    /// The null identity cannot be linked
    #[error("Cannot link the zero address")]
    ZeroAddress,

    /// An account cannot delegate to itself
    #[error("Account cannot link itself as signer")]
    SelfLink,
}
