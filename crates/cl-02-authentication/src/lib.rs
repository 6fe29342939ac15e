//! # Authentication Gate
//!
//! Decides whether a user-originated instruction embedded in an operator
//! batch was really authorized by the account it names.
//!
//! ## Flow
//!
//! ```text
//! (sender, asset, amount, nonce)
//!          │
//!          ▼
//!   TypedDomain::withdraw_digest ──► SignatureRecovery::recover ──► signer
//!                                                                    │
//!                       signer == sender  OR  signer == linked signer?
//!                                   │yes                │no
//!                                   ▼                   ▼
//!                                  Ok            AuthError::SignerMismatch
//! ```
//!
//! ## Security Properties
//!
//! - Digests are domain separated by chain id and verifying identity, so a
//!   signature cannot be replayed against another deployment.
//! - Changing any signed field changes the digest.
//! - The zero address never authenticates, whatever the recovery returns.
//! - High-S signatures are rejected (EIP-2).
//! - Linking a delegate requires the delegate's own countersignature over a
//!   strictly increasing nonce.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::secp256k1::EcdsaRecovery;
pub use domain::digest::TypedDomain;
pub use domain::ecdsa::keccak256;
pub use domain::entities::EcdsaSignature;
pub use domain::errors::AuthError;
pub use domain::registry::{LinkedSignerRegistry, ReplayGuard};
pub use ports::outbound::SignatureRecovery;
pub use service::Authenticator;

#[cfg(any(test, feature = "test-helpers"))]
pub use domain::ecdsa::test_helpers;
