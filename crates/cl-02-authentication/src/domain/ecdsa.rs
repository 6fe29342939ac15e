//! # ECDSA Recovery (secp256k1)
//!
//! Pure domain logic: recover the address that produced a signature over a
//! 32-byte digest.
//!
//! ## Security Notes
//!
//! - **Malleability Prevention (EIP-2)**: S must be strictly below half the
//!   curve order, checked in constant time with `subtle`.
//! - **Scalar Range Validation**: R and S must be in [1, n-1]; enforced by
//!   `k256::ecdsa::Signature::from_slice`.
//! - Addresses are the last 20 bytes of keccak256 of the uncompressed public
//!   key without its 0x04 prefix.

use super::entities::EcdsaSignature;
use super::errors::AuthError;
use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};
use sha3::{Digest, Keccak256};
use shared_types::{Address, Hash};
use subtle::Choice;

/// secp256k1 curve order n
const SECP256K1_ORDER: [u8; 32] = [
    0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFE,
    0xBA, 0xAE, 0xDC, 0xE6, 0xAF, 0x48, 0xA0, 0x3B, 0xBF, 0xD2, 0x5E, 0x8C, 0xD0, 0x36, 0x41, 0x41,
];

/// Half of the secp256k1 curve order (for malleability check).
const SECP256K1_HALF_ORDER: [u8; 32] = [
    0x7F, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0x5D, 0x57, 0x6E, 0x73, 0x57, 0xA4, 0x50, 0x1D, 0xDF, 0xE9, 0x2F, 0x46, 0x68, 0x1B, 0x20, 0xA0,
];

/// Recover the signer's address from a signature over `digest`.
pub fn recover_address(digest: &Hash, signature: &EcdsaSignature) -> Result<Address, AuthError> {
    let recovery_id = parse_recovery_id(signature.v)?;

    if !is_low_s(&signature.s) {
        return Err(AuthError::MalleableSignature);
    }

    let mut sig_bytes = [0u8; 64];
    sig_bytes[..32].copy_from_slice(&signature.r);
    sig_bytes[32..].copy_from_slice(&signature.s);
    let sig = Signature::from_slice(&sig_bytes).map_err(|_| AuthError::InvalidFormat)?;

    let recovered_key = VerifyingKey::recover_from_prehash(digest, &sig, recovery_id)
        .map_err(|_| AuthError::RecoveryFailed)?;

    Ok(address_from_pubkey(&recovered_key))
}

/// Keccak256 hash function.
pub fn keccak256(data: &[u8]) -> Hash {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&result);
    hash
}

/// Derive an Ethereum-style address from a public key.
pub fn address_from_pubkey(public_key: &VerifyingKey) -> Address {
    let pubkey_bytes = public_key.to_encoded_point(false);
    let pubkey_slice = pubkey_bytes.as_bytes();

    // Skip the 0x04 uncompressed-point prefix
    let hash = keccak256(&pubkey_slice[1..]);

    let mut address = [0u8; 20];
    address.copy_from_slice(&hash[12..]);
    address
}

/// Check if S is strictly below half the curve order, in constant time.
fn is_low_s(s: &[u8; 32]) -> bool {
    let mut less = Choice::from(0u8);
    let mut greater = Choice::from(0u8);

    for i in 0..32 {
        let not_decided = !(less | greater);
        let byte_less = Choice::from((s[i] < SECP256K1_HALF_ORDER[i]) as u8);
        let byte_greater = Choice::from((s[i] > SECP256K1_HALF_ORDER[i]) as u8);

        less |= not_decided & byte_less;
        greater |= not_decided & byte_greater;
    }

    less.into()
}

/// Parse recovery ID from v value.
///
/// Valid v values: 0, 1, 27, 28
fn parse_recovery_id(v: u8) -> Result<RecoveryId, AuthError> {
    let id = match v {
        0 | 27 => 0,
        1 | 28 => 1,
        _ => return Err(AuthError::InvalidRecoveryId(v)),
    };

    RecoveryId::try_from(id).map_err(|_| AuthError::InvalidRecoveryId(v))
}

/// s' = n - s
pub fn invert_s(s: &[u8; 32]) -> [u8; 32] {
    let mut result = [0u8; 32];
    let mut borrow: i32 = 0;

    for i in (0..32).rev() {
        let diff = (SECP256K1_ORDER[i] as i32) - (s[i] as i32) - borrow;
        if diff < 0 {
            result[i] = (diff + 256) as u8;
            borrow = 1;
        } else {
            result[i] = diff as u8;
            borrow = 0;
        }
    }

    result
}

// =============================================================================
// TEST HELPERS
// =============================================================================

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers {
    use super::*;
    use k256::ecdsa::SigningKey;

    /// Generate a new keypair and its address.
    pub fn generate_keypair() -> (SigningKey, Address) {
        let signing_key = SigningKey::random(&mut rand::thread_rng());
        let address = address_from_pubkey(signing_key.verifying_key());
        (signing_key, address)
    }

    /// Sign a digest, normalizing S to the lower half of the curve order.
    pub fn sign(digest: &Hash, private_key: &SigningKey) -> EcdsaSignature {
        let (sig, recid) = private_key
            .sign_prehash_recoverable(digest)
            .expect("signing failed");

        let sig_bytes = sig.to_bytes();
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&sig_bytes[..32]);
        s.copy_from_slice(&sig_bytes[32..]);

        let s_normalized = if !is_low_s(&s) { invert_s(&s) } else { s };

        // Inverting S flips the recovery id
        let v = if s_normalized != s {
            if recid.to_byte() == 0 {
                28
            } else {
                27
            }
        } else {
            recid.to_byte() + 27
        };

        EcdsaSignature {
            r,
            s: s_normalized,
            v,
        }
    }
}
