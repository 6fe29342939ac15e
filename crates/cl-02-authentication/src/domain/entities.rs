//! # Domain Entities

use serde::{Deserialize, Serialize};

/// ECDSA signature on the secp256k1 curve.
///
/// The all-zero value is the "no signature" sentinel carried by batch items
/// that complete a pending sovereign withdrawal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EcdsaSignature {
    /// R component (32 bytes)
    pub r: [u8; 32],
    /// S component (32 bytes)
    pub s: [u8; 32],
    /// Recovery ID (0, 1, 27, or 28)
    pub v: u8,
}

impl EcdsaSignature {
    /// The "no signature" sentinel.
    pub const NULL: EcdsaSignature = EcdsaSignature {
        r: [0u8; 32],
        s: [0u8; 32],
        v: 0,
    };

    pub fn is_null(&self) -> bool {
        *self == Self::NULL
    }

    /// Parse a 65-byte `r || s || v` signature.
    pub fn from_bytes(bytes: &[u8; 65]) -> Self {
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&bytes[..32]);
        s.copy_from_slice(&bytes[32..64]);
        Self { r, s, v: bytes[64] }
    }

    pub fn to_bytes(&self) -> [u8; 65] {
        let mut out = [0u8; 65];
        out[..32].copy_from_slice(&self.r);
        out[32..64].copy_from_slice(&self.s);
        out[64] = self.v;
        out
    }
}

impl Default for EcdsaSignature {
    fn default() -> Self {
        Self::NULL
    }
}
