//! # Core Ledger Entities
//!
//! ## Clusters
//!
//! - **Identity**: `Address`, `AssetId`
//! - **Amounts**: `U256`, `Delta`
//! - **Custody**: `Payout`

use serde::{Deserialize, Serialize};
use std::fmt;

// Re-export U256 from primitive-types for use across all subsystems
pub use primitive_types::U256;

/// A 32-byte hash (Keccak-256 throughout the ledger).
pub type Hash = [u8; 32];

/// A 20-byte Ethereum-style account address.
pub type Address = [u8; 20];

/// Seconds since the Unix epoch.
pub type Timestamp = u64;

/// The null identity. Never a valid signer, owner, operator or fee account.
pub const ZERO_ADDRESS: Address = [0u8; 20];

/// The absent-hash marker.
pub const ZERO_HASH: Hash = [0u8; 32];

/// Identifier of a custodied asset.
///
/// Tokens are identified by their contract address; [`AssetId::NATIVE`]
/// stands for the chain's native currency.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct AssetId(pub Address);

impl AssetId {
    /// The chain's native currency.
    pub const NATIVE: AssetId = AssetId(ZERO_ADDRESS);

    pub fn is_native(&self) -> bool {
        *self == Self::NATIVE
    }

    pub fn as_bytes(&self) -> &Address {
        &self.0
    }
}

impl fmt::Debug for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_native() {
            write!(f, "AssetId(native)")
        } else {
            write!(f, "AssetId(0x{})", hex::encode(self.0))
        }
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_native() {
            write!(f, "native")
        } else {
            write!(f, "0x{}", hex::encode(self.0))
        }
    }
}

/// A signed change to one balance cell.
///
/// Amounts are unsigned 256-bit integers, so the sign is carried by the
/// variant instead of the number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Delta {
    Credit(U256),
    Debit(U256),
}

impl Delta {
    /// Magnitude of the change.
    pub fn amount(&self) -> U256 {
        match self {
            Delta::Credit(amount) | Delta::Debit(amount) => *amount,
        }
    }

    pub fn is_debit(&self) -> bool {
        matches!(self, Delta::Debit(_))
    }

    pub fn is_zero(&self) -> bool {
        self.amount().is_zero()
    }
}

/// A transfer out of custody owed to an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payout {
    pub recipient: Address,
    pub asset: AssetId,
    pub amount: U256,
}

/// Render an address as `0x`-prefixed lowercase hex for logs.
pub fn format_address(address: &Address) -> String {
    format!("0x{}", hex::encode(address))
}

/// Render a hash as `0x`-prefixed lowercase hex for logs.
pub fn format_hash(hash: &Hash) -> String {
    format!("0x{}", hex::encode(hash))
}
