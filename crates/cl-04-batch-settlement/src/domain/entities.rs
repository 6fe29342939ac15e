//! # Batch Payloads
//!
//! The operator submits batches as canonical bincode bytes of
//! [`BatchPayload`]. They are decoded once at the boundary; everything past
//! the codec works on these typed values.

use cl_02_authentication::EcdsaSignature;
use serde::{Deserialize, Serialize};
use shared_types::{Address, AssetId, Hash, U256};

// =============================================================================
// WITHDRAWALS
// =============================================================================

/// One user withdrawal inside an operator batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawalItem {
    /// Operator-assigned id, echoed in events for correlation only.
    pub sequence: u64,
    pub sender: Address,
    pub asset: AssetId,
    /// Zero withdraws the entire balance.
    pub amount: U256,
    pub nonce: u64,
    /// Paid to the fee account out of the withdrawn amount.
    pub fee: U256,
    /// Over `(sender, asset, amount, nonce)`; null for sovereign completion.
    pub signature: EcdsaSignature,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawalBatch {
    pub items: Vec<WithdrawalItem>,
}

// =============================================================================
// SETTLEMENT
// =============================================================================

/// A credit or debit of one wallet, addressed by its index in
/// [`SettlementBatch::wallets`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletAdjustment {
    pub wallet_index: u32,
    pub amount: U256,
}

/// All balance movements of one asset in a settlement batch.
///
/// Must net to zero: `sum(increments) + fee == sum(decrements)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetAdjustments {
    pub asset: AssetId,
    pub increments: Vec<WalletAdjustment>,
    pub decrements: Vec<WalletAdjustment>,
    /// Credited to the fee account.
    pub fee: U256,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementBatch {
    pub wallets: Vec<Address>,
    /// One list per wallet, parallel to `wallets`. Opaque to the ledger.
    pub trade_hashes: Vec<Vec<Hash>>,
    pub adjustments: Vec<AssetAdjustments>,
}

impl SettlementBatch {
    pub fn wallet(&self, index: u32) -> Option<&Address> {
        self.wallets.get(index as usize)
    }

    pub fn trade_hashes_of(&self, index: u32) -> Vec<Hash> {
        self.trade_hashes
            .get(index as usize)
            .cloned()
            .unwrap_or_default()
    }
}

// =============================================================================
// ENVELOPE
// =============================================================================

/// Every batch the operator can submit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BatchPayload {
    Withdrawals(WithdrawalBatch),
    Settlement(SettlementBatch),
}

impl BatchPayload {
    pub fn kind(&self) -> &'static str {
        match self {
            BatchPayload::Withdrawals(_) => "withdrawals",
            BatchPayload::Settlement(_) => "settlement",
        }
    }
}
