//! # Sovereign Request

use serde::{Deserialize, Serialize};
use shared_types::{AssetId, Timestamp, U256};

/// A pending sovereign withdrawal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SovereignRequest {
    pub asset: AssetId,
    /// Zero means the whole balance at completion time.
    pub amount: U256,
    pub requested_at: Timestamp,
}

impl SovereignRequest {
    /// Same asset and amount. The timestamp is not compared.
    pub fn matches(&self, asset: &AssetId, amount: U256) -> bool {
        self.asset == *asset && self.amount == amount
    }

    /// First instant at which the request may be completed.
    pub fn ready_at(&self, delay: u64) -> Timestamp {
        self.requested_at.saturating_add(delay)
    }
}
