//! # Balance Ports
//!
//! Read and write access to balance cells. Both the durable store and the
//! scratch overlay implement these, so the adjustment engine never needs to
//! know whether it is running for real or as a dry run.

use shared_types::{Address, AssetId, U256};

/// Read-only view of balances.
pub trait BalanceReader {
    /// Current balance of `(account, asset)`. Absent cells read as zero.
    fn balance(&self, account: &Address, asset: &AssetId) -> U256;
}

/// Mutable view of balances.
///
/// Callers outside this crate go through [`crate::adjust`]; `set_balance` is
/// the primitive it is built on.
pub trait BalanceLedger: BalanceReader {
    fn set_balance(&mut self, account: Address, asset: AssetId, value: U256);
}

impl<R: BalanceReader + ?Sized> BalanceReader for &R {
    fn balance(&self, account: &Address, asset: &AssetId) -> U256 {
        (**self).balance(account, asset)
    }
}

impl<R: BalanceReader + ?Sized> BalanceReader for &mut R {
    fn balance(&self, account: &Address, asset: &AssetId) -> U256 {
        (**self).balance(account, asset)
    }
}

impl<L: BalanceLedger + ?Sized> BalanceLedger for &mut L {
    fn set_balance(&mut self, account: Address, asset: AssetId, value: U256) {
        (**self).set_balance(account, asset, value)
    }
}
