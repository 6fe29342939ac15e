//! # Scratch Overlay
//!
//! Copy-on-write view over any [`BalanceReader`]. Writes stay in the overlay
//! until it is turned into a [`ChangeSet`]; dropping it discards them.
//!
//! Overlays nest: a per-item overlay over a per-batch overlay lets one batch
//! item fail without disturbing the items before it.

use crate::domain::changeset::ChangeSet;
use crate::ports::{BalanceLedger, BalanceReader};
use shared_types::{Address, AssetId, U256};

pub struct BalanceOverlay<'a, R: BalanceReader + ?Sized> {
    base: &'a R,
    writes: ChangeSet,
}

impl<'a, R: BalanceReader + ?Sized> BalanceOverlay<'a, R> {
    pub fn new(base: &'a R) -> Self {
        Self {
            base,
            writes: ChangeSet::new(),
        }
    }

    /// Fold the writes of a finished child overlay into this one.
    pub fn absorb(&mut self, child: ChangeSet) {
        self.writes.merge(child);
    }

    /// Number of cells written so far.
    pub fn touched(&self) -> usize {
        self.writes.len()
    }

    pub fn into_changeset(self) -> ChangeSet {
        self.writes
    }
}

impl<R: BalanceReader + ?Sized> BalanceReader for BalanceOverlay<'_, R> {
    fn balance(&self, account: &Address, asset: &AssetId) -> U256 {
        self.writes
            .get(account, asset)
            .unwrap_or_else(|| self.base.balance(account, asset))
    }
}

impl<R: BalanceReader + ?Sized> BalanceLedger for BalanceOverlay<'_, R> {
    fn set_balance(&mut self, account: Address, asset: AssetId, value: U256) {
        self.writes.set(account, asset, value);
    }
}
