//! # Durable Balance Store

use crate::domain::changeset::{ChangeSet, UndoLog};
use crate::ports::{BalanceLedger, BalanceReader};
use shared_types::{Address, AssetId, U256};
use std::collections::HashMap;

/// The authoritative balance of every (account, asset) cell.
///
/// Zero balances are not stored, so the map only grows with funded cells.
#[derive(Debug, Clone, Default)]
pub struct BalanceStore {
    cells: HashMap<(Address, AssetId), U256>,
}

impl BalanceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write every cell of `changes` and return what was there before.
    pub fn apply(&mut self, changes: &ChangeSet) -> UndoLog {
        let mut undo = UndoLog::default();
        for (account, asset, value) in changes.iter() {
            undo.previous
                .push((*account, *asset, self.balance(account, asset)));
            self.set_balance(*account, *asset, *value);
        }
        tracing::debug!(cells = undo.len(), "applied balance change set");
        undo
    }

    /// Restore the values captured by [`BalanceStore::apply`].
    pub fn revert(&mut self, undo: UndoLog) {
        let cells = undo.len();
        for (account, asset, value) in undo.previous.into_iter().rev() {
            self.set_balance(account, asset, value);
        }
        tracing::debug!(cells, "reverted balance change set");
    }

    /// Number of funded cells.
    pub fn funded_cells(&self) -> usize {
        self.cells.len()
    }

    /// Sum of every balance held in `asset`.
    pub fn total_supply(&self, asset: &AssetId) -> U256 {
        self.cells
            .iter()
            .filter(|((_, cell_asset), _)| cell_asset == asset)
            .fold(U256::zero(), |acc, (_, value)| acc.saturating_add(*value))
    }
}

impl BalanceReader for BalanceStore {
    fn balance(&self, account: &Address, asset: &AssetId) -> U256 {
        self.cells
            .get(&(*account, *asset))
            .copied()
            .unwrap_or_default()
    }
}

impl BalanceLedger for BalanceStore {
    fn set_balance(&mut self, account: Address, asset: AssetId, value: U256) {
        if value.is_zero() {
            self.cells.remove(&(account, asset));
        } else {
            self.cells.insert((account, asset), value);
        }
    }
}
