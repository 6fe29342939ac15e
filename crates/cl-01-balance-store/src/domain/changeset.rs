//! # Change Sets and Undo Logs
//!
//! A [`ChangeSet`] is the final value of every cell a scratch evaluation
//! touched. Applying it to the store yields an [`UndoLog`] holding the values
//! it overwrote.

use shared_types::{Address, AssetId, U256};
use std::collections::BTreeMap;

/// Final balances produced by a scratch evaluation, keyed by cell.
///
/// Ordered so that applying the same change set is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    cells: BTreeMap<(Address, AssetId), U256>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, account: Address, asset: AssetId, value: U256) {
        self.cells.insert((account, asset), value);
    }

    pub fn get(&self, account: &Address, asset: &AssetId) -> Option<U256> {
        self.cells.get(&(*account, *asset)).copied()
    }

    /// Fold `later` on top of this change set; `later` wins on overlap.
    pub fn merge(&mut self, later: ChangeSet) {
        self.cells.extend(later.cells);
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Address, &AssetId, &U256)> {
        self.cells
            .iter()
            .map(|((account, asset), value)| (account, asset, value))
    }
}

/// Previous values of every cell a [`ChangeSet`] overwrote.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UndoLog {
    pub(crate) previous: Vec<(Address, AssetId, U256)>,
}

impl UndoLog {
    pub fn len(&self) -> usize {
        self.previous.len()
    }

    pub fn is_empty(&self) -> bool {
        self.previous.is_empty()
    }
}
