//! # In-Memory Custody
//!
//! External wallets plus one vault per asset. Deposits move funds from a
//! wallet into the vault and payouts move them back.

use crate::ports::outbound::{Custody, CustodyError};
use parking_lot::Mutex;
use shared_types::{Address, AssetId, Payout, U256};
use std::collections::HashMap;

/// Pseudo-account the vault balances are reported under.
const VAULT: Address = [0xFF; 20];

#[derive(Debug, Default)]
struct Holdings {
    wallets: HashMap<(Address, AssetId), U256>,
    vault: HashMap<AssetId, U256>,
}

impl Holdings {
    fn wallet(&self, account: &Address, asset: &AssetId) -> U256 {
        self.wallets
            .get(&(*account, *asset))
            .copied()
            .unwrap_or_default()
    }

    fn vault(&self, asset: &AssetId) -> U256 {
        self.vault.get(asset).copied().unwrap_or_default()
    }

    fn wallet_mut(&mut self, account: Address, asset: AssetId) -> &mut U256 {
        self.wallets.entry((account, asset)).or_default()
    }

    fn vault_mut(&mut self, asset: AssetId) -> &mut U256 {
        self.vault.entry(asset).or_default()
    }
}

/// Thread-safe custody backed by in-memory maps.
#[derive(Debug, Default)]
pub struct InMemoryCustody {
    holdings: Mutex<Holdings>,
}

impl InMemoryCustody {
    pub fn new() -> Self {
        Self::default()
    }

    /// Give `account` external funds it can deposit.
    pub fn fund(&self, account: Address, asset: AssetId, amount: U256) {
        let mut holdings = self.holdings.lock();
        let wallet = holdings.wallet_mut(account, asset);
        *wallet = wallet.saturating_add(amount);
    }

    /// External funds of `account`.
    pub fn wallet(&self, account: &Address, asset: &AssetId) -> U256 {
        self.holdings.lock().wallet(account, asset)
    }

    /// Funds held in custody for `asset`.
    pub fn vault(&self, asset: &AssetId) -> U256 {
        self.holdings.lock().vault(asset)
    }
}

impl Custody for InMemoryCustody {
    fn transfer_in(&self, from: &Address, asset: &AssetId, amount: U256) -> Result<(), CustodyError> {
        let mut holdings = self.holdings.lock();
        let available = holdings.wallet(from, asset);
        let remaining = available
            .checked_sub(amount)
            .ok_or(CustodyError::InsufficientFunds {
                account: *from,
                asset: *asset,
                required: amount,
                available,
            })?;

        *holdings.wallet_mut(*from, *asset) = remaining;
        let vault = holdings.vault_mut(*asset);
        *vault = vault.saturating_add(amount);
        Ok(())
    }

    fn transfer_out(&self, payouts: &[Payout]) -> Result<(), CustodyError> {
        let mut holdings = self.holdings.lock();

        let mut needed: HashMap<AssetId, U256> = HashMap::new();
        for payout in payouts {
            let total = needed.entry(payout.asset).or_default();
            *total = total.saturating_add(payout.amount);
        }
        for (asset, required) in &needed {
            let available = holdings.vault(asset);
            if available < *required {
                return Err(CustodyError::InsufficientFunds {
                    account: VAULT,
                    asset: *asset,
                    required: *required,
                    available,
                });
            }
        }

        for payout in payouts {
            let vault = holdings.vault_mut(payout.asset);
            *vault -= payout.amount;
            let wallet = holdings.wallet_mut(payout.recipient, payout.asset);
            *wallet = wallet.saturating_add(payout.amount);
        }
        Ok(())
    }

    fn reclaim(&self, payouts: &[Payout]) -> Result<(), CustodyError> {
        let mut holdings = self.holdings.lock();

        let mut needed: HashMap<(Address, AssetId), U256> = HashMap::new();
        for payout in payouts {
            let total = needed.entry((payout.recipient, payout.asset)).or_default();
            *total = total.saturating_add(payout.amount);
        }
        for ((account, asset), required) in &needed {
            let available = holdings.wallet(account, asset);
            if available < *required {
                return Err(CustodyError::InsufficientFunds {
                    account: *account,
                    asset: *asset,
                    required: *required,
                    available,
                });
            }
        }

        for payout in payouts {
            *holdings.wallet_mut(payout.recipient, payout.asset) -= payout.amount;
            let vault = holdings.vault_mut(payout.asset);
            *vault = vault.saturating_add(payout.amount);
        }
        Ok(())
    }
}
