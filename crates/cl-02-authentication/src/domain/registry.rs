//! # Signer Registries
//!
//! - [`LinkedSignerRegistry`]: at most one active delegate per account.
//! - [`ReplayGuard`]: withdrawal nonces already consumed per account.

use super::errors::AuthError;
use shared_types::{Address, ZERO_ADDRESS};
use std::collections::{HashMap, HashSet};

/// Account → delegate mapping with per-account link nonces.
#[derive(Debug, Clone, Default)]
pub struct LinkedSignerRegistry {
    links: HashMap<Address, Address>,
    nonces: HashMap<Address, u64>,
}

impl LinkedSignerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check that `signer` may be linked to `account` with `nonce`.
    pub fn check_link(&self, account: &Address, signer: &Address, nonce: u64) -> Result<(), AuthError> {
        if *signer == ZERO_ADDRESS {
            return Err(AuthError::ZeroAddress);
        }
        if signer == account {
            return Err(AuthError::SelfLink);
        }
        if let Some(&last) = self.nonces.get(account) {
            if nonce <= last {
                return Err(AuthError::StaleNonce { last, given: nonce });
            }
        }
        Ok(())
    }

    /// Link `signer` to `account`, replacing any previous delegate.
    ///
    /// Returns the delegate that was replaced.
    pub fn link(
        &mut self,
        account: Address,
        signer: Address,
        nonce: u64,
    ) -> Result<Option<Address>, AuthError> {
        self.check_link(&account, &signer, nonce)?;
        self.nonces.insert(account, nonce);
        Ok(self.links.insert(account, signer))
    }

    /// Remove the delegate of `account`. The nonce high-water mark is kept.
    pub fn unlink(&mut self, account: &Address) -> Option<Address> {
        self.links.remove(account)
    }

    pub fn delegate_of(&self, account: &Address) -> Option<Address> {
        self.links.get(account).copied()
    }

    pub fn last_nonce(&self, account: &Address) -> Option<u64> {
        self.nonces.get(account).copied()
    }
}

/// Withdrawal nonces that have already authorized a debit.
#[derive(Debug, Clone, Default)]
pub struct ReplayGuard {
    used: HashSet<(Address, u64)>,
}

impl ReplayGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_used(&self, account: &Address, nonce: u64) -> bool {
        self.used.contains(&(*account, nonce))
    }

    /// Mark a nonce as used. Returns `false` if it already was.
    pub fn consume(&mut self, account: Address, nonce: u64) -> bool {
        self.used.insert((account, nonce))
    }

    /// Forget a nonce, making it usable again.
    pub fn release(&mut self, account: &Address, nonce: u64) {
        self.used.remove(&(*account, nonce));
    }
}
