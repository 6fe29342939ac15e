//! Shared handle serializing calls into one [`LedgerService`].

use crate::ports::outbound::{Custody, EventSink, TimeSource};
use crate::service::LedgerService;
use cl_02_authentication::{EcdsaRecovery, SignatureRecovery};
use parking_lot::Mutex;
use std::sync::Arc;

/// Cloneable handle; every call holds the lock for its whole duration, so
/// calls never interleave.
pub struct LedgerHandle<C, T, S, R = EcdsaRecovery>
where
    C: Custody,
    T: TimeSource,
    S: EventSink,
    R: SignatureRecovery,
{
    inner: Arc<Mutex<LedgerService<C, T, S, R>>>,
}

impl<C, T, S, R> LedgerHandle<C, T, S, R>
where
    C: Custody,
    T: TimeSource,
    S: EventSink,
    R: SignatureRecovery,
{
    pub fn new(service: LedgerService<C, T, S, R>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(service)),
        }
    }

    /// Run `call` with exclusive access to the ledger.
    pub fn with<V>(&self, call: impl FnOnce(&mut LedgerService<C, T, S, R>) -> V) -> V {
        let mut service = self.inner.lock();
        call(&mut service)
    }
}

impl<C, T, S, R> Clone for LedgerHandle<C, T, S, R>
where
    C: Custody,
    T: TimeSource,
    S: EventSink,
    R: SignatureRecovery,
{
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}
