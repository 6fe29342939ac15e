//! In-memory event sink.

use crate::ports::outbound::EventSink;
use parking_lot::RwLock;
use shared_types::LedgerEvent;

/// Append-only event buffer readers can inspect or drain.
#[derive(Debug, Default)]
pub struct InMemoryEventLog {
    events: RwLock<Vec<LedgerEvent>>,
}

impl InMemoryEventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every event published so far.
    pub fn events(&self) -> Vec<LedgerEvent> {
        self.events.read().clone()
    }

    /// Take every event published so far.
    pub fn drain(&self) -> Vec<LedgerEvent> {
        std::mem::take(&mut *self.events.write())
    }

    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }
}

impl EventSink for InMemoryEventLog {
    fn publish(&self, events: &[LedgerEvent]) {
        self.events.write().extend_from_slice(events);
    }
}
