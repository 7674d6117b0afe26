use skybook_core::repository::SessionWrite;
use skybook_core::{SessionBatch, SessionKey, SessionStore};
use std::collections::BTreeMap;
use tracing::debug;

/// In-memory session slots for a single visitor, ordered by key.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    slots: BTreeMap<SessionKey, String>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn keys(&self) -> Vec<SessionKey> {
        self.slots.keys().copied().collect()
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: SessionKey) -> Option<String> {
        self.slots.get(&key).cloned()
    }

    fn set(&mut self, key: SessionKey, value: String) {
        debug!("Session slot set: {} ({} bytes)", key, value.len());
        self.slots.insert(key, value);
    }

    fn remove(&mut self, key: SessionKey) {
        if self.slots.remove(&key).is_some() {
            debug!("Session slot removed: {}", key);
        }
    }

    fn clear(&mut self) {
        debug!("Session cleared ({} slots)", self.slots.len());
        self.slots.clear();
    }

    fn apply(&mut self, batch: SessionBatch) {
        // Stage on a copy so a reader never sees half a batch.
        let mut staged = self.slots.clone();
        for write in batch.into_writes() {
            match write {
                SessionWrite::Put(key, value) => {
                    staged.insert(key, value);
                }
                SessionWrite::Remove(key) => {
                    staged.remove(&key);
                }
            }
        }
        self.slots = staged;
    }
}
