//! Shared in-memory store.
//!
//! One `MemoryStore` models one browser origin: every view attached to the
//! same instance sees the same values and hears the same notifications.
//! Used by tests and simulations; the contract is identical to
//! [`NativeStore`](crate::NativeStore).

use crate::error::Result;
use crate::store::{ChangeNotice, DurableStore, Subscribers};
use std::collections::HashMap;
use std::sync::mpsc::Receiver;
use std::sync::{Arc, Mutex, MutexGuard};

/// In-memory key/value store with change notifications
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, Vec<u8>>>,
    subscribers: Subscribers,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store already wrapped for sharing between views
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Vec<u8>>> {
        self.values
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl DurableStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.lock().get(key).cloned())
    }

    fn write(&self, key: &str, value: &[u8]) -> Result<()> {
        {
            let mut values = self.lock();
            if values.get(key).is_some_and(|v| v.as_slice() == value) {
                return Ok(());
            }
            values.insert(key.to_string(), value.to_vec());
        }
        tracing::trace!(key, len = value.len(), "store value changed");
        self.subscribers.notify(key, value);
        Ok(())
    }

    fn subscribe(&self, key: &str) -> Receiver<ChangeNotice> {
        self.subscribers.subscribe(key)
    }
}
