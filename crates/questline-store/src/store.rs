//! The durable store capability.

use crate::error::Result;
use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Mutex, MutexGuard};

/// A key's new value, delivered to subscribers after a change
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeNotice {
    pub key: String,
    pub value: Vec<u8>,
}

/// Key/value persistence scoped to one account origin
///
/// Values are opaque bytes; callers own serialization. Every write that
/// changes a key's value is delivered to all live subscribers of that key,
/// including the writer's own subscriptions - loop prevention is the
/// consumer's job (diff before apply).
pub trait DurableStore: Send + Sync {
    /// Read the current value of a key
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Write a value; no-op (and no notification) if the value is unchanged
    fn write(&self, key: &str, value: &[u8]) -> Result<()>;

    /// Subscribe to changes of one key
    ///
    /// The receiver stays valid for the life of the store; dropped receivers
    /// are pruned on the next notification.
    fn subscribe(&self, key: &str) -> Receiver<ChangeNotice>;
}

/// Per-key subscriber registry shared by the store implementations
#[derive(Debug, Default)]
pub(crate) struct Subscribers {
    channels: Mutex<HashMap<String, Vec<Sender<ChangeNotice>>>>,
}

impl Subscribers {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn subscribe(&self, key: &str) -> Receiver<ChangeNotice> {
        let (tx, rx) = mpsc::channel();
        self.lock().entry(key.to_string()).or_default().push(tx);
        rx
    }

    /// Deliver a change to every live subscriber of the key
    ///
    /// Senders whose receiver has been dropped are pruned here.
    pub(crate) fn notify(&self, key: &str, value: &[u8]) {
        let mut channels = self.lock();
        if let Some(senders) = channels.get_mut(key) {
            senders.retain(|tx| {
                tx.send(ChangeNotice {
                    key: key.to_string(),
                    value: value.to_vec(),
                })
                .is_ok()
            });
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Vec<Sender<ChangeNotice>>>> {
        // A poisoned registry only means another subscriber panicked; the
        // map itself is still usable.
        self.channels
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
