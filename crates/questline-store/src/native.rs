//! native_db-backed store.

use crate::error::{Error, Result};
use crate::store::{ChangeNotice, DurableStore, Subscribers};
use native_db::*;
use native_model::{native_model, Model};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::mpsc::Receiver;
use std::sync::LazyLock;

// Static models for the database
static MODELS: LazyLock<Models> = LazyLock::new(|| {
    let mut models = Models::new();
    models.define::<StoredValue>().unwrap();
    models
});

/// One stored key/value row.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[native_model(id = 1, version = 1)]
#[native_db]
struct StoredValue {
    /// Primary key - the store key.
    #[primary_key]
    key: String,
    /// Opaque serialized value.
    value: Vec<u8>,
}

/// Durable store backed by native_db
///
/// Notifications cover writes through this instance; a second process
/// opening the same file does not hear them. That matches the deployment
/// shape: one store process, many in-process views.
pub struct NativeStore {
    db: Database<'static>,
    subscribers: Subscribers,
}

impl NativeStore {
    /// Open or create a database at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let db = Builder::new()
            .create(&MODELS, path.as_ref())
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(Self {
            db,
            subscribers: Subscribers::new(),
        })
    }

    /// Create an in-memory database.
    pub fn in_memory() -> Result<Self> {
        let db = Builder::new()
            .create_in_memory(&MODELS)
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(Self {
            db,
            subscribers: Subscribers::new(),
        })
    }
}

impl DurableStore for NativeStore {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let r = self.db.r_transaction()?;
        let stored: Option<StoredValue> = r.get().primary(key.to_string())?;
        Ok(stored.map(|s| s.value))
    }

    fn write(&self, key: &str, value: &[u8]) -> Result<()> {
        let rw = self.db.rw_transaction()?;
        let existing: Option<StoredValue> = rw.get().primary(key.to_string())?;
        if existing.is_some_and(|e| e.value == value) {
            return Ok(());
        }
        rw.upsert(StoredValue {
            key: key.to_string(),
            value: value.to_vec(),
        })?;
        rw.commit()?;

        tracing::trace!(key, len = value.len(), "store value changed");
        self.subscribers.notify(key, value);
        Ok(())
    }

    fn subscribe(&self, key: &str) -> Receiver<ChangeNotice> {
        self.subscribers.subscribe(key)
    }
}

impl From<native_db::db_type::Error> for Error {
    fn from(err: native_db::db_type::Error) -> Self {
        Error::Database(err.to_string())
    }
}
