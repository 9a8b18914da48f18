//! Questline Store - Durable key/value persistence with change notifications
//!
//! Models the one shared store behind every open view of an account:
//! - [`DurableStore`] - the capability: read/write opaque byte values by key,
//!   subscribe to per-key change notifications
//! - [`MemoryStore`] - shared in-memory implementation, one "origin" with any
//!   number of attached views
//! - [`NativeStore`] - `native_db`-backed implementation for on-disk state
//!
//! A write that leaves a key's value unchanged emits no notification, so
//! subscribers only ever hear about real changes. The contract is
//! last-write-wins at value granularity; consumers diff before applying.

mod error;
pub mod keys;
mod memory;
mod native;
mod store;

pub use error::{Error, Result};
pub use memory::MemoryStore;
pub use native::NativeStore;
pub use store::{ChangeNotice, DurableStore};
