//! Questline Sync - Cross-view consistency over one durable store
//!
//! Multiple independently running views of the same account (two open tabs)
//! share one [`DurableStore`](questline_store::DurableStore). This crate
//! keeps them consistent:
//!
//! - [`AccountSnapshot`]: the full serialized account state, the unit of
//!   synchronization (last-write-wins, never a field-level merge)
//! - [`SyncCoordinator`]: persists snapshots after local mutations and merges
//!   inbound changes without feedback loops (diff-before-apply plus tracking
//!   the last value this view itself wrote)
//! - [`DailyQuestGenerator`]: idempotent per-calendar-day quest generation
//!   against the shared store
//! - [`View`]: one open view of the account; every operation from the core
//!   crate wired to persistence, guards and the leaderboard
//!
//! There is no distributed consensus here - one physical store, cooperative
//! single-threaded views - only the re-entrant notification loop to defuse.

pub mod codec;
mod coordinator;
mod error;
mod generator;
mod guard;
mod view;

pub use codec::AccountSnapshot;
pub use coordinator::SyncCoordinator;
pub use error::{Error, Result};
pub use generator::DailyQuestGenerator;
pub use guard::OpGuard;
pub use view::View;
