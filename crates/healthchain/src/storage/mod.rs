//! Storage layer for contract state.
//!
//! The whole contract (registry, ledger, accounts, event log and policy) is
//! persisted as a single versioned JSON snapshot. The CLI loads it before a
//! call and saves it after a successful one.
//!
//! # Modules
//!
//! - [`snapshot`]: save/load of a [`crate::Healthchain`] snapshot file.

pub mod snapshot;

pub use snapshot::{load_snapshot, save_snapshot, SNAPSHOT_VERSION};
