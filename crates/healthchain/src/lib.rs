//! Healthchain: a sponsored registry with a deposit ledger.
//!
//! Binds three kinds of parties (sponsoring organizations, affiliated
//! agents and enrolled subjects) and tracks a per-identity deposit ledger.
//! Every call is attributed to a caller identity, checked against the access
//! rules, applied atomically and logged as exactly one event.

pub mod access;
pub mod config;
pub mod contract;
pub mod error;
pub mod events;
pub mod identity;
pub mod ledger;
pub mod registry;
pub mod storage;
pub mod value;

// Re-export primary types
pub use access::{AccessRule, Operation};
pub use config::{ReRegistration, RegistryConfig, SponsorRequirement};
pub use contract::{CallContext, Healthchain};
pub use error::{ErrorKind, RegistryError, Result};
pub use events::{EventLog, LoggedEvent, RegistryEvent};
pub use identity::{Identity, NativeValue};
pub use ledger::Ledger;
pub use registry::{Agent, Organization, RecordKind, RegistryStore, Subject};
pub use value::{Accounts, ValueSubstrate};
