//! Registry of organizations, agents and subjects.
//!
//! The registry module provides:
//! - Record types for the three parties and their sponsor back-references
//! - An identity-keyed store enforcing one Agent and one Subject per identity
//! - Sponsor rosters for organizations

pub mod store;
pub mod types;

pub use store::RegistryStore;
pub use types::{Agent, Organization, RecordKind, Subject};
