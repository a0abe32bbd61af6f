//! Access control: who may invoke each registry operation.
//!
//! The access module provides:
//! - The [`Operation`] catalogue of every entry point
//! - The [`AccessRule`] assigned to each operation
//! - Stateless evaluation of a rule against the current registry snapshot

pub mod policy;

pub use policy::{authorize, AccessRule, Operation, Target};
