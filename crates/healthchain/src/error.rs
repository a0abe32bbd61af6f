//! Error types for Healthchain.
//!
//! Registry failures come in exactly three kinds (`AlreadyRegistered`,
//! `NotFound`, `Unauthorized`). The remaining variants belong to the
//! execution environment or to snapshot persistence. Subject health data is
//! never included in error messages.

use crate::identity::NativeValue;

/// Error types covering every registry, ledger and storage operation.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Already registered: {0}")]
    AlreadyRegistered(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Operation does not accept attached value: {0}")]
    NotPayable(String),

    #[error("Insufficient funds: needed {needed}, available {available}")]
    InsufficientFunds {
        needed: NativeValue,
        available: NativeValue,
    },

    #[error("Value overflow")]
    ValueOverflow,

    #[error("Invalid identity: {0}")]
    InvalidIdentity(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Invalid file format: {0}")]
    InvalidFileFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse classification of a [`RegistryError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    AlreadyRegistered,
    NotFound,
    Unauthorized,
    /// Rejected by the execution environment (value, identity parsing).
    Environment,
    /// Snapshot persistence failed.
    Storage,
}

impl RegistryError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::AlreadyRegistered(_) => ErrorKind::AlreadyRegistered,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Unauthorized(_) => ErrorKind::Unauthorized,
            Self::NotPayable(_)
            | Self::InsufficientFunds { .. }
            | Self::ValueOverflow
            | Self::InvalidIdentity(_) => ErrorKind::Environment,
            Self::SerializationError(_) | Self::InvalidFileFormat(_) | Self::Io(_) => {
                ErrorKind::Storage
            }
        }
    }
}

/// Convenience Result alias.
pub type Result<T> = std::result::Result<T, RegistryError>;
