//! Caller identities and native value.
//!
//! An identity is an opaque 20-byte account identifier supplied by the
//! execution environment. It is rendered as lower-case `0x`-prefixed hex.

use std::fmt;
use std::str::FromStr;

use rand::RngCore;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

use crate::error::{RegistryError, Result};

/// Amount of native value, in the smallest indivisible unit.
pub type NativeValue = u128;

/// Length of an identity in bytes.
pub const IDENTITY_LEN: usize = 20;

const LABEL_DOMAIN: &str = "healthchain:label:";

/// Opaque caller identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identity([u8; IDENTITY_LEN]);

impl Identity {
    /// Wrap raw identity bytes.
    pub const fn from_bytes(bytes: [u8; IDENTITY_LEN]) -> Self {
        Self(bytes)
    }

    /// Deterministic identity for a human-readable label.
    ///
    /// Format: first 20 bytes of SHA-256(`"healthchain:label:" + label`).
    pub fn from_label(label: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(LABEL_DOMAIN.as_bytes());
        hasher.update(label.as_bytes());
        let hash = hasher.finalize();
        let mut bytes = [0u8; IDENTITY_LEN];
        bytes.copy_from_slice(&hash[..IDENTITY_LEN]);
        Self(bytes)
    }

    /// Fresh random identity.
    pub fn generate() -> Self {
        let mut bytes = [0u8; IDENTITY_LEN];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; IDENTITY_LEN] {
        &self.0
    }

    /// Hex form with `0x` prefix.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for Identity {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self> {
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .ok_or_else(|| RegistryError::InvalidIdentity(format!("missing 0x prefix: {s}")))?;

        if digits.len() != IDENTITY_LEN * 2 {
            return Err(RegistryError::InvalidIdentity(format!(
                "expected {} hex digits, got {}",
                IDENTITY_LEN * 2,
                digits.len()
            )));
        }

        let mut bytes = [0u8; IDENTITY_LEN];
        hex::decode_to_slice(digits, &mut bytes)
            .map_err(|e| RegistryError::InvalidIdentity(format!("{s}: {e}")))?;
        Ok(Self(bytes))
    }
}

impl Serialize for Identity {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Identity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Serde helper writing a [`NativeValue`] as a decimal string.
///
/// Keeps large amounts exact in JSON consumers limited to 64-bit numbers.
pub mod value_string {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::NativeValue;

    pub fn serialize<S: Serializer>(
        value: &NativeValue,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<NativeValue, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
