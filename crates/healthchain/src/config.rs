//! Registry policy configuration.
//!
//! Two policies are left open by the observed behaviour of the registry and
//! are therefore explicit knobs rather than hard-coded choices.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{RegistryError, Result};

/// What happens when an identity that already holds an Organization record
/// registers as an Organization again.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReRegistration {
    /// Replace the stored name.
    #[default]
    Overwrite,
    /// Fail with `AlreadyRegistered`.
    Reject,
}

/// Who may act as the sponsor of a new Agent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SponsorRequirement {
    /// The caller must hold an Organization record.
    #[default]
    RequireOrganization,
    /// Any caller may register agents and becomes their sponsor.
    AnyCaller,
}

/// Policy knobs for a registry instance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    pub organization_reregistration: ReRegistration,
    pub agent_sponsor: SponsorRequirement,
}

impl RegistryConfig {
    pub fn with_reregistration(mut self, policy: ReRegistration) -> Self {
        self.organization_reregistration = policy;
        self
    }

    pub fn with_agent_sponsor(mut self, requirement: SponsorRequirement) -> Self {
        self.agent_sponsor = requirement;
        self
    }

    /// Load a JSON config file. Missing fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        serde_json::from_slice(&bytes).map_err(|e| {
            RegistryError::InvalidFileFormat(format!(
                "failed to parse config {}: {e}",
                path.display()
            ))
        })
    }
}
