//! Data structures for registry records.

use serde::{Deserialize, Serialize};

use crate::identity::Identity;

// ---------------------------------------------------------------------------
// Record kinds
// ---------------------------------------------------------------------------

/// The three kinds of registry record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Organization,
    Agent,
    Subject,
}

impl RecordKind {
    /// Return a stable string tag.
    pub fn as_tag(&self) -> &'static str {
        match self {
            Self::Organization => "organization",
            Self::Agent => "agent",
            Self::Subject => "subject",
        }
    }
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_tag())
    }
}

// ---------------------------------------------------------------------------
// Organization
// ---------------------------------------------------------------------------

/// A sponsoring organization. Created by self-registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub name: String,
}

impl Organization {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

// ---------------------------------------------------------------------------
// Agent
// ---------------------------------------------------------------------------

/// An agent affiliated with the organization that registered it.
///
/// `sponsor` is fixed at creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    pub credential: String,
    pub sponsor: Identity,
}

impl Agent {
    pub fn new(credential: impl Into<String>, sponsor: Identity) -> Self {
        Self {
            credential: credential.into(),
            sponsor,
        }
    }

    /// Fields in contract order: `(credential, sponsor)`.
    pub fn into_tuple(self) -> (String, Identity) {
        (self.credential, self.sponsor)
    }
}

// ---------------------------------------------------------------------------
// Subject
// ---------------------------------------------------------------------------

/// An enrolled subject.
///
/// Only `condition` and `sensitivities` change after creation; `classifier`
/// and `sponsor` are fixed.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub condition: String,
    pub sensitivities: String,
    pub classifier: String,
    pub sponsor: Identity,
}

impl Subject {
    pub fn new(
        condition: impl Into<String>,
        sensitivities: impl Into<String>,
        classifier: impl Into<String>,
        sponsor: Identity,
    ) -> Self {
        Self {
            condition: condition.into(),
            sensitivities: sensitivities.into(),
            classifier: classifier.into(),
            sponsor,
        }
    }

    /// Fields in contract order: `(condition, sensitivities, classifier, sponsor)`.
    pub fn into_tuple(self) -> (String, String, String, Identity) {
        (
            self.condition,
            self.sensitivities,
            self.classifier,
            self.sponsor,
        )
    }
}

// Health data stays out of logs and panic messages.
impl std::fmt::Debug for Subject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subject")
            .field("condition", &"<redacted>")
            .field("sensitivities", &"<redacted>")
            .field("classifier", &"<redacted>")
            .field("sponsor", &self.sponsor)
            .finish()
    }
}
