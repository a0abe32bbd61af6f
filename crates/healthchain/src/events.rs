//! Notifications emitted by successful state transitions.
//!
//! Every successful mutating operation emits exactly one [`RegistryEvent`].
//! The contract appends it to its [`EventLog`] with a sequence number and
//! timestamp, and returns the logged entry to the caller.

use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identity::{Identity, NativeValue};

/// A state transition and its key arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum RegistryEvent {
    OrganizationRegistered {
        organization: Identity,
        name: String,
    },
    AgentRegistered {
        agent: Identity,
    },
    SubjectRegistered {
        subject: Identity,
    },
    SubjectUpdated {
        subject: Identity,
    },
    SubjectDeleted {
        subject: Identity,
    },
    AgentDeleted {
        agent: Identity,
    },
    DepositMade {
        depositor: Identity,
        #[serde(with = "crate::identity::value_string")]
        amount: NativeValue,
    },
}

impl RegistryEvent {
    /// Stable event name.
    pub fn event_name(&self) -> &'static str {
        match self {
            Self::OrganizationRegistered { .. } => "OrganizationRegistered",
            Self::AgentRegistered { .. } => "AgentRegistered",
            Self::SubjectRegistered { .. } => "SubjectRegistered",
            Self::SubjectUpdated { .. } => "SubjectUpdated",
            Self::SubjectDeleted { .. } => "SubjectDeleted",
            Self::AgentDeleted { .. } => "AgentDeleted",
            Self::DepositMade { .. } => "DepositMade",
        }
    }

    /// The identity the event is about.
    pub fn subject_identity(&self) -> Identity {
        match self {
            Self::OrganizationRegistered { organization, .. } => *organization,
            Self::AgentRegistered { agent } | Self::AgentDeleted { agent } => *agent,
            Self::SubjectRegistered { subject }
            | Self::SubjectUpdated { subject }
            | Self::SubjectDeleted { subject } => *subject,
            Self::DepositMade { depositor, .. } => *depositor,
        }
    }
}

/// An event as recorded in the log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggedEvent {
    /// Position in the log, starting at 1.
    pub sequence: u64,
    /// Microseconds since Unix epoch.
    pub emitted_at: u64,
    pub event: RegistryEvent,
}

impl LoggedEvent {
    /// Emission time as an RFC 3339 string.
    pub fn emitted_at_rfc3339(&self) -> String {
        let secs = (self.emitted_at / 1_000_000) as i64;
        let nanos = ((self.emitted_at % 1_000_000) * 1_000) as u32;
        DateTime::<Utc>::from_timestamp(secs, nanos)
            .unwrap_or(DateTime::UNIX_EPOCH)
            .to_rfc3339()
    }
}

// A clock set before the epoch reads as zero.
fn clock_micros() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_micros() as u64)
        .unwrap_or(0)
}

/// Append-only event log.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventLog {
    entries: Vec<LoggedEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event and return the logged entry.
    pub fn emit(&mut self, event: RegistryEvent) -> LoggedEvent {
        let logged = LoggedEvent {
            sequence: self.entries.len() as u64 + 1,
            emitted_at: clock_micros(),
            event,
        };
        log::info!(
            "event #{} {} {}",
            logged.sequence,
            logged.event.event_name(),
            logged.event.subject_identity()
        );
        self.entries.push(logged.clone());
        logged
    }

    pub fn entries(&self) -> &[LoggedEvent] {
        &self.entries
    }

    /// Entries with a sequence number greater than `sequence`.
    pub fn since(&self, sequence: u64) -> &[LoggedEvent] {
        let start = (sequence as usize).min(self.entries.len());
        &self.entries[start..]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
