//! Identity-keyed storage for registry records.
//!
//! Three independent collections share one key space. An identity may hold
//! an Organization, an Agent and a Subject record at the same time, but at
//! most one of each.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{RegistryError, Result};
use crate::identity::Identity;

use super::types::{Agent, Organization, RecordKind, Subject};

/// In-memory registry store.
///
/// The store enforces uniqueness and existence only. Who may call what is
/// decided by [`crate::access`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryStore {
    organizations: HashMap<Identity, Organization>,
    agents: HashMap<Identity, Agent>,
    subjects: HashMap<Identity, Subject>,
}

impl RegistryStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Organizations ─────────────────────────────────────────────────────────

    /// Store an organization, returning the record it replaced.
    pub fn put_organization(
        &mut self,
        id: Identity,
        organization: Organization,
    ) -> Option<Organization> {
        self.organizations.insert(id, organization)
    }

    pub fn organization(&self, id: &Identity) -> Option<&Organization> {
        self.organizations.get(id)
    }

    pub fn is_organization(&self, id: &Identity) -> bool {
        self.organizations.contains_key(id)
    }

    pub fn require_organization(&self, id: &Identity) -> Result<&Organization> {
        self.organization(id)
            .ok_or_else(|| not_found(RecordKind::Organization, id))
    }

    // ── Agents ────────────────────────────────────────────────────────────────

    pub fn agent(&self, id: &Identity) -> Option<&Agent> {
        self.agents.get(id)
    }

    pub fn is_agent(&self, id: &Identity) -> bool {
        self.agents.contains_key(id)
    }

    pub fn require_agent(&self, id: &Identity) -> Result<&Agent> {
        self.agent(id).ok_or_else(|| not_found(RecordKind::Agent, id))
    }

    /// Fail with `AlreadyRegistered` if `id` holds an Agent record.
    pub fn ensure_no_agent(&self, id: &Identity) -> Result<()> {
        if self.is_agent(id) {
            return Err(already_registered(RecordKind::Agent, id));
        }
        Ok(())
    }

    pub fn insert_agent(&mut self, id: Identity, agent: Agent) -> Result<()> {
        self.ensure_no_agent(&id)?;
        self.agents.insert(id, agent);
        Ok(())
    }

    pub fn remove_agent(&mut self, id: &Identity) -> Result<Agent> {
        self.agents
            .remove(id)
            .ok_or_else(|| not_found(RecordKind::Agent, id))
    }

    // ── Subjects ──────────────────────────────────────────────────────────────

    pub fn subject(&self, id: &Identity) -> Option<&Subject> {
        self.subjects.get(id)
    }

    pub fn is_subject(&self, id: &Identity) -> bool {
        self.subjects.contains_key(id)
    }

    pub fn require_subject(&self, id: &Identity) -> Result<&Subject> {
        self.subject(id)
            .ok_or_else(|| not_found(RecordKind::Subject, id))
    }

    /// Fail with `AlreadyRegistered` if `id` holds a Subject record.
    pub fn ensure_no_subject(&self, id: &Identity) -> Result<()> {
        if self.is_subject(id) {
            return Err(already_registered(RecordKind::Subject, id));
        }
        Ok(())
    }

    pub fn insert_subject(&mut self, id: Identity, subject: Subject) -> Result<()> {
        self.ensure_no_subject(&id)?;
        self.subjects.insert(id, subject);
        Ok(())
    }

    /// Overwrite the mutable fields of a subject.
    pub fn update_subject(
        &mut self,
        id: &Identity,
        condition: impl Into<String>,
        sensitivities: impl Into<String>,
    ) -> Result<()> {
        let subject = self
            .subjects
            .get_mut(id)
            .ok_or_else(|| not_found(RecordKind::Subject, id))?;
        subject.condition = condition.into();
        subject.sensitivities = sensitivities.into();
        Ok(())
    }

    pub fn remove_subject(&mut self, id: &Identity) -> Result<Subject> {
        self.subjects
            .remove(id)
            .ok_or_else(|| not_found(RecordKind::Subject, id))
    }

    // ── Rosters ───────────────────────────────────────────────────────────────

    /// Identities of all agents sponsored by `sponsor`, sorted.
    pub fn agents_sponsored_by(&self, sponsor: &Identity) -> Vec<Identity> {
        let mut ids: Vec<Identity> = self
            .agents
            .iter()
            .filter(|(_, a)| a.sponsor == *sponsor)
            .map(|(id, _)| *id)
            .collect();
        ids.sort();
        ids
    }

    /// Identities of all subjects sponsored by `sponsor`, sorted.
    pub fn subjects_sponsored_by(&self, sponsor: &Identity) -> Vec<Identity> {
        let mut ids: Vec<Identity> = self
            .subjects
            .iter()
            .filter(|(_, s)| s.sponsor == *sponsor)
            .map(|(id, _)| *id)
            .collect();
        ids.sort();
        ids
    }

    /// Record counts as `(organizations, agents, subjects)`.
    pub fn counts(&self) -> (usize, usize, usize) {
        (
            self.organizations.len(),
            self.agents.len(),
            self.subjects.len(),
        )
    }
}

// ── Error helpers ─────────────────────────────────────────────────────────────

fn not_found(kind: RecordKind, id: &Identity) -> RegistryError {
    RegistryError::NotFound(format!("{kind} not found: {id}"))
}

fn already_registered(kind: RecordKind, id: &Identity) -> RegistryError {
    RegistryError::AlreadyRegistered(format!("{kind} already registered: {id}"))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
