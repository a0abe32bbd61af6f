//! Access rules and their evaluation.
//!
//! | Operation            | Rule            | Authorized caller                          |
//! |----------------------|-----------------|--------------------------------------------|
//! | register_organization| `Anyone`        | anyone                                     |
//! | register_agent       | `Organization`  | any organization (acts as sponsor)         |
//! | register_subject     | `Anyone`        | anyone (acts as the subject)               |
//! | get_organization     | `Anyone`        | anyone                                     |
//! | get_agent/get_subject| `RecordReader`  | any agent, the sponsor, the record itself  |
//! | update_subject       | `RecordOwner`   | the subject itself                         |
//! | delete_subject/agent | `RecordSponsor` | the recorded sponsor only                  |
//! | sponsored_*          | `Organization`  | the organization reading its own roster    |
//! | deposit              | `Anyone`        | anyone                                     |
//! | get_balance          | `AccountOwner`  | the account itself                         |
//!
//! Agents read any subject record. This is the first-responder lookup
//! capability and is intentionally broad.

use crate::config::{RegistryConfig, SponsorRequirement};
use crate::error::{RegistryError, Result};
use crate::identity::Identity;
use crate::registry::{RecordKind, RegistryStore};

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// Every entry point of the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    RegisterOrganization,
    RegisterAgent,
    RegisterSubject,
    GetOrganization,
    GetAgent,
    GetSubject,
    UpdateSubject,
    DeleteSubject,
    DeleteAgent,
    SponsoredAgents,
    SponsoredSubjects,
    Deposit,
    GetBalance,
}

impl Operation {
    /// Stable operation name used in logs and error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Self::RegisterOrganization => "register_organization",
            Self::RegisterAgent => "register_agent",
            Self::RegisterSubject => "register_subject",
            Self::GetOrganization => "get_organization",
            Self::GetAgent => "get_agent",
            Self::GetSubject => "get_subject",
            Self::UpdateSubject => "update_subject",
            Self::DeleteSubject => "delete_subject",
            Self::DeleteAgent => "delete_agent",
            Self::SponsoredAgents => "sponsored_agents",
            Self::SponsoredSubjects => "sponsored_subjects",
            Self::Deposit => "deposit",
            Self::GetBalance => "get_balance",
        }
    }

    /// The access rule guarding this operation.
    pub fn rule(&self) -> AccessRule {
        match self {
            Self::RegisterOrganization
            | Self::RegisterSubject
            | Self::GetOrganization
            | Self::Deposit => AccessRule::Anyone,
            Self::RegisterAgent | Self::SponsoredAgents | Self::SponsoredSubjects => {
                AccessRule::Organization
            }
            Self::GetAgent | Self::GetSubject => AccessRule::RecordReader,
            Self::UpdateSubject => AccessRule::RecordOwner,
            Self::DeleteSubject | Self::DeleteAgent => AccessRule::RecordSponsor,
            Self::GetBalance => AccessRule::AccountOwner,
        }
    }

    /// Whether the operation accepts value attached to the call.
    pub fn is_payable(&self) -> bool {
        matches!(self, Self::RegisterSubject | Self::Deposit)
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

/// Capability required of the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessRule {
    /// No restriction.
    Anyone,
    /// Caller holds an Organization record (subject to `agent_sponsor`).
    Organization,
    /// Caller is a registered agent, the record's sponsor, or the record itself.
    RecordReader,
    /// Caller is the record itself.
    RecordOwner,
    /// Caller is the record's sponsor.
    RecordSponsor,
    /// Caller is the account being read.
    AccountOwner,
}

/// What the operation acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// Nothing beyond the caller.
    None,
    /// An existing Agent or Subject record.
    Record {
        kind: RecordKind,
        id: Identity,
        sponsor: Identity,
    },
    /// A ledger account.
    Account(Identity),
}

impl Target {
    pub fn record(kind: RecordKind, id: Identity, sponsor: Identity) -> Self {
        Self::Record { kind, id, sponsor }
    }
}

/// Evaluate `op`'s rule for `caller` against the current store.
///
/// Record rules need a `Target::Record`; callers resolve the record first so
/// that a missing record reports `NotFound` before any access decision.
pub fn authorize(
    op: Operation,
    caller: &Identity,
    target: Target,
    store: &RegistryStore,
    config: &RegistryConfig,
) -> Result<()> {
    match op.rule() {
        AccessRule::Anyone => Ok(()),

        AccessRule::Organization => {
            if config.agent_sponsor == SponsorRequirement::AnyCaller
                || store.is_organization(caller)
            {
                Ok(())
            } else {
                Err(RegistryError::Unauthorized(format!(
                    "only a registered organization can call {op}"
                )))
            }
        }

        AccessRule::RecordReader => {
            let (kind, id, sponsor) = expect_record(op, target)?;
            if store.is_agent(caller) || *caller == sponsor || *caller == id {
                Ok(())
            } else {
                Err(RegistryError::Unauthorized(format!(
                    "only agents or the sponsoring organization can read the {kind}"
                )))
            }
        }

        AccessRule::RecordOwner => {
            let (kind, id, _) = expect_record(op, target)?;
            if *caller == id {
                Ok(())
            } else {
                Err(RegistryError::Unauthorized(format!(
                    "only the {kind} itself can call {op}"
                )))
            }
        }

        AccessRule::RecordSponsor => {
            let (kind, _, sponsor) = expect_record(op, target)?;
            if *caller == sponsor {
                Ok(())
            } else {
                Err(RegistryError::Unauthorized(format!(
                    "only the sponsoring organization can delete the {kind}"
                )))
            }
        }

        AccessRule::AccountOwner => match target {
            Target::Account(account) if account == *caller => Ok(()),
            _ => Err(RegistryError::Unauthorized(
                "an account balance can only be read by its owner".to_string(),
            )),
        },
    }
}

fn expect_record(op: Operation, target: Target) -> Result<(RecordKind, Identity, Identity)> {
    match target {
        Target::Record { kind, id, sponsor } => Ok((kind, id, sponsor)),
        _ => Err(RegistryError::Unauthorized(format!(
            "{op} requires a target record"
        ))),
    }
}
