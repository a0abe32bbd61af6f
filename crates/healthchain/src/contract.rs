//! The Healthchain contract: every registry and ledger operation.
//!
//! Each call enters through a public method carrying a [`CallContext`]. The
//! call is checked against the access rules and the current store, then
//! applied and logged as exactly one event.
//!
//! Operations validate everything before the first mutation. The value
//! transfer is the only fallible effect and runs before any record or ledger
//! change, so a failed call leaves the whole state untouched.

use serde::{Deserialize, Serialize};

use crate::access::{authorize, Operation, Target};
use crate::config::{ReRegistration, RegistryConfig};
use crate::error::{RegistryError, Result};
use crate::events::{EventLog, LoggedEvent, RegistryEvent};
use crate::identity::{Identity, NativeValue};
use crate::ledger::Ledger;
use crate::registry::{Agent, Organization, RecordKind, RegistryStore, Subject};
use crate::value::{Accounts, ValueSubstrate};

// ---------------------------------------------------------------------------
// Call context
// ---------------------------------------------------------------------------

/// Attribution and attached value of a single call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallContext {
    pub caller: Identity,
    pub value: NativeValue,
}

impl CallContext {
    /// A call from `caller` with no value attached.
    pub fn new(caller: Identity) -> Self {
        Self { caller, value: 0 }
    }

    pub fn with_value(mut self, value: NativeValue) -> Self {
        self.value = value;
        self
    }
}

// ---------------------------------------------------------------------------
// Contract
// ---------------------------------------------------------------------------

/// Registry, ledger and event log sharing one sequentially applied state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Healthchain<V = Accounts> {
    /// The contract's own account; deposits are held here.
    contract: Identity,
    config: RegistryConfig,
    registry: RegistryStore,
    ledger: Ledger,
    events: EventLog,
    substrate: V,
}

impl Healthchain<Accounts> {
    /// A fresh contract over an empty in-memory account set.
    pub fn new(config: RegistryConfig) -> Self {
        Self::with_substrate(config, Accounts::new(), Identity::generate())
    }
}

impl<V: ValueSubstrate> Healthchain<V> {
    /// A fresh contract over an existing value substrate.
    pub fn with_substrate(config: RegistryConfig, substrate: V, contract: Identity) -> Self {
        Self {
            contract,
            config,
            registry: RegistryStore::new(),
            ledger: Ledger::new(),
            events: EventLog::new(),
            substrate,
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────────────

    pub fn contract_identity(&self) -> Identity {
        self.contract
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    pub fn registry(&self) -> &RegistryStore {
        &self.registry
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }

    pub fn substrate(&self) -> &V {
        &self.substrate
    }

    /// The execution environment's side of the value substrate.
    pub fn substrate_mut(&mut self) -> &mut V {
        &mut self.substrate
    }

    // ── Registry: organizations ───────────────────────────────────────────────

    /// The caller registers itself as an Organization named `name`.
    pub fn register_organization(
        &mut self,
        ctx: &CallContext,
        name: impl Into<String>,
    ) -> Result<LoggedEvent> {
        let op = Operation::RegisterOrganization;
        self.apply_register_organization(ctx, name.into())
            .map_err(rejected(op, &ctx.caller))
    }

    fn apply_register_organization(
        &mut self,
        ctx: &CallContext,
        name: String,
    ) -> Result<LoggedEvent> {
        let op = Operation::RegisterOrganization;
        let caller = ctx.caller;
        ensure_payable(op, ctx, &self.contract)?;
        authorize(op, &caller, Target::None, &self.registry, &self.config)?;

        if self.config.organization_reregistration == ReRegistration::Reject
            && self.registry.is_organization(&caller)
        {
            return Err(RegistryError::AlreadyRegistered(format!(
                "{} already registered: {caller}",
                RecordKind::Organization
            )));
        }

        let previous = self
            .registry
            .put_organization(caller, Organization::new(name.clone()));
        log::debug!(
            "{op} accepted: organization={caller} replaced={}",
            previous.is_some()
        );

        Ok(self.events.emit(RegistryEvent::OrganizationRegistered {
            organization: caller,
            name,
        }))
    }

    /// Read an organization record. Anyone may read it.
    pub fn get_organization(&self, caller: &Identity, id: &Identity) -> Result<Organization> {
        let op = Operation::GetOrganization;
        self.registry
            .require_organization(id)
            .and_then(|org| {
                authorize(op, caller, Target::None, &self.registry, &self.config)?;
                Ok(org.clone())
            })
            .map_err(rejected(op, caller))
    }

    // ── Registry: agents ──────────────────────────────────────────────────────

    /// The calling organization registers `agent` and becomes its sponsor.
    pub fn register_agent(
        &mut self,
        ctx: &CallContext,
        agent: Identity,
        credential: impl Into<String>,
    ) -> Result<LoggedEvent> {
        let op = Operation::RegisterAgent;
        self.apply_register_agent(ctx, agent, credential.into())
            .map_err(rejected(op, &ctx.caller))
    }

    fn apply_register_agent(
        &mut self,
        ctx: &CallContext,
        agent: Identity,
        credential: String,
    ) -> Result<LoggedEvent> {
        let op = Operation::RegisterAgent;
        let caller = ctx.caller;
        ensure_payable(op, ctx, &self.contract)?;
        authorize(op, &caller, Target::None, &self.registry, &self.config)?;

        self.registry
            .insert_agent(agent, Agent::new(credential, caller))?;
        log::debug!("{op} accepted: agent={agent} sponsor={caller}");

        Ok(self.events.emit(RegistryEvent::AgentRegistered { agent }))
    }

    /// Read an agent record as `(credential, sponsor)`.
    pub fn get_agent(&self, caller: &Identity, id: &Identity) -> Result<Agent> {
        let op = Operation::GetAgent;
        self.registry
            .require_agent(id)
            .and_then(|agent| {
                let target = Target::record(RecordKind::Agent, *id, agent.sponsor);
                authorize(op, caller, target, &self.registry, &self.config)?;
                Ok(agent.clone())
            })
            .map_err(rejected(op, caller))
    }

    /// The sponsoring organization removes `id`'s agent record.
    pub fn delete_agent(&mut self, ctx: &CallContext, id: &Identity) -> Result<LoggedEvent> {
        let op = Operation::DeleteAgent;
        self.apply_delete_agent(ctx, id)
            .map_err(rejected(op, &ctx.caller))
    }

    fn apply_delete_agent(&mut self, ctx: &CallContext, id: &Identity) -> Result<LoggedEvent> {
        let op = Operation::DeleteAgent;
        ensure_payable(op, ctx, &self.contract)?;
        let sponsor = self.registry.require_agent(id)?.sponsor;
        let target = Target::record(RecordKind::Agent, *id, sponsor);
        authorize(op, &ctx.caller, target, &self.registry, &self.config)?;

        self.registry.remove_agent(id)?;
        log::debug!("{op} accepted: agent={id} sponsor={sponsor}");

        Ok(self.events.emit(RegistryEvent::AgentDeleted { agent: *id }))
    }

    /// Agents sponsored by the calling organization.
    pub fn sponsored_agents(&self, caller: &Identity) -> Result<Vec<Identity>> {
        let op = Operation::SponsoredAgents;
        authorize(op, caller, Target::None, &self.registry, &self.config)
            .map(|()| self.registry.agents_sponsored_by(caller))
            .map_err(rejected(op, caller))
    }

    // ── Registry: subjects ────────────────────────────────────────────────────

    /// The caller enrolls as a Subject under `sponsor`.
    ///
    /// The whole attached value goes straight to the sponsor's account; none
    /// of it reaches the contract or the deposit ledger.
    pub fn register_subject(
        &mut self,
        ctx: &CallContext,
        condition: impl Into<String>,
        sensitivities: impl Into<String>,
        classifier: impl Into<String>,
        sponsor: Identity,
    ) -> Result<LoggedEvent> {
        let op = Operation::RegisterSubject;
        let subject = Subject::new(condition, sensitivities, classifier, sponsor);
        self.apply_register_subject(ctx, subject)
            .map_err(rejected(op, &ctx.caller))
    }

    fn apply_register_subject(&mut self, ctx: &CallContext, subject: Subject) -> Result<LoggedEvent> {
        let op = Operation::RegisterSubject;
        let caller = ctx.caller;
        let sponsor = subject.sponsor;
        ensure_payable(op, ctx, &self.contract)?;
        authorize(op, &caller, Target::None, &self.registry, &self.config)?;

        self.registry.ensure_no_subject(&caller)?;
        self.registry.require_organization(&sponsor)?;

        self.substrate.transfer(&caller, &sponsor, ctx.value)?;
        self.registry.insert_subject(caller, subject)?;
        log::debug!(
            "{op} accepted: subject={caller} sponsor={sponsor} paid={}",
            ctx.value
        );

        Ok(self
            .events
            .emit(RegistryEvent::SubjectRegistered { subject: caller }))
    }

    /// Read a subject record as `(condition, sensitivities, classifier, sponsor)`.
    pub fn get_subject(&self, caller: &Identity, id: &Identity) -> Result<Subject> {
        let op = Operation::GetSubject;
        self.registry
            .require_subject(id)
            .and_then(|subject| {
                let target = Target::record(RecordKind::Subject, *id, subject.sponsor);
                authorize(op, caller, target, &self.registry, &self.config)?;
                Ok(subject.clone())
            })
            .map_err(rejected(op, caller))
    }

    /// The calling subject overwrites its own condition and sensitivities.
    pub fn update_subject(
        &mut self,
        ctx: &CallContext,
        condition: impl Into<String>,
        sensitivities: impl Into<String>,
    ) -> Result<LoggedEvent> {
        let op = Operation::UpdateSubject;
        self.apply_update_subject(ctx, condition.into(), sensitivities.into())
            .map_err(rejected(op, &ctx.caller))
    }

    fn apply_update_subject(
        &mut self,
        ctx: &CallContext,
        condition: String,
        sensitivities: String,
    ) -> Result<LoggedEvent> {
        let op = Operation::UpdateSubject;
        let caller = ctx.caller;
        ensure_payable(op, ctx, &self.contract)?;
        let sponsor = self.registry.require_subject(&caller)?.sponsor;
        let target = Target::record(RecordKind::Subject, caller, sponsor);
        authorize(op, &caller, target, &self.registry, &self.config)?;

        self.registry
            .update_subject(&caller, condition, sensitivities)?;
        log::debug!("{op} accepted: subject={caller}");

        Ok(self
            .events
            .emit(RegistryEvent::SubjectUpdated { subject: caller }))
    }

    /// The sponsoring organization removes `id`'s subject record.
    pub fn delete_subject(&mut self, ctx: &CallContext, id: &Identity) -> Result<LoggedEvent> {
        let op = Operation::DeleteSubject;
        self.apply_delete_subject(ctx, id)
            .map_err(rejected(op, &ctx.caller))
    }

    fn apply_delete_subject(&mut self, ctx: &CallContext, id: &Identity) -> Result<LoggedEvent> {
        let op = Operation::DeleteSubject;
        ensure_payable(op, ctx, &self.contract)?;
        let sponsor = self.registry.require_subject(id)?.sponsor;
        let target = Target::record(RecordKind::Subject, *id, sponsor);
        authorize(op, &ctx.caller, target, &self.registry, &self.config)?;

        self.registry.remove_subject(id)?;
        log::debug!("{op} accepted: subject={id} sponsor={sponsor}");

        Ok(self
            .events
            .emit(RegistryEvent::SubjectDeleted { subject: *id }))
    }

    /// Subjects sponsored by the calling organization.
    pub fn sponsored_subjects(&self, caller: &Identity) -> Result<Vec<Identity>> {
        let op = Operation::SponsoredSubjects;
        authorize(op, caller, Target::None, &self.registry, &self.config)
            .map(|()| self.registry.subjects_sponsored_by(caller))
            .map_err(rejected(op, caller))
    }

    // ── Ledger ────────────────────────────────────────────────────────────────

    /// Credit the attached value to the caller's ledger balance.
    pub fn deposit(&mut self, ctx: &CallContext) -> Result<LoggedEvent> {
        let op = Operation::Deposit;
        self.apply_deposit(ctx).map_err(rejected(op, &ctx.caller))
    }

    fn apply_deposit(&mut self, ctx: &CallContext) -> Result<LoggedEvent> {
        let op = Operation::Deposit;
        let caller = ctx.caller;
        let amount = ctx.value;
        ensure_payable(op, ctx, &self.contract)?;
        authorize(op, &caller, Target::None, &self.registry, &self.config)?;

        self.ledger.check_credit(&caller, amount)?;
        self.substrate.transfer(&caller, &self.contract, amount)?;
        let balance = self.ledger.credit(&caller, amount)?;
        log::debug!("{op} accepted: depositor={caller} amount={amount} balance={balance}");

        Ok(self.events.emit(RegistryEvent::DepositMade {
            depositor: caller,
            amount,
        }))
    }

    /// The caller's own ledger balance.
    pub fn get_balance(&self, caller: &Identity) -> Result<NativeValue> {
        self.balance_for(caller, caller)
    }

    /// Ledger balance of `account`, readable only by `account` itself.
    pub fn balance_for(&self, caller: &Identity, account: &Identity) -> Result<NativeValue> {
        let op = Operation::GetBalance;
        authorize(
            op,
            caller,
            Target::Account(*account),
            &self.registry,
            &self.config,
        )
        .map(|()| self.ledger.balance_of(account))
        .map_err(rejected(op, caller))
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Value may only be attached to payable operations, and never by the
/// contract account itself: its holdings back the deposit ledger.
fn ensure_payable(op: Operation, ctx: &CallContext, contract: &Identity) -> Result<()> {
    if ctx.value == 0 {
        return Ok(());
    }
    if !op.is_payable() {
        return Err(RegistryError::NotPayable(format!(
            "{op} received {}",
            ctx.value
        )));
    }
    if ctx.caller == *contract {
        return Err(RegistryError::Unauthorized(format!(
            "the contract account cannot attach value to {op}"
        )));
    }
    Ok(())
}

/// Log a rejected call and pass the error through.
fn rejected(op: Operation, caller: &Identity) -> impl FnOnce(RegistryError) -> RegistryError + '_ {
    move |err| {
        log::warn!("{op} rejected for {caller}: {err}");
        err
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
