//! Healthchain CLI: `hc` command.
//!
//! Drives a persisted Healthchain contract: register organizations, agents
//! and subjects, deposit value and query balances. Every call is attributed
//! to the identity given with `--as`.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};

use healthchain::storage::{load_snapshot, save_snapshot};
use healthchain::{
    CallContext, Healthchain, Identity, LoggedEvent, NativeValue, RegistryConfig, ValueSubstrate,
};

// ── Directory helpers ─────────────────────────────────────────────────────────

fn default_state_path() -> Result<PathBuf> {
    let home = std::env::var("HOME").map_err(|_| anyhow!("HOME not set; pass --state"))?;
    Ok(PathBuf::from(home).join(".healthchain").join("state.json"))
}

// ── Identity helpers ──────────────────────────────────────────────────────────

/// Parse `0x…` hex or `@label`.
fn parse_identity(s: &str) -> Result<Identity> {
    if let Some(label) = s.strip_prefix('@') {
        if label.is_empty() {
            return Err(anyhow!("empty identity label"));
        }
        return Ok(Identity::from_label(label));
    }
    s.parse::<Identity>()
        .with_context(|| format!("invalid identity '{s}' (use 0x… or @label)"))
}

// ── CLI structure ─────────────────────────────────────────────────────────────

/// Healthchain CLI: sponsored registry of organizations, agents and
/// subjects with a deposit ledger.
#[derive(Parser, Debug)]
#[command(
    name = "hc",
    about = "Healthchain CLI",
    version,
    long_about = "hc: Healthchain CLI\n\nRegister organizations, agents and subjects, deposit value and\nquery balances against a persisted registry state."
)]
struct Cli {
    /// State snapshot file (default: ~/.healthchain/state.json)
    #[arg(long, global = true)]
    state: Option<PathBuf>,

    /// Caller identity (0x… or @label)
    #[arg(long = "as", global = true)]
    caller: Option<String>,

    /// Native value attached to the call
    #[arg(long, global = true, default_value = "0")]
    value: NativeValue,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a new, empty registry state
    Init {
        /// Policy config file (JSON)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Overwrite an existing state file
        #[arg(long)]
        force: bool,
    },

    /// Credit external value to an account (development faucet)
    Fund {
        /// Account identity (0x… or @label)
        account: String,
        /// Amount to credit
        amount: NativeValue,
    },

    /// Show an account's external balance
    Account {
        /// Account identity (0x… or @label)
        account: String,
    },

    /// Print the identity derived from a label
    Whois {
        /// Label (without the leading @)
        label: String,
    },

    /// Manage organizations
    Org {
        #[command(subcommand)]
        subcommand: OrgCommands,
    },

    /// Manage agents
    Agent {
        #[command(subcommand)]
        subcommand: AgentCommands,
    },

    /// Manage subjects
    Subject {
        #[command(subcommand)]
        subcommand: SubjectCommands,
    },

    /// Deposit the attached --value into the caller's ledger balance
    Deposit,

    /// Show the caller's ledger balance
    Balance,

    /// List emitted events
    Events {
        /// Only events after this sequence number
        #[arg(long, default_value = "0")]
        since: u64,

        /// Print events as JSON lines
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand, Debug)]
enum OrgCommands {
    /// Register the caller as an organization
    Register {
        /// Organization name
        name: String,
    },
    /// Show an organization
    Show {
        /// Organization identity
        identity: String,
    },
    /// List agents and subjects sponsored by the caller
    Roster,
}

#[derive(Subcommand, Debug)]
enum AgentCommands {
    /// Register an agent sponsored by the caller
    Register {
        /// Agent identity
        identity: String,
        /// Professional credential
        credential: String,
    },
    /// Show an agent
    Show {
        /// Agent identity
        identity: String,
    },
    /// Delete an agent sponsored by the caller
    Delete {
        /// Agent identity
        identity: String,
    },
}

#[derive(Subcommand, Debug)]
enum SubjectCommands {
    /// Enroll the caller as a subject; --value is paid to the sponsor
    Register {
        condition: String,
        sensitivities: String,
        classifier: String,
        /// Sponsoring organization identity
        sponsor: String,
    },
    /// Show a subject
    Show {
        /// Subject identity
        identity: String,
    },
    /// Update the caller's condition and sensitivities
    Update {
        condition: String,
        sensitivities: String,
    },
    /// Delete a subject sponsored by the caller
    Delete {
        /// Subject identity
        identity: String,
    },
}

// ── Main entry point ──────────────────────────────────────────────────────────

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    let result = run(cli);

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let state = match cli.state {
        Some(path) => path,
        None => default_state_path()?,
    };
    log::debug!("using registry state {}", state.display());
    let session = Session {
        state,
        caller: cli.caller,
        value: cli.value,
        verbose: cli.verbose,
    };

    match cli.command {
        Commands::Init { config, force } => cmd_init(&session, config.as_deref(), force),
        Commands::Fund { account, amount } => cmd_fund(&session, &account, amount),
        Commands::Account { account } => cmd_account(&session, &account),
        Commands::Whois { label } => cmd_whois(&label),
        Commands::Org { subcommand } => match subcommand {
            OrgCommands::Register { name } => cmd_org_register(&session, &name),
            OrgCommands::Show { identity } => cmd_org_show(&session, &identity),
            OrgCommands::Roster => cmd_org_roster(&session),
        },
        Commands::Agent { subcommand } => match subcommand {
            AgentCommands::Register {
                identity,
                credential,
            } => cmd_agent_register(&session, &identity, &credential),
            AgentCommands::Show { identity } => cmd_agent_show(&session, &identity),
            AgentCommands::Delete { identity } => cmd_agent_delete(&session, &identity),
        },
        Commands::Subject { subcommand } => match subcommand {
            SubjectCommands::Register {
                condition,
                sensitivities,
                classifier,
                sponsor,
            } => cmd_subject_register(&session, &condition, &sensitivities, &classifier, &sponsor),
            SubjectCommands::Show { identity } => cmd_subject_show(&session, &identity),
            SubjectCommands::Update {
                condition,
                sensitivities,
            } => cmd_subject_update(&session, &condition, &sensitivities),
            SubjectCommands::Delete { identity } => cmd_subject_delete(&session, &identity),
        },
        Commands::Deposit => cmd_deposit(&session),
        Commands::Balance => cmd_balance(&session),
        Commands::Events { since, json } => cmd_events(&session, since, json),
    }
}

// ── Session ───────────────────────────────────────────────────────────────────

/// Global options shared by every command.
struct Session {
    state: PathBuf,
    caller: Option<String>,
    value: NativeValue,
    verbose: bool,
}

impl Session {
    fn load(&self) -> Result<Healthchain> {
        if !self.state.exists() {
            return Err(anyhow!(
                "no registry state at {} (run `hc init` first)",
                self.state.display()
            ));
        }
        load_snapshot(&self.state)
            .with_context(|| format!("failed to load {}", self.state.display()))
    }

    fn save(&self, chain: &Healthchain) -> Result<()> {
        save_snapshot(chain, &self.state)
            .with_context(|| format!("failed to save {}", self.state.display()))
    }

    fn caller(&self) -> Result<Identity> {
        let raw = self
            .caller
            .as_deref()
            .ok_or_else(|| anyhow!("this command needs a caller: pass --as <identity>"))?;
        parse_identity(raw)
    }

    fn context(&self) -> Result<CallContext> {
        Ok(CallContext::new(self.caller()?).with_value(self.value))
    }

    /// Load, apply one mutating call, save on success, print the event.
    fn transact<F>(&self, call: F) -> Result<()>
    where
        F: FnOnce(&mut Healthchain, &CallContext) -> healthchain::Result<LoggedEvent>,
    {
        let ctx = self.context()?;
        let mut chain = self.load()?;
        let event = call(&mut chain, &ctx)?;
        self.save(&chain)?;
        print_event(&event, self.verbose);
        Ok(())
    }
}

fn print_event(logged: &LoggedEvent, verbose: bool) {
    println!(
        "#{} {} {}",
        logged.sequence,
        logged.event.event_name(),
        logged.event.subject_identity()
    );
    if verbose {
        println!("  At:   {}", logged.emitted_at_rfc3339());
        if let Ok(json) = serde_json::to_string(&logged.event) {
            println!("  Data: {json}");
        }
    }
}

// ── Command implementations ───────────────────────────────────────────────────

/// `hc init [--config FILE] [--force]`
fn cmd_init(session: &Session, config: Option<&Path>, force: bool) -> Result<()> {
    if session.state.exists() && !force {
        return Err(anyhow!(
            "registry state already exists at {} (use --force to replace it)",
            session.state.display()
        ));
    }

    let config = match config {
        Some(path) => RegistryConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => RegistryConfig::default(),
    };

    let chain = Healthchain::new(config);
    session.save(&chain)?;

    println!("Created registry state");
    println!("  File:     {}", session.state.display());
    println!("  Contract: {}", chain.contract_identity());
    if session.verbose {
        println!("  Config:   {}", serde_json::to_string(chain.config())?);
    }
    Ok(())
}

/// `hc fund ACCOUNT AMOUNT`
fn cmd_fund(session: &Session, account: &str, amount: NativeValue) -> Result<()> {
    let account = parse_identity(account)?;
    let mut chain = session.load()?;
    let balance = chain
        .substrate_mut()
        .mint(&account, amount)
        .context("failed to fund account")?;
    session.save(&chain)?;
    println!("Funded {account}: balance {balance}");
    Ok(())
}

/// `hc account ACCOUNT`
fn cmd_account(session: &Session, account: &str) -> Result<()> {
    let account = parse_identity(account)?;
    let chain = session.load()?;
    println!("{}", chain.substrate().balance_of(&account));
    Ok(())
}

/// `hc whois LABEL`
fn cmd_whois(label: &str) -> Result<()> {
    println!("{}", Identity::from_label(label));
    Ok(())
}

/// `hc --as ORG org register NAME`
fn cmd_org_register(session: &Session, name: &str) -> Result<()> {
    session.transact(|chain, ctx| chain.register_organization(ctx, name))
}

/// `hc org show IDENTITY`
fn cmd_org_show(session: &Session, identity: &str) -> Result<()> {
    let id = parse_identity(identity)?;
    let chain = session.load()?;
    let caller = match session.caller {
        Some(_) => session.caller()?,
        None => id,
    };
    let org = chain.get_organization(&caller, &id)?;
    println!("Organization: {id}");
    println!("  Name: {}", org.name);
    Ok(())
}

/// `hc --as ORG org roster`
fn cmd_org_roster(session: &Session) -> Result<()> {
    let caller = session.caller()?;
    let chain = session.load()?;
    let agents = chain.sponsored_agents(&caller)?;
    let subjects = chain.sponsored_subjects(&caller)?;

    println!("Agents ({}):", agents.len());
    for id in &agents {
        println!("  {id}");
    }
    println!("Subjects ({}):", subjects.len());
    for id in &subjects {
        println!("  {id}");
    }
    Ok(())
}

/// `hc --as ORG agent register IDENTITY CREDENTIAL`
fn cmd_agent_register(session: &Session, identity: &str, credential: &str) -> Result<()> {
    let agent = parse_identity(identity)?;
    session.transact(|chain, ctx| chain.register_agent(ctx, agent, credential))
}

/// `hc --as READER agent show IDENTITY`
fn cmd_agent_show(session: &Session, identity: &str) -> Result<()> {
    let id = parse_identity(identity)?;
    let caller = session.caller()?;
    let chain = session.load()?;
    let (credential, sponsor) = chain.get_agent(&caller, &id)?.into_tuple();
    println!("Agent: {id}");
    println!("  Credential: {credential}");
    println!("  Sponsor:    {sponsor}");
    Ok(())
}

/// `hc --as ORG agent delete IDENTITY`
fn cmd_agent_delete(session: &Session, identity: &str) -> Result<()> {
    let agent = parse_identity(identity)?;
    session.transact(|chain, ctx| chain.delete_agent(ctx, &agent))
}

/// `hc --as SUBJECT --value V subject register CONDITION SENSITIVITIES CLASSIFIER SPONSOR`
fn cmd_subject_register(
    session: &Session,
    condition: &str,
    sensitivities: &str,
    classifier: &str,
    sponsor: &str,
) -> Result<()> {
    let sponsor = parse_identity(sponsor)?;
    session.transact(|chain, ctx| {
        chain.register_subject(ctx, condition, sensitivities, classifier, sponsor)
    })
}

/// `hc --as READER subject show IDENTITY`
fn cmd_subject_show(session: &Session, identity: &str) -> Result<()> {
    let id = parse_identity(identity)?;
    let caller = session.caller()?;
    let chain = session.load()?;
    let (condition, sensitivities, classifier, sponsor) =
        chain.get_subject(&caller, &id)?.into_tuple();
    println!("Subject: {id}");
    println!("  Condition:     {condition}");
    println!("  Sensitivities: {sensitivities}");
    println!("  Classifier:    {classifier}");
    println!("  Sponsor:       {sponsor}");
    Ok(())
}

/// `hc --as SUBJECT subject update CONDITION SENSITIVITIES`
fn cmd_subject_update(session: &Session, condition: &str, sensitivities: &str) -> Result<()> {
    session.transact(|chain, ctx| chain.update_subject(ctx, condition, sensitivities))
}

/// `hc --as ORG subject delete IDENTITY`
fn cmd_subject_delete(session: &Session, identity: &str) -> Result<()> {
    let subject = parse_identity(identity)?;
    session.transact(|chain, ctx| chain.delete_subject(ctx, &subject))
}

/// `hc --as WHO --value V deposit`
fn cmd_deposit(session: &Session) -> Result<()> {
    session.transact(|chain, ctx| chain.deposit(ctx))
}

/// `hc --as WHO balance`
fn cmd_balance(session: &Session) -> Result<()> {
    let caller = session.caller()?;
    let chain = session.load()?;
    println!("{}", chain.get_balance(&caller)?);
    Ok(())
}

/// `hc events [--since N] [--json]`
fn cmd_events(session: &Session, since: u64, json: bool) -> Result<()> {
    let chain = session.load()?;
    let entries = chain.events().since(since);

    if entries.is_empty() && !json {
        println!("No events after #{since}");
        return Ok(());
    }

    for logged in entries {
        if json {
            println!("{}", serde_json::to_string(logged)?);
        } else {
            print_event(logged, session.verbose);
        }
    }
    Ok(())
}
