//! Edge cases: failure ordering, atomicity and unusual inputs.

use healthchain::{
    CallContext, ErrorKind, Healthchain, Identity, NativeValue, ReRegistration, RegistryConfig,
    RegistryError, ValueSubstrate,
};

fn setup() -> (Healthchain, Identity, Identity) {
    let org = Identity::from_label("org");
    let agent = Identity::from_label("agent");
    let mut chain = Healthchain::new(RegistryConfig::default());
    chain
        .register_organization(&CallContext::new(org), "Org")
        .unwrap();
    chain
        .register_agent(&CallContext::new(org), agent, "1")
        .unwrap();
    (chain, org, agent)
}

/// Snapshot of everything a failed call must leave untouched.
fn fingerprint(chain: &Healthchain) -> String {
    format!(
        "{:?}|{:?}|{}|{:?}",
        chain.registry().counts(),
        chain.ledger(),
        chain.events().len(),
        chain.substrate()
    )
}

#[test]
fn failed_calls_leave_no_trace() {
    let (mut chain, org, agent) = setup();
    let client = Identity::from_label("client");
    let stranger = Identity::from_label("stranger");
    chain.substrate_mut().mint(&client, 5).unwrap();
    chain
        .register_subject(&CallContext::new(client), "a", "b", "c", org)
        .unwrap();
    let before = fingerprint(&chain);

    let failures: Vec<RegistryError> = vec![
        chain
            .register_subject(&CallContext::new(client).with_value(1), "a", "b", "c", org)
            .unwrap_err(),
        chain
            .register_agent(&CallContext::new(org), agent, "2")
            .unwrap_err(),
        chain
            .register_agent(&CallContext::new(stranger), Identity::generate(), "2")
            .unwrap_err(),
        chain
            .delete_subject(&CallContext::new(agent), &client)
            .unwrap_err(),
        chain
            .delete_agent(&CallContext::new(client), &agent)
            .unwrap_err(),
        chain
            .update_subject(&CallContext::new(stranger), "x", "y")
            .unwrap_err(),
        chain
            .update_subject(&CallContext::new(client).with_value(1), "x", "y")
            .unwrap_err(),
        chain
            .deposit(&CallContext::new(stranger).with_value(1))
            .unwrap_err(),
        chain
            .register_subject(
                &CallContext::new(stranger).with_value(1),
                "a",
                "b",
                "c",
                org,
            )
            .unwrap_err(),
    ];

    assert_eq!(failures.len(), 9);
    assert_eq!(fingerprint(&chain), before);
    assert_eq!(chain.get_subject(&agent, &client).unwrap().condition, "a");
}

#[test]
fn not_found_wins_over_unauthorized() {
    let (chain, _, _) = setup();
    let stranger = Identity::from_label("stranger");
    let ghost = Identity::from_label("ghost");
    assert_eq!(
        chain.get_subject(&stranger, &ghost).unwrap_err().kind(),
        ErrorKind::NotFound
    );
    assert_eq!(
        chain.get_agent(&stranger, &ghost).unwrap_err().kind(),
        ErrorKind::NotFound
    );
}

#[test]
fn already_registered_wins_over_missing_sponsor() {
    let (mut chain, org, _) = setup();
    let client = Identity::from_label("client");
    chain
        .register_subject(&CallContext::new(client), "a", "b", "c", org)
        .unwrap();
    let err = chain
        .register_subject(
            &CallContext::new(client),
            "a",
            "b",
            "c",
            Identity::from_label("nobody"),
        )
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AlreadyRegistered);
}

#[test]
fn organization_may_enroll_itself() {
    let (mut chain, org, agent) = setup();
    chain.substrate_mut().mint(&org, 10).unwrap();
    chain
        .register_subject(&CallContext::new(org).with_value(4), "a", "b", "c", org)
        .unwrap();
    assert_eq!(chain.substrate().balance_of(&org), 10);
    assert_eq!(chain.get_subject(&agent, &org).unwrap().sponsor, org);
}

#[test]
fn agent_may_also_be_a_subject() {
    let (mut chain, org, agent) = setup();
    chain
        .register_subject(&CallContext::new(agent), "a", "b", "c", org)
        .unwrap();
    assert!(chain.registry().is_agent(&agent));
    assert!(chain.registry().is_subject(&agent));

    chain
        .delete_agent(&CallContext::new(org), &agent)
        .unwrap();
    // The subject record survives and its owner can still read it.
    assert!(chain.get_subject(&agent, &agent).is_ok());
}

#[test]
fn deleted_agent_loses_read_access() {
    let (mut chain, org, agent) = setup();
    let client = Identity::from_label("client");
    chain
        .register_subject(&CallContext::new(client), "a", "b", "c", org)
        .unwrap();
    assert!(chain.get_subject(&agent, &client).is_ok());

    chain
        .delete_agent(&CallContext::new(org), &agent)
        .unwrap();
    assert_eq!(
        chain.get_subject(&agent, &client).unwrap_err().kind(),
        ErrorKind::Unauthorized
    );
}

#[test]
fn empty_and_unicode_fields_round_trip() {
    let (mut chain, org, agent) = setup();
    let client = Identity::from_label("client");
    chain
        .register_subject(&CallContext::new(client), "", "amendoim, camarão", "A-", org)
        .unwrap();
    let subject = chain.get_subject(&agent, &client).unwrap();
    assert_eq!(subject.condition, "");
    assert_eq!(subject.sensitivities, "amendoim, camarão");
}

#[test]
fn zero_deposit_is_recorded() {
    let (mut chain, _, agent) = setup();
    let e = chain.deposit(&CallContext::new(agent)).unwrap();
    assert_eq!(e.event.event_name(), "DepositMade");
    assert_eq!(chain.get_balance(&agent).unwrap(), 0);
    assert_eq!(chain.ledger().accounts(), 1);
}

#[test]
fn deposit_overflow_is_rejected() {
    let (mut chain, _, agent) = setup();
    let max: NativeValue = u128::MAX;
    chain.substrate_mut().mint(&agent, max).unwrap();
    chain
        .deposit(&CallContext::new(agent).with_value(max))
        .unwrap();

    let rich = Identity::from_label("rich");
    chain.substrate_mut().mint(&rich, 1).unwrap();
    let err = chain
        .deposit(&CallContext::new(rich).with_value(1))
        .unwrap_err();
    assert!(matches!(err, RegistryError::ValueOverflow));
    assert_eq!(chain.substrate().balance_of(&rich), 1);
    assert_eq!(chain.get_balance(&rich).unwrap(), 0);
}

#[test]
fn reject_policy_keeps_first_name() {
    let org = Identity::from_label("org");
    let mut chain =
        Healthchain::new(RegistryConfig::default().with_reregistration(ReRegistration::Reject));
    chain
        .register_organization(&CallContext::new(org), "First")
        .unwrap();
    let err = chain
        .register_organization(&CallContext::new(org), "Second")
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AlreadyRegistered);
    assert!(err.to_string().contains("organization already registered"));
    assert_eq!(
        chain
            .get_organization(&Identity::generate(), &org)
            .unwrap()
            .name,
        "First"
    );
}
