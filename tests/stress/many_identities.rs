//! Stress test: many organizations, agents, subjects and depositors in one
//! registry, checking that records and balances never bleed into each other.

use std::collections::HashSet;

use healthchain::{
    CallContext, ErrorKind, Healthchain, Identity, NativeValue, RegistryConfig, ValueSubstrate,
};

const ORGS: usize = 10;
const AGENTS_PER_ORG: usize = 20;
const SUBJECTS_PER_ORG: usize = 30;

#[test]
fn stress_1000_unique_label_identities() {
    let ids: HashSet<Identity> = (0..1000)
        .map(|i| Identity::from_label(&format!("account-{i}")))
        .collect();
    assert_eq!(ids.len(), 1000);
}

#[test]
fn stress_registry_isolation() {
    let mut chain = Healthchain::new(RegistryConfig::default());
    let orgs: Vec<Identity> = (0..ORGS)
        .map(|i| Identity::from_label(&format!("org-{i}")))
        .collect();

    for (i, org) in orgs.iter().enumerate() {
        chain
            .register_organization(&CallContext::new(*org), format!("Org {i}"))
            .unwrap();
        for a in 0..AGENTS_PER_ORG {
            let agent = Identity::from_label(&format!("agent-{i}-{a}"));
            chain
                .register_agent(&CallContext::new(*org), agent, format!("cred-{i}-{a}"))
                .unwrap();
        }
        for s in 0..SUBJECTS_PER_ORG {
            let subject = Identity::from_label(&format!("subject-{i}-{s}"));
            chain.substrate_mut().mint(&subject, 10).unwrap();
            chain
                .register_subject(
                    &CallContext::new(subject).with_value(3),
                    format!("condition-{s}"),
                    "none",
                    "O+",
                    *org,
                )
                .unwrap();
        }
    }

    assert_eq!(
        chain.registry().counts(),
        (ORGS, ORGS * AGENTS_PER_ORG, ORGS * SUBJECTS_PER_ORG)
    );
    let mutations = ORGS * (1 + AGENTS_PER_ORG + SUBJECTS_PER_ORG);
    assert_eq!(chain.events().len(), mutations);

    for (i, org) in orgs.iter().enumerate() {
        assert_eq!(
            chain.substrate().balance_of(org),
            3 * SUBJECTS_PER_ORG as NativeValue
        );
        assert_eq!(chain.sponsored_agents(org).unwrap().len(), AGENTS_PER_ORG);
        assert_eq!(chain.sponsored_subjects(org).unwrap().len(), SUBJECTS_PER_ORG);

        // Any agent, from any organization, can read any subject.
        let reader = Identity::from_label(&format!("agent-{}-0", (i + 1) % ORGS));
        let subject = Identity::from_label(&format!("subject-{i}-7"));
        let record = chain.get_subject(&reader, &subject).unwrap();
        assert_eq!(record.condition, "condition-7");
        assert_eq!(record.sponsor, *org);

        // But only the sponsor can delete.
        let other = orgs[(i + 1) % ORGS];
        let err = chain
            .delete_subject(&CallContext::new(other), &subject)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
    }
}

#[test]
fn stress_many_deposits() {
    let mut chain = Healthchain::new(RegistryConfig::default());
    let depositors: Vec<Identity> = (0..50)
        .map(|i| Identity::from_label(&format!("depositor-{i}")))
        .collect();
    for who in &depositors {
        chain.substrate_mut().mint(who, 1_000_000).unwrap();
    }

    for round in 1..=20u128 {
        for who in &depositors {
            chain
                .deposit(&CallContext::new(*who).with_value(round))
                .unwrap();
        }
    }

    let per_depositor: NativeValue = (1..=20u128).sum();
    for who in &depositors {
        assert_eq!(chain.get_balance(who).unwrap(), per_depositor);
        assert_eq!(
            chain.substrate().balance_of(who),
            1_000_000 - per_depositor
        );
    }
    assert_eq!(
        chain.ledger().total_deposits(),
        per_depositor * depositors.len() as NativeValue
    );
    assert_eq!(
        chain.substrate().balance_of(&chain.contract_identity()),
        chain.ledger().total_deposits()
    );
}

#[test]
fn stress_enroll_delete_cycles() {
    let org = Identity::from_label("org");
    let subject = Identity::from_label("cycler");
    let mut chain = Healthchain::new(RegistryConfig::default());
    chain
        .register_organization(&CallContext::new(org), "Org")
        .unwrap();

    for round in 0..200 {
        chain
            .register_subject(
                &CallContext::new(subject),
                format!("c{round}"),
                "s",
                "AB+",
                org,
            )
            .unwrap();
        assert_eq!(
            chain.get_subject(&org, &subject).unwrap().condition,
            format!("c{round}")
        );
        chain
            .delete_subject(&CallContext::new(org), &subject)
            .unwrap();
        assert!(!chain.registry().is_subject(&subject));
    }
    assert_eq!(chain.events().len(), 1 + 2 * 200);
}
