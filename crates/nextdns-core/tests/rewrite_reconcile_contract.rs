//! Architectural Contract Test: Rewrite Reconciliation
//!
//! The remote rewrite collection is edited rule by rule. This test
//! verifies that the controller only touches rules that differ.
//!
//! Constraints verified:
//! - A declaration matching the remote issues no delete and no create
//! - A changed rule is one delete plus one create, deletes first
//! - Rules already present are adopted on create
//! - Delete removes every rule of the profile
//! - A failed call aborts; earlier changes stay applied
//!
//! If this test fails, rewrites churn on every apply or get duplicated.

mod common;

use common::*;
use nextdns_core::ResourceHandler;
use nextdns_core::model::Rewrite;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use tokio_test::{assert_err, assert_ok};

const PROFILE: &str = "abc123";

fn rule(id: &str, name: &str, content: &str) -> Rewrite {
    Rewrite {
        id: id.to_string(),
        name: name.to_string(),
        record_type: "A".to_string(),
        content: content.to_string(),
    }
}

fn desired(rules: &[(&str, &str)]) -> Value {
    let rewrite: Vec<Value> = rules
        .iter()
        .map(|(domain, address)| json!({"domain": domain, "address": address}))
        .collect();
    json!({"profile_id": PROFILE, "rewrite": rewrite})
}

fn seeded() -> (std::sync::Arc<MockApi>, nextdns_core::ResourceRegistry) {
    let (api, registry) = registry_with_profile(PROFILE);
    api.seed(PROFILE, |r| {
        r.rewrites = vec![
            rule("r1", "nas.lan", "10.0.0.2"),
            rule("r2", "printer.lan", "10.0.0.3"),
        ];
    });
    (api, registry)
}

#[tokio::test]
async fn matching_declaration_changes_nothing() {
    let (api, registry) = seeded();
    let rewrite = registry.resource("nextdns_rewrite").unwrap();
    let current = data(PROFILE, desired(&[("nas.lan", "10.0.0.2"), ("printer.lan", "10.0.0.3")]));

    // Order differs from the remote on purpose
    let updated = assert_ok!(
        rewrite
            .update(
                &current,
                &desired(&[("printer.lan", "10.0.0.3"), ("nas.lan", "10.0.0.2")])
            )
            .await
    );

    assert_eq!(api.calls(), vec!["list_rewrites", "list_rewrites"]);
    assert_eq!(updated.state["rewrite"].as_array().unwrap().len(), 2);
    let ids: Vec<String> = api.remote(PROFILE).rewrites.into_iter().map(|r| r.id).collect();
    assert_eq!(ids, vec!["r1", "r2"]);
}

#[tokio::test]
async fn changed_address_is_delete_then_create() {
    let (api, registry) = seeded();
    let rewrite = registry.resource("nextdns_rewrite").unwrap();
    let current = data(PROFILE, desired(&[("nas.lan", "10.0.0.2"), ("printer.lan", "10.0.0.3")]));

    let updated = assert_ok!(
        rewrite
            .update(
                &current,
                &desired(&[("nas.lan", "10.0.0.9"), ("printer.lan", "10.0.0.3")])
            )
            .await
    );

    assert_eq!(
        api.calls(),
        vec!["list_rewrites", "delete_rewrite", "create_rewrite", "list_rewrites"]
    );
    let remote = api.remote(PROFILE).rewrites;
    assert_eq!(remote.len(), 2);
    assert!(remote.iter().any(|r| r.id == "r2"));
    assert!(remote.iter().any(|r| r.name == "nas.lan" && r.content == "10.0.0.9"));
    assert!(
        updated.state["rewrite"]
            .as_array()
            .unwrap()
            .contains(&json!({"domain": "nas.lan", "address": "10.0.0.9"}))
    );
}

#[tokio::test]
async fn create_adopts_existing_rules() {
    let (api, registry) = seeded();
    let rewrite = registry.resource("nextdns_rewrite").unwrap();

    assert_ok!(
        rewrite
            .create(&desired(&[("nas.lan", "10.0.0.2"), ("vpn.lan", "10.0.0.4")]))
            .await
    );

    // printer.lan is not declared, so it goes; nas.lan is kept as is
    assert_eq!(
        api.calls(),
        vec!["list_rewrites", "delete_rewrite", "create_rewrite", "list_rewrites"]
    );
    let remote = api.remote(PROFILE).rewrites;
    assert!(remote.iter().any(|r| r.id == "r1"));
    assert!(!remote.iter().any(|r| r.name == "printer.lan"));
    assert!(remote.iter().any(|r| r.name == "vpn.lan"));
}

#[tokio::test]
async fn delete_removes_every_rule() {
    let (api, registry) = seeded();
    let rewrite = registry.resource("nextdns_rewrite").unwrap();
    let current = data(PROFILE, desired(&[("nas.lan", "10.0.0.2")]));

    let after = assert_ok!(rewrite.delete(&current).await).expect("profile still exists");

    assert_eq!(
        api.calls(),
        vec!["list_rewrites", "delete_rewrite", "delete_rewrite", "list_rewrites"]
    );
    assert!(api.remote(PROFILE).rewrites.is_empty());
    assert_eq!(after.state["rewrite"], json!([]));
}

#[tokio::test]
async fn failed_create_leaves_earlier_deletes_applied() {
    let (api, registry) = seeded();
    api.fail_on("create_rewrite");
    let rewrite = registry.resource("nextdns_rewrite").unwrap();
    let current = data(PROFILE, desired(&[("nas.lan", "10.0.0.2"), ("printer.lan", "10.0.0.3")]));

    let err = assert_err!(
        rewrite
            .update(&current, &desired(&[("nas.lan", "10.0.0.9")]))
            .await
    );

    assert!(err.to_string().starts_with("error creating rewrite: "));
    assert_eq!(
        api.calls(),
        vec!["list_rewrites", "delete_rewrite", "delete_rewrite", "create_rewrite"]
    );
    // Both old rules are gone and nothing replaced them
    assert!(api.remote(PROFILE).rewrites.is_empty());
}

#[tokio::test]
async fn blank_address_is_rejected_before_any_call() {
    let (api, registry) = seeded();
    let rewrite = registry.resource("nextdns_rewrite").unwrap();

    let err = assert_err!(rewrite.create(&desired(&[("nas.lan", " ")])).await);

    assert!(err.is_validation());
    assert!(err.to_string().contains("rewrite.0"));
    assert_eq!(api.call_count(), 0);
}
