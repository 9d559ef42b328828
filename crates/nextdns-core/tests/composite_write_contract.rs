//! Architectural Contract Test: Composite Writes
//!
//! Parental control, privacy, security and settings are each written
//! through several endpoints. This test verifies the order of those calls,
//! what a partial failure leaves behind, and the translations applied on
//! the way out and back in.
//!
//! Constraints verified:
//! - Sub-collections are written before the parent document
//! - The first failing call aborts the rest; earlier calls stay applied
//! - Log privacy toggles are inverted on the wire and restored on read
//! - Retention comes back in the shape it was declared in
//!
//! If this test fails, an apply can leave the remote half-written without
//! saying which part failed, or report drift that does not exist.

mod common;

use common::*;
use nextdns_core::ResourceHandler;
use nextdns_core::model::{IdRef, ToggleEntry};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use tokio_test::{assert_err, assert_ok};

const PROFILE: &str = "abc123";

fn parental() -> Value {
    json!({
        "profile_id": PROFILE,
        "block_bypass": true,
        "safe_search": true,
        "youtube_restricted_mode": false,
        "service": [{"id": "tiktok", "active": true}],
        "category": [{"id": "gambling", "active": true}],
        "recreation": {
            "timezone": "Europe/Paris",
            "saturday": {"start": "10:00:00", "end": "18:00:00"}
        }
    })
}

fn settings(retention: Value) -> Value {
    json!({
        "profile_id": PROFILE,
        "logs": {
            "enabled": true,
            "privacy": {"log_clients_ip": true, "log_domains": false},
            "retention": retention,
            "location": "eu"
        },
        "block_page": {"enabled": true},
        "performance": {"ecs": true, "cache_boost": false, "cname_flattening": true},
        "web3": false
    })
}

#[tokio::test]
async fn parental_control_writes_collections_before_document() {
    let (api, registry) = registry_with_profile(PROFILE);
    let handler = registry.resource("nextdns_parental_control").unwrap();

    let created = assert_ok!(handler.create(&parental()).await);

    assert_eq!(
        api.calls(),
        vec![
            "replace_parental_control_services",
            "replace_parental_control_categories",
            "update_parental_control",
            "get_parental_control",
        ]
    );
    let remote = api.remote(PROFILE).parental_control;
    assert_eq!(remote.services, vec![ToggleEntry::new("tiktok", true)]);
    assert!(remote.block_bypass);
    let times = remote.recreation.expect("schedule sent").times;
    assert!(times.saturday.is_some());
    assert!(times.monday.is_none());

    assert_eq!(
        created.state["recreation"],
        json!({
            "timezone": "Europe/Paris",
            "saturday": {"start": "10:00:00", "end": "18:00:00"}
        })
    );
}

#[tokio::test]
async fn parental_control_failure_keeps_earlier_steps() {
    let (api, registry) = registry_with_profile(PROFILE);
    api.fail_on("replace_parental_control_categories");
    let handler = registry.resource("nextdns_parental_control").unwrap();

    let err = assert_err!(handler.create(&parental()).await);

    assert!(err.to_string().starts_with("error creating categories settings: "));
    assert_eq!(
        api.calls(),
        vec![
            "replace_parental_control_services",
            "replace_parental_control_categories",
        ]
    );
    let remote = api.remote(PROFILE).parental_control;
    assert_eq!(remote.services, vec![ToggleEntry::new("tiktok", true)]);
    assert!(remote.categories.is_empty());
    assert!(!remote.block_bypass);
}

#[tokio::test]
async fn parental_control_rejects_bad_time_before_any_call() {
    let (api, registry) = registry_with_profile(PROFILE);
    let handler = registry.resource("nextdns_parental_control").unwrap();
    let mut desired = parental();
    desired["recreation"]["saturday"]["end"] = json!("25:00");

    let err = assert_err!(handler.create(&desired).await);

    assert!(err.is_validation());
    assert!(err.to_string().contains("recreation.saturday.end"));
    assert_eq!(api.call_count(), 0);
}

#[tokio::test]
async fn privacy_writes_lists_in_order() {
    let (api, registry) = registry_with_profile(PROFILE);
    let handler = registry.resource("nextdns_privacy").unwrap();

    let created = assert_ok!(
        handler
            .create(&json!({
                "profile_id": PROFILE,
                "allow_affiliate": false,
                "disguised_trackers": true,
                "blocklists": ["nextdns-recommended", "oisd"],
                "natives": ["apple"]
            }))
            .await
    );

    assert_eq!(
        api.calls(),
        vec![
            "replace_privacy_blocklists",
            "replace_privacy_natives",
            "update_privacy",
            "get_privacy",
        ]
    );
    assert_eq!(
        api.remote(PROFILE).privacy.blocklists,
        vec![IdRef::new("nextdns-recommended"), IdRef::new("oisd")]
    );
    assert_eq!(created.state["blocklists"], json!(["nextdns-recommended", "oisd"]));
    assert_eq!(created.state["disguised_trackers"], true);
}

#[tokio::test]
async fn security_writes_tlds_first_and_maps_renamed_toggles() {
    let (api, registry) = registry_with_profile(PROFILE);
    let handler = registry.resource("nextdns_security").unwrap();

    let created = assert_ok!(
        handler
            .create(&json!({
                "profile_id": PROFILE,
                "threat_intelligence_feeds": true,
                "ai_threat_detection": true,
                "google_safe_browsing": false,
                "crypto_jacking": true,
                "dns_rebinding": true,
                "idn_homographs": true,
                "typo_squatting": true,
                "dga": true,
                "nrd": false,
                "ddns": false,
                "parking": true,
                "csam": true,
                "tlds": ["zip", "mov"]
            }))
            .await
    );

    assert_eq!(
        api.calls(),
        vec!["replace_security_tlds", "update_security", "get_security"]
    );
    let remote = api.remote(PROFILE).security;
    assert!(remote.cryptojacking);
    assert!(remote.typosquatting);
    assert!(!remote.nrd);
    assert_eq!(remote.tlds, vec![IdRef::new("zip"), IdRef::new("mov")]);
    assert_eq!(created.state["crypto_jacking"], true);
    assert_eq!(created.state["tlds"], json!(["zip", "mov"]));
}

#[tokio::test]
async fn settings_write_order_and_privacy_inversion() {
    let (api, registry) = registry_with_profile(PROFILE);
    let handler = registry.resource("nextdns_settings").unwrap();

    let created = assert_ok!(handler.create(&settings(json!("1 month"))).await);

    assert_eq!(
        api.calls(),
        vec![
            "update_settings_logs",
            "update_settings_block_page",
            "update_settings_performance",
            "update_settings",
            "get_settings",
        ]
    );
    let remote = api.remote(PROFILE).settings;
    assert!(!remote.logs.drop.ip);
    assert!(remote.logs.drop.domain);
    assert_eq!(remote.logs.retention, 2_592_000);

    assert_eq!(created.state["logs"]["privacy"]["log_clients_ip"], true);
    assert_eq!(created.state["logs"]["privacy"]["log_domains"], false);
    assert_eq!(created.state["logs"]["retention"], "1 month");
}

#[tokio::test]
async fn settings_retention_keeps_declared_shape() {
    let (api, registry) = registry_with_profile(PROFILE);
    let handler = registry.resource("nextdns_settings").unwrap();

    let created = assert_ok!(handler.create(&settings(json!(21_600))).await);

    assert_eq!(api.remote(PROFILE).settings.logs.retention, 21_600);
    assert_eq!(created.state["logs"]["retention"], 21_600);
}

#[tokio::test]
async fn settings_non_canonical_retention_surfaces_as_seconds() {
    let (api, registry) = registry_with_profile(PROFILE);
    let handler = registry.resource("nextdns_settings").unwrap();
    let created = assert_ok!(handler.create(&settings(json!("1 day"))).await);

    api.seed(PROFILE, |r| r.settings.logs.retention = 12_345);
    let read = assert_ok!(handler.read(&created).await).expect("settings exist");

    assert_eq!(read.state["logs"]["retention"], 12_345);
}

#[tokio::test]
async fn settings_unknown_retention_label_is_rejected() {
    let (api, registry) = registry_with_profile(PROFILE);
    let handler = registry.resource("nextdns_settings").unwrap();

    let err = assert_err!(handler.create(&settings(json!("2 weeks"))).await);

    assert!(err.is_validation());
    assert!(err.to_string().contains("logs.retention"));
    assert_eq!(api.call_count(), 0);
}
