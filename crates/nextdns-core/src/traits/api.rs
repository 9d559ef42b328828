// # NextDNS API Trait
//
// Defines the interface the resource controllers use to reach the remote
// configuration service.
//
// ## Implementations
//
// - HTTP: `nextdns-api` crate
// - Test doubles: `tests/common/mod.rs`
//
// ## Usage
//
// ```rust,ignore
// use nextdns_core::NextDnsApi;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let api = /* NextDnsApi implementation */;
//
//     let entries = api.list_allowlist("abc123").await?;
//     println!("{} allowlist entries", entries.len());
//
//     Ok(())
// }
// ```

use async_trait::async_trait;

use crate::error::Result;
use crate::model::{
    LinkedIp, NewRewrite, ParentalControl, Privacy, Profile, Rewrite, Security, Settings,
    SettingsBlockPage, SettingsLogs, SettingsPerformance, Setup, IdRef, ToggleEntry,
};

/// Remote service client contract
///
/// Every call is scoped by a profile id and carries the process-wide API
/// key configured at construction time. A single instance is shared
/// read-only by all controllers.
///
/// # Trust Level: Untrusted
///
/// ## Allowed Capabilities
/// - ✅ Perform HTTP/HTTPS calls to the configuration API only
/// - ✅ Parse API responses into the wire model
/// - ✅ Enforce a per-request timeout
///
/// ## Forbidden Capabilities
/// - ❌ Retry or back off (a failure propagates immediately)
/// - ❌ Cache responses beyond a single call
/// - ❌ Reach into orchestrator state
///
/// ## Error Contract
///
/// A missing profile or collection must surface as `Error::NotFound` so
/// that Read can tell "resource gone" apart from other failures.
///
/// `replace_*` methods set a whole collection in one request; the remote
/// treats them as an idempotent upsert, and an empty slice clears it.
#[async_trait]
pub trait NextDnsApi: Send + Sync {
    /// Create a profile and return its new id
    async fn create_profile(&self, profile: &Profile) -> Result<String>;

    /// Fetch a profile
    async fn get_profile(&self, profile_id: &str) -> Result<Profile>;

    /// Patch a profile
    async fn update_profile(&self, profile_id: &str, profile: &Profile) -> Result<()>;

    async fn list_allowlist(&self, profile_id: &str) -> Result<Vec<ToggleEntry>>;

    async fn replace_allowlist(&self, profile_id: &str, entries: &[ToggleEntry]) -> Result<()>;

    async fn list_denylist(&self, profile_id: &str) -> Result<Vec<ToggleEntry>>;

    async fn replace_denylist(&self, profile_id: &str, entries: &[ToggleEntry]) -> Result<()>;

    async fn get_parental_control(&self, profile_id: &str) -> Result<ParentalControl>;

    /// Patch toggles and the recreation schedule
    async fn update_parental_control(
        &self,
        profile_id: &str,
        parental_control: &ParentalControl,
    ) -> Result<()>;

    async fn replace_parental_control_services(
        &self,
        profile_id: &str,
        services: &[ToggleEntry],
    ) -> Result<()>;

    async fn replace_parental_control_categories(
        &self,
        profile_id: &str,
        categories: &[ToggleEntry],
    ) -> Result<()>;

    async fn get_privacy(&self, profile_id: &str) -> Result<Privacy>;

    async fn update_privacy(&self, profile_id: &str, privacy: &Privacy) -> Result<()>;

    async fn replace_privacy_blocklists(&self, profile_id: &str, blocklists: &[IdRef]) -> Result<()>;

    async fn replace_privacy_natives(&self, profile_id: &str, natives: &[IdRef]) -> Result<()>;

    async fn get_security(&self, profile_id: &str) -> Result<Security>;

    async fn update_security(&self, profile_id: &str, security: &Security) -> Result<()>;

    async fn replace_security_tlds(&self, profile_id: &str, tlds: &[IdRef]) -> Result<()>;

    async fn get_settings(&self, profile_id: &str) -> Result<Settings>;

    async fn update_settings(&self, profile_id: &str, settings: &Settings) -> Result<()>;

    async fn update_settings_logs(&self, profile_id: &str, logs: &SettingsLogs) -> Result<()>;

    async fn update_settings_block_page(
        &self,
        profile_id: &str,
        block_page: &SettingsBlockPage,
    ) -> Result<()>;

    async fn update_settings_performance(
        &self,
        profile_id: &str,
        performance: &SettingsPerformance,
    ) -> Result<()>;

    async fn list_rewrites(&self, profile_id: &str) -> Result<Vec<Rewrite>>;

    /// Create one rewrite; the server assigns its id
    async fn create_rewrite(&self, profile_id: &str, rewrite: &NewRewrite) -> Result<Rewrite>;

    async fn delete_rewrite(&self, profile_id: &str, rewrite_id: &str) -> Result<()>;

    async fn get_setup(&self, profile_id: &str) -> Result<Setup>;

    async fn get_setup_linked_ip(&self, profile_id: &str) -> Result<LinkedIp>;

    /// Provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str {
        "nextdns"
    }
}
