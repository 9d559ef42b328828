//! Test doubles and common utilities for contract tests
//!
//! [`MockApi`] is an in-memory stand-in for the NextDNS API. It keeps one
//! document set per profile, answers `NotFound` for unknown profiles,
//! records every call in order, and can be told to fail a given method.

#![allow(dead_code)]

use async_trait::async_trait;
use nextdns_core::error::{Error, Result};
use nextdns_core::model::{
    IdRef, LinkedIp, NewRewrite, ParentalControl, Privacy, Profile, Rewrite, Security, Settings,
    SettingsBlockPage, SettingsLogs, SettingsPerformance, Setup, ToggleEntry,
};
use nextdns_core::traits::NextDnsApi;
use nextdns_core::{ResourceRegistry, ResourceData};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Everything the remote holds for one profile
#[derive(Debug, Clone, Default)]
pub struct RemoteProfile {
    pub profile: Profile,
    pub allowlist: Vec<ToggleEntry>,
    pub denylist: Vec<ToggleEntry>,
    pub parental_control: ParentalControl,
    pub privacy: Privacy,
    pub security: Security,
    pub settings: Settings,
    pub rewrites: Vec<Rewrite>,
    pub setup: Setup,
    pub linked_ip: LinkedIp,
}

/// One recorded API call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub method: &'static str,
    pub profile_id: String,
}

/// Recording in-memory NextDNS API
#[derive(Default)]
pub struct MockApi {
    profiles: Mutex<HashMap<String, RemoteProfile>>,
    calls: Mutex<Vec<Call>>,
    fail_on: Mutex<Option<&'static str>>,
    call_count: Arc<AtomicUsize>,
    next_id: AtomicUsize,
}

impl MockApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mock that already knows `profile_id`
    pub fn with_profile(profile_id: &str) -> Self {
        let api = Self::new();
        api.seed(profile_id, |_| {});
        api
    }

    /// Create or edit the remote documents of a profile
    pub fn seed(&self, profile_id: &str, f: impl FnOnce(&mut RemoteProfile)) {
        let mut profiles = self.profiles.lock().unwrap();
        let remote = profiles
            .entry(profile_id.to_string())
            .or_insert_with(|| RemoteProfile {
                profile: Profile {
                    id: profile_id.to_string(),
                    name: format!("profile {}", profile_id),
                },
                ..Default::default()
            });
        f(remote);
    }

    /// Forget a profile, as if it was deleted out of band
    pub fn remove_profile(&self, profile_id: &str) {
        self.profiles.lock().unwrap().remove(profile_id);
    }

    /// Snapshot of a profile's remote documents
    pub fn remote(&self, profile_id: &str) -> RemoteProfile {
        self.profiles
            .lock()
            .unwrap()
            .get(profile_id)
            .cloned()
            .expect("profile is known to the mock")
    }

    /// Make every subsequent call to `method` fail
    pub fn fail_on(&self, method: &'static str) {
        *self.fail_on.lock().unwrap() = Some(method);
    }

    /// Method names of all calls so far, in order
    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().iter().map(|c| c.method).collect()
    }

    pub fn recorded(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
        self.call_count.store(0, Ordering::SeqCst);
    }

    fn enter(&self, method: &'static str, profile_id: &str) -> Result<()> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        self.calls.lock().unwrap().push(Call {
            method,
            profile_id: profile_id.to_string(),
        });
        if *self.fail_on.lock().unwrap() == Some(method) {
            return Err(Error::provider("nextdns", format!("{} rejected", method)));
        }
        Ok(())
    }

    fn with<T>(
        &self,
        method: &'static str,
        profile_id: &str,
        f: impl FnOnce(&mut RemoteProfile) -> T,
    ) -> Result<T> {
        self.enter(method, profile_id)?;
        let mut profiles = self.profiles.lock().unwrap();
        let remote = profiles
            .get_mut(profile_id)
            .ok_or_else(|| Error::not_found(format!("profile {}", profile_id)))?;
        Ok(f(remote))
    }
}

#[async_trait]
impl NextDnsApi for MockApi {
    async fn create_profile(&self, profile: &Profile) -> Result<String> {
        self.enter("create_profile", "")?;
        let n = self.next_id.fetch_add(1, Ordering::SeqCst);
        let id = format!("{:06x}", 0xabc000 + n);
        self.seed(&id, |remote| remote.profile.name = profile.name.clone());
        Ok(id)
    }

    async fn get_profile(&self, profile_id: &str) -> Result<Profile> {
        self.with("get_profile", profile_id, |r| r.profile.clone())
    }

    async fn update_profile(&self, profile_id: &str, profile: &Profile) -> Result<()> {
        self.with("update_profile", profile_id, |r| {
            r.profile.name = profile.name.clone()
        })
    }

    async fn list_allowlist(&self, profile_id: &str) -> Result<Vec<ToggleEntry>> {
        self.with("list_allowlist", profile_id, |r| r.allowlist.clone())
    }

    async fn replace_allowlist(&self, profile_id: &str, entries: &[ToggleEntry]) -> Result<()> {
        self.with("replace_allowlist", profile_id, |r| {
            r.allowlist = entries.to_vec()
        })
    }

    async fn list_denylist(&self, profile_id: &str) -> Result<Vec<ToggleEntry>> {
        self.with("list_denylist", profile_id, |r| r.denylist.clone())
    }

    async fn replace_denylist(&self, profile_id: &str, entries: &[ToggleEntry]) -> Result<()> {
        self.with("replace_denylist", profile_id, |r| {
            r.denylist = entries.to_vec()
        })
    }

    async fn get_parental_control(&self, profile_id: &str) -> Result<ParentalControl> {
        self.with("get_parental_control", profile_id, |r| {
            r.parental_control.clone()
        })
    }

    async fn update_parental_control(
        &self,
        profile_id: &str,
        parental_control: &ParentalControl,
    ) -> Result<()> {
        self.with("update_parental_control", profile_id, |r| {
            let pc = &mut r.parental_control;
            pc.safe_search = parental_control.safe_search;
            pc.youtube_restricted_mode = parental_control.youtube_restricted_mode;
            pc.block_bypass = parental_control.block_bypass;
            pc.recreation = parental_control.recreation.clone();
        })
    }

    async fn replace_parental_control_services(
        &self,
        profile_id: &str,
        services: &[ToggleEntry],
    ) -> Result<()> {
        self.with("replace_parental_control_services", profile_id, |r| {
            r.parental_control.services = services.to_vec()
        })
    }

    async fn replace_parental_control_categories(
        &self,
        profile_id: &str,
        categories: &[ToggleEntry],
    ) -> Result<()> {
        self.with("replace_parental_control_categories", profile_id, |r| {
            r.parental_control.categories = categories.to_vec()
        })
    }

    async fn get_privacy(&self, profile_id: &str) -> Result<Privacy> {
        self.with("get_privacy", profile_id, |r| r.privacy.clone())
    }

    async fn update_privacy(&self, profile_id: &str, privacy: &Privacy) -> Result<()> {
        self.with("update_privacy", profile_id, |r| {
            r.privacy.allow_affiliate = privacy.allow_affiliate;
            r.privacy.disguised_trackers = privacy.disguised_trackers;
        })
    }

    async fn replace_privacy_blocklists(&self, profile_id: &str, blocklists: &[IdRef]) -> Result<()> {
        self.with("replace_privacy_blocklists", profile_id, |r| {
            r.privacy.blocklists = blocklists.to_vec()
        })
    }

    async fn replace_privacy_natives(&self, profile_id: &str, natives: &[IdRef]) -> Result<()> {
        self.with("replace_privacy_natives", profile_id, |r| {
            r.privacy.natives = natives.to_vec()
        })
    }

    async fn get_security(&self, profile_id: &str) -> Result<Security> {
        self.with("get_security", profile_id, |r| r.security.clone())
    }

    async fn update_security(&self, profile_id: &str, security: &Security) -> Result<()> {
        self.with("update_security", profile_id, |r| {
            let tlds = std::mem::take(&mut r.security.tlds);
            r.security = Security {
                tlds,
                ..security.clone()
            };
        })
    }

    async fn replace_security_tlds(&self, profile_id: &str, tlds: &[IdRef]) -> Result<()> {
        self.with("replace_security_tlds", profile_id, |r| {
            r.security.tlds = tlds.to_vec()
        })
    }

    async fn get_settings(&self, profile_id: &str) -> Result<Settings> {
        self.with("get_settings", profile_id, |r| r.settings.clone())
    }

    async fn update_settings(&self, profile_id: &str, settings: &Settings) -> Result<()> {
        self.with("update_settings", profile_id, |r| r.settings = settings.clone())
    }

    async fn update_settings_logs(&self, profile_id: &str, logs: &SettingsLogs) -> Result<()> {
        self.with("update_settings_logs", profile_id, |r| {
            r.settings.logs = logs.clone()
        })
    }

    async fn update_settings_block_page(
        &self,
        profile_id: &str,
        block_page: &SettingsBlockPage,
    ) -> Result<()> {
        self.with("update_settings_block_page", profile_id, |r| {
            r.settings.block_page = block_page.clone()
        })
    }

    async fn update_settings_performance(
        &self,
        profile_id: &str,
        performance: &SettingsPerformance,
    ) -> Result<()> {
        self.with("update_settings_performance", profile_id, |r| {
            r.settings.performance = performance.clone()
        })
    }

    async fn list_rewrites(&self, profile_id: &str) -> Result<Vec<Rewrite>> {
        self.with("list_rewrites", profile_id, |r| r.rewrites.clone())
    }

    async fn create_rewrite(&self, profile_id: &str, rewrite: &NewRewrite) -> Result<Rewrite> {
        let n = self.next_id.fetch_add(1, Ordering::SeqCst);
        let created = self.with("create_rewrite", profile_id, |r| {
            if r.rewrites
                .iter()
                .any(|e| e.name == rewrite.name && e.content == rewrite.content)
            {
                return None;
            }
            let created = Rewrite {
                id: format!("rw{}", n),
                name: rewrite.name.clone(),
                record_type: "A".to_string(),
                content: rewrite.content.clone(),
            };
            r.rewrites.push(created.clone());
            Some(created)
        })?;
        created.ok_or_else(|| Error::provider("nextdns", "duplicate rewrite"))
    }

    async fn delete_rewrite(&self, profile_id: &str, rewrite_id: &str) -> Result<()> {
        self.with("delete_rewrite", profile_id, |r| {
            r.rewrites.retain(|e| e.id != rewrite_id)
        })
    }

    async fn get_setup(&self, profile_id: &str) -> Result<Setup> {
        self.with("get_setup", profile_id, |r| r.setup.clone())
    }

    async fn get_setup_linked_ip(&self, profile_id: &str) -> Result<LinkedIp> {
        self.with("get_setup_linked_ip", profile_id, |r| r.linked_ip.clone())
    }
}

/// Registry wired to a fresh mock that knows `profile_id`
pub fn registry_with_profile(profile_id: &str) -> (Arc<MockApi>, ResourceRegistry) {
    let api = Arc::new(MockApi::with_profile(profile_id));
    let registry = ResourceRegistry::with_defaults(api.clone());
    (api, registry)
}

/// Identity + state handed back to a handler
pub fn data(id: &str, state: Value) -> ResourceData<Value> {
    ResourceData {
        id: id.to_string(),
        state,
    }
}
