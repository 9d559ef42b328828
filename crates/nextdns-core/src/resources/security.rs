//! `nextdns_security`

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ResultExt};
use crate::model::Security;
use crate::resources::privacy::{id_refs, ids};
use crate::resources::{PROFILE_ID_DESCRIPTION, found, refreshed, require_profile_id};
use crate::schema::{FieldKind, Schema};
use crate::traits::{NextDnsApi, ProfileScoped, Resource, ResourceData};

/// Local state of the security settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityState {
    pub profile_id: String,
    pub threat_intelligence_feeds: bool,
    pub ai_threat_detection: bool,
    pub google_safe_browsing: bool,
    pub crypto_jacking: bool,
    pub dns_rebinding: bool,
    pub idn_homographs: bool,
    pub typo_squatting: bool,
    pub dga: bool,
    pub nrd: bool,
    pub ddns: bool,
    pub parking: bool,
    pub csam: bool,
    /// Blocked top-level domains
    pub tlds: Vec<String>,
}

impl ProfileScoped for SecurityState {
    fn profile_id(&self) -> &str {
        &self.profile_id
    }

    fn set_profile_id(&mut self, profile_id: String) {
        self.profile_id = profile_id;
    }
}

/// Security controller
///
/// Writes the blocked TLDs first, then the toggle document.
pub struct SecurityResource {
    api: Arc<dyn NextDnsApi>,
}

const TOGGLES: [(&str, &str); 12] = [
    ("threat_intelligence_feeds", "Use threat intelligence feeds."),
    ("ai_threat_detection", "Use AI-driven threat detection."),
    ("google_safe_browsing", "Use Google Safe Browsing."),
    ("crypto_jacking", "Block cryptojacking."),
    ("dns_rebinding", "Protect against DNS rebinding."),
    ("idn_homographs", "Block IDN homograph attacks."),
    ("typo_squatting", "Protect against typosquatting."),
    ("dga", "Protect against domain generation algorithms."),
    ("nrd", "Block newly registered domains."),
    ("ddns", "Block dynamic DNS hostnames."),
    ("parking", "Block parked domains."),
    ("csam", "Block child sexual abuse material."),
];

impl SecurityResource {
    pub fn new(api: Arc<dyn NextDnsApi>) -> Self {
        Self { api }
    }

    fn build(state: &SecurityState) -> Result<Security> {
        Ok(Security {
            threat_intelligence_feeds: state.threat_intelligence_feeds,
            ai_threat_detection: state.ai_threat_detection,
            google_safe_browsing: state.google_safe_browsing,
            cryptojacking: state.crypto_jacking,
            dns_rebinding: state.dns_rebinding,
            idn_homographs: state.idn_homographs,
            typosquatting: state.typo_squatting,
            dga: state.dga,
            nrd: state.nrd,
            ddns: state.ddns,
            parking: state.parking,
            csam: state.csam,
            tlds: id_refs("tlds", &state.tlds)?,
        })
    }

    async fn apply(&self, profile_id: &str, document: &Security, verb: &str) -> Result<()> {
        tracing::debug!(
            "Request to replace security tlds of profile {}: {:?}",
            profile_id,
            document.tlds
        );
        self.api
            .replace_security_tlds(profile_id, &document.tlds)
            .await
            .context(format!("error {} security tlds settings", verb))?;

        tracing::debug!("Request to update security of profile {}", profile_id);
        self.api
            .update_security(profile_id, document)
            .await
            .context(format!("error {} security settings", verb))
    }

    async fn write(&self, state: &SecurityState, verb: &str) -> Result<ResourceData<SecurityState>> {
        let profile_id = require_profile_id(&state.profile_id)?;
        let document = Self::build(state).context("error building security settings")?;
        tracing::debug!("Object built: {:?}", document);

        self.apply(profile_id, &document, verb).await?;

        let data = self.read(ResourceData::from_state(state.clone())).await?;
        refreshed(data, "nextdns_security", profile_id)
    }
}

#[async_trait]
impl Resource for SecurityResource {
    type State = SecurityState;

    fn type_name(&self) -> &'static str {
        "nextdns_security"
    }

    fn schema(&self) -> Schema {
        let schema = Schema::new().required("profile_id", FieldKind::String, PROFILE_ID_DESCRIPTION);
        TOGGLES
            .iter()
            .fold(schema, |s, &(name, description)| {
                s.required(name, FieldKind::Bool, description)
            })
            .optional(
                "tlds",
                FieldKind::list(FieldKind::String),
                "Top-level domains to block.",
            )
    }

    async fn create(&self, desired: SecurityState) -> Result<ResourceData<SecurityState>> {
        let data = self.write(&desired, "creating").await?;
        tracing::info!("Created security settings for profile {}", data.id);
        Ok(data)
    }

    async fn read(
        &self,
        current: ResourceData<SecurityState>,
    ) -> Result<Option<ResourceData<SecurityState>>> {
        let profile_id = require_profile_id(&current.state.profile_id)?.to_string();
        tracing::debug!("Request to get security of profile {}", profile_id);

        let result = self
            .api
            .get_security(&profile_id)
            .await
            .context("error getting security settings");
        let Some(remote) = found(result, "nextdns_security", &profile_id)? else {
            return Ok(None);
        };
        tracing::debug!("Object built: {:?}", remote);

        Ok(Some(ResourceData::from_state(SecurityState {
            profile_id,
            threat_intelligence_feeds: remote.threat_intelligence_feeds,
            ai_threat_detection: remote.ai_threat_detection,
            google_safe_browsing: remote.google_safe_browsing,
            crypto_jacking: remote.cryptojacking,
            dns_rebinding: remote.dns_rebinding,
            idn_homographs: remote.idn_homographs,
            typo_squatting: remote.typosquatting,
            dga: remote.dga,
            nrd: remote.nrd,
            ddns: remote.ddns,
            parking: remote.parking,
            csam: remote.csam,
            tlds: ids(remote.tlds),
        })))
    }

    async fn update(
        &self,
        desired: ResourceData<SecurityState>,
    ) -> Result<ResourceData<SecurityState>> {
        self.write(&desired.state, "updating").await
    }

    async fn delete(
        &self,
        current: ResourceData<SecurityState>,
    ) -> Result<Option<ResourceData<SecurityState>>> {
        let profile_id = require_profile_id(&current.state.profile_id)?.to_string();
        self.apply(&profile_id, &Security::default(), "deleting").await?;
        tracing::info!("Reset security settings of profile {}", profile_id);

        self.read(current).await
    }
}
