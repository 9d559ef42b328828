//! `nextdns_privacy`

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result, ResultExt};
use crate::model::{IdRef, Privacy};
use crate::resources::{PROFILE_ID_DESCRIPTION, found, refreshed, require_profile_id};
use crate::schema::{FieldKind, Schema};
use crate::traits::{NextDnsApi, ProfileScoped, Resource, ResourceData};

/// Local state of the privacy settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrivacyState {
    pub profile_id: String,
    pub allow_affiliate: bool,
    pub disguised_trackers: bool,
    /// Blocklist ids, in priority order
    pub blocklists: Vec<String>,
    /// Native tracking protection ids
    pub natives: Vec<String>,
}

impl ProfileScoped for PrivacyState {
    fn profile_id(&self) -> &str {
        &self.profile_id
    }

    fn set_profile_id(&mut self, profile_id: String) {
        self.profile_id = profile_id;
    }
}

pub(crate) fn id_refs(field: &str, ids: &[String]) -> Result<Vec<IdRef>> {
    if let Some(i) = ids.iter().position(|id| id.trim().is_empty()) {
        return Err(Error::validation(format!("field `{}.{}` is empty", field, i)));
    }
    Ok(ids.iter().map(IdRef::new).collect())
}

pub(crate) fn ids(refs: Vec<IdRef>) -> Vec<String> {
    refs.into_iter().map(|r| r.id).collect()
}

/// Privacy controller
///
/// Writes blocklists, then natives, then the toggle document.
pub struct PrivacyResource {
    api: Arc<dyn NextDnsApi>,
}

impl PrivacyResource {
    pub fn new(api: Arc<dyn NextDnsApi>) -> Self {
        Self { api }
    }

    fn build(state: &PrivacyState) -> Result<Privacy> {
        Ok(Privacy {
            blocklists: id_refs("blocklists", &state.blocklists)?,
            natives: id_refs("natives", &state.natives)?,
            disguised_trackers: state.disguised_trackers,
            allow_affiliate: state.allow_affiliate,
        })
    }

    async fn apply(&self, profile_id: &str, document: &Privacy, verb: &str) -> Result<()> {
        tracing::debug!(
            "Request to replace privacy blocklists of profile {}: {:?}",
            profile_id,
            document.blocklists
        );
        self.api
            .replace_privacy_blocklists(profile_id, &document.blocklists)
            .await
            .context(format!("error {} blocklist settings", verb))?;

        tracing::debug!(
            "Request to replace privacy natives of profile {}: {:?}",
            profile_id,
            document.natives
        );
        self.api
            .replace_privacy_natives(profile_id, &document.natives)
            .await
            .context(format!("error {} native settings", verb))?;

        tracing::debug!("Request to update privacy of profile {}", profile_id);
        self.api
            .update_privacy(profile_id, document)
            .await
            .context(format!("error {} privacy settings", verb))
    }

    async fn write(&self, state: &PrivacyState, verb: &str) -> Result<ResourceData<PrivacyState>> {
        let profile_id = require_profile_id(&state.profile_id)?;
        let document = Self::build(state).context("error building privacy settings")?;
        tracing::debug!("Object built: {:?}", document);

        self.apply(profile_id, &document, verb).await?;

        let data = self.read(ResourceData::from_state(state.clone())).await?;
        refreshed(data, "nextdns_privacy", profile_id)
    }
}

#[async_trait]
impl Resource for PrivacyResource {
    type State = PrivacyState;

    fn type_name(&self) -> &'static str {
        "nextdns_privacy"
    }

    fn schema(&self) -> Schema {
        Schema::new()
            .required("profile_id", FieldKind::String, PROFILE_ID_DESCRIPTION)
            .required(
                "allow_affiliate",
                FieldKind::Bool,
                "Allow affiliate & tracking links.",
            )
            .required(
                "disguised_trackers",
                FieldKind::Bool,
                "Block disguised third-party trackers.",
            )
            .optional(
                "blocklists",
                FieldKind::list(FieldKind::String),
                "Blocklists to block ads and trackers.",
            )
            .optional(
                "natives",
                FieldKind::list(FieldKind::String),
                "Native tracking protection to enable.",
            )
    }

    async fn create(&self, desired: PrivacyState) -> Result<ResourceData<PrivacyState>> {
        let data = self.write(&desired, "creating").await?;
        tracing::info!("Created privacy settings for profile {}", data.id);
        Ok(data)
    }

    async fn read(
        &self,
        current: ResourceData<PrivacyState>,
    ) -> Result<Option<ResourceData<PrivacyState>>> {
        let profile_id = require_profile_id(&current.state.profile_id)?.to_string();
        tracing::debug!("Request to get privacy of profile {}", profile_id);

        let result = self
            .api
            .get_privacy(&profile_id)
            .await
            .context("error getting privacy settings");
        let Some(remote) = found(result, "nextdns_privacy", &profile_id)? else {
            return Ok(None);
        };
        tracing::debug!("Object built: {:?}", remote);

        Ok(Some(ResourceData::from_state(PrivacyState {
            profile_id,
            allow_affiliate: remote.allow_affiliate,
            disguised_trackers: remote.disguised_trackers,
            blocklists: ids(remote.blocklists),
            natives: ids(remote.natives),
        })))
    }

    async fn update(&self, desired: ResourceData<PrivacyState>) -> Result<ResourceData<PrivacyState>> {
        self.write(&desired.state, "updating").await
    }

    async fn delete(
        &self,
        current: ResourceData<PrivacyState>,
    ) -> Result<Option<ResourceData<PrivacyState>>> {
        let profile_id = require_profile_id(&current.state.profile_id)?.to_string();
        self.apply(&profile_id, &Privacy::default(), "deleting").await?;
        tracing::info!("Reset privacy settings of profile {}", profile_id);

        self.read(current).await
    }
}
