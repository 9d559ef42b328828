//! `nextdns_allowlist` and `nextdns_denylist`
//!
//! Both lists have the same shape and the same remote contract (list and
//! whole-list replace), so one controller serves both.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ResultExt};
use crate::model::ToggleEntry;
use crate::resources::{
    EntryState, PROFILE_ID_DESCRIPTION, build_entries, entry_set, found, refreshed,
    require_profile_id,
};
use crate::schema::{FieldKind, Schema};
use crate::traits::{NextDnsApi, ProfileScoped, Resource, ResourceData};

/// Which list a [`DomainListResource`] manages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomainListKind {
    Allow,
    Deny,
}

impl DomainListKind {
    pub fn type_name(self) -> &'static str {
        match self {
            DomainListKind::Allow => "nextdns_allowlist",
            DomainListKind::Deny => "nextdns_denylist",
        }
    }

    /// Human label used in error messages
    pub fn label(self) -> &'static str {
        match self {
            DomainListKind::Allow => "allow list",
            DomainListKind::Deny => "deny list",
        }
    }
}

/// Local state of an allowlist or denylist
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DomainListState {
    pub profile_id: String,
    pub domain: Vec<EntryState>,
}

impl ProfileScoped for DomainListState {
    fn profile_id(&self) -> &str {
        &self.profile_id
    }

    fn set_profile_id(&mut self, profile_id: String) {
        self.profile_id = profile_id;
    }
}

/// Allowlist / denylist controller
pub struct DomainListResource {
    api: Arc<dyn NextDnsApi>,
    kind: DomainListKind,
}

impl DomainListResource {
    pub fn new(api: Arc<dyn NextDnsApi>, kind: DomainListKind) -> Self {
        Self { api, kind }
    }

    pub fn allowlist(api: Arc<dyn NextDnsApi>) -> Self {
        Self::new(api, DomainListKind::Allow)
    }

    pub fn denylist(api: Arc<dyn NextDnsApi>) -> Self {
        Self::new(api, DomainListKind::Deny)
    }

    pub fn kind(&self) -> DomainListKind {
        self.kind
    }

    async fn replace(&self, profile_id: &str, entries: &[ToggleEntry]) -> Result<()> {
        tracing::debug!(
            "Request to replace {} of profile {}: {} entries",
            self.kind.label(),
            profile_id,
            entries.len()
        );
        match self.kind {
            DomainListKind::Allow => self.api.replace_allowlist(profile_id, entries).await,
            DomainListKind::Deny => self.api.replace_denylist(profile_id, entries).await,
        }
    }

    /// Shared by create and update; `verb` names the operation in errors
    async fn write(
        &self,
        state: &DomainListState,
        verb: &str,
    ) -> Result<ResourceData<DomainListState>> {
        let label = self.kind.label();
        let profile_id = require_profile_id(&state.profile_id)?;
        let entries = build_entries("domain", &state.domain)
            .context(format!("error building {}", label))?;
        tracing::debug!("Object built: {:?}", entries);

        self.replace(profile_id, &entries)
            .await
            .context(format!("error {} {}", verb, label))?;

        let data = self.read(ResourceData::from_state(state.clone())).await?;
        refreshed(data, self.kind.type_name(), profile_id)
    }
}

#[async_trait]
impl Resource for DomainListResource {
    type State = DomainListState;

    fn type_name(&self) -> &'static str {
        self.kind.type_name()
    }

    fn schema(&self) -> Schema {
        let description = match self.kind {
            DomainListKind::Allow => "Domains to allow.",
            DomainListKind::Deny => "Domains to block.",
        };
        Schema::new()
            .required("profile_id", FieldKind::String, PROFILE_ID_DESCRIPTION)
            .required("domain", entry_set(), description)
    }

    async fn create(&self, desired: DomainListState) -> Result<ResourceData<DomainListState>> {
        let data = self.write(&desired, "creating").await?;
        tracing::info!("Created {} for profile {}", self.kind.label(), data.id);
        Ok(data)
    }

    async fn read(
        &self,
        current: ResourceData<DomainListState>,
    ) -> Result<Option<ResourceData<DomainListState>>> {
        let profile_id = require_profile_id(&current.state.profile_id)?.to_string();
        tracing::debug!("Request to list {} of profile {}", self.kind.label(), profile_id);

        let result = match self.kind {
            DomainListKind::Allow => self.api.list_allowlist(&profile_id).await,
            DomainListKind::Deny => self.api.list_denylist(&profile_id).await,
        }
        .context(format!("error getting {}", self.kind.label()));
        let Some(entries) = found(result, self.kind.type_name(), &profile_id)? else {
            return Ok(None);
        };
        tracing::debug!("Object built: {:?}", entries);

        Ok(Some(ResourceData::from_state(DomainListState {
            profile_id,
            domain: entries.into_iter().map(EntryState::from).collect(),
        })))
    }

    async fn update(
        &self,
        desired: ResourceData<DomainListState>,
    ) -> Result<ResourceData<DomainListState>> {
        self.write(&desired.state, "updating").await
    }

    async fn delete(
        &self,
        current: ResourceData<DomainListState>,
    ) -> Result<Option<ResourceData<DomainListState>>> {
        let profile_id = require_profile_id(&current.state.profile_id)?.to_string();
        self.replace(&profile_id, &[])
            .await
            .context(format!("error deleting {}", self.kind.label()))?;
        tracing::info!("Cleared {} of profile {}", self.kind.label(), profile_id);

        self.read(current).await
    }
}
