//! `nextdns_rewrite`
//!
//! The remote rewrite collection has no bulk replace and rejects a create
//! that duplicates an existing rule, so every write goes through
//! [`reconcile::plan`]: delete what is no longer declared, create what is
//! missing, leave matching rules alone. The resource owns the whole
//! collection of its profile; create reconciles against whatever already
//! exists and delete reconciles against an empty declaration.
//!
//! A failed delete or create aborts the call; rules already deleted or
//! created stay that way until the next update.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result, ResultExt};
use crate::model::{NewRewrite, Rewrite};
use crate::reconcile;
use crate::resources::{PROFILE_ID_DESCRIPTION, found, refreshed, require_profile_id};
use crate::schema::{FieldKind, Schema};
use crate::traits::{NextDnsApi, ProfileScoped, Resource, ResourceData};

/// Local state of the rewrite rules of a profile
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewriteState {
    pub profile_id: String,
    pub rewrite: Vec<RewriteEntry>,
}

impl ProfileScoped for RewriteState {
    fn profile_id(&self) -> &str {
        &self.profile_id
    }

    fn set_profile_id(&mut self, profile_id: String) {
        self.profile_id = profile_id;
    }
}

/// One rule, identified by its `(domain, address)` pair
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewriteEntry {
    pub domain: String,
    pub address: String,
}

impl RewriteEntry {
    pub fn new(domain: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            address: address.into(),
        }
    }
}

/// Rewrite controller
pub struct RewriteResource {
    api: Arc<dyn NextDnsApi>,
}

impl RewriteResource {
    pub fn new(api: Arc<dyn NextDnsApi>) -> Self {
        Self { api }
    }

    fn build(state: &RewriteState) -> Result<Vec<NewRewrite>> {
        state
            .rewrite
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                if entry.domain.trim().is_empty() || entry.address.trim().is_empty() {
                    return Err(Error::validation(format!(
                        "field `rewrite.{}` needs both a domain and an address",
                        i
                    )));
                }
                Ok(NewRewrite::new(entry.domain.clone(), entry.address.clone()))
            })
            .collect()
    }

    async fn list(&self, profile_id: &str) -> Result<Vec<Rewrite>> {
        tracing::debug!("Request to list rewrites of profile {}", profile_id);
        self.api
            .list_rewrites(profile_id)
            .await
            .context("error getting rewrites")
    }

    /// Bring the remote collection in line with `desired`
    async fn reconcile(&self, profile_id: &str, desired: &[NewRewrite]) -> Result<()> {
        let existing = self.list(profile_id).await?;
        let plan = reconcile::plan(
            &existing,
            desired,
            |e: &Rewrite| (e.name.clone(), e.content.clone()),
            |d: &NewRewrite| (d.name.clone(), d.content.clone()),
        );
        tracing::debug!(
            "Rewrite plan for profile {}: {} to remove, {} to add, {} unchanged",
            profile_id,
            plan.to_remove.len(),
            plan.to_add.len(),
            existing.len() - plan.to_remove.len()
        );

        for rewrite in &plan.to_remove {
            tracing::debug!("Request to delete rewrite {:?}", rewrite);
            self.api
                .delete_rewrite(profile_id, &rewrite.id)
                .await
                .context("error deleting rewrite")?;
        }

        for rewrite in &plan.to_add {
            tracing::debug!("Request to create rewrite {:?}", rewrite);
            let created = self
                .api
                .create_rewrite(profile_id, rewrite)
                .await
                .context("error creating rewrite")?;
            tracing::debug!("Rewrite created with id {}", created.id);
        }

        Ok(())
    }

    async fn write(&self, state: &RewriteState) -> Result<ResourceData<RewriteState>> {
        let profile_id = require_profile_id(&state.profile_id)?;
        let desired = Self::build(state).context("error building rewrite list")?;
        tracing::debug!("Object built: {:?}", desired);

        self.reconcile(profile_id, &desired).await?;

        let data = self.read(ResourceData::from_state(state.clone())).await?;
        refreshed(data, "nextdns_rewrite", profile_id)
    }
}

#[async_trait]
impl Resource for RewriteResource {
    type State = RewriteState;

    fn type_name(&self) -> &'static str {
        "nextdns_rewrite"
    }

    fn schema(&self) -> Schema {
        let entry = Schema::new()
            .required("domain", FieldKind::String, "Domain to rewrite.")
            .required("address", FieldKind::String, "Address or hostname to answer with.");
        Schema::new()
            .required("profile_id", FieldKind::String, PROFILE_ID_DESCRIPTION)
            .required(
                "rewrite",
                FieldKind::set(FieldKind::block(entry)),
                "DNS rewrite rules.",
            )
    }

    async fn create(&self, desired: RewriteState) -> Result<ResourceData<RewriteState>> {
        let data = self.write(&desired).await?;
        tracing::info!("Created rewrites for profile {}", data.id);
        Ok(data)
    }

    async fn read(
        &self,
        current: ResourceData<RewriteState>,
    ) -> Result<Option<ResourceData<RewriteState>>> {
        let profile_id = require_profile_id(&current.state.profile_id)?.to_string();

        let result = self.list(&profile_id).await;
        let Some(rewrites) = found(result, "nextdns_rewrite", &profile_id)? else {
            return Ok(None);
        };
        tracing::debug!("Object built: {:?}", rewrites);

        Ok(Some(ResourceData::from_state(RewriteState {
            profile_id,
            rewrite: rewrites
                .into_iter()
                .map(|r| RewriteEntry::new(r.name, r.content))
                .collect(),
        })))
    }

    async fn update(&self, desired: ResourceData<RewriteState>) -> Result<ResourceData<RewriteState>> {
        self.write(&desired.state).await
    }

    async fn delete(
        &self,
        current: ResourceData<RewriteState>,
    ) -> Result<Option<ResourceData<RewriteState>>> {
        let profile_id = require_profile_id(&current.state.profile_id)?.to_string();
        self.reconcile(&profile_id, &[]).await?;
        tracing::info!("Removed all rewrites of profile {}", profile_id);

        self.read(current).await
    }
}
