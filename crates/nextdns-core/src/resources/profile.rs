//! `nextdns_profile`

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::codec::{doh_address, dot_address, ipv6_addresses};
use crate::error::{Result, ResultExt};
use crate::model::Profile;
use crate::resources::{found, refreshed, require_profile_id};
use crate::schema::{FieldKind, Schema};
use crate::traits::{NextDnsApi, ProfileScoped, Resource, ResourceData};

/// Local state of a profile
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileState {
    /// Minted by create
    pub profile_id: String,
    pub name: String,
    pub endpoint_doh: String,
    pub endpoint_dot: String,
    /// Primary and secondary resolver
    pub endpoint_ipv6: Vec<String>,
}

impl ProfileScoped for ProfileState {
    fn profile_id(&self) -> &str {
        &self.profile_id
    }

    fn set_profile_id(&mut self, profile_id: String) {
        self.profile_id = profile_id;
    }
}

/// Profile controller
///
/// The only controller that mints an identity. Delete is local-only: the
/// remote profile is a user-facing resolver and is never destroyed here,
/// so delete makes no remote call and returns nothing.
pub struct ProfileResource {
    api: Arc<dyn NextDnsApi>,
}

impl ProfileResource {
    pub fn new(api: Arc<dyn NextDnsApi>) -> Self {
        Self { api }
    }

    fn build(state: &ProfileState) -> Profile {
        Profile {
            id: String::new(),
            name: state.name.clone(),
        }
    }
}

#[async_trait]
impl Resource for ProfileResource {
    type State = ProfileState;

    fn type_name(&self) -> &'static str {
        "nextdns_profile"
    }

    fn schema(&self) -> Schema {
        Schema::new()
            .computed(
                "profile_id",
                FieldKind::String,
                "The profile identifier to target the resource.",
            )
            .required("name", FieldKind::String, "Profile name.")
            .computed(
                "endpoint_doh",
                FieldKind::String,
                "The DNS over HTTPS address the DNS is reachable at.",
            )
            .computed(
                "endpoint_dot",
                FieldKind::String,
                "The DNS over TLS address the DNS is reachable at.",
            )
            .computed(
                "endpoint_ipv6",
                FieldKind::list(FieldKind::String),
                "The IPv6 addresses the DNS is reachable at.",
            )
    }

    async fn create(&self, desired: ProfileState) -> Result<ResourceData<ProfileState>> {
        let profile = Self::build(&desired);
        tracing::debug!("Request to create profile: {:?}", profile);

        let profile_id = self
            .api
            .create_profile(&profile)
            .await
            .context("error creating profile")?;
        tracing::info!("Created profile {} ({})", profile_id, profile.name);

        let mut state = desired;
        state.profile_id = profile_id.clone();
        let data = self.read(ResourceData::from_state(state)).await?;
        refreshed(data, Resource::type_name(self), &profile_id)
    }

    async fn read(
        &self,
        current: ResourceData<ProfileState>,
    ) -> Result<Option<ResourceData<ProfileState>>> {
        let profile_id = require_profile_id(&current.state.profile_id)?.to_string();
        tracing::debug!("Request to get profile {}", profile_id);

        let result = self
            .api
            .get_profile(&profile_id)
            .await
            .context("error getting profile");
        let Some(profile) = found(result, Resource::type_name(self), &profile_id)? else {
            return Ok(None);
        };
        tracing::debug!("Object built: {:?}", profile);

        Ok(Some(ResourceData::from_state(ProfileState {
            endpoint_doh: doh_address(&profile_id),
            endpoint_dot: dot_address(&profile_id),
            endpoint_ipv6: ipv6_addresses(&profile_id),
            name: profile.name,
            profile_id,
        })))
    }

    async fn update(
        &self,
        desired: ResourceData<ProfileState>,
    ) -> Result<ResourceData<ProfileState>> {
        let profile_id = require_profile_id(&desired.state.profile_id)?.to_string();
        let profile = Self::build(&desired.state);
        tracing::debug!("Request to update profile {}: {:?}", profile_id, profile);

        self.api
            .update_profile(&profile_id, &profile)
            .await
            .context("error updating profile")?;

        let data = self.read(desired).await?;
        refreshed(data, Resource::type_name(self), &profile_id)
    }

    async fn delete(
        &self,
        current: ResourceData<ProfileState>,
    ) -> Result<Option<ResourceData<ProfileState>>> {
        tracing::info!(
            "Detached profile {}; the remote profile is left in place",
            current.id
        );
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_carries_only_name() {
        let state = ProfileState {
            profile_id: "abc123".to_string(),
            name: "Home".to_string(),
            ..Default::default()
        };
        let body = serde_json::to_value(ProfileResource::build(&state)).unwrap();
        assert_eq!(body, serde_json::json!({"name": "Home"}));
    }
}
