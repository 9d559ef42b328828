//! `nextdns_setup_endpoint` and `nextdns_setup_linkedip` data sources

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use crate::codec::{doh_address, dot_address};
use crate::error::{Result, ResultExt};
use crate::resources::PROFILE_ID_DESCRIPTION;
use crate::schema::{FieldKind, Schema};
use crate::traits::{DataSource, NextDnsApi, ResourceData};

/// Addresses a profile is reachable at
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SetupEndpointState {
    pub profile_id: String,
    pub doh: String,
    pub dot: String,
    pub ipv4: Vec<String>,
    pub ipv6: Vec<String>,
    pub dnscrypt: String,
}

/// Linked-IP details of a profile
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LinkedIpState {
    pub profile_id: String,
    pub servers: Vec<String>,
    pub ip: String,
    pub ddns: String,
    pub update_token: String,
}

pub struct SetupEndpointSource {
    api: Arc<dyn NextDnsApi>,
}

impl SetupEndpointSource {
    pub fn new(api: Arc<dyn NextDnsApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl DataSource for SetupEndpointSource {
    type State = SetupEndpointState;

    fn type_name(&self) -> &'static str {
        "nextdns_setup_endpoint"
    }

    fn schema(&self) -> Schema {
        Schema::new()
            .required("profile_id", FieldKind::String, PROFILE_ID_DESCRIPTION)
            .computed(
                "doh",
                FieldKind::String,
                "The DNS over HTTPS address the profile is reachable at.",
            )
            .computed(
                "dot",
                FieldKind::String,
                "The DNS over TLS address the profile is reachable at.",
            )
            .computed(
                "ipv4",
                FieldKind::list(FieldKind::String),
                "The IPv4 addresses the profile is reachable at.",
            )
            .computed(
                "ipv6",
                FieldKind::list(FieldKind::String),
                "The IPv6 addresses the profile is reachable at.",
            )
            .computed("dnscrypt", FieldKind::String, "The DNS Stamps from the profile.")
    }

    async fn read(&self, profile_id: &str) -> Result<ResourceData<SetupEndpointState>> {
        tracing::debug!("Request to get setup of profile {}", profile_id);
        let setup = self
            .api
            .get_setup(profile_id)
            .await
            .context("error getting setup endpoint settings")?;
        tracing::debug!("Object built: {:?}", setup);

        Ok(ResourceData {
            id: profile_id.to_string(),
            state: SetupEndpointState {
                profile_id: profile_id.to_string(),
                doh: doh_address(profile_id),
                dot: dot_address(profile_id),
                ipv4: setup.ipv4,
                ipv6: setup.ipv6,
                dnscrypt: setup.dnscrypt,
            },
        })
    }
}

pub struct SetupLinkedIpSource {
    api: Arc<dyn NextDnsApi>,
}

impl SetupLinkedIpSource {
    pub fn new(api: Arc<dyn NextDnsApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl DataSource for SetupLinkedIpSource {
    type State = LinkedIpState;

    fn type_name(&self) -> &'static str {
        "nextdns_setup_linkedip"
    }

    fn schema(&self) -> Schema {
        Schema::new()
            .required("profile_id", FieldKind::String, PROFILE_ID_DESCRIPTION)
            .computed(
                "servers",
                FieldKind::list(FieldKind::String),
                "Servers to point the linked IP at.",
            )
            .computed("ip", FieldKind::String, "The linked IP address.")
            .computed("ddns", FieldKind::String, "DDNS hostname tracking the linked IP.")
            .computed(
                "update_token",
                FieldKind::String,
                "Token for updating the linked IP.",
            )
    }

    async fn read(&self, profile_id: &str) -> Result<ResourceData<LinkedIpState>> {
        tracing::debug!("Request to get linked IP of profile {}", profile_id);
        let linked = self
            .api
            .get_setup_linked_ip(profile_id)
            .await
            .context("error getting setup linkedip settings")?;
        tracing::debug!("Object built: servers={:?} ip={}", linked.servers, linked.ip);

        Ok(ResourceData {
            id: profile_id.to_string(),
            state: LinkedIpState {
                profile_id: profile_id.to_string(),
                servers: linked.servers,
                ip: linked.ip,
                ddns: linked.ddns,
                update_token: linked.update_token,
            },
        })
    }
}
