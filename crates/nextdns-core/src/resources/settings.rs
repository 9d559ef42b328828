//! `nextdns_settings`
//!
//! Two translations happen here. Retention is a label locally and a number
//! of seconds remotely (see [`Retention`]). The privacy toggles are
//! phrased as "log X" locally and as "drop X" remotely, so both are
//! inverted on the way out and on the way back.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::codec::{RETENTION_TABLE, Retention, invert};
use crate::error::{Result, ResultExt};
use crate::model::{LogsDrop, Settings, SettingsBlockPage, SettingsLogs, SettingsPerformance};
use crate::resources::{PROFILE_ID_DESCRIPTION, found, refreshed, require_profile_id};
use crate::schema::{FieldKind, Schema};
use crate::traits::{NextDnsApi, ProfileScoped, Resource, ResourceData};

/// Local state of the profile settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsState {
    pub profile_id: String,
    pub logs: LogsState,
    pub block_page: BlockPageState,
    pub performance: PerformanceState,
    pub web3: bool,
}

impl ProfileScoped for SettingsState {
    fn profile_id(&self) -> &str {
        &self.profile_id
    }

    fn set_profile_id(&mut self, profile_id: String) {
        self.profile_id = profile_id;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogsState {
    pub enabled: bool,
    pub privacy: LogsPrivacyState,
    pub retention: Retention,
    pub location: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogsPrivacyState {
    pub log_clients_ip: bool,
    pub log_domains: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockPageState {
    pub enabled: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceState {
    pub ecs: bool,
    pub cache_boost: bool,
    pub cname_flattening: bool,
}

/// Settings controller
///
/// Writes logs, block page and performance through their own endpoints,
/// then the whole settings document.
pub struct SettingsResource {
    api: Arc<dyn NextDnsApi>,
}

impl SettingsResource {
    pub fn new(api: Arc<dyn NextDnsApi>) -> Self {
        Self { api }
    }

    fn build(state: &SettingsState) -> Settings {
        Settings {
            logs: SettingsLogs {
                enabled: state.logs.enabled,
                drop: LogsDrop {
                    ip: invert(state.logs.privacy.log_clients_ip),
                    domain: invert(state.logs.privacy.log_domains),
                },
                retention: state.logs.retention.to_seconds(),
                location: state.logs.location.clone(),
            },
            block_page: SettingsBlockPage {
                enabled: state.block_page.enabled,
            },
            performance: SettingsPerformance {
                ecs: state.performance.ecs,
                cache_boost: state.performance.cache_boost,
                cname_flattening: state.performance.cname_flattening,
            },
            web3: state.web3,
        }
    }

    /// Translate the remote document, keeping the retention shape of `shape`
    fn translate(profile_id: String, remote: Settings, shape: &Retention) -> SettingsState {
        SettingsState {
            profile_id,
            logs: LogsState {
                enabled: remote.logs.enabled,
                privacy: LogsPrivacyState {
                    log_clients_ip: invert(remote.logs.drop.ip),
                    log_domains: invert(remote.logs.drop.domain),
                },
                retention: Retention::from_seconds(remote.logs.retention, shape.is_label()),
                location: remote.logs.location,
            },
            block_page: BlockPageState {
                enabled: remote.block_page.enabled,
            },
            performance: PerformanceState {
                ecs: remote.performance.ecs,
                cache_boost: remote.performance.cache_boost,
                cname_flattening: remote.performance.cname_flattening,
            },
            web3: remote.web3,
        }
    }

    async fn apply(&self, profile_id: &str, document: &Settings, verb: &str) -> Result<()> {
        tracing::debug!(
            "Request to update logs settings of profile {}: {:?}",
            profile_id,
            document.logs
        );
        self.api
            .update_settings_logs(profile_id, &document.logs)
            .await
            .context(format!("error {} logs settings", verb))?;

        tracing::debug!("Request to update block page settings of profile {}", profile_id);
        self.api
            .update_settings_block_page(profile_id, &document.block_page)
            .await
            .context(format!("error {} block page settings", verb))?;

        tracing::debug!("Request to update performance settings of profile {}", profile_id);
        self.api
            .update_settings_performance(profile_id, &document.performance)
            .await
            .context(format!("error {} performance settings", verb))?;

        tracing::debug!("Request to update settings of profile {}", profile_id);
        self.api
            .update_settings(profile_id, document)
            .await
            .context(format!("error {} settings", verb))
    }

    async fn write(&self, state: &SettingsState, verb: &str) -> Result<ResourceData<SettingsState>> {
        let profile_id = require_profile_id(&state.profile_id)?;
        let document = Self::build(state);
        tracing::debug!("Object built: {:?}", document);

        self.apply(profile_id, &document, verb).await?;

        let data = self.read(ResourceData::from_state(state.clone())).await?;
        refreshed(data, "nextdns_settings", profile_id)
    }
}

#[async_trait]
impl Resource for SettingsResource {
    type State = SettingsState;

    fn type_name(&self) -> &'static str {
        "nextdns_settings"
    }

    fn schema(&self) -> Schema {
        let retention = FieldKind::OneOf {
            kinds: vec![
                FieldKind::Enum {
                    values: RETENTION_TABLE.iter().map(|(label, _)| *label).collect(),
                },
                FieldKind::Int,
            ],
        };
        let privacy = Schema::new()
            .required("log_clients_ip", FieldKind::Bool, "Log clients IP.")
            .required("log_domains", FieldKind::Bool, "Log domains.");
        let logs = Schema::new()
            .required("enabled", FieldKind::Bool, "Enable logs.")
            .required("privacy", FieldKind::block(privacy), "")
            .required(
                "retention",
                retention,
                "Retention period for logs, a label or a number of seconds.",
            )
            .required("location", FieldKind::String, "Location of the logs.");
        let block_page =
            Schema::new().required("enabled", FieldKind::Bool, "Enable block page.");
        let performance = Schema::new()
            .required("ecs", FieldKind::Bool, "Anonymized EDNS client subnet.")
            .required("cache_boost", FieldKind::Bool, "Cache boost.")
            .required("cname_flattening", FieldKind::Bool, "CNAME flattening.");

        Schema::new()
            .required("profile_id", FieldKind::String, PROFILE_ID_DESCRIPTION)
            .required("logs", FieldKind::block(logs), "Logs.")
            .required("block_page", FieldKind::block(block_page), "Block Page.")
            .required("performance", FieldKind::block(performance), "Performance.")
            .optional("web3", FieldKind::Bool, "Web3.")
    }

    async fn create(&self, desired: SettingsState) -> Result<ResourceData<SettingsState>> {
        let data = self.write(&desired, "creating").await?;
        tracing::info!("Created settings for profile {}", data.id);
        Ok(data)
    }

    async fn read(
        &self,
        current: ResourceData<SettingsState>,
    ) -> Result<Option<ResourceData<SettingsState>>> {
        let profile_id = require_profile_id(&current.state.profile_id)?.to_string();
        tracing::debug!("Request to get settings of profile {}", profile_id);

        let result = self
            .api
            .get_settings(&profile_id)
            .await
            .context("error getting settings");
        let Some(remote) = found(result, "nextdns_settings", &profile_id)? else {
            return Ok(None);
        };
        tracing::debug!("Object built: {:?}", remote);

        let state = Self::translate(profile_id, remote, &current.state.logs.retention);
        if let Retention::Seconds(secs) = &state.logs.retention {
            if current.state.logs.retention.is_label() {
                tracing::warn!(
                    "Retention of profile {} is {} seconds, which has no label",
                    state.profile_id,
                    secs
                );
            }
        }
        Ok(Some(ResourceData::from_state(state)))
    }

    async fn update(
        &self,
        desired: ResourceData<SettingsState>,
    ) -> Result<ResourceData<SettingsState>> {
        self.write(&desired.state, "updating").await
    }

    async fn delete(
        &self,
        current: ResourceData<SettingsState>,
    ) -> Result<Option<ResourceData<SettingsState>>> {
        let profile_id = require_profile_id(&current.state.profile_id)?.to_string();
        self.apply(&profile_id, &Settings::default(), "deleting").await?;
        tracing::info!("Reset settings of profile {}", profile_id);

        self.read(current).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn state(retention: Retention) -> SettingsState {
        SettingsState {
            profile_id: "abc123".to_string(),
            logs: LogsState {
                enabled: true,
                privacy: LogsPrivacyState {
                    log_clients_ip: true,
                    log_domains: false,
                },
                retention,
                location: "eu".to_string(),
            },
            block_page: BlockPageState { enabled: true },
            performance: PerformanceState {
                ecs: true,
                cache_boost: true,
                cname_flattening: false,
            },
            web3: false,
        }
    }

    #[test]
    fn test_build_inverts_privacy_and_encodes_retention() {
        let document = SettingsResource::build(&state(Retention::Label("1 month".to_string())));
        assert!(!document.logs.drop.ip);
        assert!(document.logs.drop.domain);
        assert_eq!(document.logs.retention, 2_592_000);
    }

    #[test]
    fn test_translate_round_trips_both_shapes() {
        for retention in [Retention::Label("6 hours".to_string()), Retention::Seconds(21_600)] {
            let local = state(retention.clone());
            let remote = SettingsResource::build(&local);
            let back = SettingsResource::translate("abc123".to_string(), remote, &retention);
            assert_eq!(back, local);
        }
    }

    #[test]
    fn test_translate_surfaces_non_canonical_retention() {
        let mut remote = SettingsResource::build(&state(Retention::Label("1 day".to_string())));
        remote.logs.retention = 12345;
        let back = SettingsResource::translate(
            "abc123".to_string(),
            remote,
            &Retention::Label("1 day".to_string()),
        );
        assert_eq!(back.logs.retention, Retention::Seconds(12345));
    }
}
