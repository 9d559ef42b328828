//! `nextdns_parental_control`
//!
//! One logical resource backed by three remote writes: the services set,
//! the categories set, and the toggle/recreation document. They are issued
//! in that order and are not transactional; a failure part way leaves the
//! earlier writes applied.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result, ResultExt};
use crate::model::{ParentalControl, Recreation, RecreationTimes, TimeWindow};
use crate::resources::{
    EntryState, PROFILE_ID_DESCRIPTION, build_entries, entry_set, found, refreshed,
    require_profile_id,
};
use crate::schema::{FieldKind, Schema};
use crate::traits::{NextDnsApi, ProfileScoped, Resource, ResourceData};

const TIME_FORMAT: &str = "%H:%M:%S";

/// Local state of the parental control settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParentalControlState {
    pub profile_id: String,
    pub block_bypass: bool,
    pub safe_search: bool,
    pub youtube_restricted_mode: bool,
    pub service: Vec<EntryState>,
    pub category: Vec<EntryState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recreation: Option<RecreationState>,
}

impl ProfileScoped for ParentalControlState {
    fn profile_id(&self) -> &str {
        &self.profile_id
    }

    fn set_profile_id(&mut self, profile_id: String) {
        self.profile_id = profile_id;
    }
}

/// Weekly recreation schedule, one optional window per weekday
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecreationState {
    pub timezone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monday: Option<TimeWindowState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tuesday: Option<TimeWindowState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wednesday: Option<TimeWindowState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thursday: Option<TimeWindowState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub friday: Option<TimeWindowState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saturday: Option<TimeWindowState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sunday: Option<TimeWindowState>,
}

/// `HH:MM:SS` interval
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindowState {
    pub start: String,
    pub end: String,
}

impl TimeWindowState {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    fn build(&self, day: &str) -> Result<TimeWindow> {
        for (bound, value) in [("start", &self.start), ("end", &self.end)] {
            NaiveTime::parse_from_str(value, TIME_FORMAT).map_err(|e| {
                Error::validation(format!(
                    "field `recreation.{}.{}` is not a HH:MM:SS time ({:?}): {}",
                    day, bound, value, e
                ))
            })?;
        }
        Ok(TimeWindow {
            start: self.start.clone(),
            end: self.end.clone(),
        })
    }
}

impl From<TimeWindow> for TimeWindowState {
    fn from(window: TimeWindow) -> Self {
        Self {
            start: window.start,
            end: window.end,
        }
    }
}

impl RecreationState {
    fn build(&self) -> Result<Recreation> {
        let window = |day: &str, w: &Option<TimeWindowState>| w.as_ref().map(|w| w.build(day)).transpose();
        Ok(Recreation {
            times: RecreationTimes {
                monday: window("monday", &self.monday)?,
                tuesday: window("tuesday", &self.tuesday)?,
                wednesday: window("wednesday", &self.wednesday)?,
                thursday: window("thursday", &self.thursday)?,
                friday: window("friday", &self.friday)?,
                saturday: window("saturday", &self.saturday)?,
                sunday: window("sunday", &self.sunday)?,
            },
            timezone: self.timezone.clone(),
        })
    }

    /// `None` when the remote schedule has no window at all
    fn from_remote(recreation: Recreation) -> Option<Self> {
        let RecreationTimes {
            monday,
            tuesday,
            wednesday,
            thursday,
            friday,
            saturday,
            sunday,
        } = recreation.times;
        let state = Self {
            timezone: recreation.timezone,
            monday: monday.map(Into::into),
            tuesday: tuesday.map(Into::into),
            wednesday: wednesday.map(Into::into),
            thursday: thursday.map(Into::into),
            friday: friday.map(Into::into),
            saturday: saturday.map(Into::into),
            sunday: sunday.map(Into::into),
        };
        let any_window = [
            &state.monday,
            &state.tuesday,
            &state.wednesday,
            &state.thursday,
            &state.friday,
            &state.saturday,
            &state.sunday,
        ]
        .iter()
        .any(|w| w.is_some());
        any_window.then_some(state)
    }
}

/// Parental control controller
pub struct ParentalControlResource {
    api: Arc<dyn NextDnsApi>,
}

impl ParentalControlResource {
    pub fn new(api: Arc<dyn NextDnsApi>) -> Self {
        Self { api }
    }

    fn build(state: &ParentalControlState) -> Result<ParentalControl> {
        Ok(ParentalControl {
            services: build_entries("service", &state.service)?,
            categories: build_entries("category", &state.category)?,
            safe_search: state.safe_search,
            youtube_restricted_mode: state.youtube_restricted_mode,
            block_bypass: state.block_bypass,
            recreation: state.recreation.as_ref().map(RecreationState::build).transpose()?,
        })
    }

    /// Services, then categories, then the toggle document
    async fn apply(&self, profile_id: &str, document: &ParentalControl, verb: &str) -> Result<()> {
        tracing::debug!(
            "Request to replace parental control services of profile {}: {:?}",
            profile_id,
            document.services
        );
        self.api
            .replace_parental_control_services(profile_id, &document.services)
            .await
            .context(format!("error {} services settings", verb))?;

        tracing::debug!(
            "Request to replace parental control categories of profile {}: {:?}",
            profile_id,
            document.categories
        );
        self.api
            .replace_parental_control_categories(profile_id, &document.categories)
            .await
            .context(format!("error {} categories settings", verb))?;

        tracing::debug!("Request to update parental control of profile {}", profile_id);
        self.api
            .update_parental_control(profile_id, document)
            .await
            .context(format!("error {} parental control settings", verb))
    }

    async fn write(
        &self,
        state: &ParentalControlState,
        verb: &str,
    ) -> Result<ResourceData<ParentalControlState>> {
        let profile_id = require_profile_id(&state.profile_id)?;
        let document = Self::build(state).context("error building parental control settings")?;
        tracing::debug!("Object built: {:?}", document);

        self.apply(profile_id, &document, verb).await?;

        let data = self.read(ResourceData::from_state(state.clone())).await?;
        refreshed(data, "nextdns_parental_control", profile_id)
    }
}

#[async_trait]
impl Resource for ParentalControlResource {
    type State = ParentalControlState;

    fn type_name(&self) -> &'static str {
        "nextdns_parental_control"
    }

    fn schema(&self) -> Schema {
        let window = || {
            FieldKind::block(
                Schema::new()
                    .required("start", FieldKind::String, "Start time, HH:MM:SS.")
                    .required("end", FieldKind::String, "End time, HH:MM:SS."),
            )
        };
        let recreation = Schema::new()
            .required("timezone", FieldKind::String, "Timezone of the schedule.")
            .optional("monday", window(), "")
            .optional("tuesday", window(), "")
            .optional("wednesday", window(), "")
            .optional("thursday", window(), "")
            .optional("friday", window(), "")
            .optional("saturday", window(), "")
            .optional("sunday", window(), "");

        Schema::new()
            .required("profile_id", FieldKind::String, PROFILE_ID_DESCRIPTION)
            .required("block_bypass", FieldKind::Bool, "Block bypass methods.")
            .required("safe_search", FieldKind::Bool, "Safe search.")
            .required(
                "youtube_restricted_mode",
                FieldKind::Bool,
                "YouTube restricted mode.",
            )
            .optional(
                "service",
                entry_set(),
                "Restrict access to specific websites, apps and games.",
            )
            .optional(
                "category",
                entry_set(),
                "Restrict access to specific categories of websites and apps.",
            )
            .optional(
                "recreation",
                FieldKind::block(recreation),
                "Weekly windows during which restrictions are lifted.",
            )
    }

    async fn create(
        &self,
        desired: ParentalControlState,
    ) -> Result<ResourceData<ParentalControlState>> {
        let data = self.write(&desired, "creating").await?;
        tracing::info!("Created parental control settings for profile {}", data.id);
        Ok(data)
    }

    async fn read(
        &self,
        current: ResourceData<ParentalControlState>,
    ) -> Result<Option<ResourceData<ParentalControlState>>> {
        let profile_id = require_profile_id(&current.state.profile_id)?.to_string();
        tracing::debug!("Request to get parental control of profile {}", profile_id);

        let result = self
            .api
            .get_parental_control(&profile_id)
            .await
            .context("error getting parental control settings");
        let Some(remote) = found(result, "nextdns_parental_control", &profile_id)? else {
            return Ok(None);
        };
        tracing::debug!("Object built: {:?}", remote);

        Ok(Some(ResourceData::from_state(ParentalControlState {
            profile_id,
            block_bypass: remote.block_bypass,
            safe_search: remote.safe_search,
            youtube_restricted_mode: remote.youtube_restricted_mode,
            service: remote.services.into_iter().map(EntryState::from).collect(),
            category: remote.categories.into_iter().map(EntryState::from).collect(),
            recreation: remote.recreation.and_then(RecreationState::from_remote),
        })))
    }

    async fn update(
        &self,
        desired: ResourceData<ParentalControlState>,
    ) -> Result<ResourceData<ParentalControlState>> {
        self.write(&desired.state, "updating").await
    }

    async fn delete(
        &self,
        current: ResourceData<ParentalControlState>,
    ) -> Result<Option<ResourceData<ParentalControlState>>> {
        let profile_id = require_profile_id(&current.state.profile_id)?.to_string();
        self.apply(&profile_id, &ParentalControl::default(), "deleting")
            .await?;
        tracing::info!("Reset parental control settings of profile {}", profile_id);

        self.read(current).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> ParentalControlState {
        ParentalControlState {
            profile_id: "abc123".to_string(),
            safe_search: true,
            service: vec![EntryState::new("tiktok", true)],
            recreation: Some(RecreationState {
                timezone: "Europe/Paris".to_string(),
                monday: Some(TimeWindowState::new("18:00:00", "20:30:00")),
                saturday: Some(TimeWindowState::new("09:00:00", "23:00:00")),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_build_expands_only_configured_days() {
        let document = ParentalControlResource::build(&state()).unwrap();
        let recreation = document.recreation.unwrap();

        assert_eq!(recreation.timezone, "Europe/Paris");
        assert_eq!(recreation.times.monday.unwrap().end, "20:30:00");
        assert!(recreation.times.tuesday.is_none());
        assert!(recreation.times.saturday.is_some());
        assert!(recreation.times.sunday.is_none());
        assert_eq!(document.services.len(), 1);
        assert!(document.categories.is_empty());
    }

    #[test]
    fn test_build_rejects_bad_time() {
        let mut bad = state();
        if let Some(r) = bad.recreation.as_mut() {
            r.friday = Some(TimeWindowState::new("25:00:00", "26:00:00"));
        }
        let err = ParentalControlResource::build(&bad).unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("recreation.friday.start"));
    }

    #[test]
    fn test_empty_remote_schedule_collapses() {
        let empty = Recreation {
            times: RecreationTimes::default(),
            timezone: "UTC".to_string(),
        };
        assert!(RecreationState::from_remote(empty).is_none());

        let built = state().recreation.unwrap().build().unwrap();
        assert_eq!(RecreationState::from_remote(built), state().recreation);
    }
}
