//! Resource controllers and data sources
//!
//! Each controller holds a shared [`NextDnsApi`] handle and translates
//! between its typed local state and the remote documents. They all follow
//! the same state machine:
//!
//! - **create**: build the remote request, send it, then read back
//! - **read**: fetch the remote view; `None` when the profile is gone
//! - **update**: same calls as create (the remote treats them as upserts)
//! - **delete**: send the empty value of every sub-resource, then read back
//! - **import**: adopt a profile id and read
//!
//! Profile and rewrite deviate from this in ways documented on their types.
//!
//! [`NextDnsApi`]: crate::traits::NextDnsApi

pub mod domain_list;
pub mod parental_control;
pub mod privacy;
pub mod profile;
pub mod rewrite;
pub mod security;
pub mod settings;
pub mod setup;

pub use domain_list::{DomainListKind, DomainListResource, DomainListState};
pub use parental_control::{
    ParentalControlResource, ParentalControlState, RecreationState, TimeWindowState,
};
pub use privacy::{PrivacyResource, PrivacyState};
pub use profile::{ProfileResource, ProfileState};
pub use rewrite::{RewriteEntry, RewriteResource, RewriteState};
pub use security::{SecurityResource, SecurityState};
pub use settings::{
    BlockPageState, LogsPrivacyState, LogsState, PerformanceState, SettingsResource,
    SettingsState,
};
pub use setup::{LinkedIpState, SetupEndpointState, SetupEndpointSource, SetupLinkedIpSource};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::ToggleEntry;
use crate::schema::{FieldKind, Schema};
use crate::traits::resource::ResourceData;

pub(crate) const PROFILE_ID_DESCRIPTION: &str = "The profile identifier to target the resource.";

/// `{id, active}` element of a domain list, service set or category set
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryState {
    pub id: String,
    pub active: bool,
}

impl EntryState {
    pub fn new(id: impl Into<String>, active: bool) -> Self {
        Self {
            id: id.into(),
            active,
        }
    }
}

impl From<&EntryState> for ToggleEntry {
    fn from(entry: &EntryState) -> Self {
        ToggleEntry::new(entry.id.clone(), entry.active)
    }
}

impl From<ToggleEntry> for EntryState {
    fn from(entry: ToggleEntry) -> Self {
        Self {
            id: entry.id,
            active: entry.active,
        }
    }
}

/// Schema of a set of `{id, active}` blocks
pub(crate) fn entry_set() -> FieldKind {
    FieldKind::set(FieldKind::block(
        Schema::new()
            .required("id", FieldKind::String, "")
            .required("active", FieldKind::Bool, ""),
    ))
}

/// Translate entries for the wire, rejecting blank ids
pub(crate) fn build_entries(field: &str, entries: &[EntryState]) -> Result<Vec<ToggleEntry>> {
    if let Some(i) = entries.iter().position(|e| e.id.trim().is_empty()) {
        return Err(Error::validation(format!("field `{}.{}.id` is empty", field, i)));
    }
    Ok(entries.iter().map(ToggleEntry::from).collect())
}

pub(crate) fn require_profile_id(profile_id: &str) -> Result<&str> {
    if profile_id.is_empty() {
        return Err(Error::validation("missing required field `profile_id`"));
    }
    Ok(profile_id)
}

/// Treat a not-found response as "resource gone"
pub(crate) fn found<T>(result: Result<T>, type_name: &str, profile_id: &str) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(err) if err.is_not_found() => {
            tracing::warn!(
                "{} for profile {} no longer exists remotely: {}",
                type_name,
                profile_id,
                err
            );
            Ok(None)
        }
        Err(err) => Err(err),
    }
}

/// The read that closes create and update must find the resource
pub(crate) fn refreshed<S>(
    data: Option<ResourceData<S>>,
    type_name: &str,
    profile_id: &str,
) -> Result<ResourceData<S>> {
    data.ok_or_else(|| {
        Error::not_found(format!(
            "{} for profile {} vanished after it was written",
            type_name, profile_id
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_entries_rejects_blank_id() {
        let entries = vec![EntryState::new("example.com", true), EntryState::new(" ", false)];
        let err = build_entries("domain", &entries).unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("domain.1.id"));
    }

    #[test]
    fn test_found_maps_not_found_to_none() {
        let gone: Result<()> = Err(Error::not_found("profile").context("error getting deny list"));
        assert!(found(gone, "nextdns_denylist", "abc123").unwrap().is_none());

        let failed: Result<()> = Err(Error::auth("bad key"));
        assert!(found(failed, "nextdns_denylist", "abc123").is_err());
    }
}
