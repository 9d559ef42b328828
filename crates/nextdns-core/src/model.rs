//! Wire types of the NextDNS configuration API
//!
//! These mirror the JSON documents exchanged with `api.nextdns.io`
//! (camelCase field names). Missing fields decode to their defaults so a
//! partially populated response never fails to parse.

use serde::{Deserialize, Serialize};

/// A profile
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Profile {
    /// Server-assigned identifier (absent on requests)
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,
    /// Display name
    pub name: String,
}

/// Allowlist/denylist entry, parental-control service or category
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToggleEntry {
    /// Domain or catalog identifier
    pub id: String,
    /// Whether the entry is enforced
    pub active: bool,
}

impl ToggleEntry {
    pub fn new(id: impl Into<String>, active: bool) -> Self {
        Self {
            id: id.into(),
            active,
        }
    }
}

/// Privacy blocklist, native tracker or security TLD reference
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdRef {
    pub id: String,
}

impl IdRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// Parental control document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ParentalControl {
    pub services: Vec<ToggleEntry>,
    pub categories: Vec<ToggleEntry>,
    pub safe_search: bool,
    pub youtube_restricted_mode: bool,
    pub block_bypass: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recreation: Option<Recreation>,
}

/// Weekly recreation schedule
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Recreation {
    pub times: RecreationTimes,
    pub timezone: String,
}

/// One optional window per weekday
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecreationTimes {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monday: Option<TimeWindow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tuesday: Option<TimeWindow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wednesday: Option<TimeWindow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thursday: Option<TimeWindow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub friday: Option<TimeWindow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saturday: Option<TimeWindow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sunday: Option<TimeWindow>,
}

/// Time-of-day interval, `HH:MM:SS`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeWindow {
    pub start: String,
    pub end: String,
}

/// Privacy document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Privacy {
    pub blocklists: Vec<IdRef>,
    pub natives: Vec<IdRef>,
    pub disguised_trackers: bool,
    pub allow_affiliate: bool,
}

/// Security document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Security {
    pub threat_intelligence_feeds: bool,
    pub ai_threat_detection: bool,
    pub google_safe_browsing: bool,
    pub cryptojacking: bool,
    pub dns_rebinding: bool,
    pub idn_homographs: bool,
    pub typosquatting: bool,
    pub dga: bool,
    pub nrd: bool,
    pub ddns: bool,
    pub parking: bool,
    pub csam: bool,
    pub tlds: Vec<IdRef>,
}

/// Settings document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub logs: SettingsLogs,
    pub block_page: SettingsBlockPage,
    pub performance: SettingsPerformance,
    pub web3: bool,
}

/// Query log settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsLogs {
    pub enabled: bool,
    pub drop: LogsDrop,
    /// Seconds
    pub retention: u32,
    pub location: String,
}

/// What the log pipeline discards
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogsDrop {
    pub ip: bool,
    pub domain: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsBlockPage {
    pub enabled: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SettingsPerformance {
    pub ecs: bool,
    pub cache_boost: bool,
    pub cname_flattening: bool,
}

/// A rewrite rule as stored remotely
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rewrite {
    pub id: String,
    pub name: String,
    /// Record type chosen by the server (A, AAAA, CNAME)
    #[serde(rename = "type", skip_serializing_if = "String::is_empty")]
    pub record_type: String,
    pub content: String,
}

/// Body of a rewrite create request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRewrite {
    pub name: String,
    pub content: String,
}

impl NewRewrite {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }
}

/// Setup information for a profile
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Setup {
    pub ipv4: Vec<String>,
    pub ipv6: Vec<String>,
    pub dnscrypt: String,
}

/// Linked-IP setup information for a profile
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LinkedIp {
    pub servers: Vec<String>,
    pub ip: String,
    pub ddns: String,
    pub update_token: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_settings_wire_names() {
        let settings = Settings {
            logs: SettingsLogs {
                enabled: true,
                drop: LogsDrop { ip: true, domain: false },
                retention: 3600,
                location: "ch".to_string(),
            },
            block_page: SettingsBlockPage { enabled: true },
            performance: SettingsPerformance {
                ecs: true,
                cache_boost: false,
                cname_flattening: true,
            },
            web3: false,
        };

        let value = serde_json::to_value(&settings).unwrap();
        assert_eq!(value["blockPage"]["enabled"], json!(true));
        assert_eq!(value["performance"]["cacheBoost"], json!(false));
        assert_eq!(value["performance"]["cnameFlattening"], json!(true));
        assert_eq!(value["logs"]["drop"]["ip"], json!(true));
    }

    #[test]
    fn test_parental_control_omits_missing_recreation() {
        let value = serde_json::to_value(ParentalControl::default()).unwrap();
        assert!(value.get("recreation").is_none());
        assert_eq!(value["youtubeRestrictedMode"], json!(false));
    }

    #[test]
    fn test_partial_documents_decode() {
        let security: Security =
            serde_json::from_value(json!({"cryptojacking": true, "tlds": [{"id": "zip"}]})).unwrap();
        assert!(security.cryptojacking);
        assert!(!security.csam);
        assert_eq!(security.tlds, vec![IdRef::new("zip")]);

        let rewrite: Rewrite = serde_json::from_value(
            json!({"id": "r1", "name": "nas.lan", "type": "A", "content": "10.0.0.2"}),
        )
        .unwrap();
        assert_eq!(rewrite.record_type, "A");
    }
}
