// # State Store Trait
//
// Defines the interface for the orchestrator-side record of managed
// resources.
//
// ## Purpose
//
// The controllers themselves are stateless; whatever hosts them must keep
// the identity and last-read state of every managed resource between
// calls. The store tracks, per resource address (`TYPE.NAME`):
// - The resource type name and identity (profile id)
// - The last state returned by a lifecycle call
// - When that state was last refreshed
//
// ## Implementations
//
// - In-memory: tests and one-shot hosts
// - File-based: JSON file with atomic writes (`nextdnsctl`)
//
// ## Usage
//
// ```rust,ignore
// use nextdns_core::{StateStore, StateRecord};
//
// let record = store.get("nextdns_allowlist.home").await?;
// if let Some(record) = record {
//     let refreshed = handler.read(&record.resource_data()).await?;
// }
// ```

use async_trait::async_trait;
use serde_json::Value;

use crate::traits::resource::ResourceData;

/// Orchestrator record of one managed resource
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StateRecord {
    /// Resource type name, e.g. `nextdns_allowlist`
    pub resource_type: String,
    /// Resource identity (profile id)
    pub id: String,
    /// Last known local state
    pub attributes: Value,
    /// When the attributes were last written
    pub last_refreshed: chrono::DateTime<chrono::Utc>,
}

impl StateRecord {
    /// Record the outcome of a lifecycle call
    pub fn new(resource_type: impl Into<String>, data: ResourceData<Value>) -> Self {
        Self {
            resource_type: resource_type.into(),
            id: data.id,
            attributes: data.state,
            last_refreshed: chrono::Utc::now(),
        }
    }

    /// Identity and state, as handed back to a resource handler
    pub fn resource_data(&self) -> ResourceData<Value> {
        ResourceData {
            id: self.id.clone(),
            state: self.attributes.clone(),
        }
    }

    /// Check if the record is older than `max_age`
    pub fn is_stale(&self, max_age: chrono::Duration) -> bool {
        let now = chrono::Utc::now();
        now.signed_duration_since(self.last_refreshed) > max_age
    }
}

/// Trait for state store implementations
///
/// # Thread Safety
///
/// All methods must be safe to call concurrently from multiple tasks.
///
/// # Trust Level: Trusted (Host Component)
///
/// ## Allowed Capabilities
/// - ✅ Perform local I/O for persistence
/// - ✅ Cache state in memory (with explicit flush)
///
/// ## Forbidden Capabilities
/// - ❌ Call the remote API (owned by the controllers)
/// - ❌ Interpret the attributes it stores
///
/// The reconciliation core never reads or writes this store; only the host
/// does.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Get the record stored under `address`
    ///
    /// # Returns
    ///
    /// - `Ok(Some(StateRecord))`: The record
    /// - `Ok(None)`: Nothing stored under that address
    /// - `Err(Error)`: Storage error
    async fn get(&self, address: &str) -> Result<Option<StateRecord>, crate::Error>;

    /// Create or replace the record under `address`
    async fn set(&self, address: &str, record: &StateRecord) -> Result<(), crate::Error>;

    /// Delete a record (no error if it didn't exist)
    async fn delete(&self, address: &str) -> Result<(), crate::Error>;

    /// List all addresses in the store
    async fn list(&self) -> Result<Vec<String>, crate::Error>;

    /// Persist any pending changes
    async fn flush(&self) -> Result<(), crate::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_round_trips_resource_data() {
        let data = ResourceData {
            id: "abc123".to_string(),
            state: json!({"profile_id": "abc123"}),
        };
        let record = StateRecord::new("nextdns_allowlist", data.clone());

        assert_eq!(record.resource_type, "nextdns_allowlist");
        assert_eq!(record.resource_data(), data);
        assert!(!record.is_stale(chrono::Duration::hours(1)));
    }
}
