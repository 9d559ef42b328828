// # Resource Lifecycle Traits
//
// Defines the surface the orchestrator drives: five lifecycle entry points
// per managed resource type, and a single read for each data source.
//
// ## Layers
//
// - `Resource` / `DataSource`: typed, one impl per controller
// - `ResourceHandler` / `DataSourceHandler`: object-safe JSON wrappers,
//   implemented for every typed impl, stored in the registry
//
// ## Usage
//
// ```rust,ignore
// use nextdns_core::{ResourceRegistry, ResourceHandler};
// use serde_json::json;
//
// let registry = ResourceRegistry::with_defaults(api);
// let allowlist = registry.resource("nextdns_allowlist")?;
//
// let created = allowlist
//     .create(&json!({"profile_id": "abc123", "domain": [{"id": "example.com", "active": true}]}))
//     .await?;
// assert_eq!(created.id, "abc123");
// ```

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::schema::Schema;

/// Local state that is scoped by a profile
///
/// Every resource is keyed by `profile_id`; the profile resource itself
/// stores the id it minted.
pub trait ProfileScoped {
    fn profile_id(&self) -> &str;
    fn set_profile_id(&mut self, profile_id: String);
}

/// Orchestrator-visible identity plus local state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceData<S> {
    /// Resource identity (always a profile id)
    pub id: String,
    pub state: S,
}

impl<S: ProfileScoped> ResourceData<S> {
    /// Wrap a state whose `profile_id` is its identity
    pub fn from_state(state: S) -> Self {
        Self {
            id: state.profile_id().to_string(),
            state,
        }
    }
}

/// Typed lifecycle of one managed resource type
///
/// # Contract
///
/// - Every remote failure is wrapped with an operation message
///   ("error creating allow list") before it is returned
/// - `read` returns `Ok(None)` when the remote reports the resource gone;
///   any other failure is an error
/// - `create`, `update` and `delete` end with a `read` so the returned
///   state reflects the remote
/// - No retries; a failure aborts the call and earlier remote mutations
///   stay applied
#[async_trait]
pub trait Resource: Send + Sync {
    /// Decoded local state
    type State: ProfileScoped
        + Serialize
        + DeserializeOwned
        + Default
        + Clone
        + Send
        + Sync
        + 'static;

    /// Orchestrator type name, e.g. `nextdns_allowlist`
    fn type_name(&self) -> &'static str;

    fn schema(&self) -> Schema;

    async fn create(&self, desired: Self::State) -> Result<ResourceData<Self::State>>;

    async fn read(
        &self,
        current: ResourceData<Self::State>,
    ) -> Result<Option<ResourceData<Self::State>>>;

    async fn update(&self, desired: ResourceData<Self::State>) -> Result<ResourceData<Self::State>>;

    /// Remove the resource, returning the remote view after removal
    async fn delete(
        &self,
        current: ResourceData<Self::State>,
    ) -> Result<Option<ResourceData<Self::State>>>;

    /// Adopt an existing remote resource by profile id
    async fn import(&self, external_id: &str) -> Result<Option<ResourceData<Self::State>>> {
        let mut state = Self::State::default();
        state.set_profile_id(external_id.to_string());
        self.read(ResourceData {
            id: external_id.to_string(),
            state,
        })
        .await
    }
}

/// Typed read-only data source
#[async_trait]
pub trait DataSource: Send + Sync {
    type State: Serialize + Send + 'static;

    fn type_name(&self) -> &'static str;

    fn schema(&self) -> Schema;

    async fn read(&self, profile_id: &str) -> Result<ResourceData<Self::State>>;
}

/// Object-safe lifecycle over JSON documents
///
/// Desired documents are checked against the schema and then decoded into
/// the typed state; malformed input is a validation error and never
/// reaches the remote service.
#[async_trait]
pub trait ResourceHandler: Send + Sync {
    fn type_name(&self) -> &'static str;

    fn schema(&self) -> Schema;

    async fn create(&self, desired: &Value) -> Result<ResourceData<Value>>;

    async fn read(&self, current: &ResourceData<Value>) -> Result<Option<ResourceData<Value>>>;

    async fn update(
        &self,
        current: &ResourceData<Value>,
        desired: &Value,
    ) -> Result<ResourceData<Value>>;

    async fn delete(&self, current: &ResourceData<Value>) -> Result<Option<ResourceData<Value>>>;

    async fn import(&self, external_id: &str) -> Result<Option<ResourceData<Value>>>;
}

/// Object-safe data source read
#[async_trait]
pub trait DataSourceHandler: Send + Sync {
    fn type_name(&self) -> &'static str;

    fn schema(&self) -> Schema;

    async fn read(&self, profile_id: &str) -> Result<ResourceData<Value>>;
}

#[async_trait]
impl<R: Resource> ResourceHandler for R {
    fn type_name(&self) -> &'static str {
        Resource::type_name(self)
    }

    fn schema(&self) -> Schema {
        Resource::schema(self)
    }

    async fn create(&self, desired: &Value) -> Result<ResourceData<Value>> {
        let state: R::State = decode_desired(&Resource::schema(self), desired)?;
        encode(Resource::create(self, state).await?)
    }

    async fn read(&self, current: &ResourceData<Value>) -> Result<Option<ResourceData<Value>>> {
        let current = decode_stored::<R::State>(current)?;
        Resource::read(self, current).await?.map(encode).transpose()
    }

    async fn update(
        &self,
        current: &ResourceData<Value>,
        desired: &Value,
    ) -> Result<ResourceData<Value>> {
        let mut state: R::State = decode_desired(&Resource::schema(self), desired)?;
        if state.profile_id().is_empty() {
            state.set_profile_id(current.id.clone());
        }
        let data = ResourceData {
            id: current.id.clone(),
            state,
        };
        encode(Resource::update(self, data).await?)
    }

    async fn delete(&self, current: &ResourceData<Value>) -> Result<Option<ResourceData<Value>>> {
        let current = decode_stored::<R::State>(current)?;
        Resource::delete(self, current).await?.map(encode).transpose()
    }

    async fn import(&self, external_id: &str) -> Result<Option<ResourceData<Value>>> {
        Resource::import(self, external_id)
            .await?
            .map(encode)
            .transpose()
    }
}

#[async_trait]
impl<D: DataSource> DataSourceHandler for D {
    fn type_name(&self) -> &'static str {
        DataSource::type_name(self)
    }

    fn schema(&self) -> Schema {
        DataSource::schema(self)
    }

    async fn read(&self, profile_id: &str) -> Result<ResourceData<Value>> {
        if profile_id.is_empty() {
            return Err(Error::validation("missing required field `profile_id`"));
        }
        encode(DataSource::read(self, profile_id).await?)
    }
}

fn decode_desired<S: DeserializeOwned>(schema: &Schema, desired: &Value) -> Result<S> {
    schema.validate(desired)?;
    let mut document = desired.clone();
    schema.strip_computed(&mut document);
    serde_json::from_value(document).map_err(|e| Error::validation(e.to_string()))
}

fn decode_stored<S: DeserializeOwned + ProfileScoped>(
    current: &ResourceData<Value>,
) -> Result<ResourceData<S>> {
    let mut state: S = serde_json::from_value(current.state.clone())
        .map_err(|e| Error::state_store(format!("stored state for {}: {}", current.id, e)))?;
    if state.profile_id().is_empty() {
        state.set_profile_id(current.id.clone());
    }
    Ok(ResourceData {
        id: current.id.clone(),
        state,
    })
}

fn encode<S: Serialize>(data: ResourceData<S>) -> Result<ResourceData<Value>> {
    Ok(ResourceData {
        id: data.id,
        state: serde_json::to_value(data.state)?,
    })
}
