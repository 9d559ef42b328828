// # nextdns-core
//
// Reconciliation core for declarative NextDNS configuration.
//
// ## Architecture Overview
//
// An orchestrator holds the desired configuration of a NextDNS profile as
// JSON documents, one per resource type. This library turns lifecycle calls
// on those documents into calls against the NextDNS configuration API:
//
// - **NextDnsApi**: Trait for the remote configuration API
// - **Resource / ResourceHandler**: Create/Read/Update/Delete/Import per
//   resource type (profile, allowlist, denylist, parental control,
//   privacy, security, rewrite, settings)
// - **DataSource**: Read-only setup lookups
// - **ResourceRegistry**: Type-name dispatch for hosts
// - **codec / reconcile**: The translations and the rewrite diff the
//   controllers share
//
// ## Design Principles
//
// 1. **Remote is the source of truth**: Every write ends with a read
// 2. **No hidden retries**: A failed call aborts the operation
// 3. **Typed state**: Documents are validated against a schema and
//    decoded into structs before anything is sent
// 4. **Library-First**: The HTTP client and the host binary live in
//    their own crates

pub mod codec;
pub mod config;
pub mod error;
pub mod model;
pub mod reconcile;
pub mod registry;
pub mod resources;
pub mod schema;
pub mod state;
pub mod traits;

// Re-export core types for convenience
pub use config::ProviderConfig;
pub use error::{Error, Result, ResultExt};
pub use registry::ResourceRegistry;
pub use schema::{Field, FieldKind, FieldMode, Schema};
pub use state::{FileStateStore, MemoryStateStore};
pub use traits::{
    DataSource, DataSourceHandler, NextDnsApi, ProfileScoped, Resource, ResourceData,
    ResourceHandler, StateRecord, StateStore,
};
