//! Core traits of the reconciliation core
//!
//! - [`NextDnsApi`]: Remote configuration API client
//! - [`Resource`] / [`ResourceHandler`]: Lifecycle of a managed resource
//! - [`DataSource`] / [`DataSourceHandler`]: Read-only lookups
//! - [`StateStore`]: Orchestrator-side record of managed resources

pub mod api;
pub mod resource;
pub mod state_store;

pub use api::NextDnsApi;
pub use resource::{
    DataSource, DataSourceHandler, ProfileScoped, Resource, ResourceData, ResourceHandler,
};
pub use state_store::{StateRecord, StateStore};
