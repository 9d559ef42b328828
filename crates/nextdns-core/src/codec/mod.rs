//! Pure translation functions shared by the resource controllers
//!
//! - [`endpoint`]: network addresses derived from a profile identifier
//! - [`retention`]: log-retention labels <-> seconds, inverted log flags

pub mod endpoint;
pub mod retention;

pub use endpoint::{IPV6_PREFIXES, NEXTDNS_DOMAIN, doh_address, dot_address, ipv6_addresses, ipv6_suffix};
pub use retention::{RETENTION_TABLE, Retention, invert, label_to_seconds, seconds_to_label};
