//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// nextdnsctl - drive NextDNS profile configuration from JSON documents
#[derive(Parser, Debug)]
#[command(name = "nextdnsctl")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// State file holding the recorded resources
    #[arg(long, global = true, env = "NEXTDNS_STATE_PATH", default_value = "nextdns-state.json")]
    pub state: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "NEXTDNS_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// The command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
///
/// Resources are recorded in the state file under `TYPE.NAME`, e.g.
/// `nextdns_denylist.kids`.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Print the schema of one type, or of every type
    Schema {
        /// Resource or data source type, e.g. nextdns_settings
        type_name: Option<String>,
    },

    /// Create a resource from a JSON document
    ///
    /// Examples:
    ///   nextdnsctl create nextdns_profile home profile.json
    ///   nextdnsctl create nextdns_denylist kids denylist.json
    Create {
        type_name: String,
        name: String,
        /// Desired state, as JSON
        file: PathBuf,
    },

    /// Refresh a recorded resource from the remote
    Read { type_name: String, name: String },

    /// Apply a new desired document to a recorded resource
    Update {
        type_name: String,
        name: String,
        /// Desired state, as JSON
        file: PathBuf,
    },

    /// Delete a recorded resource and drop it from the state file
    Delete { type_name: String, name: String },

    /// Adopt an existing profile's configuration under NAME
    ///
    /// Examples:
    ///   nextdnsctl import nextdns_settings home abc123
    Import {
        type_name: String,
        name: String,
        /// Profile identifier
        id: String,
    },

    /// Query a data source
    Data {
        type_name: String,
        profile_id: String,
    },

    /// List the recorded resources
    List,
}
