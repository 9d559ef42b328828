// # nextdnsctl - NextDNS configuration host
//
// A thin stand-in for an infrastructure orchestrator: it keeps the state
// file, reads desired documents from disk and dispatches lifecycle calls
// to the controllers in nextdns-core.
//
// CRITICAL RULES:
// - This is a THIN integration layer ONLY
// - DO NOT add reconciliation or API logic here; it belongs in
//   nextdns-core and nextdns-api
// - Secrets come from environment variables ONLY
//
// ## Configuration
//
// - `NEXTDNS_API_KEY`: API key (required)
// - `NEXTDNS_API_URL`: API base URL (default https://api.nextdns.io)
// - `NEXTDNS_TIMEOUT_SECS`: Per-request timeout (default 30)
// - `NEXTDNS_STATE_PATH`: State file (default nextdns-state.json, or `--state`)
// - `NEXTDNS_LOG_LEVEL`: trace, debug, info, warn, error (or `--log-level`)
//
// ## Example
//
// ```bash
// export NEXTDNS_API_KEY=your_key
//
// nextdnsctl import nextdns_denylist kids abc123
// nextdnsctl update nextdns_denylist kids denylist.json
// nextdnsctl data nextdns_setup_endpoint abc123
// ```

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

use nextdns_api::NextDnsClient;
use nextdns_core::config::{API_KEY_ENV, DEFAULT_API_URL};
use nextdns_core::{FileStateStore, ProviderConfig, ResourceRegistry};

use cli::{Cli, Commands};
use commands::Session;

/// Exit codes for different termination scenarios
///
/// - 0: Success
/// - 1: Configuration error
/// - 2: Runtime error
#[derive(Debug, Clone, Copy)]
enum CtlExitCode {
    Success = 0,
    ConfigError = 1,
    RuntimeError = 2,
}

impl From<CtlExitCode> for ExitCode {
    fn from(code: CtlExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Application configuration
struct Config {
    provider: ProviderConfig,
    state_path: PathBuf,
    log_level: String,
}

impl Config {
    /// Load configuration from the environment and global flags
    fn load(cli: &Cli) -> Result<Self> {
        let mut provider = ProviderConfig::new(env::var(API_KEY_ENV).unwrap_or_default())
            .with_api_url(
                env::var("NEXTDNS_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            );

        if let Ok(raw) = env::var("NEXTDNS_TIMEOUT_SECS") {
            let timeout_secs = raw.trim().parse().map_err(|_| {
                anyhow::anyhow!(
                    "NEXTDNS_TIMEOUT_SECS must be a whole number of seconds. Got: {}",
                    raw
                )
            })?;
            provider = provider.with_timeout_secs(timeout_secs);
        }

        Ok(Self {
            provider,
            state_path: cli.state.clone(),
            log_level: cli.log_level.clone(),
        })
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        self.provider.validate()?;

        // Check for obvious placeholder keys (common mistake)
        let key_lower = self.provider.api_key.to_lowercase();
        if key_lower.contains("your_key") || key_lower.contains("replace_me") {
            anyhow::bail!(
                "{} appears to be a placeholder. \
                Use the API key from your NextDNS account page.",
                API_KEY_ENV
            );
        }

        if !(1..=300).contains(&self.provider.timeout_secs) {
            anyhow::bail!(
                "NEXTDNS_TIMEOUT_SECS must be between 1 and 300 seconds. Got: {}",
                self.provider.timeout_secs
            );
        }

        if self.provider.api_url.starts_with("http://") {
            eprintln!(
                "WARNING: NEXTDNS_API_URL uses HTTP (not HTTPS). \
                The API key will be sent in clear text."
            );
        }

        if self.state_path.as_os_str().is_empty() {
            anyhow::bail!("NEXTDNS_STATE_PATH cannot be empty");
        }

        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!(
                "NEXTDNS_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }

        Ok(())
    }

    fn level(&self) -> Level {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match Config::load(&cli) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return CtlExitCode::ConfigError.into();
        }
    };

    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {}", e);
        return CtlExitCode::ConfigError.into();
    }

    // Logs go to stderr so stdout stays machine-readable
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.level())
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return CtlExitCode::ConfigError.into();
    }

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return CtlExitCode::RuntimeError.into();
        }
    };

    rt.block_on(async {
        match run(config, cli.command).await {
            Ok(()) => CtlExitCode::Success,
            Err(e) => {
                error!("{:#}", e);
                exit_code_for(&e)
            }
        }
    })
    .into()
}

/// Unknown type names and rejected settings are configuration errors;
/// everything else is a runtime failure
fn exit_code_for(err: &anyhow::Error) -> CtlExitCode {
    match err.downcast_ref::<nextdns_core::Error>().map(|e| e.root()) {
        Some(nextdns_core::Error::Config(_)) => CtlExitCode::ConfigError,
        _ => CtlExitCode::RuntimeError,
    }
}

async fn run(config: Config, command: Commands) -> Result<()> {
    let api = Arc::new(NextDnsClient::new(&config.provider)?);
    info!("Using NextDNS API at {}", config.provider.api_url);

    let session = Session {
        registry: ResourceRegistry::with_defaults(api),
        store: FileStateStore::new(&config.state_path).await?,
    };

    session.run(command).await
}
