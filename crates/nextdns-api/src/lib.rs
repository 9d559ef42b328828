// # NextDNS API Client
//
// `reqwest` implementation of the `NextDnsApi` trait against the NextDNS
// configuration API.
//
// ## Behaviour
//
// - ✅ One HTTP request per trait call
// - ✅ Bounded per-request timeout (`ProviderConfig::timeout_secs`)
// - ✅ Status codes mapped onto the core error kinds (401/403, 404, 429, 5xx)
// - ❌ NO retry and NO backoff (the orchestrator decides whether to re-apply)
// - ❌ NO caching (every Read goes to the remote)
//
// ## Architectural Constraints
//
// ### Trust Level: Untrusted (Remote API)
//
// **Allowed Capabilities**:
// - ✅ Perform HTTPS calls to the configured API URL only
// - ✅ Decode the `{"data": ...}` / `{"errors": [...]}` envelope
//
// **Forbidden Capabilities**:
// - ❌ Spawn tasks or threads
// - ❌ Access orchestrator state
//
// ## Security Requirements
//
// - API key NEVER appears in logs, `Debug` output or error messages
// - Construction fails fast if the key is empty
//
// ## API Reference
//
// - Authentication: `X-Api-Key: <key>`
// - Profiles: `POST /profiles`, `GET|PATCH /profiles/:id`
// - Collections: `GET|PUT /profiles/:id/{allowlist,denylist}`,
//   `PUT /profiles/:id/parentalControl/{services,categories}`,
//   `PUT /profiles/:id/privacy/{blocklists,natives}`,
//   `PUT /profiles/:id/security/tlds`
// - Documents: `GET|PATCH /profiles/:id/{parentalControl,privacy,security,settings}`,
//   `PATCH /profiles/:id/settings/{logs,blockPage,performance}`
// - Rewrites: `GET|POST /profiles/:id/rewrites`, `DELETE /profiles/:id/rewrites/:rid`
// - Setup: `GET /profiles/:id/setup`, `GET /profiles/:id/setup/linkedip`

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use nextdns_core::config::ProviderConfig;
use nextdns_core::model::{
    IdRef, LinkedIp, NewRewrite, ParentalControl, Privacy, Profile, Rewrite, Security, Settings,
    SettingsBlockPage, SettingsLogs, SettingsPerformance, Setup, ToggleEntry,
};
use nextdns_core::traits::NextDnsApi;
use nextdns_core::{Error, Result};

/// Name used in `Error::Provider`
const PROVIDER: &str = "nextdns";

/// Header carrying the API key
const API_KEY_HEADER: &str = "X-Api-Key";

/// Response envelope shared by every endpoint
#[derive(Debug, Default, Deserialize)]
struct Envelope {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    errors: Vec<ApiError>,
}

/// One entry of the `errors` array
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ApiError {
    code: String,
    detail: String,
    source: Option<Value>,
}

impl ApiError {
    fn describe(errors: &[ApiError]) -> String {
        errors
            .iter()
            .map(|e| {
                let mut text = e.code.clone();
                if !e.detail.is_empty() {
                    text = format!("{} ({})", text, e.detail);
                }
                if let Some(pointer) = e.source.as_ref().and_then(|s| s.get("parameter")) {
                    text = format!("{} at {}", text, pointer);
                }
                text
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Debug, Deserialize)]
struct Created {
    id: String,
}

/// NextDNS configuration API client
///
/// # Trust Level: Untrusted
///
/// Stateless apart from the connection pool; one instance is shared by
/// every controller through `Arc<dyn NextDnsApi>`.
pub struct NextDnsClient {
    /// NextDNS API key
    /// ⚠️ NEVER log this value
    api_key: String,

    /// Base URL without trailing slash
    api_url: String,

    /// Parsed base; request paths are appended segment by segment
    base_url: Url,

    /// HTTP client with the configured timeout
    client: reqwest::Client,
}

// Custom Debug implementation that hides the API key
impl std::fmt::Debug for NextDnsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NextDnsClient")
            .field("api_key", &"<REDACTED>")
            .field("api_url", &self.api_url)
            .finish()
    }
}

impl NextDnsClient {
    /// Create a client from a validated configuration
    ///
    /// # Returns
    ///
    /// - `Ok(client)`: Ready to use
    /// - `Err(Error::Config)`: Empty key, bad URL, zero timeout, or the
    ///   HTTP client could not be built
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        config.validate()?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("nextdnsctl/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        let api_url = config.api_url.trim_end_matches('/').to_string();
        let base_url = Url::parse(&api_url)
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| Error::config(format!("Invalid API URL: {}", api_url)))?;

        Ok(Self {
            api_key: config.api_key.clone(),
            api_url,
            base_url,
            client,
        })
    }

    /// Each segment is percent-encoded, so an id can never change the route
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(&self, method: Method, profile_id: &str, path: &[&str]) -> reqwest::RequestBuilder {
        let url = self.url(path);
        tracing::debug!(profile_id = %profile_id, "Request {} {}", method, url.path());
        self.client
            .request(method, url)
            .header(API_KEY_HEADER, &self.api_key)
    }

    /// Send a request and unwrap the response envelope
    ///
    /// `what` names the operation in error messages ("allowlist",
    /// "rewrite", ...).
    async fn execute(&self, request: reqwest::RequestBuilder, what: &str) -> Result<Option<Value>> {
        let response = request
            .send()
            .await
            .map_err(|e| Error::http(format!("{} request failed: {}", what, e.without_url())))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::http(format!("{} response unreadable: {}", what, e.without_url())))?;

        let envelope: Envelope = if body.trim().is_empty() {
            Envelope::default()
        } else {
            match serde_json::from_str(&body) {
                Ok(envelope) => envelope,
                Err(_) if !status.is_success() => Envelope::default(),
                Err(e) => {
                    return Err(Error::provider(
                        PROVIDER,
                        format!("Failed to parse {} response: {}", what, e),
                    ));
                }
            }
        };

        if !status.is_success() {
            let detail = if envelope.errors.is_empty() {
                body.trim().to_string()
            } else {
                ApiError::describe(&envelope.errors)
            };
            return Err(map_status(status, what, &detail));
        }

        if !envelope.errors.is_empty() {
            if envelope.errors.iter().any(|e| e.code == "notFound") {
                return Err(Error::not_found(format!("{} not found", what)));
            }
            return Err(Error::provider(
                PROVIDER,
                format!("{} rejected: {}", what, ApiError::describe(&envelope.errors)),
            ));
        }

        Ok(envelope.data)
    }

    async fn fetch<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder, what: &str) -> Result<T> {
        let data = self.execute(request, what).await?;
        serde_json::from_value(data.unwrap_or(Value::Null)).map_err(|e| {
            Error::provider(PROVIDER, format!("Invalid {} response format: {}", what, e))
        })
    }

    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        profile_id: &str,
        path: &[&str],
        body: &B,
        what: &str,
    ) -> Result<()> {
        let request = self.request(method, profile_id, path).json(body);
        self.execute(request, what).await.map(|_| ())
    }
}

/// Map a non-success status onto the core error kinds
fn map_status(status: StatusCode, what: &str, detail: &str) -> Error {
    match status.as_u16() {
        401 | 403 => Error::auth(format!(
            "Invalid API key or insufficient permissions. Status: {}",
            status
        )),
        404 => Error::not_found(format!("{} not found", what)),
        429 => Error::rate_limited(format!(
            "Rate limit exceeded. Please retry later. Status: {}",
            status
        )),
        500..=599 => Error::provider(
            PROVIDER,
            format!("NextDNS server error (transient): {} - {}", status, detail),
        ),
        _ => Error::provider(PROVIDER, format!("{} failed: {} - {}", what, status, detail)),
    }
}

/// `profiles/{id}` followed by the fixed sub-resource path
fn profile_path<'a>(profile_id: &'a str, rest: &'static str) -> Vec<&'a str> {
    let mut segments = vec!["profiles", profile_id];
    segments.extend(rest.split('/').filter(|s| !s.is_empty()));
    segments
}

#[async_trait]
impl NextDnsApi for NextDnsClient {
    async fn create_profile(&self, profile: &Profile) -> Result<String> {
        let request = self.request(Method::POST, "", &["profiles"]).json(profile);
        let created: Created = self.fetch(request, "profile").await?;
        tracing::info!("Profile created with id {}", created.id);
        Ok(created.id)
    }

    async fn get_profile(&self, profile_id: &str) -> Result<Profile> {
        let path = profile_path(profile_id, "");
        let mut profile: Profile = self
            .fetch(self.request(Method::GET, profile_id, &path), "profile")
            .await?;
        if profile.id.is_empty() {
            profile.id = profile_id.to_string();
        }
        Ok(profile)
    }

    async fn update_profile(&self, profile_id: &str, profile: &Profile) -> Result<()> {
        let body = serde_json::json!({ "name": profile.name });
        let path = profile_path(profile_id, "");
        self.send(Method::PATCH, profile_id, &path, &body, "profile").await
    }

    async fn list_allowlist(&self, profile_id: &str) -> Result<Vec<ToggleEntry>> {
        let path = profile_path(profile_id, "/allowlist");
        self.fetch(self.request(Method::GET, profile_id, &path), "allowlist")
            .await
    }

    async fn replace_allowlist(&self, profile_id: &str, entries: &[ToggleEntry]) -> Result<()> {
        let path = profile_path(profile_id, "/allowlist");
        self.send(Method::PUT, profile_id, &path, entries, "allowlist").await
    }

    async fn list_denylist(&self, profile_id: &str) -> Result<Vec<ToggleEntry>> {
        let path = profile_path(profile_id, "/denylist");
        self.fetch(self.request(Method::GET, profile_id, &path), "denylist")
            .await
    }

    async fn replace_denylist(&self, profile_id: &str, entries: &[ToggleEntry]) -> Result<()> {
        let path = profile_path(profile_id, "/denylist");
        self.send(Method::PUT, profile_id, &path, entries, "denylist").await
    }

    async fn get_parental_control(&self, profile_id: &str) -> Result<ParentalControl> {
        let path = profile_path(profile_id, "/parentalControl");
        self.fetch(self.request(Method::GET, profile_id, &path), "parental control")
            .await
    }

    async fn update_parental_control(
        &self,
        profile_id: &str,
        parental_control: &ParentalControl,
    ) -> Result<()> {
        let path = profile_path(profile_id, "/parentalControl");
        self.send(Method::PATCH, profile_id, &path, parental_control, "parental control")
            .await
    }

    async fn replace_parental_control_services(
        &self,
        profile_id: &str,
        services: &[ToggleEntry],
    ) -> Result<()> {
        let path = profile_path(profile_id, "/parentalControl/services");
        self.send(Method::PUT, profile_id, &path, services, "parental control services")
            .await
    }

    async fn replace_parental_control_categories(
        &self,
        profile_id: &str,
        categories: &[ToggleEntry],
    ) -> Result<()> {
        let path = profile_path(profile_id, "/parentalControl/categories");
        self.send(Method::PUT, profile_id, &path, categories, "parental control categories")
            .await
    }

    async fn get_privacy(&self, profile_id: &str) -> Result<Privacy> {
        let path = profile_path(profile_id, "/privacy");
        self.fetch(self.request(Method::GET, profile_id, &path), "privacy")
            .await
    }

    async fn update_privacy(&self, profile_id: &str, privacy: &Privacy) -> Result<()> {
        let path = profile_path(profile_id, "/privacy");
        self.send(Method::PATCH, profile_id, &path, privacy, "privacy").await
    }

    async fn replace_privacy_blocklists(&self, profile_id: &str, blocklists: &[IdRef]) -> Result<()> {
        let path = profile_path(profile_id, "/privacy/blocklists");
        self.send(Method::PUT, profile_id, &path, blocklists, "privacy blocklists")
            .await
    }

    async fn replace_privacy_natives(&self, profile_id: &str, natives: &[IdRef]) -> Result<()> {
        let path = profile_path(profile_id, "/privacy/natives");
        self.send(Method::PUT, profile_id, &path, natives, "privacy natives")
            .await
    }

    async fn get_security(&self, profile_id: &str) -> Result<Security> {
        let path = profile_path(profile_id, "/security");
        self.fetch(self.request(Method::GET, profile_id, &path), "security")
            .await
    }

    async fn update_security(&self, profile_id: &str, security: &Security) -> Result<()> {
        let path = profile_path(profile_id, "/security");
        self.send(Method::PATCH, profile_id, &path, security, "security").await
    }

    async fn replace_security_tlds(&self, profile_id: &str, tlds: &[IdRef]) -> Result<()> {
        let path = profile_path(profile_id, "/security/tlds");
        self.send(Method::PUT, profile_id, &path, tlds, "security tlds").await
    }

    async fn get_settings(&self, profile_id: &str) -> Result<Settings> {
        let path = profile_path(profile_id, "/settings");
        self.fetch(self.request(Method::GET, profile_id, &path), "settings")
            .await
    }

    async fn update_settings(&self, profile_id: &str, settings: &Settings) -> Result<()> {
        let path = profile_path(profile_id, "/settings");
        self.send(Method::PATCH, profile_id, &path, settings, "settings").await
    }

    async fn update_settings_logs(&self, profile_id: &str, logs: &SettingsLogs) -> Result<()> {
        let path = profile_path(profile_id, "/settings/logs");
        self.send(Method::PATCH, profile_id, &path, logs, "logs settings").await
    }

    async fn update_settings_block_page(
        &self,
        profile_id: &str,
        block_page: &SettingsBlockPage,
    ) -> Result<()> {
        let path = profile_path(profile_id, "/settings/blockPage");
        self.send(Method::PATCH, profile_id, &path, block_page, "block page settings")
            .await
    }

    async fn update_settings_performance(
        &self,
        profile_id: &str,
        performance: &SettingsPerformance,
    ) -> Result<()> {
        let path = profile_path(profile_id, "/settings/performance");
        self.send(Method::PATCH, profile_id, &path, performance, "performance settings")
            .await
    }

    async fn list_rewrites(&self, profile_id: &str) -> Result<Vec<Rewrite>> {
        let path = profile_path(profile_id, "/rewrites");
        self.fetch(self.request(Method::GET, profile_id, &path), "rewrites")
            .await
    }

    async fn create_rewrite(&self, profile_id: &str, rewrite: &NewRewrite) -> Result<Rewrite> {
        let path = profile_path(profile_id, "/rewrites");
        let request = self.request(Method::POST, profile_id, &path).json(rewrite);
        self.fetch(request, "rewrite").await
    }

    async fn delete_rewrite(&self, profile_id: &str, rewrite_id: &str) -> Result<()> {
        let mut path = profile_path(profile_id, "/rewrites");
        path.push(rewrite_id);
        let request = self.request(Method::DELETE, profile_id, &path);
        self.execute(request, "rewrite").await.map(|_| ())
    }

    async fn get_setup(&self, profile_id: &str) -> Result<Setup> {
        let path = profile_path(profile_id, "/setup");
        self.fetch(self.request(Method::GET, profile_id, &path), "setup")
            .await
    }

    async fn get_setup_linked_ip(&self, profile_id: &str) -> Result<LinkedIp> {
        let path = profile_path(profile_id, "/setup/linkedip");
        self.fetch(self.request(Method::GET, profile_id, &path), "linked IP")
            .await
    }
}
