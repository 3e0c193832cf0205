//! Provider client construction and the credential-fingerprint cache.
//!
//! Provider clients carry an HTTP connection pool and an authorization
//! scheme, so re-creating one per message would be wasteful. The cache keys
//! clients by a deterministic encoding of the full credential tuple; two
//! bridges with identical credentials share a client regardless of which
//! tenant owns them, since the fingerprint already encodes everything the
//! client is built from.

use std::sync::Arc;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use dashmap::DashMap;
use tokio::sync::OnceCell;
use tracing::debug;

use smsgw_core::{
    AuthorizationType, BridgeConfig, GatewayError, PROVIDER_ACCOUNT_ID, PROVIDER_AUTH_CUSTOM_PREFIX,
    PROVIDER_AUTH_TOKEN, PROVIDER_AUTH_TYPE, PROVIDER_URL,
};

/// Deterministic dedup key derived from a bridge's credential tuple.
///
/// Identical tuples yield identical fingerprints; any differing field yields
/// a different one. This is an internal dedup key, not a security boundary,
/// so plain base64 over the joined tuple is sufficient.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClientFingerprint(String);

impl ClientFingerprint {
    /// Derives the fingerprint from base URL, auth type, and every
    /// credential field. Absent keys contribute an empty segment so the
    /// encoding stays positional; each field is length-prefixed so no
    /// byte inside a credential can shift the field boundaries.
    pub fn derive(bridge: &BridgeConfig) -> Self {
        let tuple = [
            bridge.config_value(PROVIDER_URL).unwrap_or(""),
            bridge.config_value(PROVIDER_AUTH_TYPE).unwrap_or(""),
            bridge.config_value(PROVIDER_ACCOUNT_ID).unwrap_or(""),
            bridge.config_value(PROVIDER_AUTH_TOKEN).unwrap_or(""),
            bridge.config_value(PROVIDER_AUTH_CUSTOM_PREFIX).unwrap_or(""),
        ]
        .map(|field| format!("{}:{field}", field.len()))
        .join("|");
        Self(STANDARD.encode(tuple))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// How requests to the provider are authorized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthScheme {
    Basic { username: String, password: String },
    ApiKey { key: String },
    CustomPrefix { prefix: String, key: String },
}

impl AuthScheme {
    /// Builds the scheme from the bridge config, failing on missing keys
    /// rather than silently falling back.
    pub fn from_bridge(bridge: &BridgeConfig) -> Result<Self, GatewayError> {
        let auth_type = AuthorizationType::parse(bridge.config_value(PROVIDER_AUTH_TYPE))?;
        match auth_type {
            AuthorizationType::Basic => Ok(AuthScheme::Basic {
                username: bridge.require_config(PROVIDER_ACCOUNT_ID)?.to_string(),
                password: bridge.require_config(PROVIDER_AUTH_TOKEN)?.to_string(),
            }),
            AuthorizationType::Api => Ok(AuthScheme::ApiKey {
                key: bridge.require_config(PROVIDER_AUTH_TOKEN)?.to_string(),
            }),
            AuthorizationType::Custom => Ok(AuthScheme::CustomPrefix {
                prefix: bridge
                    .require_config(PROVIDER_AUTH_CUSTOM_PREFIX)?
                    .to_string(),
                key: bridge.require_config(PROVIDER_AUTH_TOKEN)?.to_string(),
            }),
        }
    }

    fn apply(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self {
            AuthScheme::Basic { username, password } => {
                request.basic_auth(username, Some(password))
            }
            AuthScheme::ApiKey { key } => {
                request.header(reqwest::header::AUTHORIZATION, format!("App {key}"))
            }
            AuthScheme::CustomPrefix { prefix, key } => {
                request.header(reqwest::header::AUTHORIZATION, format!("{prefix} {key}"))
            }
        }
    }
}

/// Ready-to-use provider client: connection pool, base URL, auth scheme.
pub struct SmsClient {
    http: reqwest::Client,
    base_url: String,
    auth: AuthScheme,
}

impl SmsClient {
    /// Constructs a client from a bridge config. Does no network I/O.
    pub fn from_bridge(bridge: &BridgeConfig) -> Result<Self, GatewayError> {
        let base_url = bridge.require_config(PROVIDER_URL)?.to_string();
        let auth = AuthScheme::from_bridge(bridge)?;
        let http = reqwest::Client::builder()
            .user_agent("smsgw/0.1")
            .build()
            .map_err(|err| {
                GatewayError::dispatch(
                    bridge.provider.clone(),
                    format!("failed to create HTTP client: {err}"),
                )
            })?;
        debug!(provider = %bridge.provider, "creating a new provider client");
        Ok(Self {
            http,
            base_url,
            auth,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Whether the client points at a mock endpoint (test scenarios).
    pub fn is_mock(&self) -> bool {
        self.base_url.starts_with("mock://")
    }

    /// Mock scenario name, when [`Self::is_mock`] holds.
    pub fn mock_scenario(&self) -> Option<&str> {
        self.base_url.strip_prefix("mock://")
    }

    /// Starts an authorized POST against `path` below the base URL.
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        let url = format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        self.auth.apply(self.http.post(url))
    }

    /// Starts an authorized GET against `path` below the base URL.
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        let url = format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        self.auth.apply(self.http.get(url))
    }
}

type ClientFactory =
    Arc<dyn Fn(&BridgeConfig) -> Result<Arc<SmsClient>, GatewayError> + Send + Sync>;

/// Cache of provider clients keyed by [`ClientFingerprint`].
///
/// Get-or-create is exclusive per fingerprint only: concurrent first-use of
/// one never-before-seen credential tuple constructs exactly one client,
/// while unrelated tenants proceed without contention. Construction does no
/// network I/O, so no lock is ever held across a provider call. Entries live
/// for the process lifetime; bridge configurations are long-lived and no
/// eviction is required.
#[derive(Clone)]
pub struct ProviderClientCache {
    clients: Arc<DashMap<ClientFingerprint, Arc<OnceCell<Arc<SmsClient>>>>>,
    factory: ClientFactory,
}

impl ProviderClientCache {
    pub fn new() -> Self {
        Self::with_factory(Arc::new(|bridge| SmsClient::from_bridge(bridge).map(Arc::new)))
    }

    /// Injects a custom factory; used by tests to count constructions.
    pub fn with_factory(factory: ClientFactory) -> Self {
        Self {
            clients: Arc::new(DashMap::new()),
            factory,
        }
    }

    /// Looks up the client for the bridge's credential tuple, constructing
    /// it at most once per fingerprint. A failed construction leaves the
    /// slot empty so a corrected configuration can retry.
    pub async fn get_or_create(
        &self,
        bridge: &BridgeConfig,
    ) -> Result<Arc<SmsClient>, GatewayError> {
        let fingerprint = ClientFingerprint::derive(bridge);
        let cell = {
            let entry = self.clients.entry(fingerprint).or_default();
            Arc::clone(entry.value())
        };
        let client = cell
            .get_or_try_init(|| async { (self.factory)(bridge) })
            .await?;
        Ok(Arc::clone(client))
    }

    /// Number of fingerprints seen so far (constructed or in flight).
    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}

impl Default for ProviderClientCache {
    fn default() -> Self {
        Self::new()
    }
}
