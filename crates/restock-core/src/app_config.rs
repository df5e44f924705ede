use std::net::SocketAddr;

use crate::policy::RestockPolicy;
use crate::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Store identity and Admin API token for one Shopify shop.
#[derive(Clone)]
pub struct ShopifyCredentials {
    /// Store hostname, e.g. `acme.myshopify.com`.
    pub store: String,
    pub access_token: String,
}

impl std::fmt::Debug for ShopifyCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShopifyCredentials")
            .field("store", &self.store)
            .field("access_token", &"[redacted]")
            .finish()
    }
}

/// Transport settings for the Shopify Admin API client.
#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub api_version: String,
    /// Full base URL override. When `None` the client targets
    /// `https://{store}/admin/api/{api_version}/`.
    pub base_url: Option<String>,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    /// Additional attempts after a transient failure. `0` disables retries.
    pub max_retries: u32,
    pub retry_backoff_base_ms: u64,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_version: "2024-10".to_string(),
            base_url: None,
            request_timeout_secs: 30,
            user_agent: "restock/0.1 (inventory-report)".to_string(),
            max_retries: 0,
            retry_backoff_base_ms: 1_000,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    /// `None` when either `SHOPIFY_STORE` or `SHOPIFY_ACCESS_TOKEN` is unset.
    pub credentials: Option<ShopifyCredentials>,
    pub client: ClientSettings,
    pub policy: RestockPolicy,
}

impl AppConfig {
    /// Returns the store credentials, or the per-request configuration error
    /// when the deployment has none.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingCredentials`] when either the store
    /// hostname or the access token is absent.
    pub fn shopify_credentials(&self) -> Result<&ShopifyCredentials, ConfigError> {
        self.credentials
            .as_ref()
            .ok_or(ConfigError::MissingCredentials)
    }
}
