use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use url::Url;

/// Client configuration.
///
/// The defaults target a local development server. Timeouts are optional
/// and off by default: a hung request blocks only its own operation, and
/// nothing in this crate retries on the caller's behalf.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Base URL of the storefront server, without a trailing slash.
    pub base_url: String,
    pub user_agent: String,
    /// Per-request timeout in seconds. `None` leaves the transport default.
    pub request_timeout_secs: Option<u64>,
    /// Keep the session cookie across requests. Disabling this gives every
    /// request a fresh anonymous session.
    pub cookie_store: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            user_agent: concat!("storefront-client/", env!("CARGO_PKG_VERSION")).to_string(),
            request_timeout_secs: None,
            cookie_store: true,
        }
    }
}

impl StoreConfig {
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Layered load: built-in defaults, then an optional `store.toml` in
    /// the working directory, then `STORE_*` environment variables
    /// (e.g. `STORE_BASE_URL`).
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(Config::try_from(&StoreConfig::default())?)
            .add_source(File::with_name("store").required(false))
            .add_source(Environment::with_prefix("STORE").separator("__"))
            .build()?;

        let config: StoreConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        Url::parse(&self.base_url)
            .map_err(|e| ConfigError::Message(format!("invalid base_url '{}': {e}", self.base_url)))?;
        Ok(())
    }
}
