use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use url::Url;

use super::{BaseHttpClientConfig, HttpRetryConfig, deserialize_duration_from_ms};

/// Provides the default value for refresh_interval_ms.
fn default_refresh_interval() -> Duration {
    Duration::from_secs(60)
}

/// Application configuration for Vigil.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Endpoint returning the full current set of check definitions.
    pub checks_url: Url,

    /// Bearer credential for the definition authority. When unset, requests
    /// go out without an Authorization header.
    #[serde(default)]
    pub access_token: Option<String>,

    /// The interval in milliseconds between refreshes of the check
    /// definition set.
    #[serde(
        default = "default_refresh_interval",
        deserialize_with = "deserialize_duration_from_ms"
    )]
    pub refresh_interval_ms: Duration,

    /// Configuration for HTTP client retry policies.
    #[serde(default)]
    pub http_retry_config: HttpRetryConfig,

    /// Configuration for the base HTTP client.
    #[serde(default)]
    pub http_base_config: BaseHttpClientConfig,
}

impl AppConfig {
    /// Creates a new `AppConfig` by reading from the configuration directory,
    /// layered with `VIGIL`-prefixed environment variables.
    pub fn new(config_dir: Option<&str>) -> Result<Self, ConfigError> {
        let config_dir_str = config_dir.unwrap_or("configs");
        let s = Config::builder()
            .add_source(File::with_name(&format!("{}/app.yaml", config_dir_str)))
            .add_source(Environment::with_prefix("VIGIL").separator("__"))
            .build()?;
        s.try_deserialize()
    }
}
