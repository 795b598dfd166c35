use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::error::ConfigError;

/// Environment variable naming an optional TOML config file.
pub const CONFIG_PATH_ENV: &str = "WXGATE_CONFIG";

/// Environment variable overriding `server.port`.
pub const PORT_ENV: &str = "PORT";

/// Environment variable overriding `server.host`.
pub const HOST_ENV: &str = "WXGATE_HOST";

/// Longest accepted forecast cache TTL (one week).
pub const MAX_WEATHER_TTL_SECS: u64 = 7 * 24 * 3600;

/// Longest accepted rate-limit window (one day).
pub const MAX_RATE_LIMIT_WINDOW_SECS: u64 = 24 * 3600;

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Add an error
    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Add a warning
    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Summary of all errors joined with `; `
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub upstream: UpstreamConfig,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub rate_limit: RateLimitConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address
    #[serde(default = "default_host")]
    pub host: String,

    /// Listen port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Third-party API endpoints and client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Open-Meteo forecast endpoint
    #[serde(default = "default_forecast_url")]
    pub forecast_url: String,

    /// Nominatim base URL; `/search` and `/reverse` are appended
    #[serde(default = "default_nominatim_url")]
    pub nominatim_url: String,

    /// Identifying User-Agent sent with every upstream request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Per-request timeout. Unset means the HTTP client's defaults apply.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_forecast_url() -> String {
    "https://api.open-meteo.com/v1/forecast".to_string()
}

fn default_nominatim_url() -> String {
    "https://nominatim.openstreetmap.org".to_string()
}

fn default_user_agent() -> String {
    format!("wxgate/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            forecast_url: default_forecast_url(),
            nominatim_url: default_nominatim_url(),
            user_agent: default_user_agent(),
            timeout_secs: None,
        }
    }
}

impl UpstreamConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// How long a forecast stays cached
    #[serde(default = "default_weather_ttl_secs")]
    pub weather_ttl_secs: u64,
}

fn default_weather_ttl_secs() -> u64 {
    300
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            weather_ttl_secs: default_weather_ttl_secs(),
        }
    }
}

impl CacheConfig {
    pub fn weather_ttl(&self) -> Duration {
        Duration::from_secs(self.weather_ttl_secs)
    }
}

/// Per-client request quota: `max_requests` per `window_secs`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_max_requests")]
    pub max_requests: u32,

    #[serde(default = "default_window_secs")]
    pub window_secs: u64,
}

fn default_max_requests() -> u32 {
    60
}

fn default_window_secs() -> u64 {
    60
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: default_max_requests(),
            window_secs: default_window_secs(),
        }
    }
}

impl RateLimitConfig {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}

impl Config {
    /// Load configuration from `$WXGATE_CONFIG` (if set) and apply env overrides.
    pub fn load() -> Result<Self> {
        let mut config = match std::env::var_os(CONFIG_PATH_ENV) {
            Some(path) => Self::from_file(Path::new(&path))?,
            None => Self::default(),
        };

        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Load configuration and validate it
    ///
    /// Returns an error if validation fails; warnings are logged.
    pub fn load_validated() -> Result<(Self, ValidationResult)> {
        let config = Self::load()?;
        let validation = config.validate();

        if !validation.is_valid() {
            return Err(ConfigError::Invalid(validation.error_summary()).into());
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok((config, validation))
    }

    /// Parse a TOML config file. Missing sections and fields take defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ConfigError::NotFound(path.display().to_string()),
            _ => ConfigError::Read {
                path: path.display().to_string(),
                source: e,
            },
        })?;

        let config: Config = toml::from_str(&contents)
            .map_err(|e| ConfigError::ParseError(e.to_string()))
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Apply environment overrides using `lookup` to read variables.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup(PORT_ENV) {
            self.server.port = port
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid(format!("{}={} is not a port", PORT_ENV, port)))?;
        }

        if let Some(host) = lookup(HOST_ENV) {
            self.server.host = host;
        }

        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        if self.server.port == 0 {
            result.add_error("server.port", "Port cannot be 0");
        }

        if self.server.host.trim().is_empty() {
            result.add_error("server.host", "Host must not be empty");
        }

        self.validate_url(&self.upstream.forecast_url, "upstream.forecast_url", &mut result);
        self.validate_url(&self.upstream.nominatim_url, "upstream.nominatim_url", &mut result);

        if self.upstream.user_agent.trim().is_empty() {
            result.add_error(
                "upstream.user_agent",
                "User-Agent is required by the Nominatim usage policy",
            );
        }

        if self.upstream.timeout_secs == Some(0) {
            result.add_error("upstream.timeout_secs", "Timeout must be greater than 0");
        }

        if self.cache.weather_ttl_secs == 0 {
            result.add_warning("cache.weather_ttl_secs", "Forecast caching disabled (0 seconds)");
        } else if self.cache.weather_ttl_secs > MAX_WEATHER_TTL_SECS {
            result.add_error(
                "cache.weather_ttl_secs",
                format!("TTL must not exceed {} seconds", MAX_WEATHER_TTL_SECS),
            );
        } else if self.cache.weather_ttl_secs > 3600 {
            result.add_warning(
                "cache.weather_ttl_secs",
                "Forecasts cached for more than an hour may be stale",
            );
        }

        if self.rate_limit.max_requests == 0 {
            result.add_error("rate_limit.max_requests", "Must allow at least one request");
        }

        if self.rate_limit.window_secs == 0 {
            result.add_error("rate_limit.window_secs", "Window must be greater than 0");
        } else if self.rate_limit.window_secs > MAX_RATE_LIMIT_WINDOW_SECS {
            result.add_error(
                "rate_limit.window_secs",
                format!("Window must not exceed {} seconds", MAX_RATE_LIMIT_WINDOW_SECS),
            );
        }

        result
    }

    /// Validate a URL field
    fn validate_url(&self, url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }

                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    /// Socket address string for the listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Path of the config file named by the environment, if any
    pub fn config_path() -> Option<PathBuf> {
        std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from)
    }
}
