use serde::{Deserialize, Serialize};
use std::{
    env, fmt, fs,
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};
use thiserror::Error;
use url::Url;

/// Environment variable carrying the backend base URL.
pub const API_URL_ENV: &str = "STAFFHUB_API_URL";
/// Environment variable selecting the build profile.
pub const PROFILE_ENV: &str = "STAFFHUB_PROFILE";
/// Environment variable overriding the log level.
pub const LOG_LEVEL_ENV: &str = "STAFFHUB_LOG_LEVEL";
/// Environment variable overriding the log format.
pub const LOG_FORMAT_ENV: &str = "STAFFHUB_LOG_FORMAT";
/// Environment variable overriding the request deadline in seconds.
pub const REQUEST_TIMEOUT_ENV: &str = "STAFFHUB_REQUEST_TIMEOUT_SECS";
/// Environment variable overriding where the bearer token is persisted.
pub const TOKEN_PATH_ENV: &str = "STAFFHUB_TOKEN_PATH";

/// Backend used when nothing else is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:3001/api";
/// Overall per-request deadline.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Failures while resolving a [`ClientConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read configuration file {}: {source}", .path.display())]
    Io {
        /// File that was being read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The configuration file could not be parsed.
    #[error("failed to parse configuration file {}: {message}", .path.display())]
    Parse {
        /// File that was being parsed.
        path: PathBuf,
        /// Parser diagnostic.
        message: String,
    },
    /// The configuration file extension is not one of yaml, yml, json, or toml.
    #[error("unsupported configuration format for {}; use yaml, json, or toml", .0.display())]
    UnsupportedFormat(PathBuf),
    /// An environment variable held an unusable value.
    #[error("invalid value for {key}: {message}")]
    InvalidValue {
        /// Offending variable.
        key: &'static str,
        /// What was wrong with it.
        message: String,
    },
    /// The resolved configuration failed validation.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Build profile. Request/response traffic is logged outside production.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    /// Local development; traffic logging enabled.
    #[default]
    Dev,
    /// Deployed build; traffic logging disabled.
    Production,
}

impl FromStr for Profile {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "dev" | "development" | "test" => Ok(Self::Dev),
            "prod" | "production" => Ok(Self::Production),
            other => Err(format!("unknown profile `{other}`")),
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Dev => "dev",
            Self::Production => "production",
        })
    }
}

/// Output shape of log lines.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "text" | "pretty" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format `{other}`")),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default level directive when `RUST_LOG` is unset.
    pub level: String,
    /// Line format.
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: LogFormat::Text,
        }
    }
}

/// Fully resolved client configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL every API path is appended to.
    pub api_url: Url,
    /// Build profile.
    pub profile: Profile,
    /// Overall per-request deadline in seconds.
    pub request_timeout_secs: u64,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Where the bearer token is persisted; the platform config directory when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_path: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl ClientConfig {
    /// Generates a default configuration.
    ///
    /// # Panics
    /// Never: [`DEFAULT_API_URL`] is a valid absolute URL.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self {
            api_url: Url::parse(DEFAULT_API_URL).expect("default API URL is valid"),
            profile: Profile::Dev,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            logging: LoggingConfig::default(),
            token_path: None,
        }
    }

    /// Loads the configuration from defaults, an optional file, then the environment.
    ///
    /// Environment variables take precedence over the file so deployments can
    /// override a checked-in configuration.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, an environment value is
    /// malformed, or the result fails [`ClientConfig::validate`].
    pub fn load_config(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match config_path {
            Some(path) => Self::from_file(path)?,
            None => Self::with_defaults(),
        };

        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a configuration file, choosing the format from its extension.
    ///
    /// # Errors
    /// Returns an error if the file is unreadable, malformed, or has an unknown extension.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let parse_error = |message: String| ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        };

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml" | "yml") => {
                serde_yml::from_str(&content).map_err(|err| parse_error(err.to_string()))
            }
            Some("json") => {
                serde_json::from_str(&content).map_err(|err| parse_error(err.to_string()))
            }
            Some("toml") => toml::from_str(&content).map_err(|err| parse_error(err.to_string())),
            _ => Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
        }
    }

    /// Apply `STAFFHUB_*` environment variables on top of the current values.
    ///
    /// # Errors
    /// Returns an error if a present variable cannot be parsed.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(raw) = read_env(API_URL_ENV) {
            self.api_url = Url::parse(&raw).map_err(|err| ConfigError::InvalidValue {
                key: API_URL_ENV,
                message: err.to_string(),
            })?;
        }
        if let Some(raw) = read_env(PROFILE_ENV) {
            self.profile = raw
                .parse()
                .map_err(|message| ConfigError::InvalidValue {
                    key: PROFILE_ENV,
                    message,
                })?;
        }
        if let Some(raw) = read_env(LOG_LEVEL_ENV) {
            self.logging.level = raw;
        }
        if let Some(raw) = read_env(LOG_FORMAT_ENV) {
            self.logging.format = raw
                .parse()
                .map_err(|message| ConfigError::InvalidValue {
                    key: LOG_FORMAT_ENV,
                    message,
                })?;
        }
        if let Some(raw) = read_env(REQUEST_TIMEOUT_ENV) {
            self.request_timeout_secs =
                raw.parse().map_err(|_| ConfigError::InvalidValue {
                    key: REQUEST_TIMEOUT_ENV,
                    message: format!("`{raw}` is not a whole number of seconds"),
                })?;
        }
        if let Some(raw) = read_env(TOKEN_PATH_ENV) {
            self.token_path = Some(PathBuf::from(raw));
        }
        Ok(())
    }

    /// Validate the resolved configuration.
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] describing every problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if !matches!(self.api_url.scheme(), "http" | "https") {
            errors.push(format!(
                "api_url must use http or https, got `{}`",
                self.api_url.scheme()
            ));
        }
        if self.api_url.cannot_be_a_base() {
            errors.push("api_url must be an absolute base URL".to_string());
        }
        if self.request_timeout_secs == 0 {
            errors.push("request_timeout_secs must be greater than 0".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(errors.join("; ")))
        }
    }

    /// Per-request deadline.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Whether request and response traffic should be logged.
    #[must_use]
    pub fn logs_traffic(&self) -> bool {
        self.profile != Profile::Production
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
