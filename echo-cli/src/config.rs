//! Configuration loading for echo-bot.
//!
//! Configuration is loaded from an optional TOML file (default: `echo.toml`
//! in the working directory) and then overlaid with `TWITTER_*` environment
//! variables. Environment values win.

use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use echo_client::{BotConfig, TwitterConfig};
use echo_types::MAX_PAGE_SIZE;

/// Account whose timeline is mirrored.
pub const ENV_ACCOUNT: &str = "TWITTER_ACCOUNT_TO_ECHO";
/// Bearer token of the destination account.
pub const ENV_ACCESS_TOKEN: &str = "TWITTER_ACCESS_TOKEN";
/// Optional bearer token used to read the source timeline.
pub const ENV_READER_ACCESS_TOKEN: &str = "TWITTER_READER_ACCESS_TOKEN";
/// Poll interval in milliseconds.
pub const ENV_WAIT_MS: &str = "TWITTER_WAIT_MS";

/// Root configuration for echo-bot.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EchoConfig {
    /// Source account.
    #[serde(default)]
    pub source: SourceConfig,
    /// Destination account credentials.
    #[serde(default)]
    pub writer: Credentials,
    /// Credentials for reading the source; falls back to `writer`.
    #[serde(default)]
    pub reader: Option<Credentials>,
    /// Polling configuration.
    #[serde(default)]
    pub schedule: ScheduleConfig,
    /// API endpoints.
    #[serde(default)]
    pub api: ApiConfig,
}

/// Source account configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SourceConfig {
    /// Handle of the account to echo (a leading `@` is accepted).
    #[serde(default)]
    pub account: String,
}

/// Bearer credentials for one account.
#[derive(Clone, Default, Deserialize)]
pub struct Credentials {
    /// Access token, issued out of band.
    #[serde(default)]
    pub access_token: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_token", &redact(&self.access_token))
            .finish()
    }
}

/// Polling configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleConfig {
    /// Milliseconds between sync cycles (default: 60000).
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    /// Items requested per cycle (default: 200, the API maximum).
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

/// API endpoint configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// REST API root.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Media upload API root.
    #[serde(default = "default_upload_url")]
    pub upload_url: String,
    /// Per-request timeout in seconds (default: 10).
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

// Default value functions
fn default_interval_ms() -> u64 {
    60_000 // 1 minute
}

fn default_page_size() -> u32 {
    MAX_PAGE_SIZE
}

fn default_base_url() -> String {
    echo_client::platform::DEFAULT_API_URL.to_string()
}

fn default_upload_url() -> String {
    echo_client::platform::DEFAULT_UPLOAD_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            page_size: default_page_size(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            upload_url: default_upload_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl EchoConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Overlay values from the environment, looked up through `lookup`.
    ///
    /// Unset and empty variables leave the current value alone.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(account) = get(ENV_ACCOUNT) {
            self.source.account = account;
        }
        if let Some(token) = get(ENV_ACCESS_TOKEN) {
            self.writer.access_token = token;
        }
        if let Some(token) = get(ENV_READER_ACCESS_TOKEN) {
            self.reader = Some(Credentials {
                access_token: token,
            });
        }
        if let Some(wait) = get(ENV_WAIT_MS) {
            self.schedule.interval_ms = wait.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: ENV_WAIT_MS,
                reason: format!("expected milliseconds, got {:?}", wait),
            })?;
        }
        Ok(())
    }

    /// Check that every required value is present and in range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.source.account.trim_start_matches('@').trim().is_empty() {
            return Err(ConfigError::Missing {
                key: "source.account",
                env: ENV_ACCOUNT,
            });
        }
        if self.writer.access_token.trim().is_empty() {
            return Err(ConfigError::Missing {
                key: "writer.access_token",
                env: ENV_ACCESS_TOKEN,
            });
        }
        if let Some(reader) = &self.reader {
            if reader.access_token.trim().is_empty() {
                return Err(ConfigError::Missing {
                    key: "reader.access_token",
                    env: ENV_READER_ACCESS_TOKEN,
                });
            }
        }
        if self.schedule.interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                key: "schedule.interval_ms",
                reason: "must be greater than zero".to_string(),
            });
        }
        if !(1..=MAX_PAGE_SIZE).contains(&self.schedule.page_size) {
            return Err(ConfigError::InvalidValue {
                key: "schedule.page_size",
                reason: format!("must be between 1 and {}", MAX_PAGE_SIZE),
            });
        }
        if self.api.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "api.timeout_secs",
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    /// Time between sync cycles.
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.schedule.interval_ms)
    }

    /// Coordinator settings.
    pub fn bot_config(&self) -> BotConfig {
        BotConfig::new(&self.source.account).with_page_size(self.schedule.page_size)
    }

    /// Client settings for the destination account.
    pub fn writer_client(&self) -> TwitterConfig {
        self.client_config(&self.writer)
    }

    /// Client settings for reading the source timeline.
    pub fn reader_client(&self) -> TwitterConfig {
        self.client_config(self.reader.as_ref().unwrap_or(&self.writer))
    }

    fn client_config(&self, credentials: &Credentials) -> TwitterConfig {
        TwitterConfig::new(credentials.access_token.clone())
            .with_api_url(self.api.base_url.clone())
            .with_upload_url(self.api.upload_url.clone())
            .with_timeout(Duration::from_secs(self.api.timeout_secs))
    }

    /// Human-readable effective configuration with secrets redacted.
    pub fn summary(&self) -> String {
        let reader = match &self.reader {
            Some(reader) => redact(&reader.access_token),
            None => "(same as writer)",
        };
        format!(
            "source.account      = {}\n\
             writer.access_token = {}\n\
             reader.access_token = {}\n\
             schedule.interval   = {} ms\n\
             schedule.page_size  = {}\n\
             api.base_url        = {}\n\
             api.upload_url      = {}\n\
             api.timeout         = {} s",
            self.source.account,
            redact(&self.writer.access_token),
            reader,
            self.schedule.interval_ms,
            self.schedule.page_size,
            self.api.base_url,
            self.api.upload_url,
            self.api.timeout_secs,
        )
    }
}

fn redact(secret: &str) -> &'static str {
    if secret.is_empty() {
        "<unset>"
    } else {
        "<redacted>"
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// Failed to parse configuration file.
    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying TOML parse error.
        source: toml::de::Error,
    },
    /// A required value is not set.
    #[error("{key} is not set (config file or {env})")]
    Missing {
        /// Config file key.
        key: &'static str,
        /// Environment variable that can provide it.
        env: &'static str,
    },
    /// A value is out of range or malformed.
    #[error("invalid {key}: {reason}")]
    InvalidValue {
        /// Config key or environment variable.
        key: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn valid() -> EchoConfig {
        let mut config = EchoConfig::default();
        config.source.account = "someone".into();
        config.writer.access_token = "writer-token".into();
        config
    }

    #[test]
    fn defaults() {
        let config = EchoConfig::default();
        assert_eq!(config.schedule.interval_ms, 60_000);
        assert_eq!(config.schedule.page_size, 200);
        assert_eq!(config.api.timeout_secs, 10);
        assert_eq!(config.api.base_url, "https://api.twitter.com/1.1");
        assert!(config.reader.is_none());
    }

    #[test]
    fn config_from_toml_string() {
        let toml = r#"
[source]
account = "@someone"

[writer]
access_token = "w"

[reader]
access_token = "r"

[schedule]
interval_ms = 5000
page_size = 50

[api]
base_url = "http://localhost:8080/1.1"
"#;

        let config: EchoConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.source.account, "@someone");
        assert_eq!(config.schedule.interval_ms, 5000);
        assert_eq!(config.schedule.page_size, 50);
        assert_eq!(config.api.base_url, "http://localhost:8080/1.1");
        assert_eq!(config.api.timeout_secs, 10);
        assert_eq!(config.reader_client().access_token, "r");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_missing_sections_use_defaults() {
        let config: EchoConfig = toml::from_str("[source]\naccount = \"a\"\n").unwrap();
        assert_eq!(config.schedule.interval_ms, 60_000);
        assert_eq!(config.api.upload_url, "https://upload.twitter.com/1.1");
    }

    #[test]
    fn from_file_reads_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[source]\naccount = \"filed\"").unwrap();

        let config = EchoConfig::from_file(file.path()).unwrap();
        assert_eq!(config.source.account, "filed");
    }

    #[test]
    fn from_file_reports_missing_file() {
        let err = EchoConfig::from_file(Path::new("/nonexistent/echo.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::ReadError { .. }));
    }

    #[test]
    fn from_file_reports_bad_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[schedule]\ninterval_ms = \"soon\"").unwrap();

        let err = EchoConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    // ===========================================
    // Environment Overlay
    // ===========================================

    #[test]
    fn env_overrides_file_values() {
        let mut config = valid();
        config
            .apply_env(env(&[
                (ENV_ACCOUNT, "other"),
                (ENV_ACCESS_TOKEN, "env-token"),
                (ENV_READER_ACCESS_TOKEN, "reader-token"),
                (ENV_WAIT_MS, "1500"),
            ]))
            .unwrap();

        assert_eq!(config.source.account, "other");
        assert_eq!(config.writer.access_token, "env-token");
        assert_eq!(config.reader_client().access_token, "reader-token");
        assert_eq!(config.interval(), Duration::from_millis(1500));
    }

    #[test]
    fn empty_env_values_are_ignored() {
        let mut config = valid();
        config
            .apply_env(env(&[(ENV_ACCOUNT, ""), (ENV_READER_ACCESS_TOKEN, "  ")]))
            .unwrap();

        assert_eq!(config.source.account, "someone");
        assert!(config.reader.is_none());
    }

    #[test]
    fn invalid_wait_is_rejected() {
        let mut config = valid();
        let err = config.apply_env(env(&[(ENV_WAIT_MS, "soon")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key, .. } if key == ENV_WAIT_MS));
    }

    // ===========================================
    // Validation
    // ===========================================

    #[test]
    fn missing_account_is_reported() {
        let mut config = valid();
        config.source.account = "@".into();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains(ENV_ACCOUNT));
    }

    #[test]
    fn missing_token_is_reported() {
        let mut config = valid();
        config.writer.access_token.clear();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains(ENV_ACCESS_TOKEN));
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let mut config = valid();
        config.schedule.interval_ms = 0;
        assert!(config.validate().is_err());

        let mut config = valid();
        config.schedule.page_size = 201;
        assert!(config.validate().is_err());

        let mut config = valid();
        config.api.timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn reader_falls_back_to_writer() {
        let config = valid();
        assert_eq!(config.reader_client().access_token, "writer-token");
        assert_eq!(config.bot_config().page_size, 200);
    }

    #[test]
    fn summary_redacts_tokens() {
        let mut config = valid();
        config.reader = Some(Credentials {
            access_token: "reader-secret".into(),
        });

        let summary = config.summary();
        assert!(summary.contains("someone"));
        assert!(!summary.contains("writer-token"));
        assert!(!summary.contains("reader-secret"));
        assert!(!format!("{:?}", config).contains("writer-token"));
    }
}
