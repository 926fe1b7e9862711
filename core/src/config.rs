//! TOML Configuration File Support
//!
//! Client configuration lives in a TOML file at
//! `$XDG_CONFIG_HOME/oria/client.toml` (typically `~/.config/oria/client.toml`).
//!
//! # Configuration Priority
//!
//! Values are resolved with the following priority (highest first):
//! 1. CLI arguments (via [`ConfigOverrides`])
//! 2. Environment variables
//! 3. TOML configuration file
//! 4. Default values
//!
//! # Example Configuration
//!
//! ```toml
//! [server]
//! base_url = "https://oria.example"
//! session_cookie = "session=..."
//! request_timeout_secs = 30
//!
//! [mascot]
//! blink_min_ms = 2000
//! blink_max_ms = 5000
//! talk_probability = 0.4
//!
//! [sync]
//! track_achievements = true
//! coalesce = true
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::mascot::{MascotFrames, MascotTiming};

/// Server used when nothing else is configured
pub const DEFAULT_SERVER_URL: &str = "http://localhost:5000";

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur when loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file at {path}: {source}")]
    ReadError {
        /// The path that was attempted
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("Failed to parse TOML config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

// =============================================================================
// Configuration Source Tracking
// =============================================================================

/// Tracks where a configuration value came from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Value from command-line argument
    Cli,
    /// Value from environment variable
    Env,
    /// Value from TOML configuration file
    File,
    /// Default value
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cli => write!(f, "CLI"),
            Self::Env => write!(f, "environment"),
            Self::File => write!(f, "config file"),
            Self::Default => write!(f, "default"),
        }
    }
}

// =============================================================================
// TOML Configuration Structures
// =============================================================================

/// Server section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerToml {
    /// Base URL of the ORIA server
    pub base_url: Option<String>,

    /// Cookie header value sent with every request
    pub session_cookie: Option<String>,

    /// Per-request timeout in seconds (no timeout when absent)
    pub request_timeout_secs: Option<u64>,
}

/// Mascot section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MascotToml {
    /// Shortest wait before a blink
    pub blink_min_ms: Option<u64>,

    /// Longest wait before a blink
    pub blink_max_ms: Option<u64>,

    /// Shortest wait before a talk roll
    pub talk_min_ms: Option<u64>,

    /// Longest wait before a talk roll
    pub talk_max_ms: Option<u64>,

    /// Chance that a talk roll talks
    pub talk_probability: Option<f64>,

    /// Resting frame image
    pub default_frame: Option<String>,

    /// Blinking frame image
    pub blinking_frame: Option<String>,

    /// Talking frame image
    pub talking_frame: Option<String>,
}

/// Sync section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncToml {
    /// Consume `newly_unlocked` achievements from update replies
    pub track_achievements: Option<bool>,

    /// Merge adjacent full-state pushes
    pub coalesce: Option<bool>,

    /// Delay between checking a daily quest and completing it
    pub settle_ms: Option<u64>,
}

/// Top-level TOML configuration structure
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientToml {
    /// Server configuration section
    pub server: ServerToml,

    /// Mascot configuration section
    pub mascot: MascotToml,

    /// Sync configuration section
    pub sync: SyncToml,
}

// =============================================================================
// Main Configuration Struct
// =============================================================================

/// Where and how to reach the server
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    /// Base URL
    pub base_url: String,
    /// Cookie header value
    pub session_cookie: Option<String>,
    /// Per-request timeout in seconds
    pub request_timeout_secs: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_SERVER_URL.to_string(),
            session_cookie: None,
            request_timeout_secs: None,
        }
    }
}

/// Mascot frames and idle timing
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MascotSettings {
    /// Frame images
    pub frames: MascotFrames,
    /// Idle loop timing
    pub timing: MascotTiming,
}

/// Sync behavior
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SyncConfig {
    /// Consume `newly_unlocked` achievements from update replies
    pub track_achievements: bool,
    /// Merge adjacent full-state pushes
    pub coalesce: bool,
    /// Delay between checking a daily quest and completing it, in milliseconds
    pub settle_ms: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            track_achievements: true,
            coalesce: true,
            settle_ms: 400,
        }
    }
}

/// Centralized configuration for the client
///
/// Use [`load_config`] to load with proper priority handling.
#[derive(Clone, Debug, Default)]
pub struct ClientConfig {
    /// Server connection
    pub server: ServerConfig,

    /// Mascot animation
    pub mascot: MascotSettings,

    /// Sync behavior
    pub sync: SyncConfig,

    /// Path to the config file that was loaded (if any)
    pub config_file_path: Option<PathBuf>,

    /// Source of configuration values
    source: ConfigSource,
}

impl Default for ConfigSource {
    fn default() -> Self {
        Self::Default
    }
}

impl ClientConfig {
    /// Create a new configuration with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the primary source of this configuration
    #[must_use]
    pub fn source(&self) -> ConfigSource {
        self.source
    }

    /// Check every value that has a valid range
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.base_url.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "server.base_url must not be empty".to_string(),
            ));
        }
        self.mascot
            .timing
            .validate()
            .map_err(|e| ConfigError::ValidationError(format!("mascot: {e}")))
    }
}

// =============================================================================
// Configuration Loading
// =============================================================================

/// Get the default configuration file path
///
/// Returns `$XDG_CONFIG_HOME/oria/client.toml` or
/// `~/.config/oria/client.toml` if `XDG_CONFIG_HOME` is not set.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("oria").join("client.toml"))
}

/// Load configuration from the default path and the process environment
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be parsed, or if
/// the resolved values fail validation. A missing file is not an error.
pub fn load_config() -> Result<ClientConfig, ConfigError> {
    load_config_from_path(default_config_path())
}

/// Load configuration from a specific path and the process environment
///
/// # Errors
///
/// Returns an error if the specified config file cannot be read or parsed.
pub fn load_config_from_path(path: Option<PathBuf>) -> Result<ClientConfig, ConfigError> {
    load_config_with_env(path, |key| std::env::var(key).ok())
}

/// Load configuration with a custom environment lookup
///
/// # Errors
///
/// Returns an error if the specified config file cannot be read or parsed.
pub fn load_config_with_env(
    path: Option<PathBuf>,
    env: impl Fn(&str) -> Option<String>,
) -> Result<ClientConfig, ConfigError> {
    let mut config = ClientConfig::default();

    if let Some(ref config_path) = path {
        if config_path.exists() {
            let toml_content =
                std::fs::read_to_string(config_path).map_err(|e| ConfigError::ReadError {
                    path: config_path.clone(),
                    source: e,
                })?;

            let toml_config: ClientToml = toml::from_str(&toml_content)?;
            apply_toml_config(&mut config, &toml_config);
            config.config_file_path = Some(config_path.clone());
            config.source = ConfigSource::File;

            tracing::info!(
                path = %config_path.display(),
                "Loaded configuration from file"
            );
        } else {
            tracing::debug!(
                path = %config_path.display(),
                "Config file not found, using defaults"
            );
        }
    }

    apply_env_config(&mut config, env);
    config.validate()?;

    Ok(config)
}

/// Apply TOML configuration values to the config struct
fn apply_toml_config(config: &mut ClientConfig, toml: &ClientToml) {
    // Server settings
    if let Some(ref url) = toml.server.base_url {
        config.server.base_url = url.clone();
    }
    if let Some(ref cookie) = toml.server.session_cookie {
        config.server.session_cookie = Some(cookie.clone());
    }
    if let Some(secs) = toml.server.request_timeout_secs {
        config.server.request_timeout_secs = Some(secs);
    }

    // Mascot settings
    let timing = &mut config.mascot.timing;
    if let Some(ms) = toml.mascot.blink_min_ms {
        timing.blink_min_ms = ms;
    }
    if let Some(ms) = toml.mascot.blink_max_ms {
        timing.blink_max_ms = ms;
    }
    if let Some(ms) = toml.mascot.talk_min_ms {
        timing.talk_min_ms = ms;
    }
    if let Some(ms) = toml.mascot.talk_max_ms {
        timing.talk_max_ms = ms;
    }
    if let Some(p) = toml.mascot.talk_probability {
        timing.talk_probability = p;
    }
    let frames = &mut config.mascot.frames;
    if let Some(ref path) = toml.mascot.default_frame {
        frames.default = path.clone();
    }
    if let Some(ref path) = toml.mascot.blinking_frame {
        frames.blinking = path.clone();
    }
    if let Some(ref path) = toml.mascot.talking_frame {
        frames.talking = path.clone();
    }

    // Sync settings
    if let Some(track) = toml.sync.track_achievements {
        config.sync.track_achievements = track;
    }
    if let Some(coalesce) = toml.sync.coalesce {
        config.sync.coalesce = coalesce;
    }
    if let Some(ms) = toml.sync.settle_ms {
        config.sync.settle_ms = ms;
    }
}

/// Apply environment variable overrides to the config
fn apply_env_config(config: &mut ClientConfig, env: impl Fn(&str) -> Option<String>) {
    if let Some(url) = env("ORIA_SERVER_URL") {
        config.server.base_url = url;
        config.source = ConfigSource::Env;
    }
    if let Some(cookie) = env("ORIA_SESSION_COOKIE") {
        config.server.session_cookie = Some(cookie);
        config.source = ConfigSource::Env;
    }
    if let Some(timeout) = env("ORIA_REQUEST_TIMEOUT_SECS") {
        if let Ok(secs) = timeout.parse::<u64>() {
            config.server.request_timeout_secs = Some(secs);
            config.source = ConfigSource::Env;
        }
    }
    if let Some(track) = env("ORIA_TRACK_ACHIEVEMENTS") {
        config.sync.track_achievements = track != "0" && track.to_lowercase() != "false";
        config.source = ConfigSource::Env;
    }
}

// =============================================================================
// CLI Override Support
// =============================================================================

/// Builder for applying CLI overrides to configuration
///
/// Use this after [`load_config`] to apply command-line argument overrides.
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    /// Server URL override
    pub base_url: Option<String>,
    /// Session cookie override
    pub session_cookie: Option<String>,
    /// Request timeout override (seconds)
    pub request_timeout_secs: Option<u64>,
}

impl ConfigOverrides {
    /// Create a new empty set of overrides
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set server URL override
    #[must_use]
    pub fn with_base_url(mut self, url: String) -> Self {
        self.base_url = Some(url);
        self
    }

    /// Set session cookie override
    #[must_use]
    pub fn with_session_cookie(mut self, cookie: String) -> Self {
        self.session_cookie = Some(cookie);
        self
    }

    /// Set request timeout override
    #[must_use]
    pub fn with_request_timeout_secs(mut self, secs: u64) -> Self {
        self.request_timeout_secs = Some(secs);
        self
    }

    /// Apply overrides to a configuration
    pub fn apply(&self, config: &mut ClientConfig) {
        if self.base_url.is_some()
            || self.session_cookie.is_some()
            || self.request_timeout_secs.is_some()
        {
            config.source = ConfigSource::Cli;
        }

        if let Some(ref url) = self.base_url {
            config.server.base_url = url.clone();
        }
        if let Some(ref cookie) = self.session_cookie {
            config.server.session_cookie = Some(cookie.clone());
        }
        if let Some(secs) = self.request_timeout_secs {
            config.server.request_timeout_secs = Some(secs);
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn write_toml(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.server.base_url, "http://localhost:5000");
        assert!(config.server.session_cookie.is_none());
        assert!(config.server.request_timeout_secs.is_none());
        assert!(config.sync.track_achievements);
        assert!(config.sync.coalesce);
        assert_eq!(config.sync.settle_ms, 400);
        assert_eq!(config.source(), ConfigSource::Default);
    }

    #[test]
    fn test_default_config_path() {
        if let Some(p) = default_config_path() {
            assert!(p.ends_with("oria/client.toml"));
        }
    }

    #[test]
    fn test_parse_valid_toml() {
        let file = write_toml(
            r#"
[server]
base_url = "https://oria.example"
session_cookie = "session=abc"
request_timeout_secs = 30

[mascot]
blink_min_ms = 1000
blink_max_ms = 2000
talk_probability = 0.9
talking_frame = "/static/img/custom.png"

[sync]
track_achievements = false
settle_ms = 250
"#,
        );

        let config = load_config_with_env(Some(file.path().to_path_buf()), no_env).unwrap();
        assert_eq!(config.server.base_url, "https://oria.example");
        assert_eq!(config.server.session_cookie.as_deref(), Some("session=abc"));
        assert_eq!(config.server.request_timeout_secs, Some(30));
        assert_eq!(config.mascot.timing.blink_window(), 1000..2000);
        assert!((config.mascot.timing.talk_probability - 0.9).abs() < f64::EPSILON);
        assert_eq!(config.mascot.frames.talking, "/static/img/custom.png");
        assert_eq!(config.mascot.frames.default, "/static/img/IMG_8442.PNG");
        assert!(!config.sync.track_achievements);
        assert!(config.sync.coalesce);
        assert_eq!(config.sync.settle_ms, 250);
        assert_eq!(config.source(), ConfigSource::File);
    }

    #[test]
    fn test_missing_file_graceful() {
        let path = PathBuf::from("/nonexistent/path/client.toml");
        let config = load_config_with_env(Some(path), no_env).unwrap();
        assert_eq!(config.source(), ConfigSource::Default);
        assert!(config.config_file_path.is_none());
    }

    #[test]
    fn test_invalid_toml_is_error() {
        let file = write_toml("[server\nbase_url = ");
        let result = load_config_with_env(Some(file.path().to_path_buf()), no_env);
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_validation_rejects_inverted_bounds() {
        let file = write_toml("[mascot]\ntalk_min_ms = 9000\ntalk_max_ms = 1000\n");
        let result = load_config_with_env(Some(file.path().to_path_buf()), no_env);
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));

        let file = write_toml("[mascot]\ntalk_probability = -0.1\n");
        let result = load_config_with_env(Some(file.path().to_path_buf()), no_env);
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_env_overrides_file() {
        let file = write_toml("[server]\nbase_url = \"https://file.example\"\n");
        let env: HashMap<&str, &str> = HashMap::from([
            ("ORIA_SERVER_URL", "https://env.example"),
            ("ORIA_REQUEST_TIMEOUT_SECS", "not-a-number"),
            ("ORIA_TRACK_ACHIEVEMENTS", "0"),
        ]);
        let config = load_config_with_env(Some(file.path().to_path_buf()), |k| {
            env.get(k).map(|v| (*v).to_string())
        })
        .unwrap();

        assert_eq!(config.server.base_url, "https://env.example");
        assert!(config.server.request_timeout_secs.is_none());
        assert!(!config.sync.track_achievements);
        assert_eq!(config.source(), ConfigSource::Env);
    }

    #[test]
    fn test_cli_overrides() {
        let mut config = ClientConfig::default();
        ConfigOverrides::new()
            .with_base_url("http://127.0.0.1:8080".to_string())
            .with_request_timeout_secs(5)
            .apply(&mut config);

        assert_eq!(config.server.base_url, "http://127.0.0.1:8080");
        assert_eq!(config.server.request_timeout_secs, Some(5));
        assert_eq!(config.source(), ConfigSource::Cli);
    }

    #[test]
    fn test_empty_overrides_keep_source() {
        let mut config = ClientConfig::default();
        ConfigOverrides::new().apply(&mut config);
        assert_eq!(config.source(), ConfigSource::Default);
    }
}
