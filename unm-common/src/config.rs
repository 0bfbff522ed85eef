//! Configuration loading and config file resolution

use crate::{Context, Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Environment variable naming the configuration file
pub const CONFIG_ENV_VAR: &str = "UNM_CONFIG";

/// Environment variable overriding `[server] bind_address`
pub const BIND_ADDRESS_ENV_VAR: &str = "UNM_BIND_ADDRESS";

/// Default listen address of the HTTP host
pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:3000";

/// Top-level TOML configuration
///
/// Every section is optional; missing sections fall back to defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    /// Default context, layered under every request's own context
    pub context: Context,
    /// Engines used when a search request does not name any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engines: Option<Vec<String>>,
}

/// HTTP listener settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_address: String,
    /// Request budget of the `/api/v1` routes. `requests = 0` turns it off.
    pub rate_limit: RateLimitConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            rate_limit: RateLimitConfig::default(),
        }
    }
}

/// At most `requests` API calls per `per_secs` seconds, across all clients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    pub requests: u64,
    pub per_secs: u64,
}

impl RateLimitConfig {
    pub fn is_enabled(&self) -> bool {
        self.requests > 0 && self.per_secs > 0
    }

    pub fn period(&self) -> Duration {
        Duration::from_secs(self.per_secs)
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests: 30,
            per_secs: 300,
        }
    }
}

/// Logging settings
///
/// `RUST_LOG` takes precedence over `level` when set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// error, warn, info, debug or trace
    pub level: String,
    /// Write logs to this file instead of stdout
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_file: None,
        }
    }
}

/// Where the configuration file path came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    CommandLine,
    Environment,
    UserConfigDir,
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigSource::CommandLine => write!(f, "command line"),
            ConfigSource::Environment => write!(f, "{CONFIG_ENV_VAR}"),
            ConfigSource::UserConfigDir => write!(f, "user config directory"),
        }
    }
}

/// What [`TomlConfig::load`] ended up doing.
///
/// Loading happens before logging is initialized, so the host reports
/// this afterwards with [`ConfigStatus::log`].
#[derive(Debug)]
pub enum ConfigStatus {
    /// The file was read and parsed
    Loaded { path: PathBuf, source: ConfigSource },
    /// The file could not be read; compiled defaults are in use
    FellBack {
        path: PathBuf,
        source: ConfigSource,
        error: io::Error,
    },
    /// No file was named or found; compiled defaults are in use
    Defaults,
}

impl ConfigStatus {
    pub fn is_fallback(&self) -> bool {
        matches!(self, ConfigStatus::FellBack { .. })
    }

    /// The file the configuration was read from, if any
    pub fn loaded_path(&self) -> Option<&Path> {
        match self {
            ConfigStatus::Loaded { path, .. } => Some(path),
            _ => None,
        }
    }

    pub fn log(&self) {
        match self {
            ConfigStatus::Loaded { path, source } => {
                info!(path = %path.display(), %source, "Configuration loaded");
            }
            ConfigStatus::FellBack { path, source, error } => {
                warn!(
                    path = %path.display(),
                    %source,
                    "Failed to read configuration ({}), using defaults",
                    error
                );
            }
            ConfigStatus::Defaults => info!("No configuration file found, using defaults"),
        }
    }
}

/// Config file resolution, in priority order:
/// 1. Command-line argument
/// 2. `UNM_CONFIG` environment variable
/// 3. `<user config dir>/unm/config.toml`, if it exists
///
/// When none applies the compiled defaults are used.
pub struct ConfigResolver {
    cli_arg: Option<PathBuf>,
}

impl ConfigResolver {
    pub fn new(cli_arg: Option<PathBuf>) -> Self {
        Self { cli_arg }
    }

    pub fn resolve(&self) -> Option<(PathBuf, ConfigSource)> {
        if let Some(path) = &self.cli_arg {
            return Some((path.clone(), ConfigSource::CommandLine));
        }

        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            if !path.trim().is_empty() {
                return Some((PathBuf::from(path), ConfigSource::Environment));
            }
        }

        default_config_path()
            .filter(|path| path.exists())
            .map(|path| (path, ConfigSource::UserConfigDir))
    }
}

/// `<user config dir>/unm/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("unm").join("config.toml"))
}

/// Read and parse one TOML configuration file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)?;
    toml::from_str(&content).map_err(|source| Error::ConfigParse {
        path: path.to_path_buf(),
        source,
    })
}

impl TomlConfig {
    /// Resolve, read and parse the configuration, then apply environment
    /// overrides.
    ///
    /// A missing or unreadable file is not fatal: the compiled defaults are
    /// used and the returned [`ConfigStatus`] says so. A file that exists
    /// but does not parse is an error.
    pub fn load(cli_arg: Option<PathBuf>) -> Result<(Self, ConfigStatus)> {
        let (mut config, status) = match ConfigResolver::new(cli_arg).resolve() {
            Some((path, source)) => {
                debug!(path = %path.display(), ?source, "Reading configuration");
                match load_toml_config(&path) {
                    Ok(config) => (config, ConfigStatus::Loaded { path, source }),
                    Err(Error::Io(error)) => (
                        TomlConfig::default(),
                        ConfigStatus::FellBack {
                            path,
                            source,
                            error,
                        },
                    ),
                    Err(e) => return Err(e),
                }
            }
            None => (TomlConfig::default(), ConfigStatus::Defaults),
        };

        config.apply_env_overrides();
        Ok((config, status))
    }

    /// Apply `UNM_BIND_ADDRESS` over the file's bind address
    pub fn apply_env_overrides(&mut self) {
        if let Ok(address) = std::env::var(BIND_ADDRESS_ENV_VAR) {
            if !address.trim().is_empty() {
                debug!(%address, "Bind address overridden by environment");
                self.server.bind_address = address;
            }
        }
    }
}
