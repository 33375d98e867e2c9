//! Configuration layer: typed settings with layered precedence (file → env → CLI).

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;

use crate::cache::CacheConfig;

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "vellum";
const ENV_PREFIX: &str = "VELLUM";

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 5001;
const DEFAULT_GRACEFUL_SHUTDOWN_SECS: u64 = 30;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 8;
const DEFAULT_DB_ACQUIRE_TIMEOUT_SECS: u64 = 5;
const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";
const DEFAULT_REDIS_COMMAND_TIMEOUT_MS: u64 = 2000;
const DEFAULT_HOME_DIGEST_SIZE: u32 = 5;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
    #[error("invalid listen address `{addr}`: {message}")]
    InvalidAddr { addr: String, message: String },
}

/// Command-line arguments for the Vellum binary.
#[derive(Debug, Parser)]
#[command(name = "vellum", version, about = "Vellum content API server")]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "VELLUM_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    /// Override the listener host.
    #[arg(long = "server-host", value_name = "HOST")]
    pub server_host: Option<String>,

    /// Override the listener port.
    #[arg(long = "server-port", value_name = "PORT")]
    pub server_port: Option<u16>,

    /// Override the database connection URL.
    #[arg(long = "database-url", env = "DATABASE_URL", value_name = "URL")]
    pub database_url: Option<String>,

    /// Override the key-value store URL.
    #[arg(long = "redis-url", env = "REDIS_URL", value_name = "URL")]
    pub redis_url: Option<String>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Disable the read-through cache entirely.
    #[arg(long = "no-cache", action = clap::ArgAction::SetTrue)]
    pub no_cache: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub graceful_shutdown_secs: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            graceful_shutdown_secs: DEFAULT_GRACEFUL_SHUTDOWN_SECS,
        }
    }
}

impl ServerSettings {
    pub fn addr(&self) -> Result<SocketAddr, SettingsError> {
        let addr = format!("{}:{}", self.host, self.port);
        addr.parse().map_err(|err: std::net::AddrParseError| {
            SettingsError::InvalidAddr {
                addr,
                message: err.to_string(),
            }
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: "postgres://localhost/vellum".to_string(),
            max_connections: DEFAULT_DB_MAX_CONNECTIONS,
            acquire_timeout_secs: DEFAULT_DB_ACQUIRE_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RedisSettings {
    /// Set false to run without a key-value store; every read goes to the
    /// document store.
    pub enabled: bool,
    pub url: String,
    pub command_timeout_ms: u64,
}

impl Default for RedisSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            url: DEFAULT_REDIS_URL.to_string(),
            command_timeout_ms: DEFAULT_REDIS_COMMAND_TIMEOUT_MS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Compact,
        }
    }
}

impl LoggingSettings {
    pub fn level_filter(&self) -> LevelFilter {
        LevelFilter::from_str(&self.level).unwrap_or(LevelFilter::INFO)
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ContentSettings {
    pub home_digest_size: HomeDigestSize,
}

/// Newtype so serde can default the digest size without a custom function.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct HomeDigestSize(pub u32);

impl Default for HomeDigestSize {
    fn default() -> Self {
        Self(DEFAULT_HOME_DIGEST_SIZE)
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub redis: RedisSettings,
    pub cache: CacheConfig,
    pub content: ContentSettings,
    pub logging: LoggingSettings,
}

/// Parse CLI arguments and load layered settings.
pub fn load_with_cli() -> Result<(CliArgs, Settings), SettingsError> {
    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}

/// Load settings: defaults file, optional local file, environment
/// (`VELLUM__SECTION__KEY`), then CLI overrides, strongest last.
pub fn load(args: &CliArgs) -> Result<Settings, SettingsError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = &args.config_file {
        builder = builder.add_source(File::from(path.clone()));
    }

    builder = builder.add_source(Environment::with_prefix(ENV_PREFIX).separator("__"));

    let mut settings: Settings = builder.build()?.try_deserialize()?;

    if let Some(host) = &args.server_host {
        settings.server.host = host.clone();
    }
    if let Some(port) = args.server_port {
        settings.server.port = port;
    }
    if let Some(url) = &args.database_url {
        settings.database.url = url.clone();
    }
    if let Some(url) = &args.redis_url {
        settings.redis.url = url.clone();
    }
    if let Some(level) = &args.log_level {
        settings.logging.level = level.clone();
    }
    if args.no_cache {
        settings.cache.enabled = false;
    }

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_complete() {
        let settings = Settings::default();
        assert_eq!(settings.server.port, DEFAULT_PORT);
        assert_eq!(settings.database.max_connections, DEFAULT_DB_MAX_CONNECTIONS);
        assert!(settings.redis.enabled);
        assert!(settings.cache.enabled);
        assert_eq!(settings.content.home_digest_size.0, DEFAULT_HOME_DIGEST_SIZE);
        assert_eq!(settings.logging.level_filter(), LevelFilter::INFO);
    }

    #[test]
    fn addr_parses_host_and_port() {
        let server = ServerSettings {
            host: "0.0.0.0".to_string(),
            port: 8080,
            ..Default::default()
        };
        let addr = server.addr().expect("valid address");
        assert_eq!(addr.port(), 8080);
    }

    #[test]
    fn bad_host_is_rejected() {
        let server = ServerSettings {
            host: "not a host".to_string(),
            ..Default::default()
        };
        assert!(server.addr().is_err());
    }

    #[test]
    fn unknown_log_level_falls_back_to_info() {
        let logging = LoggingSettings {
            level: "chatty".to_string(),
            ..Default::default()
        };
        assert_eq!(logging.level_filter(), LevelFilter::INFO);
    }
}
