//! Configuration layer: typed settings with layered precedence (file → env → CLI).

use std::{
    net::SocketAddr,
    num::NonZeroU32,
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};

use clap::{Args, Parser, Subcommand, builder::BoolishValueParser};
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;

use crate::cache::CacheConfig;

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "carta";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_GRACEFUL_SHUTDOWN_SECS: u64 = 30;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 8;

/// Command-line arguments for the Carta binary.
#[derive(Debug, Parser)]
#[command(name = "carta", version, about = "Carta catalog API server")]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "CARTA_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run the Carta HTTP service.
    Serve(ServeArgs),
    /// Apply pending database migrations and exit.
    #[command(name = "migrate")]
    Migrate(MigrateArgs),
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeArgs {
    #[command(flatten)]
    pub overrides: ServeOverrides,
}

#[derive(Debug, Args, Default, Clone)]
pub struct MigrateArgs {
    /// Override the database connection URL.
    #[arg(long = "database-url", value_name = "URL")]
    pub database_url: Option<String>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeOverrides {
    /// Override the listener host.
    #[arg(long = "server-host", value_name = "HOST")]
    pub server_host: Option<String>,

    /// Override the listener port.
    #[arg(long = "server-port", value_name = "PORT")]
    pub server_port: Option<u16>,

    /// Override the graceful shutdown timeout.
    #[arg(long = "server-graceful-shutdown-seconds", value_name = "SECONDS")]
    pub graceful_shutdown_seconds: Option<u64>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,

    /// Override the database connection URL.
    #[arg(long = "database-url", value_name = "URL")]
    pub database_url: Option<String>,

    /// Override the database pool size.
    #[arg(long = "database-max-connections", value_name = "COUNT")]
    pub database_max_connections: Option<u32>,

    /// Toggle the cache layer.
    #[arg(
        long = "cache-enabled",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub cache_enabled: Option<bool>,

    /// Override the cache entry TTL.
    #[arg(long = "cache-ttl-seconds", value_name = "SECONDS")]
    pub cache_ttl_seconds: Option<u64>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration: {0}")]
    Read(#[from] config::ConfigError),
    #[error("invalid configuration value for `{field}`: {message}")]
    Invalid {
        field: &'static str,
        message: String,
    },
}

impl ConfigError {
    fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Compact,
    Json,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub addr: SocketAddr,
    pub graceful_shutdown: Duration,
}

#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: NonZeroU32,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub logging: LoggingSettings,
    pub cache: CacheConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawSettings {
    server: RawServerSettings,
    database: RawDatabaseSettings,
    logging: RawLoggingSettings,
    cache: CacheConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawServerSettings {
    host: Option<String>,
    port: Option<u16>,
    graceful_shutdown_seconds: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawDatabaseSettings {
    url: Option<String>,
    max_connections: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

/// Parse the CLI and load settings with its overrides applied.
pub fn load_with_cli() -> Result<(CliArgs, Settings), ConfigError> {
    let cli = CliArgs::parse();

    let overrides = match &cli.command {
        Some(Command::Serve(args)) => args.overrides.clone(),
        Some(Command::Migrate(args)) => ServeOverrides {
            database_url: args.database_url.clone(),
            ..Default::default()
        },
        None => ServeOverrides::default(),
    };

    let settings = load(cli.config_file.as_deref(), &overrides)?;
    Ok((cli, settings))
}

/// Load layered settings: packaged defaults, then a local `carta.toml`, then
/// an explicit config file, then `CARTA_*` environment variables, then CLI
/// overrides.
pub fn load(
    config_file: Option<&Path>,
    overrides: &ServeOverrides,
) -> Result<Settings, ConfigError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = config_file {
        builder = builder.add_source(File::from(path.to_path_buf()));
    }

    let raw: RawSettings = builder
        .add_source(Environment::with_prefix("CARTA").separator("__"))
        .build()?
        .try_deserialize()?;

    Settings::resolve(raw, overrides)
}

impl Settings {
    fn resolve(raw: RawSettings, overrides: &ServeOverrides) -> Result<Self, ConfigError> {
        let host = overrides
            .server_host
            .clone()
            .or(raw.server.host)
            .unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = overrides
            .server_port
            .or(raw.server.port)
            .unwrap_or(DEFAULT_PORT);
        let addr: SocketAddr = format!("{host}:{port}")
            .parse()
            .map_err(|err| ConfigError::invalid("server.host", format!("{err}")))?;

        let graceful_shutdown = Duration::from_secs(
            overrides
                .graceful_shutdown_seconds
                .or(raw.server.graceful_shutdown_seconds)
                .unwrap_or(DEFAULT_GRACEFUL_SHUTDOWN_SECS),
        );

        let url = overrides
            .database_url
            .clone()
            .or(raw.database.url)
            .ok_or_else(|| ConfigError::invalid("database.url", "no database URL configured"))?;
        let max_connections = overrides
            .database_max_connections
            .or(raw.database.max_connections)
            .unwrap_or(DEFAULT_DB_MAX_CONNECTIONS);
        let max_connections = NonZeroU32::new(max_connections)
            .ok_or_else(|| ConfigError::invalid("database.max_connections", "must be positive"))?;

        let level_text = overrides
            .log_level
            .clone()
            .or(raw.logging.level)
            .unwrap_or_else(|| "info".to_string());
        let level = LevelFilter::from_str(&level_text)
            .map_err(|err| ConfigError::invalid("logging.level", err.to_string()))?;
        let format = if overrides.log_json.or(raw.logging.json).unwrap_or(false) {
            LogFormat::Json
        } else {
            LogFormat::Compact
        };

        let mut cache = raw.cache;
        if let Some(enabled) = overrides.cache_enabled {
            cache.enabled = enabled;
        }
        if let Some(ttl) = overrides.cache_ttl_seconds {
            cache.ttl_secs = ttl;
        }

        Ok(Self {
            server: ServerSettings {
                addr,
                graceful_shutdown,
            },
            database: DatabaseSettings {
                url,
                max_connections,
            },
            logging: LoggingSettings { level, format },
            cache,
        })
    }
}
