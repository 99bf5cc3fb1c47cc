pub mod database;
pub mod pagination;

pub use crate::{
    config::{database::DatabaseConfig, pagination::PaginationConfig},
    defaults,
};
pub use clap::{Args, Parser};
use serde::Deserialize;
use std::{
    fs::File,
    io::Error,
    path::{Path, PathBuf},
};
use strum::{AsRefStr, EnumString};
use thiserror::Error;

/// Error type returned by configuration operations.
#[derive(Error, Debug)]
pub enum TrackerConfigError {
    #[error("Error parsing env variables from config")]
    EnvVarParseError(#[from] std::env::VarError),
    #[error("Error processing file: {0:?}")]
    ConfigFileError(#[from] Error),
    #[error("Error processing YAML file: {0:?}")]
    SerdeYamlError(#[from] serde_yaml::Error),
    #[error("URL parser error: {0:?}")]
    ParseError(#[from] url::ParseError),
    #[error("Invalid value for config key `{0}`")]
    InvalidValue(String),
    #[error("Unrecognized database type: {0:?}")]
    UnsupportedDatabase(String),
    #[error("Max page size must be between 1 and {}, got {0}", defaults::MAX_PAGE_SIZE_CEILING)]
    InvalidPageSize(u64),
}

/// Result type returned by configuration operations.
pub type TrackerConfigResult<T> = core::result::Result<T, TrackerConfigError>;

/// Set of PostgresQL configuration constants.
#[derive(Debug, EnumString, AsRefStr)]
pub enum EnvVar {
    #[strum(serialize = "POSTGRES_HOST")]
    PostgresHost,
    #[strum(serialize = "POSTGRES_PASSWORD")]
    PostgresPassword,
    #[strum(serialize = "POSTGRES_DATABASE")]
    PostgresDatabase,
    #[strum(serialize = "POSTGRES_PORT")]
    PostgresPort,
    #[strum(serialize = "POSTGRES_USER")]
    PostgresUser,
}

/// Return the value of an environment variable or a default value.
pub fn env_or_default(var: EnvVar, default: String) -> String {
    std::env::var(var.as_ref()).unwrap_or(default)
}

#[derive(Debug, Parser, Clone)]
#[clap(
    name = "Tracker",
    about = "Domain security posture tracker connection service.",
    version
)]
pub struct TrackerArgs {
    /// Log level passed to the tracker service.
    #[clap(long, default_value = defaults::LOG_LEVEL, value_parser(["info", "debug", "error", "warn"]), help = "Log level passed to the tracker service.")]
    pub log_level: String,

    /// Tracker service config file.
    #[clap(
        short,
        long,
        value_name = "FILE",
        help = "Tracker service config file."
    )]
    pub config: Option<PathBuf>,

    /// Database type.
    #[clap(long, help = "Database type.", default_value = defaults::DATABASE, value_parser(["postgres"]))]
    pub database: String,

    /// Postgres username.
    #[clap(long, help = "Postgres username.")]
    pub postgres_user: Option<String>,

    /// Postgres database.
    #[clap(long, help = "Postgres database.")]
    pub postgres_database: Option<String>,

    /// Postgres password.
    #[clap(long, help = "Postgres password.")]
    pub postgres_password: Option<String>,

    /// Postgres host.
    #[clap(long, help = "Postgres host.")]
    pub postgres_host: Option<String>,

    /// Postgres port.
    #[clap(long, help = "Postgres port.")]
    pub postgres_port: Option<String>,

    /// Largest `first`/`last` value accepted on a connection.
    #[clap(
        long,
        help = "Largest `first`/`last` value accepted on a connection.",
        default_value_t = defaults::MAX_PAGE_SIZE
    )]
    pub max_page_size: u64,

    /// Enable verbose logging.
    #[clap(short, long, help = "Enable verbose logging.")]
    pub verbose: bool,
}

impl Default for TrackerArgs {
    fn default() -> Self {
        Self {
            log_level: defaults::LOG_LEVEL.to_string(),
            config: None,
            database: defaults::DATABASE.to_string(),
            postgres_user: Some(defaults::POSTGRES_USER.to_string()),
            postgres_database: Some(defaults::POSTGRES_DATABASE.to_string()),
            postgres_password: None,
            postgres_host: Some(defaults::POSTGRES_HOST.to_string()),
            postgres_port: Some(defaults::POSTGRES_PORT.to_string()),
            max_page_size: defaults::MAX_PAGE_SIZE,
            verbose: defaults::VERBOSE_LOGGING,
        }
    }
}

pub trait Env {
    fn inject_opt_env_vars(&mut self) -> TrackerConfigResult<()>;
}

/// Tracker service configuration.
#[derive(Clone, Deserialize, Debug, PartialEq, Eq)]
pub struct TrackerConfig {
    pub log_level: String,
    #[serde(default)]
    pub verbose: bool,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub pagination: PaginationConfig,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            log_level: defaults::LOG_LEVEL.to_string(),
            verbose: defaults::VERBOSE_LOGGING,
            database: DatabaseConfig::default(),
            pagination: PaginationConfig::default(),
        }
    }
}

impl TryFrom<TrackerArgs> for TrackerConfig {
    type Error = TrackerConfigError;

    fn try_from(args: TrackerArgs) -> TrackerConfigResult<Self> {
        let database = match args.database.as_str() {
            "postgres" => DatabaseConfig::Postgres {
                user: args.postgres_user.unwrap_or_else(|| {
                    env_or_default(
                        EnvVar::PostgresUser,
                        defaults::POSTGRES_USER.to_string(),
                    )
                }),
                password: args.postgres_password.unwrap_or_else(|| {
                    env_or_default(
                        EnvVar::PostgresPassword,
                        defaults::POSTGRES_PASSWORD.to_string(),
                    )
                }),
                host: args.postgres_host.unwrap_or_else(|| {
                    env_or_default(
                        EnvVar::PostgresHost,
                        defaults::POSTGRES_HOST.to_string(),
                    )
                }),
                port: args.postgres_port.unwrap_or_else(|| {
                    env_or_default(
                        EnvVar::PostgresPort,
                        defaults::POSTGRES_PORT.to_string(),
                    )
                }),
                database: args.postgres_database.unwrap_or_else(|| {
                    env_or_default(
                        EnvVar::PostgresDatabase,
                        defaults::POSTGRES_DATABASE.to_string(),
                    )
                }),
            },
            other => return Err(TrackerConfigError::UnsupportedDatabase(other.into())),
        };

        let mut config = TrackerConfig {
            log_level: args.log_level,
            verbose: args.verbose,
            database,
            pagination: PaginationConfig {
                max_page_size: args.max_page_size,
            },
        };

        config.inject_opt_env_vars()?;
        config.pagination.validate()?;

        Ok(config)
    }
}

fn yaml_key(key: &str) -> serde_yaml::Value {
    serde_yaml::Value::String(key.into())
}

fn yaml_str(value: &serde_yaml::Value, key: &str) -> TrackerConfigResult<String> {
    match value {
        serde_yaml::Value::String(s) => Ok(s.clone()),
        serde_yaml::Value::Number(n) => Ok(n.to_string()),
        _ => Err(TrackerConfigError::InvalidValue(key.into())),
    }
}

fn yaml_bool(value: &serde_yaml::Value, key: &str) -> TrackerConfigResult<bool> {
    value
        .as_bool()
        .ok_or_else(|| TrackerConfigError::InvalidValue(key.into()))
}

fn yaml_u64(value: &serde_yaml::Value, key: &str) -> TrackerConfigResult<u64> {
    value
        .as_u64()
        .ok_or_else(|| TrackerConfigError::InvalidValue(key.into()))
}

impl TrackerConfig {
    /// Build the config from CLI arguments, preferring the config file when one is given.
    pub fn from_args(args: TrackerArgs) -> TrackerConfigResult<Self> {
        match &args.config {
            Some(path) => Self::from_file(path),
            None => Self::try_from(args),
        }
    }

    // When building the config via a file, if any section (e.g., database, pagination, etc),
    // or if any individual setting in a section (e.g., database.postgres.host) is empty, replace it
    // with its respective default value.
    pub fn from_file(path: impl AsRef<Path>) -> TrackerConfigResult<Self> {
        let file = File::open(path)?;

        let mut config = TrackerConfig::default();

        let content: serde_yaml::Value = serde_yaml::from_reader(file)?;

        if let Some(log_level) = content.get(yaml_key("log_level")) {
            config.log_level = yaml_str(log_level, "log_level")?;
        }

        if let Some(verbose) = content.get(yaml_key("verbose")) {
            config.verbose = yaml_bool(verbose, "verbose")?;
        }

        if let Some(section) = content.get(yaml_key("database")) {
            if let Some(pg_section) = section.get(yaml_key("postgres")) {
                let DatabaseConfig::Postgres {
                    mut user,
                    mut password,
                    mut host,
                    mut port,
                    mut database,
                } = DatabaseConfig::default();

                for (key, slot) in [
                    ("user", &mut user),
                    ("password", &mut password),
                    ("host", &mut host),
                    ("port", &mut port),
                    ("database", &mut database),
                ] {
                    if let Some(value) = pg_section.get(yaml_key(key)) {
                        *slot = yaml_str(value, key)?;
                    }
                }

                config.database = DatabaseConfig::Postgres {
                    user,
                    password,
                    host,
                    port,
                    database,
                };
            }
        }

        if let Some(section) = content.get(yaml_key("pagination")) {
            if let Some(max_page_size) = section.get(yaml_key("max_page_size")) {
                config.pagination.max_page_size =
                    yaml_u64(max_page_size, "max_page_size")?;
            }
        }

        config.inject_opt_env_vars()?;
        config.pagination.validate()?;

        Ok(config)
    }

    // Inject env vars into each section of the config
    pub fn inject_opt_env_vars(&mut self) -> TrackerConfigResult<()> {
        self.database.inject_opt_env_vars()?;
        self.pagination.inject_opt_env_vars()?;

        Ok(())
    }
}
