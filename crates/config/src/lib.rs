use dotenv::dotenv;
use std::env;
use std::str::FromStr;
use std::ops::RangeInclusive;
use thiserror::Error;

/// Token lifetimes accepted from `TOKEN_TTL_HOURS`: one hour up to a year.
pub const TOKEN_TTL_HOURS_RANGE: RangeInclusive<i64> = 1..=8760;

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Invalid {name}: {value}")]
    InvalidValue { name: &'static str, value: String },

    #[error("Unknown document store '{0}', expected 'memory' or 'sqlite'")]
    UnknownStore(String),
}

/// Which document store engine backs the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Memory,
    Sqlite,
}

impl FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(StoreBackend::Memory),
            "sqlite" => Ok(StoreBackend::Sqlite),
            other => Err(ConfigError::UnknownStore(other.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api_host: String,
    pub api_port: u16,
    pub store_backend: StoreBackend,
    pub database_path: String,
    pub employee_collection: String,
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    pub log_filter: String,
}

impl Config {
    /// Load configuration from the process environment, reading `.env` first if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from any variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.to_string());

        Ok(Self {
            api_host: var("API_HOST", "0.0.0.0"),
            api_port: parse("API_PORT", var("API_PORT", "8080"))?,
            store_backend: var("DOCUMENT_STORE", "memory").parse()?,
            database_path: var("DATABASE_PATH", "employees.db"),
            employee_collection: var("EMPLOYEE_COLLECTION", "employees"),
            jwt_secret: var("JWT_SECRET", "MOCKJWTSECRET"),
            token_ttl_hours: parse_bounded(
                "TOKEN_TTL_HOURS",
                var("TOKEN_TTL_HOURS", "24"),
                TOKEN_TTL_HOURS_RANGE,
            )?,
            log_filter: var("LOG_FILTER", "api_server=debug,tower_http=debug"),
        })
    }

    pub fn api_address(&self) -> String {
        format!("{}:{}", self.api_host, self.api_port)
    }
}

fn parse<T: FromStr>(name: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .parse()
        .map_err(|_| ConfigError::InvalidValue { name, value })
}

fn parse_bounded(
    name: &'static str,
    value: String,
    range: RangeInclusive<i64>,
) -> Result<i64, ConfigError> {
    match value.trim().parse::<i64>() {
        Ok(parsed) if range.contains(&parsed) => Ok(parsed),
        _ => Err(ConfigError::InvalidValue { name, value }),
    }
}
