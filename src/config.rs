use std::env;
use std::str::FromStr;
use std::time::Duration;
use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub request_timeout: Duration,
    pub database: DatabaseConfig,
    pub environment: Environment,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub username: String,
    pub password: String,
    pub ssl_mode: SslMode,
    pub max_connections: u32,
    pub connection_timeout: Duration,
    /// Full `postgres://` URL; when present it replaces the individual fields
    pub connection_string: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SslMode {
    Disable,
    Prefer,
    Require,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Environment {
    Local,
    Production,
}

/// Read a variable, treating unset and empty values alike.
fn lookup_non_empty<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).filter(|value| !value.trim().is_empty())
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup_non_empty(lookup, key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{} has an invalid value: {:?}", key, raw)),
        None => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists (for local development)
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = parse_or(&lookup, "PORT", 8080u16)?;
        let request_timeout_secs = parse_or(&lookup, "REQUEST_TIMEOUT_SECS", 30u64)?;

        let database = DatabaseConfig::from_lookup(&lookup)?;

        let environment = match lookup_non_empty(&lookup, "ENV").as_deref() {
            Some("production") | Some("prod") => Environment::Production,
            _ => Environment::Local,
        };

        let config = Config {
            port,
            request_timeout: Duration::from_secs(request_timeout_secs),
            database,
            environment,
        };
        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.port == 0 {
            anyhow::bail!("PORT must be greater than 0");
        }

        if self.request_timeout.is_zero() {
            anyhow::bail!("REQUEST_TIMEOUT_SECS must be greater than 0");
        }

        self.database.validate()
    }
}

impl DatabaseConfig {
    pub fn from_lookup<F>(lookup: &F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let ssl_mode = match lookup_non_empty(lookup, "DATABASE_SSL_MODE") {
            Some(raw) => raw.parse::<SslMode>()?,
            None => SslMode::Prefer,
        };
        let max_connections = parse_or(lookup, "DATABASE_MAX_CONNECTIONS", 10u32)?;
        let connection_timeout_secs = parse_or(lookup, "DATABASE_CONNECTION_TIMEOUT", 30u64)?;
        let connection_timeout = Duration::from_secs(connection_timeout_secs);

        // A full connection string takes precedence over individual parameters
        if let Some(url) = lookup_non_empty(lookup, "DATABASE_URL") {
            if !url.starts_with("postgresql://") && !url.starts_with("postgres://") {
                anyhow::bail!("DATABASE_URL must start with 'postgresql://' or 'postgres://'");
            }

            return Ok(DatabaseConfig {
                host: String::new(),
                port: 0,
                database: String::new(),
                username: String::new(),
                password: String::new(),
                ssl_mode,
                max_connections,
                connection_timeout,
                connection_string: Some(url),
            });
        }

        let host = lookup_non_empty(lookup, "DATABASE_HOST").unwrap_or_else(|| "localhost".to_string());
        let port = parse_or(lookup, "DATABASE_PORT", 5432u16)?;

        let database = lookup_non_empty(lookup, "DATABASE_NAME")
            .context("DATABASE_NAME environment variable is required when DATABASE_URL is not set")?;
        let username = lookup_non_empty(lookup, "DATABASE_USERNAME")
            .context("DATABASE_USERNAME environment variable is required when DATABASE_URL is not set")?;
        let password = lookup_non_empty(lookup, "DATABASE_PASSWORD")
            .context("DATABASE_PASSWORD environment variable is required when DATABASE_URL is not set")?;

        Ok(DatabaseConfig {
            host,
            port,
            database,
            username,
            password,
            ssl_mode,
            max_connections,
            connection_timeout,
            connection_string: None,
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.connection_string.is_none() {
            if self.host.trim().is_empty() {
                anyhow::bail!("Database host cannot be empty");
            }

            if self.port == 0 {
                anyhow::bail!("Database port must be greater than 0");
            }
        }

        if self.max_connections == 0 {
            anyhow::bail!("Max connections must be greater than 0");
        }

        if self.connection_timeout.is_zero() {
            anyhow::bail!("Connection timeout must be greater than 0");
        }

        Ok(())
    }

    /// Log-safe description of the target; never includes the password.
    pub fn describe(&self) -> String {
        match self.connection_string {
            Some(_) => "DATABASE_URL".to_string(),
            None => format!("{}:{}/{}", self.host, self.port, self.database),
        }
    }
}

impl FromStr for SslMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "disable" => Ok(SslMode::Disable),
            "prefer" => Ok(SslMode::Prefer),
            "require" => Ok(SslMode::Require),
            other => anyhow::bail!(
                "Invalid DATABASE_SSL_MODE '{}'. Must be one of: disable, prefer, require",
                other
            ),
        }
    }
}

impl Environment {
    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }
}
