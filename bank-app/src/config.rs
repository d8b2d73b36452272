//! Configuration loading from environment.

use std::env;
use std::str::FromStr;

use bank_types::AccountId;

/// Output format of the log subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => anyhow::bail!("LOG_FORMAT must be 'pretty' or 'json', got {:?}", other),
        }
    }
}

/// Application configuration.
#[derive(Debug)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub account_id: AccountId,
    pub log_format: LogFormat,
    pub otel_enabled: bool,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads configuration through an arbitrary key lookup.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let port = lookup("PORT")
            .unwrap_or_else(|| "3000".to_string())
            .parse::<u16>()
            .map_err(|e| anyhow::anyhow!("PORT must be a valid port number: {}", e))?;

        let database_url = lookup("DATABASE_URL")
            .ok_or_else(|| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

        let account_id = match lookup("ACCOUNT_ID") {
            Some(raw) => raw
                .parse::<AccountId>()
                .map_err(|e| anyhow::anyhow!("ACCOUNT_ID is invalid: {}", e))?,
            None => AccountId::default(),
        };

        let log_format = match lookup("LOG_FORMAT") {
            Some(raw) => raw.parse::<LogFormat>()?,
            None => LogFormat::default(),
        };

        let otel_enabled = lookup("OTEL_ENABLED")
            .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Ok(Self {
            port,
            database_url,
            account_id,
            log_format,
            otel_enabled,
        })
    }

    /// URL scheme of the database, safe to log.
    pub fn database_scheme(&self) -> &str {
        self.database_url
            .split_once(':')
            .map(|(scheme, _)| scheme)
            .unwrap_or("unknown")
    }
}
