use crate::constants::WORKER_INTERVAL_SECS;
use dotenv::dotenv;
use std::env;
use std::time::Duration;
use thiserror::Error;
use url::Url;

#[derive(Debug)]
pub struct Config {
    pub database_url: String,
    /// Set only when `SIMULATION_INTERVAL_SECS` is present; otherwise the
    /// stored `simulation_config.update_interval` decides.
    pub interval: Option<Duration>,
    /// Verify the database server certificate. On unless `DATABASE_TLS_VERIFY=false`.
    pub verify_tls: bool,
    /// Fixed seed for reproducible runs. Entropy-seeded when absent.
    pub seed: Option<u64>,
    /// Raw `name:password:role` list, see `auth::StaticCredentials::parse`.
    pub dashboard_users: Option<String>,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Environment variable not found: {0}")]
    MissingEnv(String),
    #[error("Invalid database URL: {0}")]
    InvalidDatabaseUrl(String),
    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: String, value: String },
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| ConfigError::MissingEnv("DATABASE_URL".to_string()))?;

        // Validate the URL format
        Url::parse(&database_url)
            .map_err(|e| ConfigError::InvalidDatabaseUrl(e.to_string()))?;

        let interval_secs = parse_optional::<u64>("SIMULATION_INTERVAL_SECS")?;
        if interval_secs == Some(0) {
            return Err(ConfigError::InvalidValue {
                name: "SIMULATION_INTERVAL_SECS".to_string(),
                value: "0".to_string(),
            });
        }

        let verify_tls = match env::var("DATABASE_TLS_VERIFY") {
            Ok(raw) => parse_flag("DATABASE_TLS_VERIFY", &raw)?,
            Err(_) => true,
        };

        Ok(Self {
            database_url,
            interval: interval_secs.map(Duration::from_secs),
            verify_tls,
            seed: parse_optional::<u64>("SIMULATION_SEED")?,
            dashboard_users: env::var("DASHBOARD_USERS").ok().filter(|v| !v.trim().is_empty()),
        })
    }
}

/// Loop interval: the env override wins, then the stored `update_interval`
/// (minutes), then the built-in default.
pub fn resolve_interval(configured: Option<Duration>, stored_minutes: Option<i32>) -> Duration {
    if let Some(interval) = configured {
        return interval;
    }

    match stored_minutes {
        Some(minutes) if minutes > 0 => Duration::from_secs(minutes as u64 * 60),
        _ => Duration::from_secs(WORKER_INTERVAL_SECS),
    }
}

pub fn parse_flag(name: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            name: name.to_string(),
            value: raw.to_string(),
        }),
    }
}

fn parse_optional<T: std::str::FromStr>(name: &str) -> Result<Option<T>, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue {
                name: name.to_string(),
                value: raw,
            }),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_interval_overrides_stored_value() {
        let configured = Some(Duration::from_secs(90));
        assert_eq!(resolve_interval(configured, Some(15)), Duration::from_secs(90));
    }

    #[test]
    fn stored_interval_used_when_env_unset() {
        assert_eq!(resolve_interval(None, Some(15)), Duration::from_secs(900));
    }

    #[test]
    fn default_interval_when_nothing_usable() {
        assert_eq!(resolve_interval(None, None), Duration::from_secs(WORKER_INTERVAL_SECS));
        assert_eq!(resolve_interval(None, Some(0)), Duration::from_secs(WORKER_INTERVAL_SECS));
        assert_eq!(resolve_interval(None, Some(-5)), Duration::from_secs(WORKER_INTERVAL_SECS));
    }

    #[test]
    fn tls_flag_parsing() {
        assert_eq!(parse_flag("DATABASE_TLS_VERIFY", "false").ok(), Some(false));
        assert_eq!(parse_flag("DATABASE_TLS_VERIFY", " TRUE ").ok(), Some(true));
        assert!(matches!(
            parse_flag("DATABASE_TLS_VERIFY", "maybe"),
            Err(ConfigError::InvalidValue { .. })
        ));
    }
}
