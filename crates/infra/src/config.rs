//! Database configuration loading.
//!
//! Values come from the process environment. `DATABASE_URL` wins when set;
//! otherwise connect options are built from the individual `DB_*` parts, so
//! credentials never pass through URL syntax.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use sqlx::postgres::PgConnectOptions;
use thiserror::Error;

const DEFAULT_HOST: &str = "localhost";
const DEFAULT_PORT: u16 = 5432;
const DEFAULT_USER: &str = "postgres";
const DEFAULT_NAME: &str = "storefront";
const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
    /// `DATABASE_URL` could not be parsed. Carries the parser's reason only.
    #[error("invalid DATABASE_URL: {0}")]
    InvalidUrl(String),
}

#[derive(Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    /// Full connection URL; takes precedence over the individual parts.
    pub url: Option<String>,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,
    pub max_connections: u32,
    /// How long a caller waits for a pooled connection before failing.
    pub acquire_timeout: Duration,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            user: DEFAULT_USER.to_string(),
            password: String::new(),
            name: DEFAULT_NAME.to_string(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            acquire_timeout: Duration::from_secs(DEFAULT_ACQUIRE_TIMEOUT_SECS),
        }
    }
}

impl DatabaseConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup (empty values count as unset).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        Ok(Self {
            url: get("DATABASE_URL"),
            host: get("DB_HOST").unwrap_or(defaults.host),
            port: parse_or("DB_PORT", get("DB_PORT"), defaults.port)?,
            user: get("DB_USER").unwrap_or(defaults.user),
            password: get("DB_PASSWORD").unwrap_or(defaults.password),
            name: get("DB_NAME").unwrap_or(defaults.name),
            max_connections: parse_or(
                "DB_MAX_CONNECTIONS",
                get("DB_MAX_CONNECTIONS"),
                defaults.max_connections,
            )?,
            acquire_timeout: Duration::from_secs(parse_or(
                "DB_ACQUIRE_TIMEOUT_SECS",
                get("DB_ACQUIRE_TIMEOUT_SECS"),
                DEFAULT_ACQUIRE_TIMEOUT_SECS,
            )?),
        })
    }

    /// Connect options for the pool.
    pub fn connect_options(&self) -> Result<PgConnectOptions, ConfigError> {
        if let Some(url) = &self.url {
            return PgConnectOptions::from_str(url)
                .map_err(|e| ConfigError::InvalidUrl(e.to_string()));
        }

        let options = PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .database(&self.name);
        Ok(if self.password.is_empty() {
            options
        } else {
            options.password(&self.password)
        })
    }
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const REDACTED: &str = "<redacted>";
        f.debug_struct("DatabaseConfig")
            .field("url", &self.url.as_ref().map(|_| REDACTED))
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &REDACTED)
            .field("name", &self.name)
            .field("max_connections", &self.max_connections)
            .field("acquire_timeout", &self.acquire_timeout)
            .finish()
    }
}

fn parse_or<T: std::str::FromStr>(
    key: &'static str,
    raw: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = DatabaseConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, DatabaseConfig::default());

        let options = config.connect_options().unwrap();
        assert_eq!(options.get_host(), "localhost");
        assert_eq!(options.get_port(), 5432);
        assert_eq!(options.get_username(), "postgres");
        assert_eq!(options.get_database(), Some("storefront"));
    }

    #[test]
    fn parts_become_connect_options() {
        let config = DatabaseConfig::from_lookup(lookup(&[
            ("DB_HOST", "db"),
            ("DB_PORT", "6543"),
            ("DB_USER", "shop"),
            ("DB_PASSWORD", "secret"),
            ("DB_NAME", "inventory_db"),
            ("DB_MAX_CONNECTIONS", "32"),
        ]))
        .unwrap();

        let options = config.connect_options().unwrap();
        assert_eq!(options.get_host(), "db");
        assert_eq!(options.get_port(), 6543);
        assert_eq!(options.get_username(), "shop");
        assert_eq!(options.get_database(), Some("inventory_db"));
        assert_eq!(config.max_connections, 32);
    }

    #[test]
    fn reserved_characters_in_credentials_stay_in_their_field() {
        let config = DatabaseConfig::from_lookup(lookup(&[
            ("DB_USER", "shop@eu"),
            ("DB_PASSWORD", "p@ss/w#rd"),
        ]))
        .unwrap();

        let options = config.connect_options().unwrap();
        assert_eq!(options.get_host(), "localhost");
        assert_eq!(options.get_port(), 5432);
        assert_eq!(options.get_username(), "shop@eu");
        assert_eq!(options.get_database(), Some("storefront"));
    }

    #[test]
    fn database_url_takes_precedence() {
        let config = DatabaseConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://u:p@elsewhere/x"),
            ("DB_HOST", "ignored"),
        ]))
        .unwrap();

        let options = config.connect_options().unwrap();
        assert_eq!(options.get_host(), "elsewhere");
        assert_eq!(options.get_username(), "u");
        assert_eq!(options.get_database(), Some("x"));
    }

    #[test]
    fn unparseable_url_is_reported_without_echoing_it() {
        let config = DatabaseConfig {
            url: Some("postgres://u:hunter2@[::1".to_string()),
            ..DatabaseConfig::default()
        };

        let err = config.connect_options().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUrl(_)));
        assert!(!err.to_string().contains("hunter2"));
    }

    #[test]
    fn debug_output_hides_secrets() {
        let config = DatabaseConfig {
            url: Some("postgres://u:url-secret@h/x".to_string()),
            password: "part-secret".to_string(),
            ..DatabaseConfig::default()
        };

        let printed = format!("{config:?}");
        assert!(!printed.contains("url-secret"));
        assert!(!printed.contains("part-secret"));
        assert!(printed.contains("localhost"));
    }

    #[test]
    fn empty_values_fall_back_to_defaults() {
        let config = DatabaseConfig::from_lookup(lookup(&[("DB_PORT", " ")])).unwrap();
        assert_eq!(config.port, 5432);
    }

    #[test]
    fn malformed_numbers_are_reported() {
        let err = DatabaseConfig::from_lookup(lookup(&[("DB_PORT", "five")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::Invalid {
                key: "DB_PORT",
                value: "five".to_string()
            }
        );
    }
}
