//! Configuration Management
//!
//! Connection settings come from the process environment. A `.env` file in the
//! current directory is loaded first when present; variables that are already
//! set take precedence over the file.
//!
//! # Variables
//! - `DB_USER` (required)
//! - `DB_PASSWORD` (optional)
//! - `DB_HOST` (default `localhost`)
//! - `DB_NAME` (default: same as `DB_USER`)
//! - `DB_PORT` (default `5432`)

use std::fmt;

use tokio_postgres::Config;
use tracing::debug;

use crate::error::{Result, TrackerError};

/// Default `PostgreSQL` port
pub const DEFAULT_PORT: u16 = 5432;

/// Default database host
pub const DEFAULT_HOST: &str = "localhost";

/// `PostgreSQL` connection settings
#[derive(Clone, PartialEq, Eq)]
pub struct DbConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    /// WARNING: Sensitive data, do not log or include in error messages
    pub password: Option<String>,
    pub database: String,
}

impl DbConfig {
    /// Resolve settings from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve settings through an arbitrary variable lookup
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let user = get("DB_USER")
            .ok_or_else(|| TrackerError::config_error("DB_USER is not set"))?;

        let port = match get("DB_PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|_| {
                TrackerError::config_error(format!("DB_PORT must be a port number, got '{raw}'"))
            })?,
            None => DEFAULT_PORT,
        };

        let host = get("DB_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let database = get("DB_NAME").unwrap_or_else(|| user.clone());
        let password = lookup("DB_PASSWORD");

        Ok(Self { host, port, user, password, database })
    }

    /// Build the driver configuration
    #[must_use]
    pub fn to_pg_config(&self) -> Config {
        let mut pg_config = Config::new();
        pg_config.host(&self.host).port(self.port).user(&self.user).dbname(&self.database);
        if let Some(password) = &self.password {
            pg_config.password(password);
        }
        pg_config
    }

    /// Credential-free description for logs, e.g. `alice@localhost:5432/company`
    #[must_use]
    pub fn describe(&self) -> String {
        format!("{}@{}:{}/{}", self.user, self.host, self.port, self.database)
    }
}

impl fmt::Debug for DbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("database", &self.database)
            .finish()
    }
}

/// Load `.env` from the current directory, if there is one
pub fn load_dotenv() {
    match dotenvy::dotenv() {
        Ok(path) => debug!("Loaded .env from {}", path.display()),
        Err(e) if e.not_found() => debug!("No .env file found, using process environment"),
        Err(e) => debug!("Failed to load .env: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> =
            pairs.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_full_environment() {
        let config = DbConfig::from_lookup(lookup_from(&[
            ("DB_USER", "alice"),
            ("DB_PASSWORD", "secret"),
            ("DB_HOST", "db.internal"),
            ("DB_NAME", "company"),
            ("DB_PORT", "6543"),
        ]))
        .unwrap();

        assert_eq!(config.user, "alice");
        assert_eq!(config.password.as_deref(), Some("secret"));
        assert_eq!(config.host, "db.internal");
        assert_eq!(config.database, "company");
        assert_eq!(config.port, 6543);
    }

    #[test]
    fn test_defaults() {
        let config = DbConfig::from_lookup(lookup_from(&[("DB_USER", "alice")])).unwrap();

        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.host, DEFAULT_HOST);
        assert_eq!(config.database, "alice");
        assert!(config.password.is_none());
    }

    #[test]
    fn test_missing_user() {
        let err = DbConfig::from_lookup(lookup_from(&[("DB_NAME", "company")])).unwrap_err();
        assert_eq!(err.error_code(), "CONFIG_ERROR");
        assert!(err.message().contains("DB_USER"));
    }

    #[test]
    fn test_blank_values_are_unset() {
        let config = DbConfig::from_lookup(lookup_from(&[
            ("DB_USER", "alice"),
            ("DB_HOST", "  "),
            ("DB_PORT", ""),
        ]))
        .unwrap();
        assert_eq!(config.host, DEFAULT_HOST);
        assert_eq!(config.port, DEFAULT_PORT);
    }

    #[test]
    fn test_invalid_port() {
        let err = DbConfig::from_lookup(lookup_from(&[("DB_USER", "alice"), ("DB_PORT", "abc")]))
            .unwrap_err();
        assert!(err.message().contains("DB_PORT"));
        assert!(err.message().contains("abc"));
    }

    #[test]
    fn test_debug_redacts_password() {
        let config = DbConfig::from_lookup(lookup_from(&[
            ("DB_USER", "alice"),
            ("DB_PASSWORD", "hunter2"),
        ]))
        .unwrap();

        let debug = format!("{config:?}");
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("<redacted>"));
        assert!(!config.describe().contains("hunter2"));
        assert_eq!(config.describe(), "alice@localhost:5432/alice");
    }

    #[test]
    fn test_pg_config() {
        let config = DbConfig::from_lookup(lookup_from(&[
            ("DB_USER", "alice"),
            ("DB_NAME", "company"),
            ("DB_PORT", "5433"),
        ]))
        .unwrap();

        let pg = config.to_pg_config();
        assert_eq!(pg.get_user(), Some("alice"));
        assert_eq!(pg.get_dbname(), Some("company"));
        assert_eq!(pg.get_ports(), &[5433]);
        assert!(pg.get_password().is_none());
    }
}
