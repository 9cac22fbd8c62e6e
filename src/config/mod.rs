//! Configuration module for the feedback backend.
//!
//! All configuration is loaded from environment variables. The database
//! location is mandatory; everything else has a sensible default.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Configuration failures detected before the server starts.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Which transport binding serves the feedback endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    /// One handler per route and method.
    Routed,
    /// A single function that dispatches on the request method.
    Function,
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Where and how to open the feedback database.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Store location, `sqlite://<dir>` or a bare directory
    pub uri: String,
    /// Database name, opened as `<dir>/<name>.sqlite`
    pub name: String,
    /// Upper bound on waiting for a connection
    pub connect_timeout: Duration,
}

impl DatabaseConfig {
    /// Resolve the on-disk file backing this database.
    pub fn file_path(&self) -> PathBuf {
        let dir = self
            .uri
            .strip_prefix("sqlite://")
            .or_else(|| self.uri.strip_prefix("sqlite:"))
            .unwrap_or(&self.uri);
        let dir = if dir.is_empty() { "." } else { dir };
        PathBuf::from(dir).join(format!("{}.sqlite", self.name))
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    pub binding: Binding,
    /// Key required for administrative deletes; `None` leaves them open
    pub admin_key: Option<String>,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    pub log_format: LogFormat,
}

impl Config {
    /// Load configuration from the process environment (and `.env`, if present).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let uri = non_empty("PORTFOLIO_DB_URI").ok_or(ConfigError::Missing("PORTFOLIO_DB_URI"))?;
        let name =
            non_empty("PORTFOLIO_DB_NAME").ok_or(ConfigError::Missing("PORTFOLIO_DB_NAME"))?;

        let connect_timeout = match non_empty("PORTFOLIO_DB_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .ok_or(ConfigError::Invalid {
                    name: "PORTFOLIO_DB_TIMEOUT_SECS",
                    value: raw,
                })?,
            None => Duration::from_secs(5),
        };

        let bind_raw =
            non_empty("PORTFOLIO_BIND_ADDR").unwrap_or_else(|| "127.0.0.1:4000".to_string());
        let bind_addr = bind_raw.parse().map_err(|_| ConfigError::Invalid {
            name: "PORTFOLIO_BIND_ADDR",
            value: bind_raw.clone(),
        })?;

        let binding = match non_empty("PORTFOLIO_BINDING").as_deref().map(str::trim) {
            None | Some("routed") => Binding::Routed,
            Some("function") => Binding::Function,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: "PORTFOLIO_BINDING",
                    value: other.to_string(),
                })
            }
        };

        let log_format = match non_empty("PORTFOLIO_LOG_FORMAT").as_deref().map(str::trim) {
            None | Some("pretty") => LogFormat::Pretty,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: "PORTFOLIO_LOG_FORMAT",
                    value: other.to_string(),
                })
            }
        };

        let admin_key = non_empty("PORTFOLIO_ADMIN_KEY");
        let log_level = non_empty("PORTFOLIO_LOG_LEVEL").unwrap_or_else(|| "info".to_string());

        Ok(Self {
            database: DatabaseConfig {
                uri,
                name,
                connect_timeout,
            },
            bind_addr,
            binding,
            admin_key,
            log_level,
            log_format,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = Config::from_lookup(lookup(&[
            ("PORTFOLIO_DB_URI", "sqlite://./data"),
            ("PORTFOLIO_DB_NAME", "portfolio"),
        ]))
        .unwrap();

        assert_eq!(config.database.file_path(), PathBuf::from("./data/portfolio.sqlite"));
        assert_eq!(config.database.connect_timeout, Duration::from_secs(5));
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:4000");
        assert_eq!(config.binding, Binding::Routed);
        assert!(config.admin_key.is_none());
        assert_eq!(config.log_level, "info");
        assert_eq!(config.log_format, LogFormat::Pretty);
    }

    #[test]
    fn test_missing_database_settings_fail_fast() {
        let err = Config::from_lookup(lookup(&[("PORTFOLIO_DB_NAME", "portfolio")])).unwrap_err();
        assert_eq!(err, ConfigError::Missing("PORTFOLIO_DB_URI"));

        let err = Config::from_lookup(lookup(&[
            ("PORTFOLIO_DB_URI", "./data"),
            ("PORTFOLIO_DB_NAME", "  "),
        ]))
        .unwrap_err();
        assert_eq!(err, ConfigError::Missing("PORTFOLIO_DB_NAME"));
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("PORTFOLIO_DB_URI", "/var/lib/portfolio"),
            ("PORTFOLIO_DB_NAME", "guestbook"),
            ("PORTFOLIO_DB_TIMEOUT_SECS", "2"),
            ("PORTFOLIO_BIND_ADDR", "0.0.0.0:8080"),
            ("PORTFOLIO_BINDING", "function"),
            ("PORTFOLIO_ADMIN_KEY", "s3cret"),
            ("PORTFOLIO_LOG_FORMAT", "json"),
        ]))
        .unwrap();

        assert_eq!(
            config.database.file_path(),
            PathBuf::from("/var/lib/portfolio/guestbook.sqlite")
        );
        assert_eq!(config.database.connect_timeout, Duration::from_secs(2));
        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.binding, Binding::Function);
        assert_eq!(config.admin_key.as_deref(), Some("s3cret"));
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let base = [
            ("PORTFOLIO_DB_URI", "./data"),
            ("PORTFOLIO_DB_NAME", "portfolio"),
        ];

        let mut vars = base.to_vec();
        vars.push(("PORTFOLIO_BIND_ADDR", "not-an-address"));
        assert!(matches!(
            Config::from_lookup(lookup(&vars)),
            Err(ConfigError::Invalid { name: "PORTFOLIO_BIND_ADDR", .. })
        ));

        let mut vars = base.to_vec();
        vars.push(("PORTFOLIO_BINDING", "lambda"));
        assert!(matches!(
            Config::from_lookup(lookup(&vars)),
            Err(ConfigError::Invalid { name: "PORTFOLIO_BINDING", .. })
        ));

        let mut vars = base.to_vec();
        vars.push(("PORTFOLIO_DB_TIMEOUT_SECS", "0"));
        assert!(matches!(
            Config::from_lookup(lookup(&vars)),
            Err(ConfigError::Invalid { name: "PORTFOLIO_DB_TIMEOUT_SECS", .. })
        ));
    }
}
