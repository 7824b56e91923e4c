//! Store configuration from environment variables.
//!
//! Every variable is optional and falls back to the [`DbConfig::new`]
//! defaults. A value that is present but unparsable is an error, not a
//! silent fallback.
//!
//! | Variable                     | Default        |
//! |------------------------------|----------------|
//! | `CATALOG_DATABASE_PATH`      | `./catalog.db` |
//! | `CATALOG_DB_MAX_CONNECTIONS` | `5`            |
//! | `CATALOG_DB_MIN_CONNECTIONS` | `1`            |
//! | `CATALOG_QUERY_TIMEOUT_MS`   | `3000`         |

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::pool::DbConfig;

pub const DATABASE_PATH_VAR: &str = "CATALOG_DATABASE_PATH";
pub const MAX_CONNECTIONS_VAR: &str = "CATALOG_DB_MAX_CONNECTIONS";
pub const MIN_CONNECTIONS_VAR: &str = "CATALOG_DB_MIN_CONNECTIONS";
pub const QUERY_TIMEOUT_MS_VAR: &str = "CATALOG_QUERY_TIMEOUT_MS";

pub const DEFAULT_DATABASE_PATH: &str = "./catalog.db";

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {name}: '{value}'")]
    InvalidValue { name: String, value: String },

    #[error("{0} must be greater than zero")]
    MustBePositive(String),

    #[error("min connections ({min}) exceeds max connections ({max})")]
    PoolBounds { min: u32, max: u32 },
}

impl DbConfig {
    /// Loads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Loads configuration through `lookup`, which maps a variable name to
    /// its value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let path = lookup(DATABASE_PATH_VAR)
            .filter(|p| !p.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_DATABASE_PATH.to_string());

        let mut config = DbConfig::new(path);

        if let Some(max) = parse_var::<u32, _>(&lookup, MAX_CONNECTIONS_VAR)? {
            if max == 0 {
                return Err(ConfigError::MustBePositive(MAX_CONNECTIONS_VAR.to_string()));
            }
            config = config.max_connections(max);
        }

        if let Some(min) = parse_var::<u32, _>(&lookup, MIN_CONNECTIONS_VAR)? {
            config = config.min_connections(min);
        }

        if config.min_connections > config.max_connections {
            return Err(ConfigError::PoolBounds {
                min: config.min_connections,
                max: config.max_connections,
            });
        }

        if let Some(ms) = parse_var::<u64, _>(&lookup, QUERY_TIMEOUT_MS_VAR)? {
            if ms == 0 {
                return Err(ConfigError::MustBePositive(QUERY_TIMEOUT_MS_VAR.to_string()));
            }
            config = config.query_timeout(Duration::from_millis(ms));
        }

        Ok(config)
    }
}

fn parse_var<T, F>(lookup: &F, name: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue {
                name: name.to_string(),
                value: raw,
            }),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = DbConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.database_path, PathBuf::from(DEFAULT_DATABASE_PATH));
        assert_eq!(config.max_connections, 5);
        assert_eq!(config.min_connections, 1);
        assert_eq!(config.query_timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_reads_every_variable() {
        let config = DbConfig::from_lookup(lookup(&[
            (DATABASE_PATH_VAR, "/tmp/reviews.db"),
            (MAX_CONNECTIONS_VAR, "8"),
            (MIN_CONNECTIONS_VAR, "2"),
            (QUERY_TIMEOUT_MS_VAR, "750"),
        ]))
        .unwrap();

        assert_eq!(config.database_path, PathBuf::from("/tmp/reviews.db"));
        assert_eq!(config.max_connections, 8);
        assert_eq!(config.min_connections, 2);
        assert_eq!(config.query_timeout, Duration::from_millis(750));
    }

    #[test]
    fn test_unparsable_value_is_an_error() {
        let err = DbConfig::from_lookup(lookup(&[(MAX_CONNECTIONS_VAR, "lots")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref name, .. } if name == MAX_CONNECTIONS_VAR));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let err = DbConfig::from_lookup(lookup(&[(QUERY_TIMEOUT_MS_VAR, "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::MustBePositive(_)));
    }

    #[test]
    fn test_min_above_max_rejected() {
        let err = DbConfig::from_lookup(lookup(&[
            (MAX_CONNECTIONS_VAR, "2"),
            (MIN_CONNECTIONS_VAR, "4"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::PoolBounds { min: 4, max: 2 }));
    }
}
