//! Server configuration management.
//!
//! Consolidates environment variable reads behind one validated struct;
//! CLI flags override the environment, the environment overrides the
//! defaults.

use card_room::TableConfig;
use std::net::SocketAddr;

/// Complete server configuration.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// HTTP/WebSocket bind address.
    pub bind: SocketAddr,
    /// The single table this process hosts.
    pub table: TableConfig,
}

impl ServerConfig {
    /// Load configuration from the environment, applying CLI overrides.
    pub fn from_env(
        bind_override: Option<SocketAddr>,
        small_blind_override: Option<u32>,
        big_blind_override: Option<u32>,
    ) -> Result<Self, ConfigError> {
        let bind = bind_override
            .or_else(|| {
                std::env::var("SERVER_BIND")
                    .ok()
                    .and_then(|s| s.parse().ok())
            })
            .unwrap_or_else(|| {
                "127.0.0.1:7777"
                    .parse()
                    .expect("default bind address is valid")
            });

        let table = TableConfig {
            name: std::env::var("TABLE_NAME").unwrap_or_else(|_| "Main Table".to_string()),
            min_players: parse_env_or("TABLE_MIN_PLAYERS", 2),
            max_players: parse_env_or("TABLE_MAX_PLAYERS", 9),
            small_blind: small_blind_override.unwrap_or_else(|| parse_env_or("TABLE_SMALL_BLIND", 10)),
            big_blind: big_blind_override.unwrap_or_else(|| parse_env_or("TABLE_BIG_BLIND", 20)),
            ante: parse_env_or("TABLE_ANTE", 0),
            starting_chips: parse_env_or("TABLE_STARTING_CHIPS", 1000),
            action_timeout_secs: parse_env_or("TABLE_ACTION_TIMEOUT_SECS", 30),
        };

        Ok(Self { bind, table })
    }

    /// Validate after loading.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.table
            .validate()
            .map_err(|reason| ConfigError::Invalid { reason })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid table configuration: {reason}")]
    Invalid { reason: String },
}

/// Parse an environment variable with a default fallback.
fn parse_env_or<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = ServerConfig::from_env(None, None, None).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.table.big_blind, 20);
    }

    #[test]
    fn test_overrides_win() {
        let config = ServerConfig::from_env(
            Some("0.0.0.0:9000".parse().unwrap()),
            Some(25),
            Some(50),
        )
        .unwrap();
        assert_eq!(config.bind.port(), 9000);
        assert_eq!(config.table.small_blind, 25);
        assert_eq!(config.table.big_blind, 50);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_bad_blinds_fail_validation() {
        let config = ServerConfig::from_env(None, Some(50), Some(25)).unwrap();
        assert!(config.validate().is_err());
    }
}
