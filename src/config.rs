//! Configuration management with validation and defaults
//!
//! Sources, lowest precedence first: built-in defaults, an optional TOML file,
//! `GAMEHALL_*` environment variables. CLI flags are applied on top by the binary.

use crate::errors::ConfigurationError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GameHallConfig {
    pub server: ServerConfig,
    pub jackpot: JackpotConfig,
    pub sessions: SessionConfig,
    pub wallet: WalletConfig,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            allowed_origins: vec!["*".to_string()],
            request_timeout_secs: 30,
        }
    }
}

impl ServerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct JackpotConfig {
    /// Pool value after a win, and at startup
    pub floor: u64,
    /// Share of each non-jackpot bet fed into the pool
    pub contribution_percent: u64,
}

impl Default for JackpotConfig {
    fn default() -> Self {
        Self {
            floor: 10_000,
            contribution_percent: 2,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SessionConfig {
    /// Active sessions idle longer than this are expired; `None` disables the reaper
    pub abandoned_ttl_secs: Option<u64>,
    pub reap_interval_secs: u64,
    /// Completed sessions kept per user for the history endpoint
    pub history_limit: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            abandoned_ttl_secs: None,
            reap_interval_secs: 60,
            history_limit: 200,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WalletConfig {
    /// Balance a user starts with in the in-memory wallet
    pub opening_balance: u64,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            opening_balance: 1_000_000,
        }
    }
}

impl GameHallConfig {
    /// Validate configuration for logical consistency
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.server.port == 0 {
            return Err(ConfigurationError::ValidationFailed(
                "server.port must be > 0".to_string(),
            ));
        }
        if self.server.request_timeout_secs == 0 {
            return Err(ConfigurationError::ValidationFailed(
                "server.request_timeout_secs must be > 0".to_string(),
            ));
        }
        if self.jackpot.contribution_percent > 100 {
            return Err(ConfigurationError::ValidationFailed(format!(
                "jackpot.contribution_percent must be <= 100, got {}",
                self.jackpot.contribution_percent
            )));
        }
        if self.sessions.reap_interval_secs == 0 {
            return Err(ConfigurationError::ValidationFailed(
                "sessions.reap_interval_secs must be > 0".to_string(),
            ));
        }
        if self.sessions.abandoned_ttl_secs == Some(0) {
            return Err(ConfigurationError::ValidationFailed(
                "sessions.abandoned_ttl_secs must be > 0 when set".to_string(),
            ));
        }
        if self.sessions.history_limit == 0 {
            return Err(ConfigurationError::ValidationFailed(
                "sessions.history_limit must be > 0".to_string(),
            ));
        }
        Ok(())
    }

    pub fn abandoned_ttl(&self) -> Option<Duration> {
        self.sessions.abandoned_ttl_secs.map(Duration::from_secs)
    }

    pub fn reap_interval(&self) -> Duration {
        Duration::from_secs(self.sessions.reap_interval_secs)
    }
}

type EnvLookup = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Builds a `GameHallConfig` from file and environment
pub struct ConfigLoader {
    path: Option<PathBuf>,
    env: EnvLookup,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self {
            path: None,
            env: Box::new(|key| std::env::var(key).ok()),
        }
    }

    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        self.path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Replace the process environment, e.g. with a fixed map in tests
    pub fn with_env<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        self.env = Box::new(lookup);
        self
    }

    pub fn load(&self) -> Result<GameHallConfig, ConfigurationError> {
        let mut config = match &self.path {
            Some(path) => {
                let text = std::fs::read_to_string(path).map_err(|e| {
                    ConfigurationError::LoadFailed(format!("{}: {}", path.display(), e))
                })?;
                toml::from_str(&text)?
            }
            None => GameHallConfig::default(),
        };

        self.apply_env(&mut config)?;
        config.validate()?;
        Ok(config)
    }

    fn apply_env(&self, config: &mut GameHallConfig) -> Result<(), ConfigurationError> {
        if let Some(host) = (self.env)("GAMEHALL_HOST") {
            config.server.host = host;
        }
        if let Some(port) = self.parsed("GAMEHALL_PORT")? {
            config.server.port = port;
        }
        if let Some(origins) = (self.env)("GAMEHALL_ALLOWED_ORIGINS") {
            config.server.allowed_origins = origins
                .split(',')
                .map(|origin| origin.trim().to_string())
                .filter(|origin| !origin.is_empty())
                .collect();
        }
        if let Some(timeout) = self.parsed("GAMEHALL_REQUEST_TIMEOUT_SECS")? {
            config.server.request_timeout_secs = timeout;
        }
        if let Some(floor) = self.parsed("GAMEHALL_JACKPOT_FLOOR")? {
            config.jackpot.floor = floor;
        }
        if let Some(percent) = self.parsed("GAMEHALL_JACKPOT_CONTRIBUTION_PERCENT")? {
            config.jackpot.contribution_percent = percent;
        }
        if let Some(ttl) = self.parsed("GAMEHALL_ABANDONED_TTL_SECS")? {
            config.sessions.abandoned_ttl_secs = Some(ttl);
        }
        if let Some(interval) = self.parsed("GAMEHALL_REAP_INTERVAL_SECS")? {
            config.sessions.reap_interval_secs = interval;
        }
        if let Some(limit) = self.parsed("GAMEHALL_HISTORY_LIMIT")? {
            config.sessions.history_limit = limit;
        }
        if let Some(balance) = self.parsed("GAMEHALL_OPENING_BALANCE")? {
            config.wallet.opening_balance = balance;
        }
        Ok(())
    }

    fn parsed<T>(&self, key: &str) -> Result<Option<T>, ConfigurationError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match (self.env)(key) {
            None => Ok(None),
            Some(raw) => raw
                .trim()
                .parse()
                .map(Some)
                .map_err(|e: T::Err| ConfigurationError::InvalidValue {
                    field: key.to_string(),
                    value: raw.clone(),
                    reason: e.to_string(),
                }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn no_env() -> ConfigLoader {
        ConfigLoader::new().with_env(|_| None)
    }

    fn env(pairs: &[(&str, &str)]) -> ConfigLoader {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ConfigLoader::new().with_env(move |key| vars.get(key).cloned())
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = no_env().load().unwrap();
        assert_eq!(config, GameHallConfig::default());
        assert_eq!(config.jackpot.floor, 10_000);
        assert_eq!(config.jackpot.contribution_percent, 2);
        assert_eq!(config.server.request_timeout(), Duration::from_secs(30));
        assert!(config.abandoned_ttl().is_none());
    }

    #[test]
    fn test_file_values_and_partial_sections() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[server]\nport = 9090\n\n[sessions]\nabandoned_ttl_secs = 600\n"
        )
        .unwrap();

        let config = no_env().with_file(file.path()).load().unwrap();
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.abandoned_ttl(), Some(Duration::from_secs(600)));
        assert_eq!(config.sessions.history_limit, 200);
    }

    #[test]
    fn test_env_overrides_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[jackpot]\nfloor = 500\n").unwrap();

        let config = env(&[
            ("GAMEHALL_JACKPOT_FLOOR", "2500"),
            ("GAMEHALL_ALLOWED_ORIGINS", "https://a.example, https://b.example"),
        ])
        .with_file(file.path())
        .load()
        .unwrap();

        assert_eq!(config.jackpot.floor, 2_500);
        assert_eq!(
            config.server.allowed_origins,
            vec!["https://a.example", "https://b.example"]
        );
    }

    #[test]
    fn test_bad_env_value_names_the_variable() {
        let err = env(&[("GAMEHALL_PORT", "eighty")]).load().unwrap_err();
        match err {
            ConfigurationError::InvalidValue { field, value, .. } => {
                assert_eq!(field, "GAMEHALL_PORT");
                assert_eq!(value, "eighty");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_validation_rejects_inconsistent_values() {
        let mut config = GameHallConfig::default();
        config.jackpot.contribution_percent = 101;
        assert!(config.validate().is_err());

        let mut config = GameHallConfig::default();
        config.server.port = 0;
        assert!(config.validate().is_err());

        let mut config = GameHallConfig::default();
        config.sessions.abandoned_ttl_secs = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_file_and_bad_toml() {
        let err = no_env().with_file("/nonexistent/gamehall.toml").load();
        assert!(matches!(err, Err(ConfigurationError::LoadFailed(_))));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server\nport = ").unwrap();
        let err = no_env().with_file(file.path()).load();
        assert!(matches!(err, Err(ConfigurationError::LoadFailed(_))));
    }
}
