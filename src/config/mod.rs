use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{
    core::utils::{ensure_dir, write_atomic, PathResolver},
    errors::{PlannerError, Result},
};

/// Keys accepted by [`Config::set`].
pub const CONFIG_KEYS: &[&str] = &["currency_symbol", "cache_ttl_secs", "data_dir"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "Config::default_currency_symbol")]
    pub currency_symbol: String,
    #[serde(default = "Config::default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
    /// Overrides where user books are stored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            currency_symbol: Self::default_currency_symbol(),
            cache_ttl_secs: Self::default_cache_ttl_secs(),
            data_dir: None,
        }
    }
}

impl Config {
    fn default_currency_symbol() -> String {
        "R$".into()
    }

    fn default_cache_ttl_secs() -> u64 {
        300
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// Updates one setting from its textual form. `data_dir` accepts `none`
    /// to fall back to the default location.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let value = value.trim();
        match key {
            "currency_symbol" => {
                if value.is_empty() {
                    return Err(PlannerError::ConfigError(
                        "currency_symbol cannot be empty".into(),
                    ));
                }
                self.currency_symbol = value.to_string();
            }
            "cache_ttl_secs" => {
                self.cache_ttl_secs = value.parse().map_err(|_| {
                    PlannerError::ConfigError(format!(
                        "cache_ttl_secs expects a number of seconds, got `{value}`"
                    ))
                })?;
            }
            "data_dir" => {
                self.data_dir = match value {
                    "" | "none" => None,
                    path => Some(PathBuf::from(path)),
                };
            }
            other => {
                return Err(PlannerError::ConfigError(format!(
                    "unknown setting `{other}`, expected one of: {}",
                    CONFIG_KEYS.join(", ")
                )))
            }
        }
        Ok(())
    }
}

pub struct ConfigManager {
    base: PathBuf,
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self> {
        Self::from_base(PathResolver::base_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self> {
        Self::from_base(base)
    }

    fn from_base(base: PathBuf) -> Result<Self> {
        ensure_dir(&base)?;
        ensure_dir(&PathResolver::config_dir_in(&base))?;
        Ok(Self {
            path: PathResolver::config_file_in(&base),
            base,
        })
    }

    pub fn load(&self) -> Result<Config> {
        if !self.path.exists() {
            return Ok(Config::default());
        }
        let data = fs::read_to_string(&self.path)?;
        serde_json::from_str(&data).map_err(|err| {
            PlannerError::ConfigError(format!("{}: {err}", self.path.display()))
        })
    }

    pub fn save(&self, config: &Config) -> Result<()> {
        let json = serde_json::to_string_pretty(config)?;
        write_atomic(&self.path, &json)
    }

    /// Directory holding user books, honoring `data_dir` when configured.
    pub fn store_dir(&self, config: &Config) -> PathBuf {
        config
            .data_dir
            .clone()
            .unwrap_or_else(|| PathResolver::store_dir_in(&self.base))
    }

    /// Registry of sign-up accounts.
    pub fn accounts_path(&self) -> PathBuf {
        PathResolver::accounts_file_in(&self.base)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_yields_defaults() {
        let temp = TempDir::new().unwrap();
        let manager = ConfigManager::with_base_dir(temp.path().to_path_buf()).unwrap();
        let config = manager.load().unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.cache_ttl(), Duration::from_secs(300));
        assert_eq!(manager.store_dir(&config), temp.path().join("users"));
    }

    #[test]
    fn save_and_reload() {
        let temp = TempDir::new().unwrap();
        let manager = ConfigManager::with_base_dir(temp.path().to_path_buf()).unwrap();
        let config = Config {
            currency_symbol: "€".into(),
            cache_ttl_secs: 60,
            data_dir: Some(temp.path().join("books")),
        };
        manager.save(&config).unwrap();
        assert_eq!(manager.load().unwrap(), config);
        assert_eq!(manager.store_dir(&config), temp.path().join("books"));
    }

    #[test]
    fn partial_file_fills_defaults() {
        let temp = TempDir::new().unwrap();
        let manager = ConfigManager::with_base_dir(temp.path().to_path_buf()).unwrap();
        fs::write(manager.path(), r#"{ "cache_ttl_secs": 5 }"#).unwrap();
        let config = manager.load().unwrap();
        assert_eq!(config.cache_ttl_secs, 5);
        assert_eq!(config.currency_symbol, "R$");
    }

    #[test]
    fn malformed_file_is_a_config_error() {
        let temp = TempDir::new().unwrap();
        let manager = ConfigManager::with_base_dir(temp.path().to_path_buf()).unwrap();
        fs::write(manager.path(), "not json").unwrap();
        assert!(matches!(manager.load(), Err(PlannerError::ConfigError(_))));
    }

    #[test]
    fn set_parses_each_key() {
        let mut config = Config::default();
        config.set("currency_symbol", " US$ ").unwrap();
        config.set("cache_ttl_secs", "30").unwrap();
        config.set("data_dir", "/srv/books").unwrap();
        assert_eq!(config.currency_symbol, "US$");
        assert_eq!(config.cache_ttl(), Duration::from_secs(30));
        assert_eq!(config.data_dir, Some(PathBuf::from("/srv/books")));

        config.set("data_dir", "none").unwrap();
        assert_eq!(config.data_dir, None);
    }

    #[test]
    fn set_rejects_bad_values() {
        let mut config = Config::default();
        assert!(matches!(
            config.set("cache_ttl_secs", "soon"),
            Err(PlannerError::ConfigError(_))
        ));
        assert!(config.set("currency_symbol", "  ").is_err());
        assert!(config.set("theme", "dark").is_err());
        assert_eq!(config, Config::default());
    }
}
