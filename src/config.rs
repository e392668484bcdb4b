use crate::error::CatalogError;
use crate::scoring::ScoringWeights;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(default)]
    pub scoring: ScoringWeights,

    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub refresh: RefreshConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_fuzzy_max_distance")]
    pub fuzzy_max_distance: usize,
    #[serde(default = "default_autocomplete_limit")]
    pub autocomplete_limit: usize,
    #[serde(default = "default_alternatives_limit")]
    pub alternatives_limit: usize,
    /// Autocomplete results memoized per index. 0 disables the cache.
    #[serde(default = "default_cache_size")]
    pub cache_size: usize,
}

fn default_fuzzy_max_distance() -> usize {
    2
}
fn default_autocomplete_limit() -> usize {
    10
}
fn default_alternatives_limit() -> usize {
    20
}
fn default_cache_size() -> usize {
    1000
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            fuzzy_max_distance: default_fuzzy_max_distance(),
            autocomplete_limit: default_autocomplete_limit(),
            alternatives_limit: default_alternatives_limit(),
            cache_size: default_cache_size(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshConfig {
    #[serde(default = "default_refresh_timeout")]
    pub timeout_secs: u64,
}

fn default_refresh_timeout() -> u64 {
    30
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_refresh_timeout(),
        }
    }
}

impl RefreshConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Config {
    /// Loads the first config file found, or defaults when there is none.
    pub fn load() -> Result<Self> {
        match Self::find_config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    fn find_config_path() -> Option<PathBuf> {
        if let Some(xdg_config) = dirs::config_dir() {
            let xdg_path = xdg_config.join("gearfind/config.toml");
            if xdg_path.exists() {
                return Some(xdg_path);
            }
        }

        if let Some(home) = dirs::home_dir() {
            let home_path = home.join(".gearfind.toml");
            if home_path.exists() {
                return Some(home_path);
            }
        }

        let current_path = Path::new(".gearfind.toml");
        if current_path.exists() {
            return Some(current_path.to_path_buf());
        }

        None
    }

    pub fn validate(&self) -> std::result::Result<(), CatalogError> {
        if !self.scoring.is_valid() {
            return Err(CatalogError::Config(format!(
                "scoring weights must be non-negative and sum to 1.0 (got {:.4})",
                self.scoring.sum()
            )));
        }
        if self.search.autocomplete_limit == 0 || self.search.alternatives_limit == 0 {
            return Err(CatalogError::Config(
                "default limits must be positive".to_string(),
            ));
        }
        if self.refresh.timeout_secs == 0 {
            return Err(CatalogError::Config(
                "refresh timeout must be at least one second".to_string(),
            ));
        }
        Ok(())
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let config: Config = toml::from_str("[search]\nfuzzy_max_distance = 1\n").unwrap();
        assert_eq!(config.search.fuzzy_max_distance, 1);
        assert_eq!(config.search.autocomplete_limit, 10);
        assert_eq!(config.scoring, ScoringWeights::default());
        assert_eq!(config.refresh.timeout_secs, 30);
    }

    #[test]
    fn rejects_weights_not_summing_to_one() {
        let config: Config = toml::from_str("[scoring]\ntier_weight = 0.9\n").unwrap();
        assert!(matches!(config.validate(), Err(CatalogError::Config(_))));
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/config.toml");
        let mut config = Config::default();
        config.search.cache_size = 0;
        config.save(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.search.cache_size, 0);
    }
}
