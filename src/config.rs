//! Configuration loading and management.
//!
//! Configuration lives in `config.toml` under the platform config directory
//! (`~/.config/pmis-palette/config.toml` on Linux). Every section is
//! optional; missing fields fall back to defaults.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{PaletteError, PaletteResult};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub search: SearchConfig,
    pub scoring: ScoringConfig,
    pub recent: RecentConfig,
    pub remote: RemoteConfig,
    /// Optional TOML file replacing the built-in navigation catalog.
    pub catalog_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Quiet period before a query settles.
    pub debounce_ms: u64,
    /// Queries shorter than this clear results immediately.
    pub min_query_length: usize,
    /// Queries shorter than this never fuzzy-match.
    pub fuzzy_min_length: usize,
    pub max_results: usize,
    /// Local results scoring at least this are pinned above remote ones.
    pub pin_threshold: u32,
    /// Rows visible in the result list, used for scroll-into-view.
    pub visible_rows: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub prefix: u32,
    pub substring: u32,
    pub keyword: u32,
    pub description: u32,
    pub fuzzy: u32,
    /// Score for a remote hit that carries no score and no local match.
    pub remote_default: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecentConfig {
    /// Entries kept in storage.
    pub capacity: usize,
    /// Entries shown in the empty-query view.
    pub display: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    pub enabled: bool,
    pub base_url: String,
    pub endpoint: String,
    pub timeout_ms: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 300,
            min_query_length: 2,
            fuzzy_min_length: 3,
            max_results: 20,
            pin_threshold: 100,
            visible_rows: 8,
        }
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            prefix: 100,
            substring: 50,
            keyword: 40,
            description: 30,
            fuzzy: 20,
            remote_default: 30,
        }
    }
}

impl Default for RecentConfig {
    fn default() -> Self {
        Self {
            capacity: 10,
            display: 5,
        }
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: "http://localhost:8000".to_string(),
            endpoint: "/api/search/".to_string(),
            timeout_ms: 5000,
        }
    }
}

impl SearchConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl RemoteConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Config {
    /// Directory holding config and catalog files.
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| {
                dirs::home_dir()
                    .map(|h| h.join(".config"))
                    .unwrap_or_else(|| PathBuf::from("/tmp"))
            })
            .join("pmis-palette")
    }

    /// Get the config file path
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Load config from the default location, or defaults if not found
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Load config from `path`. Unreadable or invalid files yield defaults.
    pub fn load_from(path: &Path) -> Self {
        let mut config = if path.exists() {
            match Self::parse_file(path) {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "falling back to default config");
                    Self::default()
                }
            }
        } else {
            Self::default()
        };

        config.validate();
        config
    }

    fn parse_file(path: &Path) -> PaletteResult<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Validate and clamp config values to acceptable ranges
    pub fn validate(&mut self) {
        let search = &mut self.search;
        search.debounce_ms = search.debounce_ms.clamp(0, 2000);
        search.min_query_length = search.min_query_length.clamp(1, 10);
        search.fuzzy_min_length = search.fuzzy_min_length.max(search.min_query_length);
        search.max_results = search.max_results.clamp(1, 100);
        search.visible_rows = search.visible_rows.clamp(1, 50);

        let scoring = &mut self.scoring;
        scoring.prefix = scoring.prefix.max(1);
        // A title prefix must always outrank a subsequence-only match.
        scoring.fuzzy = scoring.fuzzy.min(scoring.prefix - 1);

        self.recent.capacity = self.recent.capacity.clamp(1, 100);
        self.recent.display = self.recent.display.clamp(1, self.recent.capacity);
        self.remote.timeout_ms = self.remote.timeout_ms.clamp(100, 60_000);
    }

    /// Save config to file
    pub fn save(&self) -> PaletteResult<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> PaletteResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| PaletteError::Config(format!("Failed to serialize config: {}", e)))?;

        fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.search.debounce_ms, 300);
        assert_eq!(config.search.min_query_length, 2);
        assert_eq!(config.search.max_results, 20);
        assert_eq!(config.search.pin_threshold, 100);
        assert_eq!(config.recent.display, 5);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [search]
            max_results = 5

            [remote]
            enabled = false
            "#,
        )
        .unwrap();

        assert_eq!(config.search.max_results, 5);
        assert_eq!(config.search.debounce_ms, 300);
        assert!(!config.remote.enabled);
        assert_eq!(config.remote.endpoint, "/api/search/");
    }

    #[test]
    fn test_validate_keeps_fuzzy_below_prefix() {
        let mut config = Config::default();
        config.scoring.prefix = 10;
        config.scoring.fuzzy = 50;
        config.recent.display = 500;
        config.validate();

        assert!(config.scoring.fuzzy < config.scoring.prefix);
        assert!(config.recent.display <= config.recent.capacity);
    }

    #[test]
    fn test_invalid_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "search = [not toml").unwrap();

        let config = Config::load_from(&path);
        assert_eq!(config.search.max_results, 20);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.search.pin_threshold = 80;
        config.catalog_path = Some("/etc/pmis/catalog.toml".to_string());
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path);
        assert_eq!(loaded.search.pin_threshold, 80);
        assert_eq!(loaded.catalog_path.as_deref(), Some("/etc/pmis/catalog.toml"));
    }
}
