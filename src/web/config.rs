use serde::{Deserialize, Deserializer};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::cache::{CacheSettings, DEFAULT_SNAPSHOT_KEY};
use crate::catalog::CatalogGroup;
use crate::groundtrack::OrbitClassifier;
use crate::predict::Cadence;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub web: WebConfig,
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub grid: GridConfig,
    #[serde(default)]
    pub orbit_classes: OrbitClassifier,
    #[serde(default)]
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    pub groups: Vec<CatalogGroup>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GridConfig {
    #[serde(default)]
    pub cadence_minutes: Cadence,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Directory for the persisted snapshot. Without one the snapshot only
    /// survives as long as the process.
    #[serde(default)]
    pub snapshot_dir: Option<PathBuf>,
    #[serde(default = "default_snapshot_key")]
    pub snapshot_key: String,
    #[serde(default)]
    pub sweep_concurrency: Option<usize>,
    #[serde(
        default = "default_sweep_timeout",
        deserialize_with = "deserialize_duration"
    )]
    pub sweep_timeout: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            snapshot_dir: None,
            snapshot_key: default_snapshot_key(),
            sweep_concurrency: None,
            sweep_timeout: default_sweep_timeout(),
        }
    }
}

fn default_snapshot_key() -> String {
    DEFAULT_SNAPSHOT_KEY.to_string()
}

fn default_sweep_timeout() -> Duration {
    Duration::from_secs(10 * 60)
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    humantime::parse_duration(s.trim()).map_err(serde::de::Error::custom)
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.catalog.groups.is_empty() {
            return Err(ConfigError::Invalid(
                "catalog.groups must list at least one group".into(),
            ));
        }
        self.orbit_classes
            .validate()
            .map_err(ConfigError::Invalid)?;
        if self.cache.snapshot_key.trim().is_empty() {
            return Err(ConfigError::Invalid("cache.snapshot_key is empty".into()));
        }
        if self.cache.sweep_concurrency == Some(0) {
            return Err(ConfigError::Invalid(
                "cache.sweep_concurrency must be at least 1".into(),
            ));
        }
        if self.cache.sweep_timeout.is_zero() {
            return Err(ConfigError::Invalid(
                "cache.sweep_timeout must be positive".into(),
            ));
        }
        Ok(())
    }

    pub fn cache_settings(&self) -> CacheSettings {
        let defaults = CacheSettings::default();
        CacheSettings {
            cadence: self.grid.cadence_minutes,
            classifier: self.orbit_classes,
            sweep_concurrency: self
                .cache
                .sweep_concurrency
                .unwrap_or(defaults.sweep_concurrency),
            sweep_timeout: self.cache.sweep_timeout,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predict::ObjectKind;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = Config::from_yaml(
            r#"
catalog:
  groups:
    - label: Active
      path: /var/lib/groundtrack/active.json
"#,
        )
        .unwrap();

        assert_eq!(config.web.bind, "0.0.0.0:8080");
        assert_eq!(config.grid.cadence_minutes.minutes(), 10);
        assert_eq!(config.cache.snapshot_key, DEFAULT_SNAPSHOT_KEY);
        assert!(config.cache.snapshot_dir.is_none());

        let settings = config.cache_settings();
        assert_eq!(settings.sweep_timeout, Duration::from_secs(600));
        assert!(settings.sweep_concurrency >= 1);
    }

    #[test]
    fn test_full_config() {
        let config = Config::from_yaml(
            r#"
web:
  bind: 127.0.0.1:9000
catalog:
  groups:
    - label: Active
      path: feeds/active
    - label: Debris (Cosmos 1408)
      path: feeds/cosmos-1408-debris.json
      kind: DEBRIS
grid:
  cadence_minutes: 30
orbit_classes:
  leo_max_km: 1800
cache:
  snapshot_dir: /tmp/groundtrack
  snapshot_key: today.json
  sweep_concurrency: 4
  sweep_timeout: 90s
"#,
        )
        .unwrap();

        assert_eq!(config.catalog.groups[1].kind, Some(ObjectKind::Debris));
        let settings = config.cache_settings();
        assert_eq!(settings.cadence.samples_per_day(), 48);
        assert_eq!(settings.classifier.leo_max_km, 1800.0);
        assert_eq!(settings.sweep_concurrency, 4);
        assert_eq!(settings.sweep_timeout, Duration::from_secs(90));
    }

    #[test]
    fn test_invalid_configs_are_rejected() {
        let cases = [
            "catalog:\n  groups: []\n",
            "catalog:\n  groups: [{label: a, path: a}]\ngrid:\n  cadence_minutes: 7\n",
            "catalog:\n  groups: [{label: a, path: a}]\ncache:\n  sweep_timeout: soon\n",
            "catalog:\n  groups: [{label: a, path: a}]\ncache:\n  sweep_concurrency: 0\n",
            "catalog:\n  groups: [{label: a, path: a}]\norbit_classes:\n  leo_max_km: 50000\n",
        ];
        for yaml in cases {
            assert!(Config::from_yaml(yaml).is_err(), "accepted: {yaml}");
        }
    }
}
