//! Pipeline configuration.
//!
//! Precedence: defaults, then a TOML file, then `BEACON_*` environment
//! variables. Callers apply their own flags last.

use crate::error::{ScoringError, ScoringResult};
use crate::layout::ModelLayout;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CONFIG_FILE: &str = "beacon.toml";
pub const ENV_MODEL_DIR: &str = "BEACON_MODEL_DIR";
pub const ENV_SEED: &str = "BEACON_SEED";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScoringConfig {
    /// Root directory of the artifact registry.
    pub model_dir: PathBuf,

    /// Base seed; each model kind derives its own from it.
    pub seed: u64,

    /// Entities fetched per store page while assembling training sets.
    pub page_size: usize,

    /// Optional wall-clock budget for one training run.
    pub training_deadline_secs: Option<u64>,

    /// Reference time for recency features. `None` means now.
    pub as_of: Option<DateTime<Utc>>,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            model_dir: ModelLayout::for_workspace_root(Path::new(".")).root().to_path_buf(),
            seed: 42,
            page_size: 500,
            training_deadline_secs: None,
            as_of: None,
        }
    }
}

impl ScoringConfig {
    pub fn load_from_file(path: &Path) -> ScoringResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ScoringError::Config(format!("{}: {e}", path.display())))?;
        let config: Self =
            toml::from_str(&content).map_err(|e| ScoringError::Config(format!("{}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    /// Load `explicit` if given (it must exist), otherwise `./beacon.toml` when
    /// present, otherwise defaults. Environment overrides are applied on top.
    pub fn discover(explicit: Option<&Path>) -> ScoringResult<Self> {
        let mut config = match explicit {
            Some(path) => Self::load_from_file(path)?,
            None => {
                let local = Path::new(DEFAULT_CONFIG_FILE);
                if local.is_file() { Self::load_from_file(local)? } else { Self::default() }
            }
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply `BEACON_*` overrides read through `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> ScoringResult<()> {
        if let Some(dir) = lookup(ENV_MODEL_DIR).filter(|v| !v.is_empty()) {
            self.model_dir = PathBuf::from(dir);
        }
        if let Some(seed) = lookup(ENV_SEED).filter(|v| !v.is_empty()) {
            self.seed = seed
                .trim()
                .parse()
                .map_err(|e| ScoringError::Config(format!("{ENV_SEED}={seed}: {e}")))?;
        }
        Ok(())
    }

    pub fn validate(&self) -> ScoringResult<()> {
        if self.page_size == 0 {
            return Err(ScoringError::Config("page_size must be >= 1".to_string()));
        }
        if self.training_deadline_secs == Some(0) {
            return Err(ScoringError::Config("training_deadline_secs must be >= 1".to_string()));
        }
        Ok(())
    }

    pub fn as_of_or_now(&self) -> DateTime<Utc> {
        self.as_of.unwrap_or_else(Utc::now)
    }

    pub fn training_deadline(&self) -> Option<Duration> {
        self.training_deadline_secs.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = ScoringConfig::default();
        assert_eq!(config.seed, 42);
        assert_eq!(config.page_size, 500);
        assert!(config.model_dir.ends_with(".beacon/models"));
        assert!(config.training_deadline().is_none());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("beacon.toml");
        std::fs::write(&path, "seed = 7\nas_of = \"2024-06-01T00:00:00Z\"\n").unwrap();

        let config = ScoringConfig::load_from_file(&path).unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.page_size, 500);
        assert_eq!(config.as_of.unwrap().to_rfc3339(), "2024-06-01T00:00:00+00:00");
    }

    #[test]
    fn test_rejects_bad_values() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("beacon.toml");

        std::fs::write(&path, "page_size = 0\n").unwrap();
        assert!(matches!(ScoringConfig::load_from_file(&path), Err(ScoringError::Config(_))));

        std::fs::write(&path, "unknown_key = 1\n").unwrap();
        assert!(matches!(ScoringConfig::load_from_file(&path), Err(ScoringError::Config(_))));
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        assert!(ScoringConfig::discover(Some(&temp.path().join("nope.toml"))).is_err());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([(ENV_MODEL_DIR, "/srv/models"), (ENV_SEED, "1234")]);
        let mut config = ScoringConfig::default();
        config.apply_env(|k| env.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(config.model_dir, PathBuf::from("/srv/models"));
        assert_eq!(config.seed, 1234);

        let bad: HashMap<&str, &str> = HashMap::from([(ENV_SEED, "forty-two")]);
        assert!(config.apply_env(|k| bad.get(k).map(|v| v.to_string())).is_err());
    }
}
