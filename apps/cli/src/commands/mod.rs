//! Command implementations for the Beacon CLI.

pub mod models;
pub mod predict;
pub mod seed;
pub mod status;
pub mod train;

use anyhow::{Context, Result};
use beacon_scoring::{FsModelRegistry, PipelineContext, ScoringConfig};
use beacon_store::MemoryStore;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Flags shared by every command.
#[derive(Debug, Clone)]
pub struct GlobalArgs {
    pub config: Option<PathBuf>,
    pub model_dir: Option<PathBuf>,
}

impl GlobalArgs {
    /// Defaults, then the config file, then environment, then flags.
    pub fn scoring_config(&self) -> Result<ScoringConfig> {
        let mut config =
            ScoringConfig::discover(self.config.as_deref()).context("Failed to load configuration")?;
        if let Some(dir) = &self.model_dir {
            config.model_dir.clone_from(dir);
        }
        Ok(config)
    }

    pub fn registry(&self, config: &ScoringConfig) -> FsModelRegistry {
        FsModelRegistry::at(config.model_dir.clone())
    }

    pub fn pipeline(&self, data: &Path) -> Result<PipelineContext> {
        let config = self.scoring_config()?;
        let store = MemoryStore::open(data)
            .with_context(|| format!("Failed to open entity snapshot {}", data.display()))?;
        let registry = self.registry(&config);
        Ok(PipelineContext::new(Arc::new(store), Arc::new(registry), config))
    }
}
