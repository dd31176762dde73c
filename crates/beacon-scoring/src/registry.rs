//! Named artifact slots with atomic overwrite.

use crate::artifacts::{sha256_bytes, ModelArtifact};
use crate::error::ScoringError;
use crate::layout::{validate_name, ModelLayout};
use serde::Serialize;
use std::collections::HashMap;
use std::io::Write;
use std::path::PathBuf;
use std::sync::{PoisonError, RwLock};
use thiserror::Error;
use tracing::{debug, info};

pub type RegistryResult<T> = std::result::Result<T, RegistryError>;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("no artifact named '{0}'")]
    NotFound(String),

    #[error("artifact '{name}' is unreadable: {reason}")]
    Corrupt { name: String, reason: String },

    #[error("invalid artifact name '{0}'")]
    InvalidName(String),

    #[error("registry lock poisoned")]
    Poisoned,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl<T> From<PoisonError<T>> for RegistryError {
    fn from(_: PoisonError<T>) -> Self {
        Self::Poisoned
    }
}

impl From<RegistryError> for ScoringError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::NotFound(name) => Self::ModelNotFound(name),
            other => Self::Persistence(other.to_string()),
        }
    }
}

/// Where a saved artifact ended up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SavedArtifact {
    pub name: String,
    pub path: PathBuf,
    pub sha256: String,
}

/// One slot per name. `save` replaces whatever was there; a concurrent `load`
/// sees either the old artifact or the new one, never a partial write.
pub trait ModelRegistry: Send + Sync {
    fn save(&self, name: &str, artifact: &ModelArtifact) -> RegistryResult<SavedArtifact>;

    fn load(&self, name: &str) -> RegistryResult<ModelArtifact>;

    fn exists(&self, name: &str) -> bool;

    /// Where `name` lives (or would live) in this registry.
    fn locate(&self, name: &str) -> Option<PathBuf>;
}

fn checked(name: &str) -> RegistryResult<&str> {
    if validate_name(name) {
        Ok(name)
    } else {
        Err(RegistryError::InvalidName(name.to_string()))
    }
}

fn decode(name: &str, bytes: &[u8]) -> RegistryResult<ModelArtifact> {
    ModelArtifact::from_json_bytes(bytes).map_err(|reason| RegistryError::Corrupt {
        name: name.to_string(),
        reason,
    })
}

fn encode(name: &str, artifact: &ModelArtifact) -> RegistryResult<Vec<u8>> {
    artifact.to_json_bytes().map_err(|e| RegistryError::Corrupt {
        name: name.to_string(),
        reason: e.to_string(),
    })
}

/// JSON files under a [`ModelLayout`] root.
#[derive(Debug)]
pub struct FsModelRegistry {
    layout: ModelLayout,
    lock: RwLock<()>,
}

impl FsModelRegistry {
    #[must_use]
    pub fn new(layout: ModelLayout) -> Self {
        Self { layout, lock: RwLock::new(()) }
    }

    pub fn at(root: impl Into<PathBuf>) -> Self {
        Self::new(ModelLayout::new(root.into()))
    }

    pub fn layout(&self) -> &ModelLayout {
        &self.layout
    }
}

impl ModelRegistry for FsModelRegistry {
    fn save(&self, name: &str, artifact: &ModelArtifact) -> RegistryResult<SavedArtifact> {
        let name = checked(name)?;
        let bytes = encode(name, artifact)?;
        let path = self.layout.artifact_path(name);

        let _guard = self.lock.write()?;
        self.layout.ensure_dirs()?;
        // Same directory as the target so the rename stays on one filesystem.
        let mut tmp = tempfile::NamedTempFile::new_in(self.layout.root())?;
        tmp.write_all(&bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path).map_err(|e| RegistryError::Io(e.error))?;

        let sha256 = sha256_bytes(&bytes);
        info!(name, path = %path.display(), sha256 = %sha256, "Saved model artifact");
        Ok(SavedArtifact { name: name.to_string(), path, sha256 })
    }

    fn load(&self, name: &str) -> RegistryResult<ModelArtifact> {
        let name = checked(name)?;
        let path = self.layout.artifact_path(name);

        let bytes = {
            let _guard = self.lock.read()?;
            match std::fs::read(&path) {
                Ok(bytes) => bytes,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    return Err(RegistryError::NotFound(name.to_string()));
                }
                Err(e) => return Err(e.into()),
            }
        };
        debug!(name, bytes = bytes.len(), "Loaded model artifact");
        decode(name, &bytes)
    }

    fn exists(&self, name: &str) -> bool {
        validate_name(name) && self.layout.artifact_path(name).is_file()
    }

    fn locate(&self, name: &str) -> Option<PathBuf> {
        validate_name(name).then(|| self.layout.artifact_path(name))
    }
}

/// Keeps serialized artifacts in memory. Loads still go through decoding, so a
/// loaded artifact never aliases the one that was saved.
#[derive(Debug, Default)]
pub struct MemoryModelRegistry {
    slots: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryModelRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ModelRegistry for MemoryModelRegistry {
    fn save(&self, name: &str, artifact: &ModelArtifact) -> RegistryResult<SavedArtifact> {
        let name = checked(name)?;
        let bytes = encode(name, artifact)?;
        let sha256 = sha256_bytes(&bytes);
        self.slots.write()?.insert(name.to_string(), bytes);
        Ok(SavedArtifact {
            name: name.to_string(),
            path: PathBuf::from(format!("memory://{name}")),
            sha256,
        })
    }

    fn load(&self, name: &str) -> RegistryResult<ModelArtifact> {
        let name = checked(name)?;
        let slots = self.slots.read()?;
        let bytes = slots.get(name).ok_or_else(|| RegistryError::NotFound(name.to_string()))?;
        decode(name, bytes)
    }

    fn exists(&self, name: &str) -> bool {
        self.slots.read().map(|s| s.contains_key(name)).unwrap_or(false)
    }

    fn locate(&self, name: &str) -> Option<PathBuf> {
        self.exists(name).then(|| PathBuf::from(format!("memory://{name}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_artifact_is_not_found() {
        let temp = TempDir::new().unwrap();
        let registry = FsModelRegistry::at(temp.path());

        assert!(!registry.exists("churn"));
        assert!(matches!(registry.load("churn"), Err(RegistryError::NotFound(n)) if n == "churn"));
        assert!(matches!(MemoryModelRegistry::new().load("churn"), Err(RegistryError::NotFound(_))));
    }

    #[test]
    fn test_corrupt_file_is_reported() {
        let temp = TempDir::new().unwrap();
        let registry = FsModelRegistry::at(temp.path());
        std::fs::write(temp.path().join("churn.json"), b"{\"format_version\": 99}").unwrap();

        assert!(registry.exists("churn"));
        assert!(matches!(registry.load("churn"), Err(RegistryError::Corrupt { .. })));
    }

    #[test]
    fn test_rejects_path_like_names() {
        let temp = TempDir::new().unwrap();
        let registry = FsModelRegistry::at(temp.path());
        assert!(matches!(registry.load("../churn"), Err(RegistryError::InvalidName(_))));
        assert!(registry.locate("../churn").is_none());
    }

    #[test]
    fn test_not_found_maps_to_model_not_found() {
        let err: ScoringError = RegistryError::NotFound("engagement".to_string()).into();
        assert!(matches!(err, ScoringError::ModelNotFound(n) if n == "engagement"));
    }
}
