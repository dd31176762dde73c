use std::path::{Path, PathBuf};

/// Filesystem layout for model artifacts.
///
/// Default layout is `.beacon/models/<name>.json` under the working directory.
#[derive(Debug, Clone)]
pub struct ModelLayout {
    root: PathBuf,
}

impl ModelLayout {
    #[must_use]
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    #[must_use]
    pub fn for_workspace_root(workspace_root: &Path) -> Self {
        Self::new(workspace_root.join(".beacon").join("models"))
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn artifact_path(&self, name: &str) -> PathBuf {
        self.root.join(format!("{name}.json"))
    }

    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.root)
    }
}

/// Artifact names become file stems, so keep them to a safe alphabet.
pub fn validate_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= 64
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_layout_paths() {
        let temp = TempDir::new().unwrap();
        let layout = ModelLayout::for_workspace_root(temp.path());

        assert!(layout.root().ends_with(".beacon/models"));
        assert_eq!(layout.artifact_path("churn").file_name().unwrap(), "churn.json");
    }

    #[test]
    fn test_name_validation() {
        assert!(validate_name("lead_scoring"));
        assert!(!validate_name(""));
        assert!(!validate_name("../escape"));
        assert!(!validate_name("a b"));
    }
}
