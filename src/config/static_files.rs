//! Static asset configuration

use serde::Deserialize;
use std::path::{Path, PathBuf};

use super::error::ValidationError;

/// Where keyboard pages are served from
#[derive(Debug, Clone, Deserialize)]
pub struct StaticFilesConfig {
    #[serde(default = "default_root")]
    pub root: PathBuf,
}

impl StaticFilesConfig {
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Checked at startup; the root must be an existing directory.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.root.is_dir() {
            return Err(ValidationError::StaticRootMissing(
                self.root.display().to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for StaticFilesConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
        }
    }
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_root_is_cwd() {
        let config = StaticFilesConfig::default();
        assert_eq!(config.root(), Path::new("."));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_root_rejected() {
        let config = StaticFilesConfig {
            root: PathBuf::from("/definitely/not/here"),
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::StaticRootMissing(_))
        ));
    }
}
