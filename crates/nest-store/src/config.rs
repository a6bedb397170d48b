use std::path::{Path, PathBuf};
use std::{env, fs, io};

use nest_core::{DENSITY, DIMENSIONS, FusionWeights, RECALL_THRESHOLD};
use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};

pub const CONFIG_FILE: &str = "nest.toml";
pub const MEMORY_BANK_DIR: &str = "memory_bank";
pub const DATA_DIR_ENV: &str = "NEST_DATA_DIR";

/// Default base directory for all nest storage.
pub fn default_base_dir() -> PathBuf {
    dirs_home().join(".nest")
}

fn dirs_home() -> PathBuf {
    env::var("HOME")
        .or_else(|_| env::var("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
}

/// Explicit path, then `NEST_DATA_DIR`, then `~/.nest`.
pub fn resolve_data_dir(explicit: Option<&Path>) -> PathBuf {
    let from_env = env::var_os(DATA_DIR_ENV).map(PathBuf::from);
    pick_data_dir(explicit, from_env)
}

fn pick_data_dir(explicit: Option<&Path>, from_env: Option<PathBuf>) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .or_else(|| from_env.filter(|p| !p.as_os_str().is_empty()))
        .unwrap_or_else(default_base_dir)
}

/// Recall defaults applied when a search does not override them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecallConfig {
    pub threshold: f64,
    pub top_k: Option<usize>,
}

impl Default for RecallConfig {
    fn default() -> Self {
        Self {
            threshold: RECALL_THRESHOLD,
            top_k: None,
        }
    }
}

/// Contents of `<data_dir>/nest.toml`. Every field is optional.
///
/// ```toml
/// dimension = 1024
/// density = 0.1
/// scan_limit = 100000
///
/// [weights]
/// content = 1.0
/// emotion = 0.5
///
/// [recall]
/// threshold = 0.1
/// top_k = 5
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NestConfig {
    pub dimension: usize,
    pub density: f64,
    /// Cap on records scored per search; unbounded when absent.
    pub scan_limit: Option<usize>,
    pub weights: FusionWeights,
    pub recall: RecallConfig,
}

impl Default for NestConfig {
    fn default() -> Self {
        Self {
            dimension: DIMENSIONS,
            density: DENSITY,
            scan_limit: None,
            weights: FusionWeights::default(),
            recall: RecallConfig::default(),
        }
    }
}

impl NestConfig {
    /// Read `nest.toml` from `data_dir`. A missing file yields defaults.
    pub fn load(data_dir: &Path) -> Result<Self> {
        let path = data_dir.join(CONFIG_FILE);
        match fs::read_to_string(&path) {
            Ok(raw) => {
                let config = Self::from_toml_str(&raw)?;
                tracing::debug!("loaded config from {}", path.display());
                Ok(config)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(StoreError::io(path)(e)),
        }
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.dimension == 0 {
            return Err(StoreError::InvalidData("dimension must be positive".into()));
        }
        if !(self.density > 0.0 && self.density <= 1.0) {
            return Err(StoreError::InvalidData(format!(
                "density must be in (0, 1], got {}",
                self.density
            )));
        }
        if !self.recall.threshold.is_finite() {
            return Err(StoreError::InvalidData("recall threshold must be finite".into()));
        }
        if !self.weights.content_dominant() {
            tracing::warn!(
                "configured weights let a tag outweigh content ({:?}); tags may dominate recall",
                self.weights
            );
        }
        Ok(())
    }

    /// Directory holding the partitioned records.
    pub fn memory_bank(data_dir: &Path) -> PathBuf {
        data_dir.join(MEMORY_BANK_DIR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_default() {
        let dir = TempDir::new().unwrap();
        let config = NestConfig::load(dir.path()).unwrap();
        assert_eq!(config, NestConfig::default());
        assert_eq!(config.dimension, 1024);
        assert_eq!(config.recall.threshold, 0.1);
    }

    #[test]
    fn test_partial_file() {
        let config = NestConfig::from_toml_str(
            "dimension = 256\n[weights]\nemotion = 0.25\n[recall]\ntop_k = 3\n",
        )
        .unwrap();
        assert_eq!(config.dimension, 256);
        assert_eq!(config.density, DENSITY);
        assert_eq!(config.weights.emotion, 0.25);
        assert_eq!(config.weights.content, 1.0);
        assert_eq!(config.recall.top_k, Some(3));
        assert_eq!(config.recall.threshold, RECALL_THRESHOLD);
        assert_eq!(config.scan_limit, None);
    }

    #[test]
    fn test_load_from_disk() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "scan_limit = 10\n").unwrap();
        let config = NestConfig::load(dir.path()).unwrap();
        assert_eq!(config.scan_limit, Some(10));
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(NestConfig::from_toml_str("dimension = 0").is_err());
        assert!(NestConfig::from_toml_str("density = 0.0").is_err());
        assert!(NestConfig::from_toml_str("density = 1.5").is_err());
        assert!(NestConfig::from_toml_str("density = 1.0").is_ok());
    }

    #[test]
    fn test_malformed_toml_is_config_error() {
        let err = NestConfig::from_toml_str("dimension = [").unwrap_err();
        assert!(matches!(err, StoreError::Config(_)));
    }

    #[test]
    fn test_data_dir_precedence() {
        let explicit = PathBuf::from("/tmp/explicit");
        let from_env = PathBuf::from("/tmp/env");

        assert_eq!(
            pick_data_dir(Some(&explicit), Some(from_env.clone())),
            explicit
        );
        assert_eq!(pick_data_dir(None, Some(from_env.clone())), from_env);
        assert_eq!(pick_data_dir(None, Some(PathBuf::new())), default_base_dir());
        assert!(pick_data_dir(None, None).ends_with(".nest"));
    }

    #[test]
    fn test_memory_bank_path() {
        let bank = NestConfig::memory_bank(Path::new("/data"));
        assert_eq!(bank, PathBuf::from("/data/memory_bank"));
    }
}
