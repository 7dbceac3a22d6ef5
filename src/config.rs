use crate::progression::BattlePolicy;
use crate::query::DEFAULT_PAGE_SIZE;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable naming the RON config file
pub const CONFIG_ENV: &str = "POKEMON_OWNERSHIP_CONFIG";
/// Environment variable carrying the authenticated owner id for the MCP host
pub const OWNER_ENV: &str = "POKEMON_OWNERSHIP_OWNER";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed config {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },
    #[error("default_page_size must be at least 1")]
    ZeroPageSize,
}

/// Runtime configuration, read from a RON file such as
///
/// ```ron
/// (
///     catalog_path: "data/catalog.ron",
///     snapshot_path: Some("ownership.bin"),
///     default_page_size: 20,
///     battle: (
///         health_lost: (min: 10, max: 30),
///         experience_reward: (min: 50, max: 100),
///     ),
///     log_filter: "info",
/// )
/// ```
///
/// Every field may be left out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub catalog_path: PathBuf,
    pub snapshot_path: Option<PathBuf>,
    pub default_page_size: u32,
    pub battle: BattlePolicy,
    pub log_filter: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            catalog_path: PathBuf::from("data/catalog.ron"),
            snapshot_path: None,
            default_page_size: DEFAULT_PAGE_SIZE,
            battle: BattlePolicy::default(),
            log_filter: "info".to_string(),
        }
    }
}

impl EngineConfig {
    pub fn from_ron_str(content: &str, origin: &Path) -> Result<Self, ConfigError> {
        let config: Self = ron::from_str(content).map_err(|e| ConfigError::Parse {
            path: origin.to_path_buf(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ron_str(&content, path)
    }

    /// Load the file named by `POKEMON_OWNERSHIP_CONFIG`, or the defaults when unset
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::load(Path::new(&path)),
            None => Ok(Self::default()),
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.default_page_size == 0 {
            return Err(ConfigError::ZeroPageSize);
        }
        Ok(())
    }
}

/// The authenticated owner id supplied by the environment, if any
pub fn owner_from_env() -> Option<String> {
    std::env::var(OWNER_ENV)
        .ok()
        .map(|owner| owner.trim().to_string())
        .filter(|owner| !owner.is_empty())
}
