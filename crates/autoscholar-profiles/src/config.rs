//! Configuration for the profile store
//!
//! Loaded from TOML; every key is optional:
//!
//! ```toml
//! storage_key = "autoscolar_profiles_v1"
//! max_history = 200
//! max_authors = 10
//! default_profile_name = "New User"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Storage key the document has always lived under.
pub const DEFAULT_STORAGE_KEY: &str = "autoscolar_profiles_v1";

/// Upper bound on search history entries per profile.
pub const DEFAULT_MAX_HISTORY: usize = 200;

/// Upper bound on author names kept per saved paper.
pub const DEFAULT_MAX_AUTHORS: usize = 10;

/// Name given to profiles created without one.
pub const DEFAULT_PROFILE_NAME: &str = "New User";

/// Profile store settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileStoreConfig {
    /// Key the document is persisted under
    pub storage_key: String,
    /// Maximum search history entries kept per profile
    pub max_history: usize,
    /// Maximum author names projected onto a saved paper
    pub max_authors: usize,
    /// Name for freshly bootstrapped or created profiles
    pub default_profile_name: String,
}

impl Default for ProfileStoreConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            max_history: DEFAULT_MAX_HISTORY,
            max_authors: DEFAULT_MAX_AUTHORS,
            default_profile_name: DEFAULT_PROFILE_NAME.to_string(),
        }
    }
}

impl ProfileStoreConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from an explicit path.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Load from `<config_dir>/autoscholar/profiles.toml`, falling back to
    /// defaults when the file is missing or unreadable.
    pub fn load_standard() -> Self {
        let Some(path) = Self::standard_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        Self::load(&path).unwrap_or_else(|e| {
            tracing::warn!("Failed to load config from {:?}: {}, using defaults", path, e);
            Self::default()
        })
    }

    /// Standard config file location, if the platform has a config dir.
    pub fn standard_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("autoscholar").join("profiles.toml"))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.storage_key.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "storage_key".into(),
                reason: "must not be empty".into(),
            });
        }
        if self.max_history == 0 {
            return Err(ConfigError::Invalid {
                field: "max_history".into(),
                reason: "must be at least 1".into(),
            });
        }
        Ok(())
    }
}
