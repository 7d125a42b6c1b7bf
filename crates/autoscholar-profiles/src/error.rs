//! Error types for autoscholar-profiles

use autoscholar_store::StoreError;
use thiserror::Error;

/// Result type alias for profile store operations
pub type Result<T> = std::result::Result<T, ProfileError>;

/// Main error type for profile store operations
#[derive(Error, Debug)]
pub enum ProfileError {
    /// The active-profile pointer names no stored profile.
    ///
    /// Persisted state was altered outside this store; callers should offer
    /// a reset rather than keep operating on it.
    #[error("Profile store integrity violation: active profile {active_id:?} is not stored")]
    IntegrityViolation { active_id: Option<String> },

    /// The document holds no profiles, so nothing is active
    #[error("No active profile: the profile store is empty")]
    NoActiveProfile,

    /// Writing the document to the backend failed
    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    /// Encoding the document failed
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration could not be loaded
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

impl ProfileError {
    /// Whether the error means persisted state is inconsistent.
    pub fn is_integrity_violation(&self) -> bool {
        matches!(self, ProfileError::IntegrityViolation { .. })
    }
}

impl From<serde_json::Error> for ProfileError {
    fn from(err: serde_json::Error) -> Self {
        ProfileError::Serialization(err.to_string())
    }
}

/// Configuration loading errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("TOML parse error: {0}")]
    Parse(String),

    #[error("Invalid value for {field}: {reason}")]
    Invalid { field: String, reason: String },
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::Io(err.to_string())
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::Parse(err.to_string())
    }
}
