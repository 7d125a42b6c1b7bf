//! Client-side profile store for AutoScholar
//!
//! Keeps every local user profile in a single JSON document under one key
//! of a host key-value store:
//! - Document: all profiles plus the active-profile pointer
//! - Profile: identity fields, interests, saved papers, search history
//! - SavedPaperRecord: normalized projection of an external paper
//! - Migration: one-time upgrade of legacy single-profile data
//!
//! Operations live on [`ProfileStore`] and always read, mutate and write
//! the whole document.

pub mod config;
pub mod document;
pub mod engine;
pub mod error;
pub mod history;
pub mod lenient;
pub mod migration;
pub mod operations;
pub mod paper;
pub mod profile;

pub use config::*;
pub use document::*;
pub use engine::*;
pub use error::*;
pub use history::*;
pub use migration::{decode, detect_shape, migrate_legacy, Decoded, MigrationError, StoredShape};
pub use paper::*;
pub use profile::*;
