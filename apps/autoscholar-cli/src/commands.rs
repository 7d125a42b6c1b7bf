//! Subcommands and their execution against a profile store

use autoscholar_profiles::{ProfileError, ProfilePatch, ProfileStore};
use autoscholar_store::{KeyValueStore, StoreError};
use clap::Subcommand;
use serde_json::{json, Value};

/// Errors surfaced to the terminal
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    Profile(#[from] ProfileError),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unknown profile: {0}")]
    UnknownProfile(String),
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Show the active profile
    Show,
    /// List all profiles
    Profiles,
    /// Create a profile and make it active
    Create {
        #[arg(long)]
        id: Option<String>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        institution: Option<String>,
    },
    /// Make a profile active
    Switch { id: String },
    /// Update fields of a profile (created if missing)
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        institution: Option<String>,
        #[arg(long)]
        bio: Option<String>,
        /// Replace interests; repeat for several
        #[arg(long = "interest")]
        interests: Vec<String>,
    },
    /// Delete a profile
    Delete { id: String },
    /// Toggle a paper given as JSON in the saved list
    Save { paper: String },
    /// List saved papers
    Saved,
    /// Check whether a paper id is saved
    IsSaved { id: String },
    /// Record a search query
    Search { query: String },
    /// List search history
    History,
    /// Clear search history
    ClearHistory,
    /// Clear saved papers
    ClearSaved,
    /// Remove all stored profile data
    Reset,
}

/// Run one command, returning its JSON output.
pub fn execute<S: KeyValueStore>(
    store: &ProfileStore<S>,
    command: Command,
) -> Result<Value, CliError> {
    let output = match command {
        Command::Show => json!(store.active_profile()?),
        Command::Profiles => {
            let doc = store.try_read()?;
            let profiles: Vec<Value> = doc
                .profiles
                .values()
                .map(|p| json!({"id": p.id, "name": p.name}))
                .collect();
            json!({
                "activeProfileId": doc.active_profile_id,
                "profiles": profiles,
            })
        }
        Command::Create {
            id,
            name,
            email,
            institution,
        } => {
            let patch = ProfilePatch {
                id,
                name,
                email,
                institution,
                ..ProfilePatch::default()
            };
            json!(store.create_profile(patch)?)
        }
        Command::Switch { id } => {
            if !store.set_active_profile(&id)? {
                return Err(CliError::UnknownProfile(id));
            }
            json!(store.active_profile()?)
        }
        Command::Update {
            id,
            name,
            email,
            institution,
            bio,
            interests,
        } => {
            let patch = ProfilePatch {
                id: Some(id.clone()),
                name,
                email,
                institution,
                bio,
                interests: (!interests.is_empty()).then_some(interests),
                ..ProfilePatch::default()
            };
            store.update_profile(patch)?;
            json!(store.profiles().get(&id))
        }
        Command::Delete { id } => {
            if !store.delete_profile(&id)? {
                return Err(CliError::UnknownProfile(id));
            }
            json!({"deleted": id, "activeProfileId": store.try_read()?.active_profile_id})
        }
        Command::Save { paper } => {
            let paper: Value = serde_json::from_str(&paper)?;
            json!({"saved": store.toggle_saved_paper(&paper)?})
        }
        Command::Saved => json!(store.saved_papers()?),
        Command::IsSaved { id } => json!({"id": id, "saved": store.is_paper_saved(&id)?}),
        Command::Search { query } => json!({"recorded": store.add_search_history(&query)?}),
        Command::History => json!(store.search_history()?),
        Command::ClearHistory => {
            store.clear_search_history()?;
            json!({"cleared": "history"})
        }
        Command::ClearSaved => {
            store.clear_saved_papers()?;
            json!({"cleared": "saved"})
        }
        Command::Reset => {
            store.backend().remove(&store.config().storage_key)?;
            json!({"reset": true})
        }
    };
    Ok(output)
}
