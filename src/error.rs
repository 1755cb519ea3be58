//! Fatal failures of a migration run.
//!
//! Per-card problems never show up here: a failed enrichment leaves the card
//! without comments or attachments, and a card that cannot be created is
//! quarantined in [`crate::import::ImportReport`].
use std::path::PathBuf;
use thiserror::Error;

use crate::config::ConfigError;

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("no Trello board matches '{0}'")]
    BoardNotFound(String),
    #[error("failed to read board from Trello: {0:#}")]
    Extraction(anyhow::Error),
    #[error("failed to search Notion databases: {0:#}")]
    DatabaseSearch(anyhow::Error),
    #[error("unable to find Notion database titled '{0}' to import to")]
    DatabaseNotFound(String),
    #[error("failed to add properties to Notion database '{database}': {cause:#}")]
    Schema {
        database: String,
        cause: anyhow::Error,
    },
    #[error("failed to write or read save file {}: {source}", .path.display())]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("save file {} is not a valid card list: {source}", .path.display())]
    SaveFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T, E = MigrationError> = std::result::Result<T, E>;
