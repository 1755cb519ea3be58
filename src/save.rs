//! Save files: JSON arrays of cards under `<data_dir>/<subfolder>/`.
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;

use crate::error::{MigrationError, Result};
use crate::model::Item;

/// Subfolder for full board exports.
pub const EXPORTS_DIR: &str = "exports";
/// Subfolder for cards that could not be imported.
pub const ERRORS_DIR: &str = "errors";

pub fn timestamp(now: DateTime<Local>) -> String {
    now.format("%Y-%m-%d-%H-%M-%S").to_string()
}

/// Write `items` to a new timestamped file and return its path.
pub async fn save_items(root: &Path, subfolder: &str, items: &[Item]) -> Result<PathBuf> {
    let folder = root.join(subfolder);
    fs::create_dir_all(&folder)
        .await
        .map_err(|source| MigrationError::Persist {
            path: folder.clone(),
            source,
        })?;

    let stamp = timestamp(Local::now());
    let mut path = folder.join(format!("{}.json", stamp));
    let mut n = 1;
    while taken(&path).await? {
        path = folder.join(format!("{}-{}.json", stamp, n));
        n += 1;
    }

    let data = serde_json::to_vec_pretty(items).map_err(|source| MigrationError::SaveFormat {
        path: path.clone(),
        source,
    })?;
    fs::write(&path, data)
        .await
        .map_err(|source| MigrationError::Persist {
            path: path.clone(),
            source,
        })?;

    info!(path = %path.display(), cards = items.len(), "saved cards");
    Ok(path)
}

async fn taken(path: &Path) -> Result<bool> {
    fs::try_exists(path)
        .await
        .map_err(|source| MigrationError::Persist {
            path: path.to_path_buf(),
            source,
        })
}

pub async fn load_items(path: &Path) -> Result<Vec<Item>> {
    info!(path = %path.display(), "loading cards from save");
    let data = fs::read(path)
        .await
        .map_err(|source| MigrationError::Persist {
            path: path.to_path_buf(),
            source,
        })?;
    serde_json::from_slice(&data).map_err(|source| MigrationError::SaveFormat {
        path: path.to_path_buf(),
        source,
    })
}
