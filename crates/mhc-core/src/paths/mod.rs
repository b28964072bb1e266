//! Path utilities for the client's local data.
//!
//! The only thing persisted on disk is the settings file, so resolution is
//! short:
//! 1. `MHC_DATA_DIR` environment variable (highest priority)
//! 2. System data directory (e.g. `~/.local/share/mhc`)

mod error;

#[cfg(test)]
mod test_utils;

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub use error::PathError;

/// Environment variable that overrides the data directory.
pub const DATA_DIR_ENV: &str = "MHC_DATA_DIR";

/// File name of the persisted settings inside the data root.
pub const SETTINGS_FILE_NAME: &str = "settings.json";

/// Root directory for client data, created if missing.
pub fn data_root() -> Result<PathBuf, PathError> {
    let root = match env::var(DATA_DIR_ENV) {
        Ok(path) if path.trim().is_empty() => return Err(PathError::EmptyPath),
        Ok(path) => PathBuf::from(path.trim()),
        Err(_) => dirs::data_local_dir()
            .ok_or(PathError::NoDataDir)?
            .join("mhc"),
    };

    ensure_dir(&root)?;
    Ok(root)
}

/// Location of the settings JSON file.
pub fn settings_path() -> Result<PathBuf, PathError> {
    Ok(data_root()?.join(SETTINGS_FILE_NAME))
}

fn ensure_dir(path: &Path) -> Result<(), PathError> {
    if path.exists() {
        if !path.is_dir() {
            return Err(PathError::NotADirectory(path.to_path_buf()));
        }
        return Ok(());
    }
    fs::create_dir_all(path).map_err(|e| PathError::CreateFailed {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}
