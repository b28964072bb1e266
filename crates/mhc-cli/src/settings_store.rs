//! JSON file implementation of the settings repository.
//!
//! Settings live in a single pretty-printed JSON document. Writes go to a
//! sibling temp file first and are renamed into place, so a crash never
//! leaves a half-written file behind.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use mhc_core::{RepositoryError, Settings, SettingsRepository};
use tokio::fs;

/// Settings stored as `settings.json` in the client's data directory.
#[derive(Debug, Clone)]
pub struct JsonSettingsStore {
    path: PathBuf,
}

impl JsonSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(std::ffi::OsStr::to_os_string)
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

fn storage(err: &std::io::Error, path: &Path) -> RepositoryError {
    RepositoryError::Storage(format!("{}: {err}", path.display()))
}

#[async_trait]
impl SettingsRepository for JsonSettingsStore {
    async fn load(&self) -> Result<Settings, RepositoryError> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "No settings file, using defaults");
                return Ok(Settings::with_defaults());
            }
            Err(e) => return Err(storage(&e, &self.path)),
        };

        serde_json::from_slice(&bytes)
            .map_err(|e| RepositoryError::Serialization(format!("{}: {e}", self.path.display())))
    }

    async fn save(&self, settings: &Settings) -> Result<(), RepositoryError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| storage(&e, parent))?;
        }

        let json = serde_json::to_vec_pretty(settings)
            .map_err(|e| RepositoryError::Serialization(e.to_string()))?;

        let temp = self.temp_path();
        fs::write(&temp, json).await.map_err(|e| storage(&e, &temp))?;
        fs::rename(&temp, &self.path)
            .await
            .map_err(|e| storage(&e, &self.path))?;

        tracing::debug!(path = %self.path.display(), "Settings saved");
        Ok(())
    }
}
