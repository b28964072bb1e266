//! Settings service - orchestrates settings operations.

use std::sync::Arc;

use crate::ports::{CoreError, SettingsRepository};
use crate::settings::{Settings, SettingsUpdate, Theme, validate_settings};

/// Service for settings operations.
pub struct SettingsService {
    repo: Arc<dyn SettingsRepository>,
}

impl SettingsService {
    pub fn new(repo: Arc<dyn SettingsRepository>) -> Self {
        Self { repo }
    }

    /// Get current settings.
    pub async fn get(&self) -> Result<Settings, CoreError> {
        self.repo.load().await.map_err(CoreError::from)
    }

    /// Update settings with partial changes.
    pub async fn update(&self, update: SettingsUpdate) -> Result<Settings, CoreError> {
        let mut current = self.repo.load().await?;
        current.merge(&update);
        validate_settings(&current)?;
        self.repo.save(&current).await?;
        tracing::debug!(?current, "Settings updated");
        Ok(current)
    }

    /// Save complete settings (validates first).
    pub async fn save(&self, settings: &Settings) -> Result<(), CoreError> {
        validate_settings(settings)?;
        self.repo.save(settings).await.map_err(CoreError::from)
    }

    /// Flip the effective theme and persist the result.
    pub async fn toggle_theme(&self, system_prefers_dark: bool) -> Result<Theme, CoreError> {
        let current = self.get().await?;
        let next = current.effective_theme(system_prefers_dark).toggled();
        self.update(SettingsUpdate {
            theme: Some(Some(next)),
            ..Default::default()
        })
        .await?;
        Ok(next)
    }
}
