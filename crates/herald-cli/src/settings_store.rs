//! JSON file adapter for [`SettingsRepository`].

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use herald_core::{RepositoryError, Settings, SettingsRepository};

use crate::error::CliError;

const APP_DIR: &str = "herald";
const SETTINGS_FILE: &str = "settings.json";

/// `<config dir>/herald/settings.json`.
pub fn default_settings_path() -> Result<PathBuf, CliError> {
    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR).join(SETTINGS_FILE))
        .ok_or_else(|| CliError::Settings("cannot determine config directory".into()))
}

/// `<data dir>/herald/tracks`.
pub fn default_tracks_dir() -> Result<PathBuf, CliError> {
    dirs::data_dir()
        .map(|dir| dir.join(APP_DIR).join("tracks"))
        .ok_or_else(|| CliError::Settings("cannot determine data directory".into()))
}

/// Settings stored as pretty-printed JSON. A missing file reads as defaults.
pub struct JsonFileSettingsRepository {
    path: PathBuf,
}

impl JsonFileSettingsRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SettingsRepository for JsonFileSettingsRepository {
    async fn load(&self) -> Result<Settings, RepositoryError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(json) => serde_json::from_str(&json)
                .map_err(|e| RepositoryError::Serialization(e.to_string())),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Settings::default()),
            Err(e) => Err(RepositoryError::Storage(format!(
                "{}: {e}",
                self.path.display()
            ))),
        }
    }

    async fn save(&self, settings: &Settings) -> Result<(), RepositoryError> {
        let json = serde_json::to_string_pretty(settings)
            .map_err(|e| RepositoryError::Serialization(e.to_string()))?;
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| RepositoryError::Storage(e.to_string()))?;
        }
        tokio::fs::write(&self.path, json)
            .await
            .map_err(|e| RepositoryError::Storage(e.to_string()))?;
        tracing::debug!(path = %self.path.display(), "Settings saved");
        Ok(())
    }
}
