//! Settings repository trait definition.

use async_trait::async_trait;

use super::RepositoryError;
use crate::settings::Settings;

/// Repository for user settings persistence.
///
/// # Design Rules
///
/// - Works with the domain `Settings` type directly
/// - Implementation handles serialization internally
#[async_trait]
pub trait SettingsRepository: Send + Sync {
    /// Load settings.
    ///
    /// Returns default settings if none are stored.
    async fn load(&self) -> Result<Settings, RepositoryError>;

    /// Save settings.
    async fn save(&self, settings: &Settings) -> Result<(), RepositoryError>;
}
