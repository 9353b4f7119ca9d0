//! Listener settings: read, partial update, reset.

use std::sync::Arc;

use tracing::debug;

use crate::ports::{CoreError, SettingsRepository};
use crate::settings::{Settings, SettingsUpdate, validate_settings};

/// Loads, validates and persists [`Settings`] through a [`SettingsRepository`].
pub struct SettingsService {
    repo: Arc<dyn SettingsRepository>,
}

impl SettingsService {
    pub fn new(repo: Arc<dyn SettingsRepository>) -> Self {
        Self { repo }
    }

    pub async fn get(&self) -> Result<Settings, CoreError> {
        Ok(self.repo.load().await?)
    }

    /// Merge `update` over the stored settings. Nothing is written if the
    /// merged result does not validate.
    pub async fn update(&self, update: SettingsUpdate) -> Result<Settings, CoreError> {
        let mut settings = self.repo.load().await?;
        settings.merge(&update);
        validate_settings(&settings)?;
        self.repo.save(&settings).await?;
        debug!(atmosphere = %settings.default_atmosphere, "Settings updated");
        Ok(settings)
    }

    /// Restore the defaults. Personalisation is cleared, but a listener who
    /// finished onboarding is not sent through it again.
    pub async fn reset(&self) -> Result<Settings, CoreError> {
        let onboarding_complete = self.repo.load().await?.onboarding_complete;
        let settings = Settings {
            onboarding_complete,
            ..Settings::default()
        };
        self.repo.save(&settings).await?;
        debug!(onboarding_complete, "Settings reset");
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Atmosphere;
    use crate::declaration::Gender;
    use crate::ports::RepositoryError;
    use crate::settings::SettingsError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct MockSettingsRepo {
        settings: Mutex<Settings>,
    }

    impl MockSettingsRepo {
        fn new() -> Self {
            Self {
                settings: Mutex::new(Settings::default()),
            }
        }
    }

    #[async_trait]
    impl SettingsRepository for MockSettingsRepo {
        async fn load(&self) -> Result<Settings, RepositoryError> {
            Ok(self.settings.lock().unwrap().clone())
        }

        async fn save(&self, settings: &Settings) -> Result<(), RepositoryError> {
            *self.settings.lock().unwrap() = settings.clone();
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_update_settings() {
        let repo = Arc::new(MockSettingsRepo::new());
        let service = SettingsService::new(repo);

        let update = SettingsUpdate {
            default_atmosphere: Some(Atmosphere::Peace),
            ..Default::default()
        };

        let updated = service.update(update).await.unwrap();
        assert_eq!(updated.default_atmosphere, Atmosphere::Peace);

        // Verify persisted
        let fetched = service.get().await.unwrap();
        assert_eq!(fetched.default_atmosphere, Atmosphere::Peace);
    }

    #[tokio::test]
    async fn test_invalid_update_is_not_persisted() {
        let repo = Arc::new(MockSettingsRepo::new());
        let service = SettingsService::new(repo);

        let update = SettingsUpdate {
            notification_time: Some("25:00".into()),
            ..Default::default()
        };
        let err = service.update(update).await.unwrap_err();
        assert!(matches!(
            err,
            CoreError::Settings(SettingsError::InvalidNotificationTime(_))
        ));

        let fetched = service.get().await.unwrap();
        assert_eq!(fetched.notification_time, "08:00");
    }

    #[tokio::test]
    async fn test_reset_keeps_onboarding() {
        let repo = Arc::new(MockSettingsRepo::new());
        let service = SettingsService::new(repo);

        let update = SettingsUpdate {
            default_atmosphere: Some(Atmosphere::Selah),
            gender: Some(Some(Gender::Male)),
            onboarding_complete: Some(true),
            ..Default::default()
        };
        service.update(update).await.unwrap();

        let reset = service.reset().await.unwrap();
        assert_eq!(reset.default_atmosphere, Atmosphere::Glory);
        assert_eq!(reset.gender, None);
        assert!(reset.onboarding_complete);
        assert_eq!(service.get().await.unwrap(), reset);
    }

    #[tokio::test]
    async fn test_reset_before_onboarding_is_defaults() {
        let repo = Arc::new(MockSettingsRepo::new());
        let service = SettingsService::new(repo);

        assert_eq!(service.reset().await.unwrap(), Settings::default());
    }
}
