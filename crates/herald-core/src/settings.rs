//! Settings domain types and validation.
//!
//! These are pure domain types with no infrastructure dependencies.

use serde::{Deserialize, Serialize};

use crate::atmosphere::Atmosphere;
use crate::declaration::{DeclarationCategory, Gender, MaritalStatus, VoiceGender};

/// Default daily reminder time (24h `HH:MM`).
pub const DEFAULT_NOTIFICATION_TIME: &str = "08:00";

/// User settings.
///
/// Missing fields deserialize to their defaults so stored documents from
/// older versions keep loading.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub notifications_enabled: bool,

    /// Daily reminder time, `HH:MM` (24h).
    pub notification_time: String,

    /// Atmosphere preselected when a declaration is played.
    pub default_atmosphere: Atmosphere,

    pub default_category: DeclarationCategory,

    pub gender: Option<Gender>,

    pub marital_status: Option<MaritalStatus>,

    /// Synthesizer voice.
    pub voice_gender: VoiceGender,

    pub onboarding_complete: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            notifications_enabled: false,
            notification_time: DEFAULT_NOTIFICATION_TIME.to_string(),
            default_atmosphere: Atmosphere::Glory,
            default_category: DeclarationCategory::General,
            gender: None,
            marital_status: None,
            voice_gender: VoiceGender::Female,
            onboarding_complete: false,
        }
    }
}

impl Settings {
    /// Merge a partial update into these settings, only touching fields that are `Some`.
    pub fn merge(&mut self, other: &SettingsUpdate) {
        if let Some(enabled) = other.notifications_enabled {
            self.notifications_enabled = enabled;
        }
        if let Some(ref time) = other.notification_time {
            self.notification_time.clone_from(time);
        }
        if let Some(atmosphere) = other.default_atmosphere {
            self.default_atmosphere = atmosphere;
        }
        if let Some(category) = other.default_category {
            self.default_category = category;
        }
        if let Some(gender) = other.gender {
            self.gender = gender;
        }
        if let Some(status) = other.marital_status {
            self.marital_status = status;
        }
        if let Some(voice) = other.voice_gender {
            self.voice_gender = voice;
        }
        if let Some(done) = other.onboarding_complete {
            self.onboarding_complete = done;
        }
    }
}

/// Partial settings update.
///
/// Nullable fields use `Option<Option<T>>`:
/// - `None` = don't change this field
/// - `Some(None)` = clear the field
/// - `Some(Some(value))` = set the field
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsUpdate {
    pub notifications_enabled: Option<bool>,
    pub notification_time: Option<String>,
    pub default_atmosphere: Option<Atmosphere>,
    pub default_category: Option<DeclarationCategory>,
    pub gender: Option<Option<Gender>>,
    pub marital_status: Option<Option<MaritalStatus>>,
    pub voice_gender: Option<VoiceGender>,
    pub onboarding_complete: Option<bool>,
}

/// Settings validation error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("Notification time must be HH:MM (24h), got '{0}'")]
    InvalidNotificationTime(String),
}

/// Validate settings values.
pub fn validate_settings(settings: &Settings) -> Result<(), SettingsError> {
    if parse_notification_time(&settings.notification_time).is_none() {
        return Err(SettingsError::InvalidNotificationTime(
            settings.notification_time.clone(),
        ));
    }
    Ok(())
}

/// Parse `HH:MM` into `(hour, minute)`.
#[must_use]
pub fn parse_notification_time(value: &str) -> Option<(u8, u8)> {
    let (hour, minute) = value.split_once(':')?;
    if hour.len() != 2 || minute.len() != 2 {
        return None;
    }
    let hour: u8 = hour.parse().ok()?;
    let minute: u8 = minute.parse().ok()?;
    (hour < 24 && minute < 60).then_some((hour, minute))
}
