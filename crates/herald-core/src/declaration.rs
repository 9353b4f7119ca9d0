//! Declaration domain types.
//!
//! A declaration is the generated spoken-word text whose synthesized audio
//! becomes the speech track of a playback session.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Topic a declaration is generated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum DeclarationCategory {
    #[serde(rename = "Health & Healing")]
    Health,
    #[serde(rename = "Wealth & Prosperity")]
    Wealth,
    #[serde(rename = "Identity")]
    Identity,
    #[serde(rename = "Success & Victory")]
    Success,
    #[serde(rename = "Protection & Fearlessness")]
    Protection,
    #[serde(rename = "Wisdom & Guidance")]
    Wisdom,
    #[serde(rename = "Marriage & Family")]
    Marriage,
    #[serde(rename = "Favor & Open Doors")]
    Favor,
    #[serde(rename = "Peace & Rest")]
    Peace,
    #[serde(rename = "Children & Fruitfulness")]
    Children,
    #[default]
    #[serde(rename = "General")]
    General,
}

impl DeclarationCategory {
    pub const ALL: [Self; 11] = [
        Self::Health,
        Self::Wealth,
        Self::Identity,
        Self::Success,
        Self::Protection,
        Self::Wisdom,
        Self::Marriage,
        Self::Favor,
        Self::Peace,
        Self::Children,
        Self::General,
    ];

    /// Display name, identical to the wire value.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Health => "Health & Healing",
            Self::Wealth => "Wealth & Prosperity",
            Self::Identity => "Identity",
            Self::Success => "Success & Victory",
            Self::Protection => "Protection & Fearlessness",
            Self::Wisdom => "Wisdom & Guidance",
            Self::Marriage => "Marriage & Family",
            Self::Favor => "Favor & Open Doors",
            Self::Peace => "Peace & Rest",
            Self::Children => "Children & Fruitfulness",
            Self::General => "General",
        }
    }
}

impl fmt::Display for DeclarationCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Voice used by the speech synthesizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum VoiceGender {
    Male,
    #[default]
    Female,
}

/// Optional personalisation: the listener's gender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

/// Optional personalisation: the listener's marital status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaritalStatus {
    Single,
    Married,
}

/// Input to the declaration generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeclarationRequest {
    pub category: DeclarationCategory,
    /// Free-form mood prompt (e.g. "I feel afraid and anxious").
    pub mood: String,
    /// User-written text to expand instead of a mood prompt.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_text: Option<String>,
    pub gender: Option<Gender>,
    pub marital_status: Option<MaritalStatus>,
}

impl DeclarationRequest {
    pub fn new(category: DeclarationCategory, mood: impl Into<String>) -> Self {
        Self {
            category,
            mood: mood.into(),
            custom_text: None,
            gender: None,
            marital_status: None,
        }
    }

    /// Whether the request carries any prompt at all.
    #[must_use]
    pub fn has_prompt(&self) -> bool {
        !self.mood.trim().is_empty()
            || self
                .custom_text
                .as_deref()
                .is_some_and(|t| !t.trim().is_empty())
    }
}

/// Text content returned by the generation service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedDeclaration {
    pub text: String,
    /// Scripture reference, e.g. "Isaiah 41:10".
    pub reference: String,
    pub scripture_text: String,
}

/// A declaration ready for playback.
///
/// `audio_base64` is `None` when synthesis was unavailable; callers then show
/// the text without starting a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreparedDeclaration {
    pub category: DeclarationCategory,
    pub text: String,
    pub reference: String,
    pub scripture_text: String,
    pub audio_base64: Option<String>,
}

impl PreparedDeclaration {
    #[must_use]
    pub const fn has_audio(&self) -> bool {
        self.audio_base64.is_some()
    }
}
