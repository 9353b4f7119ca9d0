//! Generation service port for declaration text and speech synthesis.
//!
//! The generation service is an external collaborator: given a category and a
//! mood prompt it writes a declaration; given text it returns an encoded
//! audio container (base64). The audio engine never talks to it directly.

use async_trait::async_trait;
use thiserror::Error;

use crate::declaration::{DeclarationRequest, GeneratedDeclaration, VoiceGender};

/// Classified generation failure.
///
/// The `Display` output is the raw cause; [`friendly_message`] yields the copy
/// shown to listeners.
///
/// [`friendly_message`]: GenerationError::friendly_message
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    /// Daily quota exhausted on the free tier.
    #[error("Daily limit reached: {0}")]
    LimitReached(String),

    /// The requested capability requires a subscription.
    #[error("Pro feature: {0}")]
    ProFeature(String),

    /// Network unreachable, timed out, or service unavailable.
    #[error("Offline: {0}")]
    Offline(String),

    /// Service-side failure or capacity problem.
    #[error("Server busy: {0}")]
    ServerBusy(String),

    /// Anything else.
    #[error("Generation failed: {0}")]
    Other(String),
}

impl GenerationError {
    /// Classify a raw transport/service message.
    pub fn classify(message: impl Into<String>) -> Self {
        let message = message.into();
        let lower = message.to_lowercase();
        let has = |needle: &str| lower.contains(needle);

        if has("resource-exhausted") || has("daily limit") {
            Self::LimitReached(message)
        } else if has("permission-denied") || has("pro feature") {
            Self::ProFeature(message)
        } else if has("network") || has("fetch") || has("timeout") || has("unavailable") {
            Self::Offline(message)
        } else if has("internal") || has("500") || has("capacity") {
            Self::ServerBusy(message)
        } else {
            Self::Other(message)
        }
    }

    /// User-facing explanation of the failure.
    #[must_use]
    pub const fn friendly_message(&self) -> &'static str {
        match self {
            Self::LimitReached(_) => {
                "You've reached your daily limit. Upgrade to Pro for unlimited declarations."
            }
            Self::ProFeature(_) => "This is a Pro feature. Upgrade to unlock.",
            Self::Offline(_) => "You appear to be offline. Please check your connection.",
            Self::ServerBusy(_) => "Our servers are busy. Please try again in a moment.",
            Self::Other(_) => "Something went wrong. Please try again.",
        }
    }
}

/// Port trait for the external generation service.
#[async_trait]
pub trait DeclarationGenerator: Send + Sync {
    /// Write a declaration for the request (text and scripture only, no audio).
    async fn generate_declaration(
        &self,
        request: &DeclarationRequest,
    ) -> Result<GeneratedDeclaration, GenerationError>;

    /// Synthesize `text` and return the encoded audio as base64.
    ///
    /// `Ok(None)` means the service answered but had no audio to offer.
    async fn generate_speech(
        &self,
        text: &str,
        voice: VoiceGender,
    ) -> Result<Option<String>, GenerationError>;
}
