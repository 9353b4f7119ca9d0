//! Declaration service - turns a mood prompt into a playable declaration.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::declaration::{DeclarationCategory, DeclarationRequest, PreparedDeclaration};
use crate::ports::{CoreError, DeclarationGenerator, SettingsRepository};

/// Composes the generation service with the listener's settings.
pub struct DeclarationService {
    generator: Arc<dyn DeclarationGenerator>,
    settings: Arc<dyn SettingsRepository>,
}

impl DeclarationService {
    pub fn new(
        generator: Arc<dyn DeclarationGenerator>,
        settings: Arc<dyn SettingsRepository>,
    ) -> Self {
        Self {
            generator,
            settings,
        }
    }

    /// Generate a declaration and, best-effort, its speech audio.
    ///
    /// Text generation failures are returned. Speech synthesis failures are
    /// logged and yield a declaration without audio, so the text can still be
    /// shown.
    pub async fn prepare(
        &self,
        category: DeclarationCategory,
        mood: &str,
        custom_text: Option<String>,
    ) -> Result<PreparedDeclaration, CoreError> {
        let settings = self.settings.load().await?;

        let request = DeclarationRequest {
            category,
            mood: mood.to_string(),
            custom_text,
            gender: settings.gender,
            marital_status: settings.marital_status,
        };
        if !request.has_prompt() {
            return Err(CoreError::Validation(
                "Mood or custom text is required".to_string(),
            ));
        }

        let generated = self.generator.generate_declaration(&request).await?;
        debug!(%category, reference = %generated.reference, "Declaration generated");

        let audio_base64 = match self
            .generator
            .generate_speech(&generated.text, settings.voice_gender)
            .await
        {
            Ok(audio) => audio,
            Err(e) => {
                warn!(error = %e, "Speech synthesis failed; continuing without audio");
                None
            }
        };

        Ok(PreparedDeclaration {
            category,
            text: generated.text,
            reference: generated.reference,
            scripture_text: generated.scripture_text,
            audio_base64,
        })
    }
}
