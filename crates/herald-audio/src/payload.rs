//! Speech payload staging.
//!
//! Platform players load clips from a path, so the base64 speech payload is
//! decoded into a `speech_*.wav` temp file that lives exactly as long as the
//! session that owns it.

use std::io::Write;
use std::path::Path;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::error::AudioError;

/// A decoded speech payload on disk. Deleted on [`release`](Self::release) or drop.
#[derive(Debug)]
pub struct SpeechPayload {
    file: NamedTempFile,
}

impl SpeechPayload {
    /// Decode `audio_base64` and write it to a fresh temp file in `dir`
    /// (the OS temp dir when `None`).
    pub fn stage(audio_base64: &str, dir: Option<&Path>) -> Result<Self, AudioError> {
        let bytes = STANDARD.decode(audio_base64.trim())?;
        if bytes.is_empty() {
            return Err(AudioError::EmptyPayload);
        }

        let mut builder = tempfile::Builder::new();
        builder.prefix("speech_").suffix(".wav");
        let mut file = match dir {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };
        file.write_all(&bytes)?;
        file.flush()?;

        debug!(path = %file.path().display(), bytes = bytes.len(), "Speech payload staged");
        Ok(Self { file })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Delete the file now. Failure is logged, never returned.
    pub fn release(self) {
        let path = self.file.path().to_path_buf();
        if let Err(e) = self.file.close() {
            warn!(path = %path.display(), error = %e, "Failed to remove speech payload");
        }
    }
}
