//! Audio engine error types.
//!
//! None of these cross the [`AudioSessionEngine`](crate::AudioSessionEngine)
//! session API: setup failures are funneled into the completion callback and
//! mid-playback handle failures are swallowed. They are visible on the
//! [`AudioBackend`](crate::AudioBackend) trait, on `init`, and on configuration.

use std::path::PathBuf;

use crate::backend::SoundHandle;

/// Errors that can occur while driving audio output.
#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    /// Failed to open the audio output stream.
    #[error("Failed to open audio output stream: {0}")]
    OutputStreamError(String),

    /// The dedicated audio thread is gone.
    #[error("Audio thread died unexpectedly")]
    AudioThreadDied,

    /// The speech payload is not valid base64.
    #[error("Speech payload is not valid base64: {0}")]
    InvalidPayload(#[from] base64::DecodeError),

    /// The speech payload decoded to zero bytes.
    #[error("Speech payload is empty")]
    EmptyPayload,

    /// A clip could not be opened or decoded.
    #[error("Failed to load clip {path}: {reason}")]
    LoadFailed { path: PathBuf, reason: String },

    /// The handle was never loaded or has already been released.
    #[error("Unknown or released sound handle {0}")]
    UnknownHandle(SoundHandle),

    /// Engine configuration rejected by validation.
    #[error("Invalid engine configuration: {0}")]
    InvalidConfig(String),

    /// IO error (transient speech file).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
