//! CLI-specific error types and mappings.
//!
//! Maps `CoreError` and `AudioError` to exit codes and user-facing messages.

use herald_audio::AudioError;
use herald_core::CoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    /// Core domain error.
    #[error("{0}")]
    Core(String),

    /// Invalid argument value.
    #[error("Invalid arguments: {0}")]
    Arguments(String),

    /// IO error (speech file missing, unreadable settings).
    #[error("IO error: {0}")]
    Io(String),

    /// Settings storage error.
    #[error("Settings error: {0}")]
    Settings(String),

    /// Audio output could not be opened or the session never started.
    #[error("Playback error: {0}")]
    Playback(String),
}

impl CliError {
    /// Map error to an exit code (sysexits.h where one fits).
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Core(_) => 1,
            Self::Arguments(_) => 2,
            Self::Io(_) => 74,       // EX_IOERR
            Self::Settings(_) => 78, // EX_CONFIG
            Self::Playback(_) => 69, // EX_UNAVAILABLE
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Repository(e) => Self::Settings(e.to_string()),
            CoreError::Settings(e) => Self::Arguments(e.to_string()),
            CoreError::Validation(msg) => Self::Arguments(msg),
            CoreError::Generation(e) => Self::Core(e.friendly_message().to_string()),
        }
    }
}

impl From<AudioError> for CliError {
    fn from(err: AudioError) -> Self {
        match err {
            AudioError::Io(e) => Self::Io(e.to_string()),
            other => Self::Playback(other.to_string()),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}
