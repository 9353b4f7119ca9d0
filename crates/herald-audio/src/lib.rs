#![doc = include_str!(concat!(env!("OUT_DIR"), "/README_GENERATED.md"))]
#![deny(unused_crate_dependencies)]

mod audio_thread;
pub mod backend;
pub mod config;
pub mod controller;
pub mod engine;
pub mod error;
pub mod fade;
pub mod payload;
pub mod rodio_backend;
pub mod session;

// Re-export key types for convenience
pub use backend::{
    AudioBackend, LoadOptions, OutputMode, PlaybackStatus, SoundHandle, StatusCallback,
};
pub use config::EngineConfig;
pub use controller::PlaybackController;
pub use engine::AudioSessionEngine;
pub use error::AudioError;
pub use fade::{FadeOutcome, FadeScheduler, VolumeRamp};
pub use rodio_backend::RodioBackend;
pub use session::{CompletionCallback, ProgressCallback, SessionStatus};
