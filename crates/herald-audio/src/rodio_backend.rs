//! [`AudioBackend`] over rodio, for desktop and CLI hosts.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;

use crate::audio_thread::{AudioThreadHandle, DEFAULT_STATUS_INTERVAL};
use crate::backend::{AudioBackend, LoadOptions, OutputMode, SoundHandle, StatusCallback};
use crate::error::AudioError;

/// Plays clips on the default output device.
///
/// Each clip is its own rodio `Sink`, so speech and music mix in the device
/// stream and are paused, stopped and faded independently.
pub struct RodioBackend {
    audio: AudioThreadHandle,
}

impl RodioBackend {
    /// Open the default output device, publishing status every 100 ms.
    pub fn new() -> Result<Self, AudioError> {
        Self::with_status_interval(DEFAULT_STATUS_INTERVAL)
    }

    /// Open the default output device with a custom status tick.
    pub fn with_status_interval(interval: Duration) -> Result<Self, AudioError> {
        Ok(Self {
            audio: AudioThreadHandle::spawn(interval)?,
        })
    }
}

#[async_trait]
impl AudioBackend for RodioBackend {
    async fn configure_output(&self, mode: OutputMode) -> Result<(), AudioError> {
        // Desktop output has no ringer switch or app suspension to opt out of.
        tracing::debug!(?mode, "Output mode requested");
        Ok(())
    }

    async fn load(&self, path: &Path, options: LoadOptions) -> Result<SoundHandle, AudioError> {
        self.audio.load(path, options).await
    }

    async fn play(&self, handle: SoundHandle) -> Result<(), AudioError> {
        self.audio.play(handle).await
    }

    async fn pause(&self, handle: SoundHandle) -> Result<(), AudioError> {
        self.audio.pause(handle).await
    }

    async fn stop(&self, handle: SoundHandle) -> Result<(), AudioError> {
        self.audio.stop(handle).await
    }

    async fn unload(&self, handle: SoundHandle) -> Result<(), AudioError> {
        self.audio.unload(handle).await
    }

    async fn set_volume(&self, handle: SoundHandle, volume: f32) -> Result<(), AudioError> {
        self.audio.set_volume(handle, volume).await
    }

    fn on_status_update(
        &self,
        handle: SoundHandle,
        callback: StatusCallback,
    ) -> Result<(), AudioError> {
        self.audio.subscribe(handle, callback)
    }
}
