//! `AudioBackend` trait: the platform audio primitive the engine drives.
//!
//! The engine never touches an audio library directly. It talks to an
//! implementation of this trait over opaque [`SoundHandle`]s:
//!
//! | Implementor | Where used |
//! |---|---|
//! | [`RodioBackend`](crate::rodio_backend::RodioBackend) | Desktop and CLI: rodio sinks on a dedicated audio thread |
//! | `RecordingBackend` (`tests/common`) | Integration tests: records every call, status ticks driven by hand |
//!
//! The trait is **object-safe** (`Arc<dyn AudioBackend>`). All methods take
//! `&self`; implementations use interior mutability or message passing.

use std::fmt;
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::AudioError;

/// Opaque reference to a loaded, playable clip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SoundHandle(u64);

impl SoundHandle {
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SoundHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sound#{}", self.0)
    }
}

/// Initial state of a clip when it is loaded. Clips are always loaded unstarted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoadOptions {
    /// Initial volume, `0.0..=1.0`.
    pub volume: f32,
    /// Restart from the beginning when the end is reached.
    pub looping: bool,
}

impl LoadOptions {
    /// One-shot speech clip at full volume.
    #[must_use]
    pub const fn speech() -> Self {
        Self {
            volume: 1.0,
            looping: false,
        }
    }

    /// Looping music bed, muted until faded in.
    #[must_use]
    pub const fn music_bed() -> Self {
        Self {
            volume: 0.0,
            looping: true,
        }
    }
}

/// Snapshot of a clip's playback, delivered on every backend status tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlaybackStatus {
    pub is_loaded: bool,
    pub is_playing: bool,
    pub position: Duration,
    /// Total length, when the container reports one.
    pub duration: Option<Duration>,
    /// Set on exactly one tick: the one where a non-looping clip reached its end.
    pub did_just_finish: bool,
}

impl PlaybackStatus {
    #[must_use]
    pub fn position_millis(&self) -> u64 {
        duration_millis(self.position)
    }

    #[must_use]
    pub fn duration_millis(&self) -> Option<u64> {
        self.duration.map(duration_millis)
    }
}

fn duration_millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

/// Listener for [`PlaybackStatus`] ticks.
///
/// Invoked from whatever thread drives the backend, so it must be cheap and
/// non-blocking (the engine forwards into a channel).
pub type StatusCallback = Box<dyn Fn(PlaybackStatus) + Send + Sync + 'static>;

/// Output behaviour requested by `AudioSessionEngine::init`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputMode {
    /// Keep playing when the device ringer is muted.
    pub plays_in_silent_mode: bool,
    /// Keep playing when the app is backgrounded.
    pub stays_active_in_background: bool,
    /// Lower other apps' audio while a session plays.
    pub duck_others: bool,
}

impl Default for OutputMode {
    fn default() -> Self {
        Self {
            plays_in_silent_mode: true,
            stays_active_in_background: true,
            duck_others: true,
        }
    }
}

/// Abstraction over the platform's clip playback primitive.
#[async_trait]
pub trait AudioBackend: Send + Sync {
    /// Apply the output mode. Must be idempotent.
    ///
    /// Platforms without such a notion keep the default no-op.
    async fn configure_output(&self, _mode: OutputMode) -> Result<(), AudioError> {
        Ok(())
    }

    /// Load a clip from a local path, unstarted.
    async fn load(&self, path: &Path, options: LoadOptions) -> Result<SoundHandle, AudioError>;

    /// Start or resume playback from the retained position.
    async fn play(&self, handle: SoundHandle) -> Result<(), AudioError>;

    /// Pause in place (position retained).
    async fn pause(&self, handle: SoundHandle) -> Result<(), AudioError>;

    /// Stop playback. A stopped clip never reports `did_just_finish`.
    async fn stop(&self, handle: SoundHandle) -> Result<(), AudioError>;

    /// Release the clip. The handle is invalid afterwards and its status
    /// listener is dropped.
    async fn unload(&self, handle: SoundHandle) -> Result<(), AudioError>;

    /// Set the clip volume, `0.0..=1.0`.
    async fn set_volume(&self, handle: SoundHandle, volume: f32) -> Result<(), AudioError>;

    /// Register the status listener for `handle`, replacing any previous one.
    fn on_status_update(
        &self,
        handle: SoundHandle,
        callback: StatusCallback,
    ) -> Result<(), AudioError>;
}
