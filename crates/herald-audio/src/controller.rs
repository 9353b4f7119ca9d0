//! Playback controller for a UI surface: the selected atmosphere plus a
//! play/stop toggle over one [`AudioSessionEngine`].
//!
//! The `playing` flag is raised on [`play`](PlaybackController::play) and
//! lowered by the session's completion callback or by
//! [`stop`](PlaybackController::stop). A superseded session never lowers it,
//! so replaying while playing keeps the flag up for the new session.

use std::sync::{Arc, Mutex, PoisonError};

use herald_core::Atmosphere;
use tokio::sync::watch;

use crate::engine::AudioSessionEngine;
use crate::session::ProgressCallback;

pub struct PlaybackController {
    engine: AudioSessionEngine,
    atmosphere: Mutex<Atmosphere>,
    playing: Arc<watch::Sender<bool>>,
}

impl PlaybackController {
    #[must_use]
    pub fn new(engine: AudioSessionEngine, atmosphere: Atmosphere) -> Self {
        let (playing, _) = watch::channel(false);
        Self {
            engine,
            atmosphere: Mutex::new(atmosphere),
            playing: Arc::new(playing),
        }
    }

    /// Play a declaration over the selected atmosphere.
    pub async fn play(&self, audio_base64: &str) {
        self.play_with_progress(audio_base64, None).await;
    }

    pub async fn play_with_progress(
        &self,
        audio_base64: &str,
        on_progress: Option<ProgressCallback>,
    ) {
        self.playing.send_replace(true);
        let playing = Arc::clone(&self.playing);
        self.engine
            .play_session(
                audio_base64,
                self.atmosphere(),
                move || {
                    playing.send_replace(false);
                },
                on_progress,
            )
            .await;
    }

    pub async fn stop(&self) {
        self.engine.stop_all().await;
        self.playing.send_replace(false);
    }

    /// Stop if playing, otherwise play `audio_base64` when there is one.
    /// Returns whether playback is running afterwards.
    pub async fn toggle_playback(&self, audio_base64: Option<&str>) -> bool {
        if self.is_playing() {
            self.stop().await;
        } else if let Some(audio) = audio_base64 {
            self.play(audio).await;
        }
        self.is_playing()
    }

    /// Select the next atmosphere (`glory → … → selah → none → glory`).
    pub fn cycle_atmosphere(&self) -> Atmosphere {
        let mut atmosphere = self.lock_atmosphere();
        *atmosphere = atmosphere.next();
        *atmosphere
    }

    /// Applies to the next session, not the current one.
    pub fn set_atmosphere(&self, atmosphere: Atmosphere) {
        *self.lock_atmosphere() = atmosphere;
    }

    #[must_use]
    pub fn atmosphere(&self) -> Atmosphere {
        *self.lock_atmosphere()
    }

    #[must_use]
    pub fn is_playing(&self) -> bool {
        *self.playing.borrow()
    }

    /// Watch the playing flag, e.g. to wait for a session to end.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.playing.subscribe()
    }

    #[must_use]
    pub const fn engine(&self) -> &AudioSessionEngine {
        &self.engine
    }

    fn lock_atmosphere(&self) -> std::sync::MutexGuard<'_, Atmosphere> {
        self.atmosphere.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
