//! `AudioSessionEngine`: at most one live playback session.
//!
//! A session is a speech clip played at full volume over an optional looping
//! music bed. The bed fades in under the voice, swells once the voice has
//! finished, holds, then fades out before everything is released.
//!
//! ```text
//!   play_session ──► Loading ──► Playing ──(did_just_finish)──► Finishing ──► Stopped
//!                                  │  ▲
//!                           pause  ▼  │ resume
//!                                Paused
//! ```
//!
//! # Exit paths
//!
//! Every way out of a session goes through one teardown routine: stop, then
//! unload, each handle; delete the speech file; cancel the ramp and the
//! session's background tasks.
//!
//! | Exit | Completion callback |
//! |---|---|
//! | Natural finish (after the fade-out) | fired |
//! | [`stop_all`](AudioSessionEngine::stop_all) / [`shutdown`](AudioSessionEngine::shutdown) | fired, if it has not fired yet |
//! | Setup failure | fired |
//! | Superseded by a new `play_session` | **not** fired |
//! | Engine dropped | not fired |
//!
//! # Concurrency
//!
//! Session state sits behind a short-lived `std::sync::Mutex` that is never
//! held across an await. `play_session` calls are serialized against each
//! other; `stop_all`, `pause` and `resume` may interleave with a setup in
//! flight, so every setup step re-checks that its session is still the
//! current one and releases what it just acquired if not.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use herald_core::{Atmosphere, TrackLibrary};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::backend::{AudioBackend, LoadOptions, PlaybackStatus, SoundHandle};
use crate::config::EngineConfig;
use crate::error::AudioError;
use crate::fade::{FadeScheduler, VolumeRamp};
use crate::payload::SpeechPayload;
use crate::session::{
    CompletionCallback, ProgressCallback, Session, SessionStatus, release_handle,
};

/// Why a session setup stopped early.
enum SetupError {
    /// The session was stopped or replaced while it was being set up.
    Superseded,
    Failed(AudioError),
}

impl From<AudioError> for SetupError {
    fn from(e: AudioError) -> Self {
        Self::Failed(e)
    }
}

struct EngineState {
    next_id: u64,
    session: Option<Session>,
    /// Reported by `status()` when no session is live.
    resting: SessionStatus,
}

struct EngineInner {
    backend: Arc<dyn AudioBackend>,
    tracks: TrackLibrary,
    config: EngineConfig,
    fader: FadeScheduler,
    state: Mutex<EngineState>,
    /// Serializes `play_session` calls.
    setup: tokio::sync::Mutex<()>,
}

/// Orchestrates speech-over-music playback sessions.
///
/// Construct one per playback surface and keep it for the app's lifetime.
pub struct AudioSessionEngine {
    inner: Arc<EngineInner>,
}

impl AudioSessionEngine {
    /// Create an engine over `backend`. Music for each atmosphere is resolved
    /// through `tracks`.
    pub fn new(
        backend: Arc<dyn AudioBackend>,
        tracks: TrackLibrary,
        config: EngineConfig,
    ) -> Result<Self, AudioError> {
        config.validate()?;
        let fader = FadeScheduler::new(config.fade_step);

        Ok(Self {
            inner: Arc::new(EngineInner {
                backend,
                tracks,
                config,
                fader,
                state: Mutex::new(EngineState {
                    next_id: 0,
                    session: None,
                    resting: SessionStatus::Idle,
                }),
                setup: tokio::sync::Mutex::new(()),
            }),
        })
    }

    /// Apply the configured output mode (silent-mode playback, background,
    /// ducking). Idempotent; `play_session` also applies it before each session.
    pub async fn init(&self) -> Result<(), AudioError> {
        self.inner
            .backend
            .configure_output(self.inner.config.output)
            .await
    }

    /// Start a session, tearing down any previous one first.
    ///
    /// Never fails. If setup goes wrong the partial session is released and
    /// `on_complete` runs, so "playback ended" is a single signal for callers.
    /// A superseded session's `on_complete` is dropped without running.
    pub async fn play_session<F>(
        &self,
        audio_base64: &str,
        atmosphere: Atmosphere,
        on_complete: F,
        on_progress: Option<ProgressCallback>,
    ) where
        F: FnOnce() + Send + 'static,
    {
        let inner = &self.inner;
        let _serialized = inner.setup.lock().await;

        if inner.teardown(None).await.is_some() {
            debug!("Previous session superseded");
        }

        let id = inner.begin(Box::new(on_complete), on_progress);
        info!(session = id, %atmosphere, "Session starting");

        match inner.start(id, audio_base64, atmosphere).await {
            Ok(()) => {}
            Err(SetupError::Superseded) => {
                debug!(session = id, "Session stopped during setup");
            }
            Err(SetupError::Failed(e)) => {
                warn!(session = id, error = %e, "Session setup failed");
                if let Some(on_complete) = inner.teardown(Some(id)).await {
                    on_complete();
                }
            }
        }
    }

    /// Pause speech and music in place. No-op unless a session is playing.
    pub async fn pause(&self) {
        let Some(handles) = self
            .inner
            .transition(SessionStatus::Playing, SessionStatus::Paused)
        else {
            return;
        };
        debug!("Session paused");
        for handle in handles.into_iter().flatten() {
            if let Err(e) = self.inner.backend.pause(handle).await {
                debug!(%handle, error = %e, "Pause failed");
            }
        }
    }

    /// Resume a paused session from the retained positions. No-op otherwise.
    pub async fn resume(&self) {
        let Some(handles) = self
            .inner
            .transition(SessionStatus::Paused, SessionStatus::Playing)
        else {
            return;
        };
        debug!("Session resumed");
        for handle in handles.into_iter().flatten() {
            if let Err(e) = self.inner.backend.play(handle).await {
                debug!(%handle, error = %e, "Resume failed");
            }
        }
    }

    /// Tear down the current session, if any, and run its completion
    /// callback if that has not happened yet. Safe to call at any time.
    pub async fn stop_all(&self) {
        if let Some(on_complete) = self.inner.teardown(None).await {
            info!("Session stopped");
            on_complete();
        }
    }

    /// Release everything before the engine goes away.
    pub async fn shutdown(&self) {
        self.stop_all().await;
    }

    /// True from the moment the speech clip is loaded until teardown.
    #[must_use]
    pub fn has_active_session(&self) -> bool {
        self.inner
            .lock()
            .session
            .as_ref()
            .is_some_and(|s| s.status.is_live() && s.speech.is_some())
    }

    #[must_use]
    pub fn status(&self) -> SessionStatus {
        let state = self.inner.lock();
        state
            .session
            .as_ref()
            .map_or(state.resting, |s| s.status)
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.inner.config
    }
}

impl Drop for AudioSessionEngine {
    fn drop(&mut self) {
        self.inner.fader.cancel();
        let Some(session) = self.inner.lock().session.take() else {
            return;
        };
        session.token.cancel();

        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                let backend = Arc::clone(&self.inner.backend);
                runtime.spawn(async move {
                    // Dropped with the engine: the callback is not run.
                    let _unfired = session.release(backend.as_ref()).await;
                });
            }
            Err(_) => {
                warn!("Engine dropped outside a runtime; clips left to the backend");
            }
        }
    }
}

// ── Session plumbing ───────────────────────────────────────────────

impl EngineInner {
    fn lock(&self) -> MutexGuard<'_, EngineState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn begin(&self, on_complete: CompletionCallback, progress: Option<ProgressCallback>) -> u64 {
        let mut state = self.lock();
        state.next_id += 1;
        let id = state.next_id;
        state.session = Some(Session::new(id, on_complete, progress));
        id
    }

    /// Run `f` on session `id` if it is still the current one.
    fn with_session<R>(&self, id: u64, f: impl FnOnce(&mut Session) -> R) -> Result<R, SetupError> {
        let mut state = self.lock();
        match state.session.as_mut() {
            Some(session) if session.id == id => Ok(f(session)),
            _ => Err(SetupError::Superseded),
        }
    }

    /// Record a freshly loaded handle on session `id`, or release it if the
    /// session is gone.
    async fn adopt(
        &self,
        id: u64,
        handle: SoundHandle,
        label: &'static str,
        slot: impl FnOnce(&mut Session) -> &mut Option<SoundHandle>,
    ) -> Result<(), SetupError> {
        if self.with_session(id, |s| *slot(s) = Some(handle)).is_ok() {
            return Ok(());
        }
        release_handle(self.backend.as_ref(), Some(handle), label).await;
        Err(SetupError::Superseded)
    }

    fn transition(
        &self,
        from: SessionStatus,
        to: SessionStatus,
    ) -> Option<[Option<SoundHandle>; 2]> {
        let mut state = self.lock();
        let session = state.session.as_mut().filter(|s| s.status == from)?;
        session.status = to;
        Some([session.speech, session.music])
    }

    fn progress_sink(&self, id: u64) -> Option<ProgressCallback> {
        self.with_session(id, |s| s.progress.clone()).ok().flatten()
    }

    /// The single release path. With `only`, tears down that session and
    /// nothing else.
    async fn teardown(&self, only: Option<u64>) -> Option<CompletionCallback> {
        let session = {
            let mut state = self.lock();
            let current = state.session.as_ref()?.id;
            if only.is_some_and(|id| id != current) {
                return None;
            }
            state.resting = SessionStatus::Stopped;
            state.session.take()?
        };

        self.fader.cancel();
        session.release(self.backend.as_ref()).await
    }

    // ── Setup ──────────────────────────────────────────────────────

    async fn start(
        self: &Arc<Self>,
        id: u64,
        audio_base64: &str,
        atmosphere: Atmosphere,
    ) -> Result<(), SetupError> {
        self.backend.configure_output(self.config.output).await?;

        let payload = SpeechPayload::stage(audio_base64, self.config.scratch_dir.as_deref())?;
        let speech_path = payload.path().to_path_buf();
        self.with_session(id, |s| s.payload = Some(payload))?;

        let speech = self.backend.load(&speech_path, LoadOptions::speech()).await?;
        self.adopt(id, speech, "speech", |s| &mut s.speech).await?;

        let music = match self.tracks.resolve(atmosphere) {
            Some(path) => {
                let music = self.backend.load(path, LoadOptions::music_bed()).await?;
                self.adopt(id, music, "music", |s| &mut s.music).await?;
                Some(music)
            }
            None => {
                if atmosphere.has_music() {
                    warn!(%atmosphere, "No track registered for atmosphere; playing voice only");
                }
                None
            }
        };

        let (status_tx, status_rx) = mpsc::unbounded_channel();
        self.backend.on_status_update(
            speech,
            Box::new(move |status| {
                let _ = status_tx.send(status);
            }),
        )?;

        self.backend.play(speech).await?;
        if let Some(music) = music {
            self.backend.play(music).await?;
        }
        let token = self.with_session(id, |s| {
            s.status = SessionStatus::Playing;
            s.token.clone()
        })?;

        if let Some(music) = music {
            let fade_in = VolumeRamp::new(
                0.0,
                self.config.background_volume,
                self.config.fade_in,
                self.config.fade_step,
            );
            // Not awaited: the fade-in runs under the voice.
            drop(self.fader.start(Arc::clone(&self.backend), music, fade_in));
        }

        info!(session = id, %speech, music = ?music, "Session playing");
        tokio::spawn(Arc::clone(self).watch_speech(id, status_rx, token));
        Ok(())
    }

    // ── Playback ───────────────────────────────────────────────────

    /// Forward speech progress and start the finishing sequence when the
    /// voice ends. Exits when the session is torn down.
    async fn watch_speech(
        self: Arc<Self>,
        id: u64,
        mut updates: mpsc::UnboundedReceiver<PlaybackStatus>,
        token: CancellationToken,
    ) {
        loop {
            let status = tokio::select! {
                biased;
                () = token.cancelled() => return,
                update = updates.recv() => match update {
                    Some(status) => status,
                    None => return,
                },
            };
            if !status.is_loaded {
                continue;
            }

            if let Some(duration) = status.duration_millis().filter(|d| *d > 0) {
                if let Some(progress) = self.progress_sink(id) {
                    progress(status.position_millis(), duration);
                }
            }

            if status.did_just_finish {
                self.finish(id, &token).await;
                return;
            }
        }
    }

    /// Swell, hold and fade out the music bed, then release the session and
    /// fire its completion callback. Abandons quietly if the session is
    /// torn down between (or during) steps.
    async fn finish(&self, id: u64, token: &CancellationToken) {
        let Ok(music) = self.with_session(id, |s| {
            s.status = SessionStatus::Finishing;
            s.music
        }) else {
            return;
        };
        info!(
            session = id,
            has_music = music.is_some(),
            tail = ?self.config.post_speech_tail(music.is_some()),
            "Speech finished"
        );

        if let Some(music) = music {
            let config = &self.config;

            let swell = VolumeRamp::new(
                config.background_volume,
                config.swell_volume,
                config.swell,
                config.fade_step,
            );
            self.fader
                .start(Arc::clone(&self.backend), music, swell)
                .finished()
                .await;
            if token.is_cancelled() {
                return;
            }

            debug!(session = id, hold = ?config.hold, "Holding swell");
            tokio::select! {
                biased;
                () = token.cancelled() => return,
                () = tokio::time::sleep(config.hold) => {}
            }

            let fade_out =
                VolumeRamp::new(config.swell_volume, 0.0, config.fade_out, config.fade_step);
            self.fader
                .start(Arc::clone(&self.backend), music, fade_out)
                .finished()
                .await;
            if token.is_cancelled() {
                return;
            }
        }

        if let Some(on_complete) = self.teardown(Some(id)).await {
            info!(session = id, "Session complete");
            on_complete();
        }
    }
}
