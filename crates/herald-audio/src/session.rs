//! The live playback session and the resource release discipline shared by
//! every exit path.

use std::sync::Arc;

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::backend::{AudioBackend, SoundHandle};
use crate::payload::SpeechPayload;

/// Invoked once when a session ends (natural finish, stop or setup failure).
pub type CompletionCallback = Box<dyn FnOnce() + Send + 'static>;

/// Invoked with `(position_ms, duration_ms)` on every speech status tick.
pub type ProgressCallback = Arc<dyn Fn(u64, u64) + Send + Sync + 'static>;

/// Where the engine's session currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    /// No session has been started yet.
    Idle,
    /// Writing the payload and loading clips.
    Loading,
    /// Speech (and music, if any) playing.
    Playing,
    /// Paused in place, positions retained.
    Paused,
    /// Speech finished; swell, hold and fade-out running.
    Finishing,
    /// Torn down. All resources released.
    Stopped,
}

impl SessionStatus {
    /// Whether the session is still holding resources.
    #[must_use]
    pub const fn is_live(self) -> bool {
        matches!(
            self,
            Self::Loading | Self::Playing | Self::Paused | Self::Finishing
        )
    }
}

pub(crate) struct Session {
    pub(crate) id: u64,
    pub(crate) status: SessionStatus,
    pub(crate) speech: Option<SoundHandle>,
    pub(crate) music: Option<SoundHandle>,
    pub(crate) payload: Option<SpeechPayload>,
    pub(crate) progress: Option<ProgressCallback>,
    pub(crate) on_complete: Option<CompletionCallback>,
    /// Cancelled on teardown; observed by the watcher and finishing sequence.
    pub(crate) token: CancellationToken,
}

impl Session {
    pub(crate) fn new(
        id: u64,
        on_complete: CompletionCallback,
        progress: Option<ProgressCallback>,
    ) -> Self {
        Self {
            id,
            status: SessionStatus::Loading,
            speech: None,
            music: None,
            payload: None,
            progress,
            on_complete: Some(on_complete),
            token: CancellationToken::new(),
        }
    }

    /// Release everything this session holds. Returns the completion
    /// callback if it has not fired yet; the caller decides whether to run it.
    pub(crate) async fn release(
        mut self,
        backend: &dyn AudioBackend,
    ) -> Option<CompletionCallback> {
        self.token.cancel();
        self.progress = None;

        release_handle(backend, self.speech.take(), "speech").await;
        release_handle(backend, self.music.take(), "music").await;
        if let Some(payload) = self.payload.take() {
            payload.release();
        }

        debug!(session = self.id, "Session released");
        self.on_complete.take()
    }
}

/// Stop, then unload. Each step runs even if the other fails; failures
/// mean the clip is already gone and are only logged.
pub(crate) async fn release_handle(
    backend: &dyn AudioBackend,
    handle: Option<SoundHandle>,
    label: &'static str,
) {
    let Some(handle) = handle else {
        return;
    };
    if let Err(e) = backend.stop(handle).await {
        debug!(%handle, clip = label, error = %e, "Stop failed during release");
    }
    if let Err(e) = backend.unload(handle).await {
        debug!(%handle, clip = label, error = %e, "Unload failed during release");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn live_statuses() {
        assert!(!SessionStatus::Idle.is_live());
        assert!(SessionStatus::Loading.is_live());
        assert!(SessionStatus::Paused.is_live());
        assert!(SessionStatus::Finishing.is_live());
        assert!(!SessionStatus::Stopped.is_live());
    }

    #[test]
    fn status_serializes_lowercase() {
        let json = serde_json::to_string(&SessionStatus::Finishing).unwrap();
        assert_eq!(json, "\"finishing\"");
    }
}
