//! In-memory `AudioBackend` for engine tests.
//!
//! Every call is recorded. Nothing plays: tests move a clip's position and
//! deliver status ticks by hand with [`RecordingBackend::advance`] and
//! [`RecordingBackend::finish`].

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use herald_audio::{
    AudioBackend, AudioError, AudioSessionEngine, EngineConfig, LoadOptions, OutputMode,
    PlaybackStatus, SoundHandle, StatusCallback,
};
use herald_core::TrackLibrary;

pub const TRACKS_DIR: &str = "/bundled/tracks";

/// Length every one-shot clip reports unless overridden.
pub const SPEECH_LENGTH: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    ConfigureOutput,
    Load {
        handle: SoundHandle,
        path: PathBuf,
        looping: bool,
        volume: f32,
    },
    Play(SoundHandle),
    Pause(SoundHandle),
    Stop(SoundHandle),
    Unload(SoundHandle),
    SetVolume(SoundHandle, f32),
}

type Listener = Arc<dyn Fn(PlaybackStatus) + Send + Sync>;

struct Clip {
    looping: bool,
    playing: bool,
    position: Duration,
    duration: Option<Duration>,
    listener: Option<Listener>,
}

struct State {
    next_id: u64,
    clips: HashMap<SoundHandle, Clip>,
    calls: Vec<BackendCall>,
    peak_live: usize,
    speech_length: Option<Duration>,
    failing_loads: Option<String>,
    load_delay: Option<Duration>,
    failing_transport: bool,
}

pub struct RecordingBackend {
    state: Mutex<State>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                next_id: 0,
                clips: HashMap::new(),
                calls: Vec::new(),
                peak_live: 0,
                speech_length: Some(SPEECH_LENGTH),
                failing_loads: None,
                load_delay: None,
                failing_transport: false,
            }),
        }
    }

    /// Length reported for one-shot clips; `None` for a container without one.
    pub fn with_speech_length(self, length: Option<Duration>) -> Self {
        self.state.lock().unwrap().speech_length = length;
        self
    }

    /// Fail every load whose path contains `needle`.
    pub fn failing_loads(self, needle: &str) -> Self {
        self.state.lock().unwrap().failing_loads = Some(needle.to_string());
        self
    }

    /// Suspend every load for `delay` before it completes.
    pub fn with_load_delay(self, delay: Duration) -> Self {
        self.state.lock().unwrap().load_delay = Some(delay);
        self
    }

    /// While set, `pause` and `play` fail even on live handles.
    pub fn fail_transport(&self, failing: bool) {
        self.state.lock().unwrap().failing_transport = failing;
    }

    pub fn calls(&self) -> Vec<BackendCall> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Position of the first call equal to `call`.
    pub fn call_index(&self, call: &BackendCall) -> Option<usize> {
        self.calls().iter().position(|c| c == call)
    }

    pub fn loads(&self) -> Vec<(SoundHandle, PathBuf, bool)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                BackendCall::Load {
                    handle,
                    path,
                    looping,
                    ..
                } => Some((handle, path, looping)),
                _ => None,
            })
            .collect()
    }

    /// Most recently loaded speech clip.
    pub fn speech(&self) -> SoundHandle {
        self.last_load(false).expect("no speech clip loaded")
    }

    /// Most recently loaded music bed.
    pub fn music(&self) -> SoundHandle {
        self.last_load(true).expect("no music bed loaded")
    }

    pub fn last_load(&self, looping: bool) -> Option<SoundHandle> {
        self.loads()
            .into_iter()
            .rev()
            .find(|(_, _, l)| *l == looping)
            .map(|(h, _, _)| h)
    }

    /// Every volume applied to `handle`, in order.
    pub fn volumes(&self, handle: SoundHandle) -> Vec<f32> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                BackendCall::SetVolume(h, v) if h == handle => Some(v),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, call: &BackendCall) -> usize {
        self.calls().iter().filter(|c| *c == call).count()
    }

    pub fn live_handles(&self) -> Vec<SoundHandle> {
        let mut live: Vec<_> = self.state.lock().unwrap().clips.keys().copied().collect();
        live.sort();
        live
    }

    /// Highest number of simultaneously loaded clips seen so far.
    pub fn peak_live(&self) -> usize {
        self.state.lock().unwrap().peak_live
    }

    pub fn position(&self, handle: SoundHandle) -> Option<Duration> {
        self.state.lock().unwrap().clips.get(&handle).map(|c| c.position)
    }

    pub fn is_playing(&self, handle: SoundHandle) -> bool {
        self.state
            .lock()
            .unwrap()
            .clips
            .get(&handle)
            .is_some_and(|c| c.playing)
    }

    /// Move a playing clip forward and deliver one status tick.
    pub fn advance(&self, handle: SoundHandle, by: Duration) {
        let status = {
            let mut state = self.state.lock().unwrap();
            let Some(clip) = state.clips.get_mut(&handle) else {
                return;
            };
            if clip.playing {
                clip.position += by;
                if let Some(total) = clip.duration {
                    clip.position = clip.position.min(total);
                }
            }
            Self::snapshot(clip, false)
        };
        self.emit(handle, status);
    }

    /// Run a one-shot clip to its end and deliver the `did_just_finish` tick.
    pub fn finish(&self, handle: SoundHandle) {
        let status = {
            let mut state = self.state.lock().unwrap();
            let Some(clip) = state.clips.get_mut(&handle) else {
                return;
            };
            clip.playing = false;
            if let Some(total) = clip.duration {
                clip.position = total;
            }
            Self::snapshot(clip, true)
        };
        self.emit(handle, status);
    }

    fn snapshot(clip: &Clip, did_just_finish: bool) -> PlaybackStatus {
        PlaybackStatus {
            is_loaded: true,
            is_playing: clip.playing,
            position: clip.position,
            duration: clip.duration,
            did_just_finish,
        }
    }

    fn emit(&self, handle: SoundHandle, status: PlaybackStatus) {
        let listener = self
            .state
            .lock()
            .unwrap()
            .clips
            .get(&handle)
            .and_then(|c| c.listener.clone());
        if let Some(listener) = listener {
            listener(status);
        }
    }

    fn check_transport(&self) -> Result<(), AudioError> {
        if self.state.lock().unwrap().failing_transport {
            return Err(AudioError::AudioThreadDied);
        }
        Ok(())
    }

    fn with_clip(
        &self,
        handle: SoundHandle,
        call: BackendCall,
        f: impl FnOnce(&mut Clip),
    ) -> Result<(), AudioError> {
        let mut state = self.state.lock().unwrap();
        let clip = state
            .clips
            .get_mut(&handle)
            .ok_or(AudioError::UnknownHandle(handle))?;
        f(clip);
        state.calls.push(call);
        Ok(())
    }
}

#[async_trait]
impl AudioBackend for RecordingBackend {
    async fn configure_output(&self, _mode: OutputMode) -> Result<(), AudioError> {
        self.state.lock().unwrap().calls.push(BackendCall::ConfigureOutput);
        Ok(())
    }

    async fn load(&self, path: &Path, options: LoadOptions) -> Result<SoundHandle, AudioError> {
        let delay = self.state.lock().unwrap().load_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let mut state = self.state.lock().unwrap();

        let fails = state
            .failing_loads
            .as_deref()
            .is_some_and(|needle| path.to_string_lossy().contains(needle));
        // Speech must have been written out before it is loaded.
        if fails || (!options.looping && !path.exists()) {
            return Err(AudioError::LoadFailed {
                path: path.to_path_buf(),
                reason: "unplayable".into(),
            });
        }

        state.next_id += 1;
        let handle = SoundHandle::from_raw(state.next_id);
        let duration = if options.looping {
            None
        } else {
            state.speech_length
        };
        state.clips.insert(
            handle,
            Clip {
                looping: options.looping,
                playing: false,
                position: Duration::ZERO,
                duration,
                listener: None,
            },
        );
        state.peak_live = state.peak_live.max(state.clips.len());
        state.calls.push(BackendCall::Load {
            handle,
            path: path.to_path_buf(),
            looping: options.looping,
            volume: options.volume,
        });
        Ok(handle)
    }

    async fn play(&self, handle: SoundHandle) -> Result<(), AudioError> {
        self.check_transport()?;
        self.with_clip(handle, BackendCall::Play(handle), |c| c.playing = true)
    }

    async fn pause(&self, handle: SoundHandle) -> Result<(), AudioError> {
        self.check_transport()?;
        self.with_clip(handle, BackendCall::Pause(handle), |c| c.playing = false)
    }

    async fn stop(&self, handle: SoundHandle) -> Result<(), AudioError> {
        self.with_clip(handle, BackendCall::Stop(handle), |c| {
            c.playing = false;
            c.position = Duration::ZERO;
        })
    }

    async fn unload(&self, handle: SoundHandle) -> Result<(), AudioError> {
        let mut state = self.state.lock().unwrap();
        state
            .clips
            .remove(&handle)
            .ok_or(AudioError::UnknownHandle(handle))?;
        state.calls.push(BackendCall::Unload(handle));
        Ok(())
    }

    async fn set_volume(&self, handle: SoundHandle, volume: f32) -> Result<(), AudioError> {
        self.with_clip(handle, BackendCall::SetVolume(handle, volume), |_| {})
    }

    fn on_status_update(
        &self,
        handle: SoundHandle,
        callback: StatusCallback,
    ) -> Result<(), AudioError> {
        let mut state = self.state.lock().unwrap();
        let clip = state
            .clips
            .get_mut(&handle)
            .ok_or(AudioError::UnknownHandle(handle))?;
        clip.listener = Some(Arc::from(callback));
        Ok(())
    }
}

// ── Helpers ────────────────────────────────────────────────────────

/// A base64 payload standing in for a synthesized WAV.
pub fn speech_payload() -> String {
    STANDARD.encode(b"RIFF\x24\x00\x00\x00WAVEfmt ")
}

/// Engine over `backend` with the default choreography, writing speech
/// files into `scratch`.
pub fn engine(backend: &Arc<RecordingBackend>, scratch: &Path) -> AudioSessionEngine {
    let config = EngineConfig::default().with_scratch_dir(scratch);
    AudioSessionEngine::new(backend.clone(), TrackLibrary::from_dir(TRACKS_DIR), config)
        .expect("default config is valid")
}

/// Let spawned engine tasks run without moving the clock meaningfully.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}
