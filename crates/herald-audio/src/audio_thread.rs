//! Dedicated audio thread that keeps rodio's `!Send` output stream off the
//! async runtime.
//!
//! `rodio::OutputStream` is `!Send` on some platforms (macOS CoreAudio among
//! them). It lives on one OS thread for its whole life, together with every
//! loaded clip. [`AudioThreadHandle`] is the `Send + Sync` proxy: each
//! operation is an [`AudioCommand`] sent over a `std::sync::mpsc` channel and
//! answered on a `tokio::sync::oneshot`, so async callers await the reply
//! instead of blocking a runtime worker.
//!
//! Between commands the thread wakes every status interval and publishes a
//! [`PlaybackStatus`] for each started clip that has a listener.

use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};
use tokio::sync::oneshot;

use crate::backend::{LoadOptions, PlaybackStatus, SoundHandle, StatusCallback};
use crate::error::AudioError;

/// Default interval between status publications.
pub const DEFAULT_STATUS_INTERVAL: Duration = Duration::from_millis(100);

type Reply<T> = oneshot::Sender<Result<T, AudioError>>;

// ── Commands ───────────────────────────────────────────────────────

enum AudioCommand {
    /// Open and decode a clip into a paused sink.
    Load {
        path: PathBuf,
        options: LoadOptions,
        reply: Reply<SoundHandle>,
    },

    Play {
        handle: SoundHandle,
        reply: Reply<()>,
    },

    Pause {
        handle: SoundHandle,
        reply: Reply<()>,
    },

    /// Stop playback; the clip will not report a natural finish.
    Stop {
        handle: SoundHandle,
        reply: Reply<()>,
    },

    /// Drop the sink and its listener.
    Unload {
        handle: SoundHandle,
        reply: Reply<()>,
    },

    SetVolume {
        handle: SoundHandle,
        volume: f32,
        reply: Reply<()>,
    },

    /// Replace the status listener (fire-and-forget).
    Subscribe {
        handle: SoundHandle,
        callback: StatusCallback,
    },

    Shutdown,
}

// ── Handle (Send + Sync proxy) ─────────────────────────────────────

/// `Send + Sync` handle to the dedicated audio thread.
pub struct AudioThreadHandle {
    cmd_tx: mpsc::Sender<AudioCommand>,
    thread: Option<thread::JoinHandle<()>>,
}

impl AudioThreadHandle {
    /// Spawn the audio thread and open the default output device on it.
    ///
    /// Output stream errors are reported back through a one-shot init channel.
    pub fn spawn(status_interval: Duration) -> Result<Self, AudioError> {
        let (cmd_tx, cmd_rx) = mpsc::channel::<AudioCommand>();
        let (init_tx, init_rx) = mpsc::channel::<Result<(), AudioError>>();

        let thread = thread::Builder::new()
            .name("herald-audio".into())
            .spawn(move || Self::run(&cmd_rx, &init_tx, status_interval))
            .map_err(|e| {
                AudioError::OutputStreamError(format!("failed to spawn audio thread: {e}"))
            })?;

        init_rx.recv().map_err(|_| AudioError::AudioThreadDied)??;

        Ok(Self {
            cmd_tx,
            thread: Some(thread),
        })
    }

    pub async fn load(&self, path: &Path, options: LoadOptions) -> Result<SoundHandle, AudioError> {
        let path = path.to_path_buf();
        self.send_and_recv(|reply| AudioCommand::Load {
            path,
            options,
            reply,
        })
        .await
    }

    pub async fn play(&self, handle: SoundHandle) -> Result<(), AudioError> {
        self.send_and_recv(|reply| AudioCommand::Play { handle, reply })
            .await
    }

    pub async fn pause(&self, handle: SoundHandle) -> Result<(), AudioError> {
        self.send_and_recv(|reply| AudioCommand::Pause { handle, reply })
            .await
    }

    pub async fn stop(&self, handle: SoundHandle) -> Result<(), AudioError> {
        self.send_and_recv(|reply| AudioCommand::Stop { handle, reply })
            .await
    }

    pub async fn unload(&self, handle: SoundHandle) -> Result<(), AudioError> {
        self.send_and_recv(|reply| AudioCommand::Unload { handle, reply })
            .await
    }

    pub async fn set_volume(&self, handle: SoundHandle, volume: f32) -> Result<(), AudioError> {
        self.send_and_recv(|reply| AudioCommand::SetVolume {
            handle,
            volume,
            reply,
        })
        .await
    }

    pub fn subscribe(&self, handle: SoundHandle, callback: StatusCallback) -> Result<(), AudioError> {
        self.cmd_tx
            .send(AudioCommand::Subscribe { handle, callback })
            .map_err(|_| AudioError::AudioThreadDied)
    }

    // ── Internal helpers ───────────────────────────────────────────

    /// Send a command and await its reply. Channel failures map to
    /// [`AudioError::AudioThreadDied`].
    async fn send_and_recv<T>(
        &self,
        build: impl FnOnce(Reply<T>) -> AudioCommand,
    ) -> Result<T, AudioError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(build(tx))
            .map_err(|_| AudioError::AudioThreadDied)?;
        rx.await.map_err(|_| AudioError::AudioThreadDied)?
    }

    // ── Audio thread event loop ────────────────────────────────────

    /// Body of the audio thread. Owns the output stream and every sink.
    fn run(
        cmd_rx: &mpsc::Receiver<AudioCommand>,
        init_tx: &mpsc::Sender<Result<(), AudioError>>,
        status_interval: Duration,
    ) {
        let (_stream, stream_handle) = match OutputStream::try_default() {
            Ok(pair) => pair,
            Err(e) => {
                let _ = init_tx.send(Err(AudioError::OutputStreamError(e.to_string())));
                return;
            }
        };
        if init_tx.send(Ok(())).is_err() {
            return;
        }
        tracing::info!("Audio output opened on default device");

        let mut clips = ClipTable::new(stream_handle);
        let mut last_publish = Instant::now();

        loop {
            let timeout = status_interval.saturating_sub(last_publish.elapsed());
            match cmd_rx.recv_timeout(timeout) {
                Ok(AudioCommand::Shutdown) | Err(mpsc::RecvTimeoutError::Disconnected) => break,
                Ok(cmd) => clips.execute(cmd),
                Err(mpsc::RecvTimeoutError::Timeout) => {}
            }

            if last_publish.elapsed() >= status_interval {
                clips.publish();
                last_publish = Instant::now();
            }
        }

        // Sinks and the stream are dropped here, on the audio thread.
        tracing::debug!(clips = clips.len(), "Audio thread shutting down");
    }
}

impl Drop for AudioThreadHandle {
    fn drop(&mut self) {
        let _ = self.cmd_tx.send(AudioCommand::Shutdown);
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }
}

// ── Clip table (audio thread only) ─────────────────────────────────

struct Clip {
    sink: Sink,
    duration: Option<Duration>,
    looping: bool,
    started: bool,
    /// Drained or stopped. No further status is published.
    finished: bool,
    listener: Option<StatusCallback>,
}

struct ClipTable {
    stream_handle: OutputStreamHandle,
    clips: HashMap<SoundHandle, Clip>,
    next_id: u64,
}

impl ClipTable {
    fn new(stream_handle: OutputStreamHandle) -> Self {
        Self {
            stream_handle,
            clips: HashMap::new(),
            next_id: 0,
        }
    }

    fn len(&self) -> usize {
        self.clips.len()
    }

    fn execute(&mut self, cmd: AudioCommand) {
        match cmd {
            AudioCommand::Load {
                path,
                options,
                reply,
            } => {
                let _ = reply.send(self.load(&path, options));
            }
            AudioCommand::Play { handle, reply } => {
                let _ = reply.send(self.with_clip(handle, |clip| {
                    clip.started = true;
                    clip.sink.play();
                }));
            }
            AudioCommand::Pause { handle, reply } => {
                let _ = reply.send(self.with_clip(handle, |clip| clip.sink.pause()));
            }
            AudioCommand::Stop { handle, reply } => {
                let _ = reply.send(self.with_clip(handle, |clip| {
                    clip.finished = true;
                    clip.sink.stop();
                }));
            }
            AudioCommand::Unload { handle, reply } => {
                let result = match self.clips.remove(&handle) {
                    Some(_clip) => Ok(()),
                    None => Err(AudioError::UnknownHandle(handle)),
                };
                let _ = reply.send(result);
            }
            AudioCommand::SetVolume {
                handle,
                volume,
                reply,
            } => {
                let volume = volume.clamp(0.0, 1.0);
                let _ = reply.send(self.with_clip(handle, |clip| clip.sink.set_volume(volume)));
            }
            AudioCommand::Subscribe { handle, callback } => {
                if let Err(e) = self.with_clip(handle, |clip| clip.listener = Some(callback)) {
                    tracing::debug!(error = %e, "Status subscription ignored");
                }
            }
            AudioCommand::Shutdown => {}
        }
    }

    fn with_clip(
        &mut self,
        handle: SoundHandle,
        f: impl FnOnce(&mut Clip),
    ) -> Result<(), AudioError> {
        let clip = self
            .clips
            .get_mut(&handle)
            .ok_or(AudioError::UnknownHandle(handle))?;
        f(clip);
        Ok(())
    }

    fn load(&mut self, path: &Path, options: LoadOptions) -> Result<SoundHandle, AudioError> {
        let load_failed = |reason: String| AudioError::LoadFailed {
            path: path.to_path_buf(),
            reason,
        };

        let sink = Sink::try_new(&self.stream_handle)
            .map_err(|e| AudioError::OutputStreamError(e.to_string()))?;
        sink.pause();
        sink.set_volume(options.volume.clamp(0.0, 1.0));

        let reader = BufReader::new(File::open(path).map_err(|e| load_failed(e.to_string()))?);
        let duration = if options.looping {
            let source = Decoder::new_looped(reader).map_err(|e| load_failed(e.to_string()))?;
            sink.append(source);
            None
        } else {
            let source = Decoder::new(reader).map_err(|e| load_failed(e.to_string()))?;
            let duration = source.total_duration();
            sink.append(source);
            duration
        };

        self.next_id += 1;
        let handle = SoundHandle::from_raw(self.next_id);
        self.clips.insert(
            handle,
            Clip {
                sink,
                duration,
                looping: options.looping,
                started: false,
                finished: false,
                listener: None,
            },
        );

        tracing::debug!(%handle, path = %path.display(), ?duration, looping = options.looping, "Clip loaded");
        Ok(handle)
    }

    /// Publish one status to every started, unfinished clip with a listener.
    /// A drained one-shot clip reports `did_just_finish` exactly once.
    fn publish(&mut self) {
        for clip in self.clips.values_mut() {
            if !clip.started || clip.finished || clip.sink.is_paused() {
                continue;
            }
            let Some(listener) = clip.listener.as_ref() else {
                continue;
            };

            let drained = !clip.looping && clip.sink.empty();
            if drained {
                clip.finished = true;
            }
            listener(PlaybackStatus {
                is_loaded: true,
                is_playing: !drained,
                position: clip.duration.map_or_else(
                    || clip.sink.get_pos(),
                    |total| if drained { total } else { clip.sink.get_pos().min(total) },
                ),
                duration: clip.duration,
                did_just_finish: drained,
            });
        }
    }
}
