//! Session lifecycle tests for `AudioSessionEngine`.
//!
//! The engine runs against the in-memory `RecordingBackend` on a paused
//! tokio clock, so ramp steps and the hold are deterministic and the whole
//! nine-second choreography runs instantly.
//!
//! # What is tested
//!
//! - Full happy path: fade-in, progress, swell, hold, fade-out, one completion
//! - Voice-only sessions (`none`, or no registered track)
//! - Supersession releases the old session before the new one loads
//! - `stop_all` during setup, during fade-in and during the hold
//! - Pause/resume keeps the position and survives backend errors
//! - Setup failures still complete exactly once
//! - Dropping the engine releases the session without completing it

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use herald_audio::{AudioSessionEngine, EngineConfig, ProgressCallback, SessionStatus};
use herald_core::{Atmosphere, TrackLibrary};
use tokio::sync::oneshot;
use tokio::time::Instant;

use common::{BackendCall, RecordingBackend, engine, settle, speech_payload};

// ── Helpers ────────────────────────────────────────────────────────

struct Completion {
    fired: Arc<AtomicUsize>,
    done: oneshot::Receiver<()>,
}

impl Completion {
    fn count(&self) -> usize {
        self.fired.load(Ordering::SeqCst)
    }

    async fn wait(&mut self) {
        (&mut self.done).await.expect("completion callback dropped");
    }
}

fn completion() -> (Completion, impl FnOnce() + Send + 'static) {
    let fired = Arc::new(AtomicUsize::new(0));
    let (tx, done) = oneshot::channel();
    let counter = Arc::clone(&fired);
    let callback = move || {
        counter.fetch_add(1, Ordering::SeqCst);
        let _ = tx.send(());
    };
    (Completion { fired, done }, callback)
}

fn progress_log() -> (Arc<Mutex<Vec<(u64, u64)>>>, ProgressCallback) {
    let log = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&log);
    let callback: ProgressCallback = Arc::new(move |position: u64, duration: u64| {
        sink.lock().unwrap().push((position, duration));
    });
    (log, callback)
}

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-4
}

fn scratch_is_empty(dir: &tempfile::TempDir) -> bool {
    std::fs::read_dir(dir.path()).unwrap().next().is_none()
}

// ── Happy path ─────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn full_session_choreography() {
    let scratch = tempfile::tempdir().unwrap();
    let backend = Arc::new(RecordingBackend::new());
    let engine = engine(&backend, scratch.path());
    let (mut completion, on_complete) = completion();
    let (progress, on_progress) = progress_log();

    engine
        .play_session(&speech_payload(), Atmosphere::Glory, on_complete, Some(on_progress))
        .await;

    assert!(engine.has_active_session());
    assert_eq!(engine.status(), SessionStatus::Playing);
    let speech = backend.speech();
    let music = backend.music();
    assert!(backend.is_playing(speech));
    assert!(backend.is_playing(music));
    assert!(
        backend.call_index(&BackendCall::Play(speech)) < backend.call_index(&BackendCall::Play(music)),
        "speech starts before the music bed"
    );

    // Music fades in under the voice.
    tokio::time::sleep(Duration::from_millis(2100)).await;
    let fade_in = backend.volumes(music);
    assert_eq!(fade_in.len(), 40);
    assert_eq!(*fade_in.last().unwrap(), 0.3);
    assert!(backend.volumes(speech).is_empty());

    backend.advance(speech, Duration::from_millis(1000));
    settle().await;
    assert_eq!(progress.lock().unwrap().as_slice(), &[(1000, 4000)]);

    let finished_at = Instant::now();
    backend.finish(speech);
    completion.wait().await;
    let tail = finished_at.elapsed();
    assert!(tail >= Duration::from_secs(7) && tail < Duration::from_millis(7100), "tail {tail:?}");

    let volumes = backend.volumes(music);
    assert_eq!(volumes.len(), 40 + 20 + 60);
    assert_eq!(volumes[59], 0.5);
    assert_eq!(*volumes.last().unwrap(), 0.0);
    assert!(volumes.iter().all(|v| (0.0..=1.0).contains(v)));

    assert_eq!(completion.count(), 1);
    assert!(!engine.has_active_session());
    assert_eq!(engine.status(), SessionStatus::Stopped);
    assert!(backend.live_handles().is_empty());
    assert!(scratch_is_empty(&scratch));
}

#[tokio::test(start_paused = true)]
async fn music_loads_muted_and_looping() {
    let scratch = tempfile::tempdir().unwrap();
    let backend = Arc::new(RecordingBackend::new());
    let engine = engine(&backend, scratch.path());
    let (_completion, on_complete) = completion();

    engine
        .play_session(&speech_payload(), Atmosphere::Peace, on_complete, None)
        .await;

    let calls = backend.calls();
    let music_load = calls
        .iter()
        .find_map(|c| match c {
            BackendCall::Load {
                path,
                looping: true,
                volume,
                ..
            } => Some((path.clone(), *volume)),
            _ => None,
        })
        .unwrap();
    assert!(music_load.0.ends_with("peace.mp3"));
    assert_eq!(music_load.1, 0.0);
    assert_eq!(calls[0], BackendCall::ConfigureOutput);
}

// ── Voice only ─────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn no_music_completes_with_speech() {
    let scratch = tempfile::tempdir().unwrap();
    let backend = Arc::new(RecordingBackend::new());
    let engine = engine(&backend, scratch.path());
    let (mut completion, on_complete) = completion();

    engine
        .play_session(&speech_payload(), Atmosphere::None, on_complete, None)
        .await;
    assert!(backend.last_load(true).is_none());

    let finished_at = Instant::now();
    backend.finish(backend.speech());
    completion.wait().await;

    assert!(finished_at.elapsed() < Duration::from_millis(50));
    assert_eq!(completion.count(), 1);
    assert!(
        !backend
            .calls()
            .iter()
            .any(|c| matches!(c, BackendCall::SetVolume(..)))
    );
    assert!(backend.live_handles().is_empty());
}

#[tokio::test(start_paused = true)]
async fn unregistered_track_plays_voice_only() {
    let scratch = tempfile::tempdir().unwrap();
    let backend = Arc::new(RecordingBackend::new());
    let engine = AudioSessionEngine::new(
        backend.clone(),
        TrackLibrary::default(),
        EngineConfig::default().with_scratch_dir(scratch.path()),
    )
    .unwrap();
    let (mut completion, on_complete) = completion();

    engine
        .play_session(&speech_payload(), Atmosphere::Warfare, on_complete, None)
        .await;

    assert_eq!(engine.status(), SessionStatus::Playing);
    assert_eq!(backend.loads().len(), 1);

    backend.finish(backend.speech());
    completion.wait().await;
    assert_eq!(completion.count(), 1);
}

// ── Supersession ───────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn new_session_releases_previous_first() {
    let scratch = tempfile::tempdir().unwrap();
    let backend = Arc::new(RecordingBackend::new());
    let engine = engine(&backend, scratch.path());
    let (first, first_done) = completion();
    let (second, second_done) = completion();

    engine
        .play_session(&speech_payload(), Atmosphere::Glory, first_done, None)
        .await;
    let (a_speech, a_music) = (backend.speech(), backend.music());
    tokio::time::sleep(Duration::from_millis(500)).await;

    engine
        .play_session(&speech_payload(), Atmosphere::Rise, second_done, None)
        .await;
    let (b_speech, b_music) = (backend.speech(), backend.music());

    assert_eq!(backend.live_handles(), vec![b_speech, b_music]);
    assert!(backend.peak_live() <= 2);

    let first_b_load = backend
        .calls()
        .iter()
        .position(|c| matches!(c, BackendCall::Load { handle, .. } if *handle == b_speech))
        .unwrap();
    for released in [a_speech, a_music] {
        assert!(backend.call_index(&BackendCall::Unload(released)).unwrap() < first_b_load);
    }

    // A's speech is gone, so its finish can no longer reach the engine.
    backend.finish(a_speech);
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(first.count(), 0);
    assert_eq!(second.count(), 0);
    assert_eq!(engine.status(), SessionStatus::Playing);

    engine.stop_all().await;
    assert_eq!(first.count(), 0);
    assert_eq!(second.count(), 1);
    assert!(scratch_is_empty(&scratch));
}

// ── Stop ───────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn stop_during_hold_skips_fade_out() {
    let scratch = tempfile::tempdir().unwrap();
    let backend = Arc::new(RecordingBackend::new());
    let engine = engine(&backend, scratch.path());
    let (completion, on_complete) = completion();

    engine
        .play_session(&speech_payload(), Atmosphere::Selah, on_complete, None)
        .await;
    let music = backend.music();
    tokio::time::sleep(Duration::from_millis(2100)).await;

    backend.finish(backend.speech());
    tokio::time::sleep(Duration::from_millis(2000)).await;
    assert_eq!(engine.status(), SessionStatus::Finishing);

    engine.stop_all().await;
    assert_eq!(completion.count(), 1);
    assert!(!engine.has_active_session());
    assert!(backend.live_handles().is_empty());

    tokio::time::sleep(Duration::from_secs(10)).await;
    let volumes = backend.volumes(music);
    assert_eq!(volumes.len(), 40 + 20);
    assert_eq!(*volumes.last().unwrap(), 0.5);
    assert_eq!(completion.count(), 1);
}

#[tokio::test(start_paused = true)]
async fn stop_during_fade_in_cancels_ramp() {
    let scratch = tempfile::tempdir().unwrap();
    let backend = Arc::new(RecordingBackend::new());
    let engine = engine(&backend, scratch.path());
    let (completion, on_complete) = completion();

    engine
        .play_session(&speech_payload(), Atmosphere::Glory, on_complete, None)
        .await;
    let (speech, music) = (backend.speech(), backend.music());
    tokio::time::sleep(Duration::from_millis(1020)).await;

    engine.stop_all().await;
    let applied = backend.volumes(music).len();
    assert_eq!(applied, 20);

    tokio::time::sleep(Duration::from_secs(3)).await;
    assert_eq!(backend.volumes(music).len(), applied);
    for handle in [speech, music] {
        assert_eq!(backend.count(&BackendCall::Stop(handle)), 1);
        assert_eq!(backend.count(&BackendCall::Unload(handle)), 1);
    }
    assert_eq!(completion.count(), 1);
}

#[tokio::test(start_paused = true)]
async fn stop_without_session_is_a_no_op() {
    let scratch = tempfile::tempdir().unwrap();
    let backend = Arc::new(RecordingBackend::new());
    let engine = engine(&backend, scratch.path());

    engine.stop_all().await;
    engine.stop_all().await;

    assert!(!engine.has_active_session());
    assert_eq!(engine.status(), SessionStatus::Idle);
    assert!(backend.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn repeated_stop_releases_once() {
    let scratch = tempfile::tempdir().unwrap();
    let backend = Arc::new(RecordingBackend::new());
    let engine = engine(&backend, scratch.path());
    let (completion, on_complete) = completion();

    engine
        .play_session(&speech_payload(), Atmosphere::None, on_complete, None)
        .await;
    let speech = backend.speech();

    engine.stop_all().await;
    engine.shutdown().await;

    assert_eq!(backend.count(&BackendCall::Unload(speech)), 1);
    assert_eq!(completion.count(), 1);
    assert_eq!(engine.status(), SessionStatus::Stopped);
}

#[tokio::test(start_paused = true)]
async fn stop_during_setup_releases_late_loads() {
    // Each load takes 100 ms: speech over 0..100, music over 100..200.
    for stop_at in [50, 150] {
        let scratch = tempfile::tempdir().unwrap();
        let backend =
            Arc::new(RecordingBackend::new().with_load_delay(Duration::from_millis(100)));
        let engine = engine(&backend, scratch.path());
        let (completion, on_complete) = completion();
        let payload = speech_payload();

        tokio::join!(
            engine.play_session(&payload, Atmosphere::Glory, on_complete, None),
            async {
                tokio::time::sleep(Duration::from_millis(stop_at)).await;
                engine.stop_all().await;
            },
        );
        settle().await;

        assert_eq!(completion.count(), 1, "stopped at {stop_at} ms");
        assert!(backend.live_handles().is_empty(), "stopped at {stop_at} ms");
        assert!(scratch_is_empty(&scratch), "stopped at {stop_at} ms");
        assert!(!engine.has_active_session());
        assert_eq!(engine.status(), SessionStatus::Stopped);
        assert!(
            !backend.calls().iter().any(|c| matches!(c, BackendCall::Play(_))),
            "nothing plays after a stop during setup"
        );
    }
}

// ── Ramps ──────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn short_speech_cuts_fade_in_short() {
    let scratch = tempfile::tempdir().unwrap();
    let backend = Arc::new(RecordingBackend::new());
    let engine = engine(&backend, scratch.path());
    let (mut completion, on_complete) = completion();

    engine
        .play_session(&speech_payload(), Atmosphere::Glory, on_complete, None)
        .await;
    let music = backend.music();
    tokio::time::sleep(Duration::from_millis(525)).await;

    backend.finish(backend.speech());
    completion.wait().await;

    // 10 fade-in steps, then the swell takes over from the background level.
    let volumes = backend.volumes(music);
    assert_eq!(volumes.len(), 10 + 20 + 60);
    assert!(volumes[9] < 0.1);
    assert!(approx(volumes[10], 0.31));
    assert_eq!(volumes[29], 0.5);
    assert_eq!(*volumes.last().unwrap(), 0.0);
}

// ── Pause / resume ─────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn pause_resume_keeps_position() {
    let scratch = tempfile::tempdir().unwrap();
    let backend = Arc::new(RecordingBackend::new());
    let engine = engine(&backend, scratch.path());
    let (_completion, on_complete) = completion();

    engine
        .play_session(&speech_payload(), Atmosphere::Glory, on_complete, None)
        .await;
    let (speech, music) = (backend.speech(), backend.music());
    backend.advance(speech, Duration::from_millis(1500));

    engine.pause().await;
    engine.pause().await;
    assert_eq!(engine.status(), SessionStatus::Paused);
    assert!(engine.has_active_session());
    assert_eq!(backend.count(&BackendCall::Pause(speech)), 1);
    assert_eq!(backend.count(&BackendCall::Pause(music)), 1);
    let paused_at = backend.position(speech).unwrap();

    backend.advance(speech, Duration::from_millis(500));
    assert_eq!(backend.position(speech).unwrap(), paused_at);

    engine.resume().await;
    engine.resume().await;
    assert_eq!(engine.status(), SessionStatus::Playing);
    assert_eq!(backend.count(&BackendCall::Play(speech)), 2);
    assert!(backend.position(speech).unwrap() >= paused_at);
    assert!(backend.is_playing(music));
}

#[tokio::test(start_paused = true)]
async fn pause_is_ignored_while_finishing() {
    let scratch = tempfile::tempdir().unwrap();
    let backend = Arc::new(RecordingBackend::new());
    let engine = engine(&backend, scratch.path());
    let (mut completion, on_complete) = completion();

    engine
        .play_session(&speech_payload(), Atmosphere::Glory, on_complete, None)
        .await;
    let music = backend.music();
    backend.finish(backend.speech());
    settle().await;
    assert_eq!(engine.status(), SessionStatus::Finishing);

    engine.pause().await;
    assert_eq!(engine.status(), SessionStatus::Finishing);
    assert_eq!(backend.count(&BackendCall::Pause(music)), 0);

    completion.wait().await;
}

#[tokio::test(start_paused = true)]
async fn pause_and_resume_without_session_are_no_ops() {
    let scratch = tempfile::tempdir().unwrap();
    let backend = Arc::new(RecordingBackend::new());
    let engine = engine(&backend, scratch.path());

    engine.pause().await;
    engine.resume().await;

    assert_eq!(engine.status(), SessionStatus::Idle);
    assert!(backend.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn pause_and_resume_swallow_transport_errors() {
    let scratch = tempfile::tempdir().unwrap();
    let backend = Arc::new(RecordingBackend::new());
    let engine = engine(&backend, scratch.path());
    let (mut completion, on_complete) = completion();

    engine
        .play_session(&speech_payload(), Atmosphere::Glory, on_complete, None)
        .await;
    let speech = backend.speech();
    backend.fail_transport(true);

    engine.pause().await;
    assert_eq!(engine.status(), SessionStatus::Paused);
    assert_eq!(backend.count(&BackendCall::Pause(speech)), 0);

    engine.resume().await;
    assert_eq!(engine.status(), SessionStatus::Playing);
    assert_eq!(backend.count(&BackendCall::Play(speech)), 1);

    backend.finish(speech);
    completion.wait().await;
    assert_eq!(completion.count(), 1);
    assert_eq!(engine.status(), SessionStatus::Stopped);
    assert!(backend.live_handles().is_empty());
}

// ── Progress ───────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn progress_needs_a_known_duration() {
    let scratch = tempfile::tempdir().unwrap();
    let backend = Arc::new(RecordingBackend::new().with_speech_length(None));
    let engine = engine(&backend, scratch.path());
    let (mut completion, on_complete) = completion();
    let (progress, on_progress) = progress_log();

    engine
        .play_session(&speech_payload(), Atmosphere::None, on_complete, Some(on_progress))
        .await;
    let speech = backend.speech();
    backend.advance(speech, Duration::from_millis(800));
    settle().await;
    assert!(progress.lock().unwrap().is_empty());

    backend.finish(speech);
    completion.wait().await;
    assert!(progress.lock().unwrap().is_empty());
}

// ── Setup failures ─────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn music_load_failure_completes_and_releases_speech() {
    let scratch = tempfile::tempdir().unwrap();
    let backend = Arc::new(RecordingBackend::new().failing_loads("glory"));
    let engine = engine(&backend, scratch.path());
    let (completion, on_complete) = completion();

    engine
        .play_session(&speech_payload(), Atmosphere::Glory, on_complete, None)
        .await;

    assert_eq!(completion.count(), 1);
    assert!(!engine.has_active_session());
    assert_eq!(engine.status(), SessionStatus::Stopped);

    let speech = backend.speech();
    assert_eq!(backend.count(&BackendCall::Stop(speech)), 1);
    assert_eq!(backend.count(&BackendCall::Unload(speech)), 1);
    assert!(backend.live_handles().is_empty());
    assert!(scratch_is_empty(&scratch));
}

#[tokio::test(start_paused = true)]
async fn invalid_payload_completes_without_loading() {
    let scratch = tempfile::tempdir().unwrap();
    let backend = Arc::new(RecordingBackend::new());
    let engine = engine(&backend, scratch.path());
    let (completion, on_complete) = completion();

    engine
        .play_session("%%% not audio %%%", Atmosphere::Glory, on_complete, None)
        .await;

    assert_eq!(completion.count(), 1);
    assert!(backend.loads().is_empty());
    assert!(!engine.has_active_session());
}

#[tokio::test(start_paused = true)]
async fn invalid_config_is_rejected() {
    let backend = Arc::new(RecordingBackend::new());
    let result = AudioSessionEngine::new(
        backend,
        TrackLibrary::default(),
        EngineConfig::default().with_levels(0.3, 2.0),
    );
    assert!(result.is_err());
}

// ── Disposal ───────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn dropping_engine_releases_without_completing() {
    let scratch = tempfile::tempdir().unwrap();
    let backend = Arc::new(RecordingBackend::new());
    let engine = engine(&backend, scratch.path());
    let (completion, on_complete) = completion();

    engine
        .play_session(&speech_payload(), Atmosphere::Glory, on_complete, None)
        .await;
    assert_eq!(backend.live_handles().len(), 2);

    drop(engine);
    settle().await;

    assert!(backend.live_handles().is_empty());
    assert_eq!(completion.count(), 0);
}

#[tokio::test(start_paused = true)]
async fn init_applies_output_mode() {
    let scratch = tempfile::tempdir().unwrap();
    let backend = Arc::new(RecordingBackend::new());
    let engine = engine(&backend, scratch.path());

    engine.init().await.unwrap();
    engine.init().await.unwrap();

    assert_eq!(backend.count(&BackendCall::ConfigureOutput), 2);
}
