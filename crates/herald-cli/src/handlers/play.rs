//! Play command handler.
//!
//! Stages a speech file as a session over the chosen atmosphere and blocks
//! until the session ends or the user presses Ctrl-C.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use herald_audio::{
    AudioSessionEngine, EngineConfig, PlaybackController, ProgressCallback, RodioBackend,
};
use herald_core::{Atmosphere, Settings, TrackLibrary};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use crate::commands::PlayArgs;
use crate::error::CliError;
use crate::presentation::format_clock;

/// Only atmospheres whose loop is actually on disk; the rest play voice-only.
pub fn installed_tracks(dir: &Path) -> TrackLibrary {
    let bundled = TrackLibrary::from_dir(dir);
    Atmosphere::ALL
        .into_iter()
        .filter_map(|a| bundled.resolve(a).filter(|p| p.is_file()).map(|p| (a, p)))
        .fold(TrackLibrary::default(), |library, (atmosphere, path)| {
            library.with_asset(atmosphere, path)
        })
}

pub async fn execute(args: PlayArgs, settings: &Settings, tracks_dir: &Path) -> Result<()> {
    let bytes = tokio::fs::read(&args.file)
        .await
        .map_err(|e| CliError::Io(format!("{}: {e}", args.file.display())))?;
    let audio_base64 = STANDARD.encode(bytes);
    let atmosphere = args.atmosphere.unwrap_or(settings.default_atmosphere);

    let tracks = installed_tracks(tracks_dir);
    if atmosphere.has_music() && tracks.resolve(atmosphere).is_none() {
        eprintln!(
            "No track for '{}' in {}; playing the voice only.",
            atmosphere,
            tracks_dir.display()
        );
    }

    let backend = Arc::new(RodioBackend::new().map_err(CliError::from)?);
    let engine = AudioSessionEngine::new(backend, tracks, EngineConfig::default())
        .map_err(CliError::from)?;
    engine.init().await.map_err(CliError::from)?;
    let controller = PlaybackController::new(engine, atmosphere);

    let bar = (!args.no_progress).then(progress_bar);
    let on_progress = bar.clone().map(|bar| -> ProgressCallback {
        Arc::new(move |position_ms: u64, duration_ms: u64| {
            bar.set_length(duration_ms);
            bar.set_position(position_ms);
            bar.set_message(format!(
                "{} / {}",
                format_clock(position_ms),
                format_clock(duration_ms)
            ));
        })
    });

    info!(file = %args.file.display(), %atmosphere, "Starting session");
    println!("Playing {} over {}", args.file.display(), atmosphere.label());

    let mut playing = controller.subscribe();
    controller.play_with_progress(&audio_base64, on_progress).await;
    if !controller.is_playing() {
        if let Some(bar) = &bar {
            bar.finish_and_clear();
        }
        controller.engine().shutdown().await;
        return Err(CliError::Playback(format!(
            "could not start playback of {}",
            args.file.display()
        ))
        .into());
    }

    tokio::select! {
        result = playing.wait_for(|playing| !playing) => {
            if result.is_err() {
                debug!("Playing flag sender dropped");
            }
        }
        _ = tokio::signal::ctrl_c() => {
            debug!("Interrupted");
            controller.stop().await;
        }
    }

    if let Some(bar) = &bar {
        bar.finish_and_clear();
    }
    controller.engine().shutdown().await;
    println!("Done.");
    Ok(())
}

fn progress_bar() -> ProgressBar {
    let bar = ProgressBar::new(0);
    bar.set_style(
        ProgressStyle::with_template("{spinner} [{bar:40.cyan/blue}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> "),
    );
    bar.set_message(format_clock(0));
    bar.with_finish(indicatif::ProgressFinish::AndClear)
}
