//! Engine configuration: fade timings, music levels and output mode.

use std::path::PathBuf;
use std::time::Duration;

use crate::backend::OutputMode;
use crate::error::AudioError;

/// Interval between volume ramp steps.
pub const FADE_STEP: Duration = Duration::from_millis(50);

/// Ramps are counted in whole milliseconds, so shorter steps are rejected.
pub const MIN_FADE_STEP: Duration = Duration::from_millis(1);

/// Music level while the voice is speaking.
pub const MUSIC_VOLUME_DURING_SPEECH: f32 = 0.3;

/// Music level the bed swells to once the voice has finished.
pub const MUSIC_VOLUME_SWELL: f32 = 0.5;

pub const FADE_IN: Duration = Duration::from_millis(2000);
pub const SWELL: Duration = Duration::from_millis(1000);
pub const HOLD: Duration = Duration::from_millis(3000);
pub const FADE_OUT: Duration = Duration::from_millis(3000);

/// Configuration for [`AudioSessionEngine`](crate::AudioSessionEngine).
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Ramp step interval.
    pub fade_step: Duration,

    /// Music level under speech.
    pub background_volume: f32,

    /// Music level after the swell.
    pub swell_volume: f32,

    /// Music fade-in under speech (`0 → background_volume`).
    pub fade_in: Duration,

    /// Post-speech swell (`background_volume → swell_volume`).
    pub swell: Duration,

    /// Pause at `swell_volume` before the fade-out.
    pub hold: Duration,

    /// Final fade (`swell_volume → 0`).
    pub fade_out: Duration,

    /// Output behaviour applied by `init`.
    pub output: OutputMode,

    /// Directory for the transient speech file. `None` uses the OS temp dir.
    pub scratch_dir: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fade_step: FADE_STEP,
            background_volume: MUSIC_VOLUME_DURING_SPEECH,
            swell_volume: MUSIC_VOLUME_SWELL,
            fade_in: FADE_IN,
            swell: SWELL,
            hold: HOLD,
            fade_out: FADE_OUT,
            output: OutputMode::default(),
            scratch_dir: None,
        }
    }
}

impl EngineConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn with_fade_step(mut self, step: Duration) -> Self {
        self.fade_step = step;
        self
    }

    #[must_use]
    pub const fn with_levels(mut self, background: f32, swell: f32) -> Self {
        self.background_volume = background;
        self.swell_volume = swell;
        self
    }

    #[must_use]
    pub const fn with_fade_in(mut self, duration: Duration) -> Self {
        self.fade_in = duration;
        self
    }

    /// Set the post-speech swell, hold and fade-out durations.
    #[must_use]
    pub const fn with_finish(mut self, swell: Duration, hold: Duration, fade_out: Duration) -> Self {
        self.swell = swell;
        self.hold = hold;
        self.fade_out = fade_out;
        self
    }

    #[must_use]
    pub const fn with_output(mut self, output: OutputMode) -> Self {
        self.output = output;
        self
    }

    #[must_use]
    pub fn with_scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = Some(dir.into());
        self
    }

    /// Non-speech tail of a session: swell + hold + fade-out with music,
    /// nothing without.
    #[must_use]
    pub fn post_speech_tail(&self, has_music: bool) -> Duration {
        if has_music {
            self.swell + self.hold + self.fade_out
        } else {
            Duration::ZERO
        }
    }

    pub fn validate(&self) -> Result<(), AudioError> {
        if self.fade_step < MIN_FADE_STEP {
            return Err(AudioError::InvalidConfig(format!(
                "fade step must be at least {MIN_FADE_STEP:?}, got {:?}",
                self.fade_step
            )));
        }
        for (name, level) in [
            ("background volume", self.background_volume),
            ("swell volume", self.swell_volume),
        ] {
            if !(0.0..=1.0).contains(&level) {
                return Err(AudioError::InvalidConfig(format!(
                    "{name} must be within 0.0..=1.0, got {level}"
                )));
            }
        }
        Ok(())
    }
}
