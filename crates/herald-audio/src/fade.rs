//! Timer-driven volume ramps, one in flight at a time.
//!
//! A ramp from `from` to `to` over `duration` runs as `max(1, duration / step)`
//! equal increments, one per timer tick. Intermediate volumes are clamped to
//! `[0, 1]`; the last step applies `to` exactly.
//!
//! [`FadeScheduler`] owns the single ramp slot. Starting a ramp cancels the
//! one in flight before the new timer is armed, so two ramps never interleave
//! `set_volume` calls on the same handle.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::backend::{AudioBackend, SoundHandle};

/// Ramp state: `{to, increment, step, total_steps}`.
#[derive(Debug, Clone, PartialEq)]
pub struct VolumeRamp {
    to: f32,
    increment: f32,
    current: f32,
    step: u32,
    total_steps: u32,
}

impl VolumeRamp {
    /// Build a ramp. `to` is clamped into `[0, 1]` so the final step never
    /// requests an out-of-range volume.
    #[must_use]
    pub fn new(from: f32, to: f32, duration: Duration, step_interval: Duration) -> Self {
        let to = to.clamp(0.0, 1.0);
        let interval_ms = step_interval.as_millis().max(1);
        let total_steps = u32::try_from(duration.as_millis() / interval_ms)
            .unwrap_or(u32::MAX)
            .max(1);
        #[allow(clippy::cast_precision_loss)]
        let increment = (to - from) / total_steps as f32;

        Self {
            to,
            increment,
            current: from,
            step: 0,
            total_steps,
        }
    }

    #[must_use]
    pub const fn total_steps(&self) -> u32 {
        self.total_steps
    }

    #[must_use]
    pub const fn target(&self) -> f32 {
        self.to
    }

    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.step >= self.total_steps
    }

    /// Advance one step and return the volume to apply, or `None` once the
    /// target has been reached.
    pub fn advance(&mut self) -> Option<f32> {
        if self.is_finished() {
            return None;
        }
        self.step += 1;
        self.current += self.increment;

        if self.is_finished() {
            self.current = self.to;
            return Some(self.to);
        }
        Some(self.current.clamp(0.0, 1.0))
    }
}

impl Iterator for VolumeRamp {
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        self.advance()
    }
}

/// How a ramp ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FadeOutcome {
    /// Target volume applied.
    Completed,
    /// A newer ramp or a teardown cancelled this one.
    Cancelled,
    /// The handle rejected a step (usually already released).
    Aborted,
}

/// Completion of a started ramp. Dropping it detaches the ramp.
#[derive(Debug)]
pub struct FadeHandle {
    task: JoinHandle<FadeOutcome>,
}

impl FadeHandle {
    /// Wait for the ramp to end. Never fails: a ramp task that could not
    /// finish reports [`FadeOutcome::Cancelled`].
    pub async fn finished(self) -> FadeOutcome {
        self.task.await.unwrap_or(FadeOutcome::Cancelled)
    }
}

#[derive(Default)]
struct FadeSlot {
    next_id: u64,
    active: Option<(u64, CancellationToken)>,
}

/// Owner of the single in-flight ramp.
///
/// Cloning shares the slot.
#[derive(Clone)]
pub struct FadeScheduler {
    step: Duration,
    slot: Arc<Mutex<FadeSlot>>,
}

impl FadeScheduler {
    #[must_use]
    pub fn new(step: Duration) -> Self {
        Self {
            step,
            slot: Arc::new(Mutex::new(FadeSlot::default())),
        }
    }

    /// Cancel the ramp in flight (if any), then start `ramp` on `handle`.
    ///
    /// The first step fires one step interval after this call.
    pub fn start(
        &self,
        backend: Arc<dyn AudioBackend>,
        handle: SoundHandle,
        ramp: VolumeRamp,
    ) -> FadeHandle {
        let token = CancellationToken::new();
        let id = {
            let mut slot = self.lock();
            if let Some((_, previous)) = slot.active.take() {
                previous.cancel();
            }
            slot.next_id += 1;
            slot.active = Some((slot.next_id, token.clone()));
            slot.next_id
        };

        debug!(
            %handle,
            target = ramp.target(),
            steps = ramp.total_steps(),
            "Volume ramp started"
        );

        let scheduler = self.clone();
        let task = tokio::spawn(async move {
            let outcome = run_ramp(backend.as_ref(), handle, ramp, scheduler.step, &token).await;
            scheduler.release(id);
            outcome
        });
        FadeHandle { task }
    }

    /// Cancel the ramp in flight, if any.
    pub fn cancel(&self) {
        if let Some((_, token)) = self.lock().active.take() {
            token.cancel();
        }
    }

    /// Whether a ramp currently occupies the slot.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.lock().active.is_some()
    }

    fn release(&self, id: u64) {
        let mut slot = self.lock();
        if slot.active.as_ref().is_some_and(|(active, _)| *active == id) {
            slot.active = None;
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FadeSlot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

async fn run_ramp(
    backend: &dyn AudioBackend,
    handle: SoundHandle,
    mut ramp: VolumeRamp,
    step: Duration,
    token: &CancellationToken,
) -> FadeOutcome {
    let mut ticker = tokio::time::interval_at(Instant::now() + step, step);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            () = token.cancelled() => return FadeOutcome::Cancelled,
            _ = ticker.tick() => {}
        }

        let Some(volume) = ramp.advance() else {
            return FadeOutcome::Completed;
        };
        if let Err(e) = backend.set_volume(handle, volume).await {
            debug!(%handle, error = %e, "Volume ramp aborted");
            return FadeOutcome::Aborted;
        }
        if ramp.is_finished() {
            return FadeOutcome::Completed;
        }
    }
}
