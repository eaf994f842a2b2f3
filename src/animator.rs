//! Drivers that move the flip angle over time.
//!
//! The flip view never reads a clock. A driver is advanced by the host with a
//! frame delta and answers with the events the view should apply, each tagged
//! with the transition it belongs to.

use crate::{
    anim_ease::Ease,
    foundation::error::{FlipError, FlipResult},
    session::TransitionId,
};

pub const DEFAULT_FLIP_DURATION_MS: u64 = 300;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DriverEvent {
    Started(TransitionId),
    Tick(TransitionId, f64),
    Ended(TransitionId),
}

/// Timing engine contract consumed by [`crate::FlipView`].
pub trait FlipDriver {
    /// Begin animating `from -> to` for transition `id`, replacing any run.
    fn start(&mut self, id: TransitionId, from: f64, to: f64);

    /// Advance by `dt_ms` milliseconds and return the resulting events.
    ///
    /// The first call after `start` announces the run and reports the start
    /// value without consuming `dt_ms`.
    fn advance(&mut self, dt_ms: f64) -> Vec<DriverEvent>;

    /// Stop the current run without emitting an end event.
    fn cancel(&mut self);

    fn set_duration(&mut self, duration_ms: u64);

    fn set_easing(&mut self, ease: Ease);

    fn is_running(&self) -> bool;
}

#[derive(Clone, Copy, Debug)]
struct Run {
    id: TransitionId,
    from: f64,
    to: f64,
    elapsed_ms: f64,
    announced: bool,
}

/// Value animator over a fixed duration with an easing curve.
#[derive(Clone, Debug)]
pub struct RotationAnimator {
    duration_ms: u64,
    ease: Ease,
    run: Option<Run>,
}

impl Default for RotationAnimator {
    fn default() -> Self {
        Self::new(DEFAULT_FLIP_DURATION_MS, Ease::default())
    }
}

impl RotationAnimator {
    pub fn new(duration_ms: u64, ease: Ease) -> Self {
        Self {
            duration_ms,
            ease,
            run: None,
        }
    }

    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    pub fn ease(&self) -> Ease {
        self.ease
    }

    /// Value the animation would report after `elapsed_ms`.
    pub fn value_at(&self, from: f64, to: f64, elapsed_ms: f64) -> f64 {
        let t = self.progress(elapsed_ms);
        from + (to - from) * self.ease.apply(t)
    }

    /// Number of `frame_ms` steps needed to finish a run.
    pub fn frames_for(&self, frame_ms: f64) -> FlipResult<u64> {
        if !frame_ms.is_finite() || frame_ms <= 0.0 {
            return Err(FlipError::validation("frame duration must be finite and > 0"));
        }
        Ok((self.duration_ms as f64 / frame_ms).ceil().max(1.0) as u64)
    }

    fn progress(&self, elapsed_ms: f64) -> f64 {
        if self.duration_ms == 0 {
            return 1.0;
        }
        (elapsed_ms / self.duration_ms as f64).clamp(0.0, 1.0)
    }
}

impl FlipDriver for RotationAnimator {
    fn start(&mut self, id: TransitionId, from: f64, to: f64) {
        self.run = Some(Run {
            id,
            from,
            to,
            elapsed_ms: 0.0,
            announced: false,
        });
    }

    fn advance(&mut self, dt_ms: f64) -> Vec<DriverEvent> {
        let Some(mut run) = self.run else {
            return Vec::new();
        };

        let mut events = Vec::with_capacity(3);
        if !run.announced {
            run.announced = true;
            events.push(DriverEvent::Started(run.id));
        } else if dt_ms.is_finite() {
            run.elapsed_ms += dt_ms.max(0.0);
        }

        let value = self.value_at(run.from, run.to, run.elapsed_ms);
        events.push(DriverEvent::Tick(run.id, value));

        if self.progress(run.elapsed_ms) >= 1.0 {
            events.push(DriverEvent::Ended(run.id));
            self.run = None;
        } else {
            self.run = Some(run);
        }
        events
    }

    fn cancel(&mut self) {
        self.run = None;
    }

    fn set_duration(&mut self, duration_ms: u64) {
        self.duration_ms = duration_ms;
    }

    fn set_easing(&mut self, ease: Ease) {
        self.ease = ease;
    }

    fn is_running(&self) -> bool {
        self.run.is_some()
    }
}
