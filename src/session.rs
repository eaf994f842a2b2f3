//! Surface bookkeeping across flip transitions.
//!
//! A session is either resting on one surface or transitioning from a previous
//! surface to a target. Requests that arrive mid-transition are coalesced: the
//! newest request replaces the in-flight target and gets a fresh
//! [`TransitionId`], and driver events carrying an older id are ignored.

use crate::{
    foundation::error::{FlipError, FlipResult},
    surface::{LayerHint, Surface},
};

/// Angle at which a flip starts: the previous surface fully shown.
pub const DEGREES_START: f64 = 180.0;
/// Angle at which a flip ends: the target fully shown.
pub const DEGREES_END: f64 = 0.0;

/// Flip progress in degrees, always within `[0, 180]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RotationState {
    degrees: f64,
}

impl RotationState {
    pub fn new() -> Self {
        Self {
            degrees: DEGREES_START,
        }
    }

    pub fn degrees(&self) -> f64 {
        self.degrees
    }

    /// Store a driver value, clamped into range. NaN is ignored.
    ///
    /// Returns whether the stored angle changed.
    pub fn set(&mut self, degrees: f64) -> bool {
        if degrees.is_nan() {
            return false;
        }
        let clamped = degrees.clamp(DEGREES_END, DEGREES_START);
        let changed = clamped != self.degrees;
        self.degrees = clamped;
        changed
    }
}

impl Default for RotationState {
    fn default() -> Self {
        Self::new()
    }
}

/// Identity of one flip transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TransitionId(pub u64);

/// Receives flip lifecycle notifications.
///
/// Errors are reported back to whoever drove the session; they never stop the
/// transition itself.
pub trait FlipListener {
    fn on_flip_started(&mut self, id: TransitionId) -> anyhow::Result<()>;

    fn on_flip_ended(&mut self, id: TransitionId) -> anyhow::Result<()>;
}

#[derive(Debug)]
pub enum SessionState {
    Idle {
        current: Option<Surface>,
    },
    Transitioning {
        id: TransitionId,
        previous: Option<Surface>,
        target: Surface,
    },
}

/// What a flip request did to the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlipOutcome {
    /// The requested surface is already shown (or already the target).
    NoOp,
    Started {
        id: TransitionId,
    },
    /// Replaced the target of a running transition.
    Retargeted {
        id: TransitionId,
        superseded: TransitionId,
    },
}

impl FlipOutcome {
    pub fn id(self) -> Option<TransitionId> {
        match self {
            Self::NoOp => None,
            Self::Started { id } | Self::Retargeted { id, .. } => Some(id),
        }
    }
}

pub struct FlipSession {
    state: SessionState,
    next_id: u64,
    listener: Option<Box<dyn FlipListener>>,
}

impl std::fmt::Debug for FlipSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlipSession")
            .field("state", &self.state)
            .field("next_id", &self.next_id)
            .field("has_listener", &self.listener.is_some())
            .finish()
    }
}

impl Default for FlipSession {
    fn default() -> Self {
        Self::new()
    }
}

impl FlipSession {
    pub fn new() -> Self {
        Self {
            state: SessionState::Idle { current: None },
            next_id: 1,
            listener: None,
        }
    }

    /// Session resting on `surface` (a placeholder, for instance).
    pub fn with_surface(mut surface: Surface) -> Self {
        surface.attach();
        Self {
            state: SessionState::Idle {
                current: Some(surface),
            },
            next_id: 1,
            listener: None,
        }
    }

    pub fn set_listener(&mut self, listener: Option<Box<dyn FlipListener>>) {
        self.listener = listener;
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, SessionState::Idle { .. })
    }

    pub fn transition_id(&self) -> Option<TransitionId> {
        match &self.state {
            SessionState::Idle { .. } => None,
            SessionState::Transitioning { id, .. } => Some(*id),
        }
    }

    /// Resting surface when idle.
    pub fn current(&self) -> Option<&Surface> {
        match &self.state {
            SessionState::Idle { current } => current.as_ref(),
            SessionState::Transitioning { .. } => None,
        }
    }

    /// Surface being flipped to, while transitioning.
    pub fn target(&self) -> Option<&Surface> {
        match &self.state {
            SessionState::Idle { .. } => None,
            SessionState::Transitioning { target, .. } => Some(target),
        }
    }

    /// Surface being flipped away from, while transitioning.
    pub fn previous(&self) -> Option<&Surface> {
        match &self.state {
            SessionState::Idle { .. } => None,
            SessionState::Transitioning { previous, .. } => previous.as_ref(),
        }
    }

    /// Surface resting in the top half: the target once a flip is underway.
    pub fn top_surface(&self) -> Option<&Surface> {
        match &self.state {
            SessionState::Idle { current } => current.as_ref(),
            SessionState::Transitioning { target, .. } => Some(target),
        }
    }

    /// Surface resting in the bottom half: the previous one until commit.
    pub fn bottom_surface(&self) -> Option<&Surface> {
        match &self.state {
            SessionState::Idle { current } => current.as_ref(),
            SessionState::Transitioning { previous, .. } => previous.as_ref(),
        }
    }

    /// Surface on the rotating strip at `angle`.
    pub fn strip_surface(&self, angle: f64) -> Option<&Surface> {
        if angle > 90.0 {
            self.bottom_surface()
        } else {
            self.top_surface()
        }
    }

    /// Accept a new surface.
    ///
    /// Flipping to the surface already shown (or already targeted) is a no-op
    /// unless `force` is set.
    pub fn request_flip(&mut self, mut surface: Surface, force: bool) -> FlipOutcome {
        let id = TransitionId(self.next_id);

        match &mut self.state {
            SessionState::Idle { current } => {
                if !force && current.as_ref().is_some_and(|c| c.same_identity(&surface)) {
                    tracing::debug!(tag = ?surface.tag(), "flip to current surface skipped");
                    return FlipOutcome::NoOp;
                }

                self.next_id += 1;
                surface.attach();
                surface.set_layer_hint(LayerHint::Cached);
                let mut previous = current.take();
                if let Some(p) = previous.as_mut() {
                    p.set_layer_hint(LayerHint::Cached);
                }
                tracing::debug!(?id, tag = ?surface.tag(), "flip started");
                self.state = SessionState::Transitioning {
                    id,
                    previous,
                    target: surface,
                };
                FlipOutcome::Started { id }
            }
            SessionState::Transitioning {
                id: running,
                target,
                ..
            } => {
                if !force && target.same_identity(&surface) {
                    tracing::debug!(tag = ?surface.tag(), "flip to in-flight target skipped");
                    return FlipOutcome::NoOp;
                }

                self.next_id += 1;
                let superseded = *running;
                surface.attach();
                surface.set_layer_hint(LayerHint::Cached);
                let mut discarded = std::mem::replace(target, surface);
                discarded.detach();
                *running = id;
                tracing::debug!(?id, ?superseded, "flip retargeted");
                FlipOutcome::Retargeted { id, superseded }
            }
        }
    }

    /// Driver reported the animation for `id` started.
    ///
    /// Returns `Ok(false)` for events of a superseded transition.
    pub fn on_animation_start(&mut self, id: TransitionId) -> FlipResult<bool> {
        if self.transition_id() != Some(id) {
            tracing::debug!(?id, "stale animation start ignored");
            return Ok(false);
        }
        if let Some(listener) = self.listener.as_mut() {
            listener
                .on_flip_started(id)
                .map_err(|e| FlipError::listener("flip_started", e))?;
        }
        Ok(true)
    }

    /// Driver reported the animation for `id` ended: commit, then notify.
    ///
    /// The commit happens even when the listener fails.
    pub fn on_animation_end(&mut self, id: TransitionId) -> FlipResult<bool> {
        if !self.commit(id) {
            tracing::debug!(?id, "stale animation end ignored");
            return Ok(false);
        }
        if let Some(listener) = self.listener.as_mut() {
            listener
                .on_flip_ended(id)
                .map_err(|e| FlipError::listener("flip_ended", e))?;
        }
        Ok(true)
    }

    /// Promote the target of transition `id` and release the previous surface.
    pub(crate) fn commit(&mut self, id: TransitionId) -> bool {
        if self.transition_id() != Some(id) {
            return false;
        }
        let state = std::mem::replace(&mut self.state, SessionState::Idle { current: None });
        let SessionState::Transitioning {
            previous,
            mut target,
            ..
        } = state
        else {
            return false;
        };
        if let Some(mut previous) = previous {
            previous.detach();
        }
        target.set_layer_hint(LayerHint::None);
        tracing::debug!(?id, tag = ?target.tag(), "flip committed");
        self.state = SessionState::Idle {
            current: Some(target),
        };
        true
    }
}
