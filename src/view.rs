//! The flip container: owns the session, rotation, geometry, style and driver,
//! and routes driver events back into the session.

use crate::{
    anim_ease::Ease,
    animator::{DriverEvent, FlipDriver, RotationAnimator},
    compositor::{FrameReport, draw_flip},
    foundation::error::FlipResult,
    geometry::ViewportGeometry,
    overlay::OverlayStyle,
    render::FlipCanvas,
    session::{
        DEGREES_END, DEGREES_START, FlipListener, FlipOutcome, FlipSession, RotationState,
        TransitionId,
    },
    surface::Surface,
};

/// Options for a single flip request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FlipRequest {
    pub animated: bool,
    /// Flip even when the surface is already shown.
    pub force: bool,
}

impl Default for FlipRequest {
    fn default() -> Self {
        Self {
            animated: true,
            force: false,
        }
    }
}

impl FlipRequest {
    pub fn immediate() -> Self {
        Self {
            animated: false,
            force: false,
        }
    }

    pub fn forced(mut self) -> Self {
        self.force = true;
        self
    }
}

#[derive(Debug)]
pub struct FlipView<D: FlipDriver = RotationAnimator> {
    session: FlipSession,
    rotation: RotationState,
    geometry: ViewportGeometry,
    style: OverlayStyle,
    driver: D,
    needs_redraw: bool,
}

impl FlipView<RotationAnimator> {
    pub fn new(width: f64, height: f64) -> Self {
        Self::with_driver(RotationAnimator::default(), width, height)
    }
}

impl<D: FlipDriver> FlipView<D> {
    pub fn with_driver(driver: D, width: f64, height: f64) -> Self {
        Self {
            session: FlipSession::new(),
            rotation: RotationState::new(),
            geometry: ViewportGeometry::new(width, height),
            style: OverlayStyle::default(),
            driver,
            needs_redraw: true,
        }
    }

    /// Start out resting on `surface` without a transition.
    pub fn with_surface(mut self, surface: Surface) -> Self {
        self.session = FlipSession::with_surface(surface);
        self.rotation.set(DEGREES_END);
        self.needs_redraw = true;
        self
    }

    pub fn with_style(mut self, style: OverlayStyle) -> Self {
        self.style = style;
        self
    }

    pub fn session(&self) -> &FlipSession {
        &self.session
    }

    pub fn rotation(&self) -> &RotationState {
        &self.rotation
    }

    pub fn geometry(&self) -> &ViewportGeometry {
        &self.geometry
    }

    pub fn style(&self) -> &OverlayStyle {
        &self.style
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn needs_redraw(&self) -> bool {
        self.needs_redraw
    }

    pub fn set_listener(&mut self, listener: Option<Box<dyn FlipListener>>) {
        self.session.set_listener(listener);
    }

    pub fn set_flip_duration(&mut self, duration_ms: u64) {
        self.driver.set_duration(duration_ms);
    }

    pub fn set_easing(&mut self, ease: Ease) {
        self.driver.set_easing(ease);
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.geometry.resize(width, height);
        self.needs_redraw = true;
    }

    /// Flip to `surface`.
    ///
    /// An animated flip restarts the driver from 180 and delivers its start
    /// event right away. A non-animated flip lands on the surface at once and
    /// does not notify the listener.
    #[tracing::instrument(skip(self, surface), fields(tag = ?surface.tag()))]
    pub fn request_flip(
        &mut self,
        surface: Surface,
        request: FlipRequest,
    ) -> FlipResult<FlipOutcome> {
        let outcome = self.session.request_flip(surface, request.force);
        let Some(id) = outcome.id() else {
            return Ok(outcome);
        };

        self.driver.cancel();
        self.needs_redraw = true;
        if request.animated {
            self.rotation.set(DEGREES_START);
            self.driver.start(id, DEGREES_START, DEGREES_END);
            self.advance(0.0)?;
        } else {
            self.rotation.set(DEGREES_END);
            self.session.commit(id);
        }
        Ok(outcome)
    }

    /// Step the driver by `dt_ms` and apply its events.
    ///
    /// All events are applied even if a listener fails; the first failure is
    /// returned.
    pub fn advance(&mut self, dt_ms: f64) -> FlipResult<()> {
        let mut first_err = None;
        for event in self.driver.advance(dt_ms) {
            let result = match event {
                DriverEvent::Started(id) => self.on_start(id).map(|_| ()),
                DriverEvent::Tick(id, angle) => {
                    self.on_tick(id, angle);
                    Ok(())
                }
                DriverEvent::Ended(id) => self.on_end(id).map(|_| ()),
            };
            if let Err(err) = result {
                tracing::warn!(error = %err, "flip listener failed");
                first_err.get_or_insert(err);
            }
        }
        first_err.map_or(Ok(()), Err)
    }

    /// Driver value for transition `id`. Returns whether it was applied.
    pub fn on_tick(&mut self, id: TransitionId, angle: f64) -> bool {
        if self.session.transition_id() != Some(id) {
            return false;
        }
        if self.rotation.set(angle) {
            self.needs_redraw = true;
        }
        true
    }

    pub fn on_start(&mut self, id: TransitionId) -> FlipResult<bool> {
        self.session.on_animation_start(id)
    }

    /// Commit transition `id`. The rotation settles at 0 even if the driver
    /// never reported it.
    pub fn on_end(&mut self, id: TransitionId) -> FlipResult<bool> {
        if self.session.transition_id() != Some(id) {
            return Ok(false);
        }
        self.rotation.set(DEGREES_END);
        self.needs_redraw = true;
        self.session.on_animation_end(id)
    }

    /// Composite the current frame and clear the redraw request.
    #[tracing::instrument(skip(self, canvas), fields(angle = self.rotation.degrees()))]
    pub fn draw<C>(&mut self, canvas: &mut C) -> Option<FrameReport>
    where
        C: FlipCanvas + ?Sized,
    {
        self.needs_redraw = false;
        draw_flip(
            canvas,
            &self.session,
            &self.rotation,
            &self.geometry,
            &self.style,
        )
    }
}
