use crate::{
    camera::{Projective, build_transform},
    foundation::core::Rect,
    geometry::ViewportGeometry,
    overlay::{OverlayAlphas, OverlayStyle, StripLight, overlay_alphas},
    render::{FlipCanvas, scoped},
    session::{FlipSession, RotationState},
    surface::{Surface, SurfaceTag},
};

/// What one static pass drew.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PassReport {
    pub surface: Option<SurfaceTag>,
    pub clip: Rect,
    pub shadow_alpha: u8,
}

/// What the rotating pass drew.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StripReport {
    pub surface: Option<SurfaceTag>,
    pub clip: Rect,
    pub transform: Projective,
    pub light: StripLight,
}

impl StripReport {
    /// On-screen height of the strip: its half of the viewport mapped through
    /// the camera, limited to the clip.
    pub fn projected_height(&self) -> f64 {
        self.transform
            .map_rect_bounds(self.clip)
            .map(|r| r.intersect(self.clip).height())
            .unwrap_or(0.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameReport {
    pub angle: f64,
    pub alphas: OverlayAlphas,
    pub top: PassReport,
    pub bottom: PassReport,
    pub strip: StripReport,
}

/// Draw one flip frame: static top, static bottom, then the rotating strip.
///
/// Each pass runs in its own save/restore scope. Returns `None` without
/// touching the canvas when the viewport has no area.
pub fn draw_flip<C>(
    canvas: &mut C,
    session: &FlipSession,
    rotation: &RotationState,
    geometry: &ViewportGeometry,
    style: &OverlayStyle,
) -> Option<FrameReport>
where
    C: FlipCanvas + ?Sized,
{
    if !geometry.is_drawable() {
        tracing::debug!(
            width = geometry.width,
            height = geometry.height,
            "skipping flip draw for empty viewport"
        );
        return None;
    }

    let angle = rotation.degrees();
    let alphas = overlay_alphas(angle, style);

    let top = draw_static_half(
        canvas,
        geometry.top,
        session.top_surface(),
        alphas.previous_shadow,
        style,
    );
    let bottom = draw_static_half(
        canvas,
        geometry.bottom,
        session.bottom_surface(),
        alphas.next_shadow,
        style,
    );
    let strip = draw_strip(canvas, session, angle, alphas.strip, geometry, style);

    Some(FrameReport {
        angle,
        alphas,
        top,
        bottom,
        strip,
    })
}

fn draw_static_half<C>(
    canvas: &mut C,
    half: Rect,
    surface: Option<&Surface>,
    shadow_alpha: u8,
    style: &OverlayStyle,
) -> PassReport
where
    C: FlipCanvas + ?Sized,
{
    scoped(canvas, |c| {
        c.clip_rect(half);
        if let Some(surface) = surface {
            c.draw_surface(surface);
        }
        if shadow_alpha > 0 {
            c.fill_round_rect(half, style.corner_radius, style.shadow.at(shadow_alpha));
        }
        PassReport {
            surface: surface.map(Surface::tag),
            clip: half,
            shadow_alpha,
        }
    })
}

fn draw_strip<C>(
    canvas: &mut C,
    session: &FlipSession,
    angle: f64,
    light: StripLight,
    geometry: &ViewportGeometry,
    style: &OverlayStyle,
) -> StripReport
where
    C: FlipCanvas + ?Sized,
{
    let clip = if angle > 90.0 {
        geometry.top
    } else {
        geometry.bottom
    };
    let surface = session.strip_surface(angle);
    let transform = build_transform(angle, geometry.width, geometry.height);

    scoped(canvas, |c| {
        c.clip_rect(clip);
        c.concat(&transform);
        if let Some(surface) = surface {
            c.draw_surface(surface);
        }
        // Lighting is drawn in the strip's rotated space.
        match light {
            StripLight::Shade(a) if a > 0 => {
                c.fill_round_rect(geometry.top, style.corner_radius, style.shade.at(a));
            }
            StripLight::Shine(a) if a > 0 => {
                c.fill_round_rect(geometry.bottom, style.corner_radius, style.shine.at(a));
            }
            _ => {}
        }
    });

    StripReport {
        surface: surface.map(Surface::tag),
        clip,
        transform,
        light,
    }
}
