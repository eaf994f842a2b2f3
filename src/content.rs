//! Surface content for the demo and the CLI: flat panels and seven-segment
//! digits, rasterized with `vello_cpu`.

use vello_cpu::kurbo::Shape as _;

use crate::{
    foundation::{
        core::Rgba8,
        error::{FlipError, FlipResult},
    },
    surface::{Surface, SurfaceImage, SurfaceTag},
};

/// Tag of the empty surface a view rests on before its first flip.
pub const PLACEHOLDER_TAG: SurfaceTag = SurfaceTag(-1);

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PanelStyle {
    pub background: Rgba8,
    pub ink: Rgba8,
    pub corner_radius: f64,
    /// Line across the fold. Skipped when fully transparent.
    pub hinge: Rgba8,
}

impl Default for PanelStyle {
    fn default() -> Self {
        Self {
            background: Rgba8::new(34, 34, 38, 255),
            ink: Rgba8::new(240, 236, 224, 255),
            corner_radius: 8.0,
            hinge: Rgba8::new(0, 0, 0, 160),
        }
    }
}

impl PanelStyle {
    pub fn validate(&self) -> FlipResult<()> {
        if !self.corner_radius.is_finite() || self.corner_radius < 0.0 {
            return Err(FlipError::validation(
                "panel corner_radius must be finite and >= 0",
            ));
        }
        Ok(())
    }
}

/// Rasterize `paint` into a fresh transparent `width x height` image.
pub fn render_content(
    width: u32,
    height: u32,
    paint: impl FnOnce(&mut vello_cpu::RenderContext),
) -> FlipResult<SurfaceImage> {
    let w = content_dim(width, "width")?;
    let h = content_dim(height, "height")?;

    let mut ctx = vello_cpu::RenderContext::new(w, h);
    paint(&mut ctx);
    ctx.flush();

    let mut pixmap = vello_cpu::Pixmap::new(w, h);
    ctx.render_to_pixmap(&mut pixmap);
    SurfaceImage::new(width, height, pixmap.data_as_u8_slice().to_vec())
}

fn content_dim(v: u32, what: &str) -> FlipResult<u16> {
    if v == 0 {
        return Err(FlipError::validation(format!("content {what} must be > 0")));
    }
    v.try_into()
        .map_err(|_| FlipError::validation(format!("content {what} exceeds u16")))
}

/// Blank surface used before anything has been shown.
pub fn placeholder_surface(width: u32, height: u32) -> Surface {
    Surface::new(
        PLACEHOLDER_TAG,
        SurfaceImage::solid(width, height, Rgba8::TRANSPARENT),
    )
}

pub fn panel_surface(
    tag: SurfaceTag,
    width: u32,
    height: u32,
    style: &PanelStyle,
) -> FlipResult<Surface> {
    style.validate()?;
    let image = render_content(width, height, |ctx| {
        paint_panel(ctx, f64::from(width), f64::from(height), style);
    })?;
    Ok(Surface::new(tag, image))
}

// Bit order a..g: top, upper right, lower right, bottom, lower left, upper left, middle.
const DIGIT_SEGMENTS: [u8; 10] = [
    0x3F, 0x06, 0x5B, 0x4F, 0x66, 0x6D, 0x7D, 0x07, 0x7F, 0x6F,
];

/// Panel showing `digit` in seven-segment style, tagged with the digit value.
pub fn digit_surface(digit: u8, width: u32, height: u32, style: &PanelStyle) -> FlipResult<Surface> {
    let Some(&mask) = DIGIT_SEGMENTS.get(usize::from(digit)) else {
        return Err(FlipError::validation(format!(
            "digit must be 0..=9, got {digit}"
        )));
    };
    style.validate()?;

    let (w, h) = (f64::from(width), f64::from(height));
    let image = render_content(width, height, |ctx| {
        paint_panel(ctx, w, h, style);
        ctx.set_paint(color_to_cpu(style.ink));
        for rect in segment_rects(w, h)
            .into_iter()
            .enumerate()
            .filter(|(bit, _)| mask & (1 << bit) != 0)
            .map(|(_, r)| r)
        {
            ctx.fill_rect(&rect);
        }
    })?;
    Ok(Surface::new(SurfaceTag(i64::from(digit)), image))
}

fn paint_panel(ctx: &mut vello_cpu::RenderContext, w: f64, h: f64, style: &PanelStyle) {
    let radius = style.corner_radius.min(w.min(h) / 2.0);
    let panel = vello_cpu::kurbo::RoundedRect::new(0.0, 0.0, w, h, radius);
    ctx.set_paint(color_to_cpu(style.background));
    ctx.fill_path(&panel.to_path(0.1));

    if style.hinge.a > 0 {
        let mid = (h / 2.0).floor();
        ctx.set_paint(color_to_cpu(style.hinge));
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, mid - 0.5, w, mid + 0.5));
    }
}

fn segment_rects(w: f64, h: f64) -> [vello_cpu::kurbo::Rect; 7] {
    use vello_cpu::kurbo::Rect;

    let (x0, x1) = (w * 0.25, w * 0.75);
    let (y0, y1) = (h * 0.15, h * 0.85);
    let t = w.min(h) * 0.08;
    let mid = (y0 + y1) / 2.0;
    let half = t / 2.0;
    [
        Rect::new(x0 + t, y0, x1 - t, y0 + t),
        Rect::new(x1 - t, y0 + t, x1, mid - half),
        Rect::new(x1 - t, mid + half, x1, y1 - t),
        Rect::new(x0 + t, y1 - t, x1 - t, y1),
        Rect::new(x0, mid + half, x0 + t, y1 - t),
        Rect::new(x0, y0 + t, x0 + t, mid - half),
        Rect::new(x0 + t, mid - half, x1 - t, mid + half),
    ]
}

fn color_to_cpu(c: Rgba8) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a)
}
