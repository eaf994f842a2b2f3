//! Canvas abstraction the compositor draws through, and its backends.
//!
//! - [`cpu::CpuCanvas`] rasterizes into premultiplied RGBA8.
//! - [`display_list::DisplayList`] records resolved draw calls for inspection.

pub mod composite;
pub mod cpu;
pub mod display_list;

use crate::{
    camera::Projective,
    foundation::core::{Rect, Rgba8},
    surface::Surface,
};

/// A rendered frame.
#[derive(Clone, Debug)]
pub struct FrameRGBA {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
    pub premultiplied: bool,
}

impl FrameRGBA {
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        Some([
            self.data[idx],
            self.data[idx + 1],
            self.data[idx + 2],
            self.data[idx + 3],
        ])
    }
}

/// 2D drawing target with a save/restore stack of clip and transform.
///
/// Clips are axis-aligned in device space; `clip_rect` under a non-trivial
/// transform clips to the bounds of the mapped rect.
pub trait FlipCanvas {
    fn save(&mut self);

    /// Pop the last saved state. Unbalanced restores are ignored.
    fn restore(&mut self);

    fn clip_rect(&mut self, rect: Rect);

    /// Pre-concatenate `transform` onto the current transform.
    fn concat(&mut self, transform: &Projective);

    /// Fill a rounded rect with `color` (straight alpha) in the current space.
    fn fill_round_rect(&mut self, rect: Rect, radius: f64, color: Rgba8);

    /// Draw the surface's image with its top-left at the local origin.
    fn draw_surface(&mut self, surface: &Surface);
}

/// Run `f` between a save and its matching restore.
pub fn scoped<C, R>(canvas: &mut C, f: impl FnOnce(&mut C) -> R) -> R
where
    C: FlipCanvas + ?Sized,
{
    canvas.save();
    let out = f(canvas);
    canvas.restore();
    out
}
