use crate::{
    camera::Projective,
    foundation::core::{Point, Rect, Rgba8},
    render::{
        FlipCanvas, FrameRGBA,
        composite::{over, rounded_rect_coverage, sample_bilinear},
    },
    surface::Surface,
};

#[derive(Clone, Copy, Debug)]
struct CanvasState {
    clip: Rect,
    transform: Projective,
}

/// Software canvas over a premultiplied RGBA8 buffer.
///
/// Every primitive is drawn by inverse-mapping device pixel centers through
/// the current transform, which handles the perspective strip the same way as
/// plain affine draws.
pub struct CpuCanvas {
    width: u32,
    height: u32,
    data: Vec<u8>,
    state: CanvasState,
    stack: Vec<CanvasState>,
}

impl CpuCanvas {
    pub fn new(width: u32, height: u32, clear: Rgba8) -> Self {
        let px = clear.to_premul();
        Self {
            width,
            height,
            data: px.repeat(width as usize * height as usize),
            state: CanvasState {
                clip: Rect::new(0.0, 0.0, f64::from(width), f64::from(height)),
                transform: Projective::IDENTITY,
            },
            stack: Vec::new(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Depth of the save stack; zero after a balanced frame.
    pub fn save_depth(&self) -> usize {
        self.stack.len()
    }

    /// Reset pixels and state for the next frame.
    pub fn clear(&mut self, color: Rgba8) {
        let px = color.to_premul();
        for d in self.data.chunks_exact_mut(4) {
            d.copy_from_slice(&px);
        }
        self.stack.clear();
        self.state = CanvasState {
            clip: Rect::new(0.0, 0.0, f64::from(self.width), f64::from(self.height)),
            transform: Projective::IDENTITY,
        };
    }

    pub fn frame(&self) -> FrameRGBA {
        FrameRGBA {
            width: self.width,
            height: self.height,
            data: self.data.clone(),
            premultiplied: true,
        }
    }

    pub fn into_frame(self) -> FrameRGBA {
        FrameRGBA {
            width: self.width,
            height: self.height,
            data: self.data,
            premultiplied: true,
        }
    }

    /// Visit device pixels whose centers fall in `clip ∩ local_bounds` mapped,
    /// handing `f` the pixel's location in local space.
    fn for_each_covered(
        &mut self,
        local_bounds: Rect,
        mut f: impl FnMut(Point) -> Option<([u8; 4], f32)>,
    ) {
        let transform = self.state.transform;
        let Some(inverse) = transform.inverse() else {
            return;
        };
        let Some(device) = transform.map_rect_bounds(local_bounds) else {
            return;
        };
        let region = self.state.clip.intersect(device);
        if region.width() <= 0.0 || region.height() <= 0.0 {
            return;
        }

        let (x_start, x_end) = pixel_span(region.x0, region.x1, self.width);
        let (y_start, y_end) = pixel_span(region.y0, region.y1, self.height);
        let stride = self.width as usize;

        for y in y_start..y_end {
            for x in x_start..x_end {
                let center = Point::new(f64::from(x) + 0.5, f64::from(y) + 0.5);
                let Some(local) = inverse.map_point(center) else {
                    continue;
                };
                let Some((src, opacity)) = f(local) else {
                    continue;
                };
                let idx = (y as usize * stride + x as usize) * 4;
                let dst = [
                    self.data[idx],
                    self.data[idx + 1],
                    self.data[idx + 2],
                    self.data[idx + 3],
                ];
                let out = over(dst, src, opacity);
                self.data[idx..idx + 4].copy_from_slice(&out);
            }
        }
    }
}

impl FlipCanvas for CpuCanvas {
    fn save(&mut self) {
        self.stack.push(self.state);
    }

    fn restore(&mut self) {
        if let Some(state) = self.stack.pop() {
            self.state = state;
        }
    }

    fn clip_rect(&mut self, rect: Rect) {
        let device = self
            .state
            .transform
            .map_rect_bounds(rect)
            .unwrap_or(Rect::ZERO);
        self.state.clip = self.state.clip.intersect(device);
    }

    fn concat(&mut self, transform: &Projective) {
        self.state.transform = self.state.transform * *transform;
    }

    fn fill_round_rect(&mut self, rect: Rect, radius: f64, color: Rgba8) {
        if color.a == 0 {
            return;
        }
        let src = color.to_premul();
        let rect = rect.abs();
        self.for_each_covered(rect, |local| {
            let coverage = rounded_rect_coverage(rect, radius, local);
            (coverage > 0.0).then_some((src, coverage))
        });
    }

    fn draw_surface(&mut self, surface: &Surface) {
        let image = surface.image();
        let bounds = image.bounds();
        if bounds.area() <= 0.0 {
            return;
        }
        self.for_each_covered(bounds, |local| {
            if local.x < 0.0 || local.y < 0.0 || local.x >= bounds.x1 || local.y >= bounds.y1 {
                return None;
            }
            Some((sample_bilinear(image, local.x - 0.5, local.y - 0.5), 1.0))
        });
    }
}

fn pixel_span(lo: f64, hi: f64, limit: u32) -> (u32, u32) {
    let clamp = |v: f64| v.clamp(0.0, f64::from(limit)) as u32;
    (clamp((lo - 0.5).ceil()), clamp((hi - 0.5).ceil()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{SurfaceImage, SurfaceTag};

    fn solid(tag: i64, w: u32, h: u32, color: Rgba8) -> Surface {
        Surface::new(SurfaceTag(tag), SurfaceImage::solid(w, h, color))
    }

    #[test]
    fn clip_limits_surface_draw() {
        let mut canvas = CpuCanvas::new(4, 4, Rgba8::BLACK);
        let red = solid(1, 4, 4, Rgba8::new(255, 0, 0, 255));
        canvas.save();
        canvas.clip_rect(Rect::new(0.0, 0.0, 4.0, 2.0));
        canvas.draw_surface(&red);
        canvas.restore();
        let frame = canvas.into_frame();
        assert_eq!(frame.pixel(0, 0), Some([255, 0, 0, 255]));
        assert_eq!(frame.pixel(3, 1), Some([255, 0, 0, 255]));
        assert_eq!(frame.pixel(0, 2), Some([0, 0, 0, 255]));
    }

    #[test]
    fn restore_undoes_clip_and_transform() {
        let mut canvas = CpuCanvas::new(4, 4, Rgba8::TRANSPARENT);
        canvas.save();
        canvas.clip_rect(Rect::new(0.0, 0.0, 1.0, 1.0));
        canvas.concat(&Projective::from_translation(2.0, 2.0));
        canvas.restore();
        canvas.restore();
        assert_eq!(canvas.save_depth(), 0);
        canvas.fill_round_rect(Rect::new(0.0, 0.0, 4.0, 4.0), 0.0, Rgba8::WHITE);
        let frame = canvas.frame();
        assert!(frame.data.chunks_exact(4).all(|px| px == [255, 255, 255, 255]));
    }

    #[test]
    fn translated_fill_lands_offset() {
        let mut canvas = CpuCanvas::new(4, 4, Rgba8::TRANSPARENT);
        canvas.concat(&Projective::from_translation(2.0, 0.0));
        canvas.fill_round_rect(Rect::new(0.0, 0.0, 1.0, 1.0), 0.0, Rgba8::WHITE);
        let frame = canvas.into_frame();
        assert_eq!(frame.pixel(2, 0), Some([255, 255, 255, 255]));
        assert_eq!(frame.pixel(0, 0), Some([0, 0, 0, 0]));
        assert_eq!(frame.pixel(3, 0), Some([0, 0, 0, 0]));
    }

    #[test]
    fn singular_transform_draws_nothing() {
        let mut canvas = CpuCanvas::new(4, 4, Rgba8::TRANSPARENT);
        canvas.concat(&crate::camera::build_transform(90.0, 4.0, 4.0));
        canvas.draw_surface(&solid(1, 4, 4, Rgba8::WHITE));
        assert!(canvas.frame().data.iter().all(|&b| b == 0));
    }

    #[test]
    fn tall_strip_near_edge_on_still_draws() {
        let (w, h) = (4_u32, 6000_u32);
        let mut canvas = CpuCanvas::new(w, h, Rgba8::TRANSPARENT);
        canvas.clip_rect(Rect::new(0.0, 3000.0, 4.0, 6000.0));
        canvas.concat(&crate::camera::build_transform(85.0, f64::from(w), f64::from(h)));
        canvas.draw_surface(&solid(1, w, h, Rgba8::WHITE));
        let frame = canvas.into_frame();
        assert_eq!(frame.pixel(2, 3000), Some([255, 255, 255, 255]));
        assert_eq!(frame.pixel(2, 2999), Some([0, 0, 0, 0]));
    }

    #[test]
    fn translucent_fill_blends() {
        let mut canvas = CpuCanvas::new(1, 1, Rgba8::WHITE);
        canvas.fill_round_rect(Rect::new(0.0, 0.0, 1.0, 1.0), 0.0, Rgba8::BLACK.with_alpha(128));
        assert_eq!(canvas.frame().pixel(0, 0), Some([127, 127, 127, 255]));
    }
}
