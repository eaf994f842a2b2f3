use crate::foundation::core::{Point, Rect};

/// Pixel size of the flip composite and the two static clip halves derived from it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportGeometry {
    pub width: f64,
    pub height: f64,
    pub top: Rect,
    pub bottom: Rect,
}

impl ViewportGeometry {
    pub fn new(width: f64, height: f64) -> Self {
        let width = sanitize(width);
        let height = sanitize(height);
        let (top, bottom) = compute_rects(width, height);
        Self {
            width,
            height,
            top,
            bottom,
        }
    }

    /// Recompute the halves after a size change.
    pub fn resize(&mut self, width: f64, height: f64) {
        *self = Self::new(width, height);
    }

    /// Zero-area viewports are skipped by the compositor.
    pub fn is_drawable(&self) -> bool {
        self.width >= 1.0 && self.height >= 1.0
    }

    pub fn center(&self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }
}

impl Default for ViewportGeometry {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

/// Split a `width x height` viewport along its horizontal midline.
///
/// The midline is floored to a whole pixel, so for odd heights the bottom half
/// is one pixel taller. The two rects always share the midline edge.
pub fn compute_rects(width: f64, height: f64) -> (Rect, Rect) {
    let width = sanitize(width);
    let height = sanitize(height);
    let mid = (height / 2.0).floor();
    (
        Rect::new(0.0, 0.0, width, mid),
        Rect::new(0.0, mid, width, height),
    )
}

fn sanitize(v: f64) -> f64 {
    if v.is_finite() { v.max(0.0) } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rects_tile_the_viewport() {
        for (w, h) in [(100.0, 200.0), (7.0, 13.0), (1.0, 1.0), (640.0, 361.0)] {
            let (top, bottom) = compute_rects(w, h);
            assert_eq!(top.y0, 0.0);
            assert_eq!(top.y1, bottom.y0);
            assert_eq!(bottom.y1, h);
            assert_eq!(top.x0, 0.0);
            assert_eq!(bottom.x1, w);
            assert!((top.height() - bottom.height()).abs() <= 1.0);
            assert_eq!(top.area() + bottom.area(), w * h);
        }
    }

    #[test]
    fn degenerate_sizes_do_not_panic() {
        let (top, bottom) = compute_rects(0.0, 0.0);
        assert_eq!(top.area(), 0.0);
        assert_eq!(bottom.area(), 0.0);

        let g = ViewportGeometry::new(-10.0, f64::NAN);
        assert_eq!(g.width, 0.0);
        assert_eq!(g.height, 0.0);
        assert!(!g.is_drawable());
    }

    #[test]
    fn resize_recomputes_halves() {
        let mut g = ViewportGeometry::new(100.0, 200.0);
        assert_eq!(g.top, Rect::new(0.0, 0.0, 100.0, 100.0));
        g.resize(50.0, 80.0);
        assert_eq!(g.top, Rect::new(0.0, 0.0, 50.0, 40.0));
        assert_eq!(g.bottom, Rect::new(0.0, 40.0, 50.0, 80.0));
        assert_eq!(g.center(), Point::new(25.0, 40.0));
    }
}
