//! Perspective camera for the rotating strip.
//!
//! The strip is a plane rotated about the horizontal axis through the viewport
//! center and seen through a pinhole camera. The result is a 3x3 projective
//! matrix acting on homogeneous 2D points, which a canvas concatenates onto
//! its current transform.

use std::ops::Mul;

use crate::foundation::core::{Affine, Point, Rect};

/// Camera distance from the plane in pixels (8 inches at 72 dpi).
pub const CAMERA_DISTANCE: f64 = 576.0;

const PRE_SCALE: f64 = 0.25;
const POST_SCALE: f64 = 4.0;

/// Below this homogeneous `w` a point is treated as behind the camera.
const W_EPSILON: f64 = 1e-9;

/// Near plane used when clipping rect bounds; kept above `W_EPSILON` so the
/// clipped corners still map.
const W_CLIP: f64 = 1e-6;

/// Row-major 3x3 projective transform.
///
/// A point `(x, y)` maps to `(x', y') = (X / W, Y / W)` where
/// `[X, Y, W] = m * [x, y, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projective {
    pub m: [[f64; 3]; 3],
}

impl Projective {
    pub const IDENTITY: Self = Self {
        m: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
    };

    pub const fn from_translation(tx: f64, ty: f64) -> Self {
        Self {
            m: [[1.0, 0.0, tx], [0.0, 1.0, ty], [0.0, 0.0, 1.0]],
        }
    }

    pub const fn from_scale(sx: f64, sy: f64) -> Self {
        Self {
            m: [[sx, 0.0, 0.0], [0.0, sy, 0.0], [0.0, 0.0, 1.0]],
        }
    }

    pub fn from_affine(a: Affine) -> Self {
        let [a, b, c, d, e, f] = a.as_coeffs();
        Self {
            m: [[a, c, e], [b, d, f], [0.0, 0.0, 1.0]],
        }
    }

    /// Rotate the plane by `degrees` about the x axis and project it through a
    /// camera `distance` pixels away. Positive angles tilt the lower edge
    /// toward the viewer.
    pub fn camera_rotate_x(degrees: f64, distance: f64) -> Self {
        let rad = degrees.to_radians();
        let sin = rad.sin();
        // cos(pi/2) is not exactly zero in f64; an edge-on plane must have no height.
        let cos = if (degrees.abs() - 90.0).abs() <= f64::EPSILON {
            0.0
        } else {
            rad.cos()
        };
        Self {
            m: [[1.0, 0.0, 0.0], [0.0, cos, 0.0], [0.0, -sin / distance, 1.0]],
        }
    }

    /// `Some` when the matrix has no perspective row.
    pub fn as_affine(&self) -> Option<Affine> {
        let m = &self.m;
        if m[2] != [0.0, 0.0, 1.0] {
            return None;
        }
        Some(Affine::new([
            m[0][0], m[1][0], m[0][1], m[1][1], m[0][2], m[1][2],
        ]))
    }

    pub fn map_point(&self, p: Point) -> Option<Point> {
        let m = &self.m;
        let w = m[2][0] * p.x + m[2][1] * p.y + m[2][2];
        if w <= W_EPSILON {
            return None;
        }
        let x = m[0][0] * p.x + m[0][1] * p.y + m[0][2];
        let y = m[1][0] * p.x + m[1][1] * p.y + m[1][2];
        Some(Point::new(x / w, y / w))
    }

    /// Bounding box of the part of `rect` in front of the camera, `None` if
    /// all of it is behind.
    ///
    /// Corners behind the camera are replaced by the points where the rect's
    /// edges cross the `w = W_CLIP` line, so a tall strip that passes over
    /// the camera still has bounds for its visible part.
    pub fn map_rect_bounds(&self, rect: Rect) -> Option<Rect> {
        let corners = [
            Point::new(rect.x0, rect.y0),
            Point::new(rect.x1, rect.y0),
            Point::new(rect.x1, rect.y1),
            Point::new(rect.x0, rect.y1),
        ];
        let mut out: Option<Rect> = None;
        let mut include = |p: Point| {
            if let Some(q) = self.map_point(p) {
                out = Some(match out {
                    None => Rect::from_points(q, q),
                    Some(r) => r.union_pt(q),
                });
            }
        };
        for (i, &a) in corners.iter().enumerate() {
            let b = corners[(i + 1) % corners.len()];
            let (wa, wb) = (self.w_at(a), self.w_at(b));
            if wa >= W_CLIP {
                include(a);
            }
            if (wa >= W_CLIP) != (wb >= W_CLIP) {
                let t = (W_CLIP - wa) / (wb - wa);
                include(a.lerp(b, t));
            }
        }
        out
    }

    fn w_at(&self, p: Point) -> f64 {
        let m = &self.m;
        m[2][0] * p.x + m[2][1] * p.y + m[2][2]
    }

    pub fn determinant(&self) -> f64 {
        let m = &self.m;
        m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
            - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
            + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
    }

    /// Inverse transform; `None` for singular matrices (an edge-on strip).
    pub fn inverse(&self) -> Option<Self> {
        let det = self.determinant();
        if !det.is_finite() || det.abs() < 1e-12 {
            return None;
        }
        let m = &self.m;
        let inv_det = 1.0 / det;
        let cof = |r0: usize, r1: usize, c0: usize, c1: usize| {
            m[r0][c0] * m[r1][c1] - m[r0][c1] * m[r1][c0]
        };
        Some(Self {
            m: [
                [
                    cof(1, 2, 1, 2) * inv_det,
                    -cof(0, 2, 1, 2) * inv_det,
                    cof(0, 1, 1, 2) * inv_det,
                ],
                [
                    -cof(1, 2, 0, 2) * inv_det,
                    cof(0, 2, 0, 2) * inv_det,
                    -cof(0, 1, 0, 2) * inv_det,
                ],
                [
                    cof(1, 2, 0, 1) * inv_det,
                    -cof(0, 2, 0, 1) * inv_det,
                    cof(0, 1, 0, 1) * inv_det,
                ],
            ],
        })
    }

    pub fn is_finite(&self) -> bool {
        self.m.iter().flatten().all(|v| v.is_finite())
    }
}

impl Default for Projective {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Projective {
    type Output = Self;

    /// `self * rhs` applies `rhs` first.
    fn mul(self, rhs: Self) -> Self {
        let a = &self.m;
        let b = &rhs.m;
        let mut out = [[0.0_f64; 3]; 3];
        for (i, row) in out.iter_mut().enumerate() {
            for (j, v) in row.iter_mut().enumerate() {
                *v = a[i][0] * b[0][j] + a[i][1] * b[1][j] + a[i][2] * b[2][j];
            }
        }
        Self { m: out }
    }
}

/// Rotation the camera applies for a given flip angle.
///
/// Past 90 degrees the strip shows the far side of the previous surface, so the
/// rotation is taken relative to 180.
pub fn effective_rotation(angle_degrees: f64) -> f64 {
    if angle_degrees > 90.0 {
        angle_degrees - 180.0
    } else {
        angle_degrees
    }
}

/// Transform for the rotating strip at `angle_degrees` in a `width x height`
/// viewport.
///
/// The camera matrix is conjugated by a 0.25 / 4.0 scale pair, which pushes the
/// effective focal distance out and keeps the projection stable near 90
/// degrees, then pivoted on the viewport center. The pivot is floored to
/// whole pixels so the hinge sits on the fold that [`compute_rects`] clips at.
///
/// [`compute_rects`]: crate::geometry::compute_rects
pub fn build_transform(angle_degrees: f64, width: f64, height: f64) -> Projective {
    let camera = Projective::camera_rotate_x(effective_rotation(angle_degrees), CAMERA_DISTANCE);
    let (cx, cy) = ((width / 2.0).floor(), (height / 2.0).floor());

    Projective::from_translation(cx, cy)
        * Projective::from_scale(POST_SCALE, POST_SCALE)
        * camera
        * Projective::from_scale(PRE_SCALE, PRE_SCALE)
        * Projective::from_translation(-cx, -cy)
}
