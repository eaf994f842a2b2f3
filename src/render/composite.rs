use crate::{
    foundation::core::{Point, Rect},
    surface::SurfaceImage,
};

pub type PremulRgba8 = [u8; 4];

/// Source-over of premultiplied `src` scaled by `opacity` onto `dst`.
pub fn over(dst: PremulRgba8, src: PremulRgba8, opacity: f32) -> PremulRgba8 {
    let opacity = opacity.clamp(0.0, 1.0);
    if opacity <= 0.0 || src[3] == 0 {
        return dst;
    }

    let op = ((opacity * 255.0).round() as i32).clamp(0, 255) as u16;
    let sa = mul_div255(u16::from(src[3]), op);
    if sa == 0 {
        return dst;
    }

    let inv = 255u16 - u16::from(sa);

    let mut out = [0u8; 4];
    out[3] = add_sat_u8(sa, mul_div255(u16::from(dst[3]), inv));

    for i in 0..3 {
        let sc = mul_div255(u16::from(src[i]), op);
        let dc = mul_div255(u16::from(dst[i]), inv);
        out[i] = add_sat_u8(sc, dc);
    }
    out
}

/// Bilinear sample in texel space; `(0, 0)` is the center of the first texel.
///
/// Texels outside the image contribute transparent black, which softens the
/// strip edges under perspective.
pub fn sample_bilinear(image: &SurfaceImage, x: f64, y: f64) -> PremulRgba8 {
    let x0 = x.floor();
    let y0 = y.floor();
    let fx = x - x0;
    let fy = y - y0;
    let (ix, iy) = (x0 as i64, y0 as i64);

    if fx == 0.0 && fy == 0.0 {
        return image.pixel(ix, iy);
    }

    let p00 = image.pixel(ix, iy);
    let p10 = image.pixel(ix + 1, iy);
    let p01 = image.pixel(ix, iy + 1);
    let p11 = image.pixel(ix + 1, iy + 1);

    let mut out = [0u8; 4];
    for i in 0..4 {
        let top = f64::from(p00[i]) * (1.0 - fx) + f64::from(p10[i]) * fx;
        let bottom = f64::from(p01[i]) * (1.0 - fx) + f64::from(p11[i]) * fx;
        out[i] = (top * (1.0 - fy) + bottom * fy).round().clamp(0.0, 255.0) as u8;
    }
    out
}

/// Approximate area coverage of `p` by a rounded rect, from its signed distance.
pub fn rounded_rect_coverage(rect: Rect, radius: f64, p: Point) -> f32 {
    let half_w = rect.width().abs() / 2.0;
    let half_h = rect.height().abs() / 2.0;
    if half_w == 0.0 || half_h == 0.0 {
        return 0.0;
    }
    let r = if radius.is_finite() {
        radius.clamp(0.0, half_w.min(half_h))
    } else {
        0.0
    };
    let c = rect.center();
    let qx = (p.x - c.x).abs() - (half_w - r);
    let qy = (p.y - c.y).abs() - (half_h - r);
    let outside = qx.max(0.0).hypot(qy.max(0.0));
    let inside = qx.max(qy).min(0.0);
    let d = outside + inside - r;
    (0.5 - d).clamp(0.0, 1.0) as f32
}

fn mul_div255(x: u16, y: u16) -> u8 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u8
}

fn add_sat_u8(a: u8, b: u8) -> u8 {
    a.saturating_add(b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::core::Rgba8;

    #[test]
    fn over_opacity_0_is_noop() {
        let dst = [1, 2, 3, 4];
        let src = [200, 200, 200, 200];
        assert_eq!(over(dst, src, 0.0), dst);
    }

    #[test]
    fn over_src_opaque_replaces_dst() {
        let dst = [0, 0, 0, 255];
        let src = [255, 0, 0, 255];
        assert_eq!(over(dst, src, 1.0), src);
    }

    #[test]
    fn over_half_black_darkens_white() {
        let out = over([255, 255, 255, 255], [0, 0, 0, 128], 1.0);
        assert_eq!(out, [127, 127, 127, 255]);
    }

    #[test]
    fn bilinear_at_texel_center_is_exact() {
        let img = SurfaceImage::new(2, 1, vec![255, 0, 0, 255, 0, 0, 255, 255]).unwrap();
        assert_eq!(sample_bilinear(&img, 0.0, 0.0), [255, 0, 0, 255]);
        assert_eq!(sample_bilinear(&img, 1.0, 0.0), [0, 0, 255, 255]);
        let mid = sample_bilinear(&img, 0.5, 0.0);
        assert_eq!(mid, [128, 0, 128, 255]);
    }

    #[test]
    fn bilinear_fades_past_the_edge() {
        let img = SurfaceImage::solid(1, 1, Rgba8::WHITE);
        let edge = sample_bilinear(&img, 0.5, 0.0);
        assert!(edge[3] > 0 && edge[3] < 255);
    }

    #[test]
    fn coverage_inside_outside_and_corner() {
        let r = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert_eq!(rounded_rect_coverage(r, 0.0, Point::new(5.0, 5.0)), 1.0);
        assert_eq!(rounded_rect_coverage(r, 0.0, Point::new(0.5, 0.5)), 1.0);
        assert_eq!(rounded_rect_coverage(r, 0.0, Point::new(10.5, 5.0)), 0.0);
        // The corner pixel is cut away by a large radius.
        assert_eq!(rounded_rect_coverage(r, 4.0, Point::new(0.5, 0.5)), 0.0);
        assert_eq!(rounded_rect_coverage(r, 4.0, Point::new(5.0, 0.5)), 1.0);
        assert_eq!(rounded_rect_coverage(Rect::ZERO, 0.0, Point::ZERO), 0.0);
    }
}
