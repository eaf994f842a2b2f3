use crate::foundation::{
    core::Rgba8,
    error::{FlipError, FlipResult},
};

/// Fill color plus the alpha it reaches at full strength (0..=255).
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct OverlayPaint {
    pub color: Rgba8,
    pub max_alpha: u8,
}

impl OverlayPaint {
    pub const fn new(color: Rgba8, max_alpha: u8) -> Self {
        Self { color, max_alpha }
    }

    /// Paint color at `alpha`, ignoring the color's own alpha channel.
    pub fn at(self, alpha: u8) -> Rgba8 {
        self.color.with_alpha(alpha)
    }
}

/// Lighting overlays for the flip.
///
/// Shadow darkens the static halves, shade and shine light the rotating strip.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct OverlayStyle {
    pub shadow: OverlayPaint,
    pub shade: OverlayPaint,
    pub shine: OverlayPaint,
    pub corner_radius: f64,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            shadow: OverlayPaint::new(Rgba8::BLACK, 180),
            shade: OverlayPaint::new(Rgba8::BLACK, 130),
            shine: OverlayPaint::new(Rgba8::WHITE, 100),
            corner_radius: 0.0,
        }
    }
}

impl OverlayStyle {
    pub fn with_corner_radius(mut self, radius: f64) -> Self {
        self.corner_radius = radius;
        self
    }

    pub fn validate(&self) -> FlipResult<()> {
        if !self.corner_radius.is_finite() || self.corner_radius < 0.0 {
            return Err(FlipError::validation(
                "overlay corner_radius must be finite and >= 0",
            ));
        }
        Ok(())
    }
}

/// Which lighting the rotating strip receives at a given angle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub enum StripLight {
    /// Angle >= 90: previous surface, drawn over the top half.
    Shade(u8),
    /// Angle < 90: target surface, drawn over the bottom half.
    Shine(u8),
}

impl StripLight {
    pub fn alpha(self) -> u8 {
        match self {
            Self::Shade(a) | Self::Shine(a) => a,
        }
    }
}

/// All overlay alphas for one frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct OverlayAlphas {
    pub previous_shadow: u8,
    pub next_shadow: u8,
    pub strip: StripLight,
}

pub fn overlay_alphas(angle: f64, style: &OverlayStyle) -> OverlayAlphas {
    let strip = if angle < 90.0 {
        StripLight::Shine(shine_alpha(angle, style.shine.max_alpha))
    } else {
        StripLight::Shade(shade_alpha(angle, style.shade.max_alpha))
    };
    OverlayAlphas {
        previous_shadow: previous_shadow_alpha(angle, style.shadow.max_alpha),
        next_shadow: next_shadow_alpha(angle, style.shadow.max_alpha),
        strip,
    }
}

/// Shadow over the resting top half while the previous strip is still up.
pub fn previous_shadow_alpha(angle: f64, cap: u8) -> u8 {
    if angle > 90.0 {
        scaled((angle - 90.0) / 90.0, cap)
    } else {
        0
    }
}

/// Shadow over the bottom half while the target strip comes down onto it.
pub fn next_shadow_alpha(angle: f64, cap: u8) -> u8 {
    if angle < 90.0 {
        scaled((angle - 90.0).abs() / 90.0, cap)
    } else {
        0
    }
}

pub fn shine_alpha(angle: f64, cap: u8) -> u8 {
    scaled(angle / 90.0, cap)
}

pub fn shade_alpha(angle: f64, cap: u8) -> u8 {
    scaled((angle - 180.0).abs() / 90.0, cap)
}

// Truncates like an int cast of the float product, then clamps into paint range.
fn scaled(fraction: f64, cap: u8) -> u8 {
    let v = fraction * f64::from(cap);
    if v.is_nan() {
        return 0;
    }
    v.clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shadows_are_never_both_visible() {
        let style = OverlayStyle::default();
        for tenth in 0..=1800 {
            let a = f64::from(tenth) / 10.0;
            let o = overlay_alphas(a, &style);
            assert!(
                o.previous_shadow == 0 || o.next_shadow == 0,
                "both shadows at {a}"
            );
        }
    }

    #[test]
    fn shadow_endpoints() {
        assert_eq!(previous_shadow_alpha(180.0, 180), 180);
        assert_eq!(previous_shadow_alpha(90.0, 180), 0);
        assert_eq!(previous_shadow_alpha(135.0, 180), 90);
        assert_eq!(next_shadow_alpha(0.0, 180), 180);
        assert_eq!(next_shadow_alpha(90.0, 180), 0);
        assert_eq!(next_shadow_alpha(45.0, 180), 90);
    }

    #[test]
    fn shine_and_shade_boundaries() {
        assert_eq!(shine_alpha(0.0, 100), 0);
        assert_eq!(shine_alpha(89.999, 100), 99);
        assert_eq!(shade_alpha(180.0, 130), 0);
        assert_eq!(shade_alpha(90.001, 130), 129);
        assert_eq!(shade_alpha(90.0, 130), 130);
    }

    #[test]
    fn strip_light_switches_at_ninety() {
        let style = OverlayStyle::default();
        assert!(matches!(overlay_alphas(89.0, &style).strip, StripLight::Shine(_)));
        assert!(matches!(overlay_alphas(90.0, &style).strip, StripLight::Shade(_)));
        assert_eq!(overlay_alphas(180.0, &style).strip, StripLight::Shade(0));
        assert_eq!(overlay_alphas(0.0, &style).strip, StripLight::Shine(0));
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        assert_eq!(shine_alpha(-30.0, 100), 0);
        assert_eq!(shade_alpha(f64::NAN, 130), 0);
        assert_eq!(previous_shadow_alpha(900.0, 255), 255);
    }

    #[test]
    fn style_validation_rejects_negative_radius() {
        assert!(OverlayStyle::default().validate().is_ok());
        assert!(
            OverlayStyle::default()
                .with_corner_radius(-1.0)
                .validate()
                .is_err()
        );
    }

    #[test]
    fn style_deserializes_partial_json() {
        let style: OverlayStyle = serde_json::from_str(r#"{"corner_radius": 6.0}"#).unwrap();
        assert_eq!(style.corner_radius, 6.0);
        assert_eq!(style.shadow.max_alpha, 180);
    }
}
