/// Timing curves for the flip angle, applied to normalized time in `[0, 1]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Ease {
    Linear,
    /// Starts slow, ends fast: `t^2`.
    Accelerate,
    /// Starts fast, settles gently: `1 - (1 - t)^2`.
    #[default]
    Decelerate,
    /// Cosine ramp, slow at both ends.
    AccelerateDecelerate,
    /// Lands and rebounds a few times, like a flap hitting its stop.
    Bounce,
}

impl Ease {
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::Accelerate => t * t,
            Self::Decelerate => 1.0 - (1.0 - t) * (1.0 - t),
            Self::AccelerateDecelerate => ((t + 1.0) * std::f64::consts::PI).cos() / 2.0 + 0.5,
            Self::Bounce => bounce(t),
        }
    }

    /// Whether the curve never moves backwards.
    pub fn is_monotonic(self) -> bool {
        !matches!(self, Self::Bounce)
    }
}

fn bounce(t: f64) -> f64 {
    if t >= 1.0 {
        return 1.0;
    }
    let arc = |x: f64| x * x * 8.0;
    let t = t * 1.1226;
    if t < 0.3535 {
        arc(t)
    } else if t < 0.7408 {
        arc(t - 0.54719) + 0.7
    } else if t < 0.9644 {
        arc(t - 0.8526) + 0.9
    } else {
        arc(t - 1.0435) + 0.95
    }
}
