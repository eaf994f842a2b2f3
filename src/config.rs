use std::path::Path;

use anyhow::Context as _;

use crate::{
    anim_ease::Ease,
    animator::{DEFAULT_FLIP_DURATION_MS, RotationAnimator},
    content::PanelStyle,
    foundation::{
        core::Rgba8,
        error::{FlipError, FlipResult},
    },
    overlay::OverlayStyle,
};

/// Everything needed to render a flip outside of an embedding application.
///
/// Every field has a default, so `{}` is a valid config file.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FlipConfig {
    pub duration_ms: u64,
    pub ease: Ease,
    pub style: OverlayStyle,
    pub panel: PanelStyle,
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    /// Color frames are flattened onto.
    pub background: Rgba8,
}

impl Default for FlipConfig {
    fn default() -> Self {
        Self {
            duration_ms: DEFAULT_FLIP_DURATION_MS,
            ease: Ease::default(),
            style: OverlayStyle::default(),
            panel: PanelStyle::default(),
            width: 120,
            height: 200,
            fps: 60.0,
            background: Rgba8::new(12, 12, 14, 255),
        }
    }
}

impl FlipConfig {
    pub fn from_json_str(s: &str) -> FlipResult<Self> {
        let cfg: Self = serde_json::from_str(s)
            .map_err(|e| FlipError::serde(format!("parse flip config: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_path(path: &Path) -> FlipResult<Self> {
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("read flip config '{}'", path.display()))?;
        Self::from_json_str(&s)
    }

    pub fn validate(&self) -> FlipResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(FlipError::validation("config width/height must be > 0"));
        }
        if self.width > u32::from(u16::MAX) || self.height > u32::from(u16::MAX) {
            return Err(FlipError::validation("config width/height must fit in u16"));
        }
        if !self.fps.is_finite() || self.fps <= 0.0 {
            return Err(FlipError::validation("config fps must be finite and > 0"));
        }
        self.style.validate()?;
        self.panel.validate()?;
        Ok(())
    }

    pub fn frame_ms(&self) -> f64 {
        1000.0 / self.fps
    }

    pub fn animator(&self) -> RotationAnimator {
        RotationAnimator::new(self.duration_ms, self.ease)
    }
}
