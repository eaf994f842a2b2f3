//! Split-flap flip transitions.
//!
//! A [`FlipView`] holds two surfaces and draws the flip between them in three
//! passes: the static top half, the static bottom half and a strip rotating
//! about the horizontal midline under a perspective camera, lit by shadow,
//! shade and shine overlays that follow the angle.
//!
//! Drawing goes through the [`FlipCanvas`] trait. [`CpuCanvas`] rasterizes
//! into premultiplied RGBA8 and [`DisplayList`] records calls for inspection.
#![forbid(unsafe_code)]

mod foundation;

pub mod anim_ease;
pub mod animator;
pub mod camera;
pub mod compositor;
pub mod config;
pub mod content;
pub mod encode_ffmpeg;
pub mod geometry;
pub mod overlay;
pub mod pipeline;
pub mod render;
pub mod session;
pub mod surface;
pub mod view;

pub use anim_ease::Ease;
pub use animator::{DEFAULT_FLIP_DURATION_MS, DriverEvent, FlipDriver, RotationAnimator};
pub use camera::{CAMERA_DISTANCE, Projective, build_transform, effective_rotation};
pub use compositor::{FrameReport, PassReport, StripReport, draw_flip};
pub use config::FlipConfig;
pub use content::{PLACEHOLDER_TAG, PanelStyle, digit_surface, panel_surface, placeholder_surface};
pub use foundation::core::{Affine, Point, Rect, Rgba8};
pub use foundation::error::{FlipError, FlipResult};
pub use geometry::{ViewportGeometry, compute_rects};
pub use overlay::{OverlayAlphas, OverlayPaint, OverlayStyle, StripLight, overlay_alphas};
pub use render::{FlipCanvas, FrameRGBA, cpu::CpuCanvas, display_list::DisplayList};
pub use session::{
    DEGREES_END, DEGREES_START, FlipListener, FlipOutcome, FlipSession, RotationState,
    SessionState, TransitionId,
};
pub use surface::{Attachment, LayerHint, Surface, SurfaceImage, SurfaceTag};
pub use view::{FlipRequest, FlipView};
