//! Offline rendering of whole flips: single frames, frame sequences, PNG
//! directories and MP4 files.

use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::{
    compositor::draw_flip,
    config::FlipConfig,
    encode_ffmpeg::{Mp4Settings, Mp4Sink, ensure_parent_dir, flatten_over},
    foundation::{
        core::Rgba8,
        error::{FlipError, FlipResult},
    },
    geometry::ViewportGeometry,
    render::{FrameRGBA, cpu::CpuCanvas},
    session::{FlipSession, RotationState},
    surface::Surface,
    view::{FlipRequest, FlipView},
};

/// One frame of the flip `from -> to` frozen at `angle` degrees.
pub fn render_flip_frame(
    from: &Surface,
    to: &Surface,
    angle: f64,
    cfg: &FlipConfig,
) -> FlipResult<FrameRGBA> {
    cfg.validate()?;
    let mut session = FlipSession::with_surface(from.clone());
    session.request_flip(to.clone(), true);
    let mut rotation = RotationState::new();
    rotation.set(angle);

    let mut canvas = CpuCanvas::new(cfg.width, cfg.height, cfg.background);
    let geometry = ViewportGeometry::new(f64::from(cfg.width), f64::from(cfg.height));
    draw_flip(&mut canvas, &session, &rotation, &geometry, &cfg.style);
    Ok(canvas.into_frame())
}

/// Drive a full animated flip at `cfg.fps`, handing every frame to `sink`.
///
/// The first frame shows the flip at its start and the last one the committed
/// target. Returns the number of frames produced.
#[tracing::instrument(skip_all, fields(from = ?from.tag(), to = ?to.tag()))]
pub fn for_each_flip_frame(
    from: &Surface,
    to: &Surface,
    cfg: &FlipConfig,
    mut sink: impl FnMut(u64, &FrameRGBA) -> FlipResult<()>,
) -> FlipResult<u64> {
    cfg.validate()?;
    let animator = cfg.animator();
    let frame_ms = cfg.frame_ms();
    // One extra step covers the announce tick that consumes no time.
    let max_steps = animator.frames_for(frame_ms)? + 1;

    let mut view = FlipView::with_driver(animator, f64::from(cfg.width), f64::from(cfg.height))
        .with_surface(from.clone())
        .with_style(cfg.style);
    view.request_flip(to.clone(), FlipRequest::default().forced())?;

    let mut canvas = CpuCanvas::new(cfg.width, cfg.height, cfg.background);
    let mut index = 0u64;
    loop {
        canvas.clear(cfg.background);
        view.draw(&mut canvas);
        sink(index, &canvas.frame())?;
        index += 1;

        if view.session().is_idle() {
            break;
        }
        if index > max_steps {
            return Err(FlipError::render(format!(
                "flip did not settle within {max_steps} frames"
            )));
        }
        view.advance(frame_ms)?;
    }

    tracing::debug!(frames = index, "flip rendered");
    Ok(index)
}

pub fn render_flip_frames(
    from: &Surface,
    to: &Surface,
    cfg: &FlipConfig,
) -> FlipResult<Vec<FrameRGBA>> {
    let mut frames = Vec::new();
    for_each_flip_frame(from, to, cfg, |_, frame| {
        frames.push(frame.clone());
        Ok(())
    })?;
    Ok(frames)
}

/// Write `frame` as an opaque PNG.
pub fn write_png(frame: &FrameRGBA, background: Rgba8, path: &Path) -> FlipResult<()> {
    ensure_parent_dir(path)?;
    let mut rgba = Vec::new();
    flatten_over(frame, background, &mut rgba)?;
    image::save_buffer_with_format(
        path,
        &rgba,
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", path.display()))?;
    Ok(())
}

/// Render the flip into `dir/frame_0000.png`, `dir/frame_0001.png`, ...
pub fn render_flip_to_pngs(
    from: &Surface,
    to: &Surface,
    cfg: &FlipConfig,
    dir: &Path,
) -> FlipResult<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("create frame directory '{}'", dir.display()))?;
    let mut written = Vec::new();
    for_each_flip_frame(from, to, cfg, |i, frame| {
        let path = dir.join(format!("frame_{i:04}.png"));
        write_png(frame, cfg.background, &path)?;
        written.push(path);
        Ok(())
    })?;
    Ok(written)
}

pub fn render_flip_to_mp4(
    from: &Surface,
    to: &Surface,
    cfg: &FlipConfig,
    out: &Path,
) -> FlipResult<u64> {
    let settings = Mp4Settings::new(out, cfg.width, cfg.height, cfg.fps);
    let mut mp4 = Mp4Sink::open(settings, cfg.background)?;
    for_each_flip_frame(from, to, cfg, |_, frame| mp4.push(frame))?;
    mp4.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        anim_ease::Ease,
        surface::{SurfaceImage, SurfaceTag},
    };

    fn solid(tag: i64, color: Rgba8) -> Surface {
        Surface::new(SurfaceTag(tag), SurfaceImage::solid(20, 40, color))
    }

    fn cfg() -> FlipConfig {
        FlipConfig {
            width: 20,
            height: 40,
            fps: 50.0,
            ease: Ease::Linear,
            background: Rgba8::BLACK,
            ..FlipConfig::default()
        }
    }

    #[test]
    fn sequence_starts_on_source_and_ends_on_target() {
        let red = solid(1, Rgba8::new(255, 0, 0, 255));
        let blue = solid(2, Rgba8::new(0, 0, 255, 255));
        let frames = render_flip_frames(&red, &blue, &cfg()).unwrap();

        // 300 ms at 20 ms per frame, plus the starting frame.
        assert_eq!(frames.len(), 16);
        let first = &frames[0];
        let last = frames.last().unwrap();
        // Bottom half still shows the source when the flip starts.
        assert_eq!(first.pixel(10, 30), Some([255, 0, 0, 255]));
        assert_eq!(last.pixel(10, 5), Some([0, 0, 255, 255]));
        assert_eq!(last.pixel(10, 30), Some([0, 0, 255, 255]));
    }

    #[test]
    fn frozen_frame_matches_angle() {
        let red = solid(1, Rgba8::new(255, 0, 0, 255));
        let blue = solid(2, Rgba8::new(0, 0, 255, 255));
        let frame = render_flip_frame(&red, &blue, 0.0, &cfg()).unwrap();
        // At 0 the strip covers the bottom half with the target, unlit.
        assert_eq!(frame.pixel(10, 30), Some([0, 0, 255, 255]));
        assert_eq!(frame.pixel(10, 5), Some([0, 0, 255, 255]));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let red = solid(1, Rgba8::WHITE);
        let bad = FlipConfig {
            fps: -1.0,
            ..cfg()
        };
        assert!(render_flip_frame(&red, &red, 90.0, &bad).is_err());
    }
}
