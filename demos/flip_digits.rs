//! Counts down 9..0 on one flip view, the way a departure board ticks.
//!
//! Each flip runs on the default 300 ms decelerating animator at 60 fps; the
//! last frame of every flip is written to `target/flip_digits/`.

use std::path::PathBuf;

use splitflap::{
    CpuCanvas, FlipConfig, FlipListener, FlipRequest, FlipView, TransitionId, digit_surface,
    pipeline::write_png, placeholder_surface,
};

struct Announcer;

impl FlipListener for Announcer {
    fn on_flip_started(&mut self, id: TransitionId) -> anyhow::Result<()> {
        tracing::info!(id = id.0, "flip started");
        Ok(())
    }

    fn on_flip_ended(&mut self, id: TransitionId) -> anyhow::Result<()> {
        tracing::info!(id = id.0, "flip ended");
        Ok(())
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cfg = FlipConfig::default();
    let out_dir = PathBuf::from("target/flip_digits");

    let mut view = FlipView::with_driver(
        cfg.animator(),
        f64::from(cfg.width),
        f64::from(cfg.height),
    )
    .with_surface(placeholder_surface(cfg.width, cfg.height))
    .with_style(cfg.style);
    view.set_listener(Some(Box::new(Announcer)));

    let mut canvas = CpuCanvas::new(cfg.width, cfg.height, cfg.background);
    for digit in (0..=9u8).rev() {
        let surface = digit_surface(digit, cfg.width, cfg.height, &cfg.panel)?;
        view.request_flip(surface, FlipRequest::default())?;

        let mut frames = 0u32;
        while !view.session().is_idle() {
            view.advance(cfg.frame_ms())?;
            frames += 1;
        }

        canvas.clear(cfg.background);
        view.draw(&mut canvas);
        let path = out_dir.join(format!("digit_{digit}.png"));
        write_png(&canvas.frame(), cfg.background, &path)?;
        println!("{digit}: {frames} frames -> {}", path.display());
    }

    Ok(())
}
