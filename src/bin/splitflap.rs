use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use splitflap::{FlipConfig, Surface};

#[derive(Parser, Debug)]
#[command(name = "splitflap", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the flip between two digits frozen at one angle, as a PNG.
    Frame(FrameArgs),
    /// Render a whole flip to a directory of PNGs, or to an MP4 (requires `ffmpeg` on PATH).
    Render(RenderArgs),
}

#[derive(Parser, Debug)]
struct FlipArgs {
    /// Digit shown before the flip.
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=9))]
    from: u8,

    /// Digit shown after the flip.
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=9))]
    to: u8,

    /// Flip config JSON. Defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    #[command(flatten)]
    flip: FlipArgs,

    /// Flip angle in degrees: 180 shows `from`, 0 shows `to`.
    #[arg(long)]
    angle: f64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    #[command(flatten)]
    flip: FlipArgs,

    /// Output directory for PNG frames, or a `.mp4` file.
    #[arg(long)]
    out: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Render(args) => cmd_render(args),
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<FlipConfig> {
    let cfg = match path {
        Some(p) => FlipConfig::from_path(p)
            .with_context(|| format!("load config '{}'", p.display()))?,
        None => FlipConfig::default(),
    };
    Ok(cfg)
}

fn digit_pair(args: &FlipArgs, cfg: &FlipConfig) -> anyhow::Result<(Surface, Surface)> {
    let from = splitflap::digit_surface(args.from, cfg.width, cfg.height, &cfg.panel)
        .with_context(|| format!("render digit {}", args.from))?;
    let to = splitflap::digit_surface(args.to, cfg.width, cfg.height, &cfg.panel)
        .with_context(|| format!("render digit {}", args.to))?;
    Ok((from, to))
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let cfg = load_config(args.flip.config.as_deref())?;
    let (from, to) = digit_pair(&args.flip, &cfg)?;

    let frame = splitflap::pipeline::render_flip_frame(&from, &to, args.angle, &cfg)?;
    splitflap::pipeline::write_png(&frame, cfg.background, &args.out)?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let cfg = load_config(args.flip.config.as_deref())?;
    let (from, to) = digit_pair(&args.flip, &cfg)?;

    let is_mp4 = args
        .out
        .extension()
        .is_some_and(|e| e.eq_ignore_ascii_case("mp4"));
    if is_mp4 {
        if !splitflap::encode_ffmpeg::ffmpeg_available() {
            anyhow::bail!("ffmpeg is required for mp4 output but was not found on PATH");
        }
        let frames = splitflap::pipeline::render_flip_to_mp4(&from, &to, &cfg, &args.out)?;
        eprintln!("wrote {} ({frames} frames)", args.out.display());
    } else {
        let written = splitflap::pipeline::render_flip_to_pngs(&from, &to, &cfg, &args.out)?;
        eprintln!("wrote {} frames to {}", written.len(), args.out.display());
    }
    Ok(())
}
