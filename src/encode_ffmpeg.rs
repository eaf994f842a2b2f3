//! MP4 output through the system `ffmpeg` binary, fed raw RGBA on stdin.

use std::{
    ffi::OsString,
    io::Write as _,
    path::{Path, PathBuf},
    process::{Child, ChildStdin, Command, Stdio},
};

use anyhow::Context as _;

use crate::{
    foundation::{
        core::Rgba8,
        error::{FlipError, FlipResult},
    },
    render::{FrameRGBA, composite::over},
};

#[derive(Clone, Debug, PartialEq)]
pub struct Mp4Settings {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    pub out_path: PathBuf,
    pub overwrite: bool,
}

impl Mp4Settings {
    pub fn new(out_path: impl Into<PathBuf>, width: u32, height: u32, fps: f64) -> Self {
        Self {
            width,
            height,
            fps,
            out_path: out_path.into(),
            overwrite: true,
        }
    }

    pub fn validate(&self) -> FlipResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(FlipError::validation("mp4 width/height must be > 0"));
        }
        // yuv420p subsamples chroma 2x2.
        if !self.width.is_multiple_of(2) || !self.height.is_multiple_of(2) {
            return Err(FlipError::validation(format!(
                "mp4 output needs even dimensions, got {}x{}",
                self.width, self.height
            )));
        }
        if !self.fps.is_finite() || self.fps <= 0.0 {
            return Err(FlipError::validation("mp4 fps must be finite and > 0"));
        }
        Ok(())
    }

    fn frame_len(&self) -> usize {
        self.width as usize * self.height as usize * 4
    }
}

/// Command line for an `ffmpeg` process reading raw RGBA frames from stdin.
pub fn ffmpeg_args(settings: &Mp4Settings) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec![
        (if settings.overwrite { "-y" } else { "-n" }).into(),
        "-loglevel".into(),
        "error".into(),
        "-f".into(),
        "rawvideo".into(),
        "-pix_fmt".into(),
        "rgba".into(),
        "-s".into(),
        format!("{}x{}", settings.width, settings.height).into(),
        "-framerate".into(),
        settings.fps.to_string().into(),
        "-i".into(),
        "pipe:0".into(),
        "-an".into(),
        "-c:v".into(),
        "libx264".into(),
        "-pix_fmt".into(),
        "yuv420p".into(),
        "-movflags".into(),
        "+faststart".into(),
    ];
    args.push(settings.out_path.clone().into_os_string());
    args
}

pub fn ffmpeg_available() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok_and(|s| s.success())
}

pub(crate) fn ensure_parent_dir(path: &Path) -> FlipResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Composite premultiplied `frame` onto an opaque `background` and write
/// straight RGBA8 into `out`.
pub fn flatten_over(frame: &FrameRGBA, background: Rgba8, out: &mut Vec<u8>) -> FlipResult<()> {
    let expected = frame.width as usize * frame.height as usize * 4;
    if frame.data.len() != expected {
        return Err(FlipError::validation(format!(
            "frame holds {} bytes, expected {expected}",
            frame.data.len()
        )));
    }

    let bg = background.with_alpha(255).to_premul();
    out.clear();
    out.reserve(expected);
    for px in frame.data.chunks_exact(4) {
        let src = if frame.premultiplied {
            [px[0], px[1], px[2], px[3]]
        } else {
            Rgba8::new(px[0], px[1], px[2], px[3]).to_premul()
        };
        out.extend_from_slice(&over(bg, src, 1.0));
    }
    Ok(())
}

/// A running `ffmpeg` process accepting frames.
///
/// Dropping the sink without calling [`Mp4Sink::finish`] kills and reaps the
/// process.
pub struct Mp4Sink {
    settings: Mp4Settings,
    background: Rgba8,
    child: Option<Child>,
    stdin: Option<ChildStdin>,
    scratch: Vec<u8>,
    frames: u64,
}

impl Mp4Sink {
    pub fn open(settings: Mp4Settings, background: Rgba8) -> FlipResult<Self> {
        settings.validate()?;
        if !settings.overwrite && settings.out_path.exists() {
            return Err(FlipError::validation(format!(
                "'{}' already exists",
                settings.out_path.display()
            )));
        }
        ensure_parent_dir(&settings.out_path)?;

        let mut cmd = Command::new("ffmpeg");
        cmd.args(ffmpeg_args(&settings));
        let sink = Self::spawn(settings, background, cmd)?;
        tracing::debug!(path = %sink.settings.out_path.display(), "ffmpeg started");
        Ok(sink)
    }

    pub(crate) fn spawn(
        settings: Mp4Settings,
        background: Rgba8,
        mut cmd: Command,
    ) -> FlipResult<Self> {
        let mut child = cmd
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| FlipError::encode(format!("spawn ffmpeg (is it on PATH?): {e}")))?;
        let Some(stdin) = child.stdin.take() else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(FlipError::encode("ffmpeg stdin was not captured"));
        };

        Ok(Self {
            scratch: Vec::with_capacity(settings.frame_len()),
            settings,
            background,
            child: Some(child),
            stdin: Some(stdin),
            frames: 0,
        })
    }

    pub fn push(&mut self, frame: &FrameRGBA) -> FlipResult<()> {
        if (frame.width, frame.height) != (self.settings.width, self.settings.height) {
            return Err(FlipError::validation(format!(
                "frame is {}x{}, sink expects {}x{}",
                frame.width, frame.height, self.settings.width, self.settings.height
            )));
        }
        flatten_over(frame, self.background, &mut self.scratch)?;

        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| FlipError::encode("mp4 sink already finished"))?;
        stdin
            .write_all(&self.scratch)
            .map_err(|e| FlipError::encode(format!("write frame to ffmpeg: {e}")))?;
        self.frames += 1;
        Ok(())
    }

    /// Close the pipe and wait for `ffmpeg`. Returns the number of frames written.
    pub fn finish(mut self) -> FlipResult<u64> {
        drop(self.stdin.take());
        let child = self
            .child
            .take()
            .ok_or_else(|| FlipError::encode("mp4 sink already finished"))?;
        let output = child
            .wait_with_output()
            .map_err(|e| FlipError::encode(format!("wait for ffmpeg: {e}")))?;
        if !output.status.success() {
            return Err(FlipError::encode(format!(
                "ffmpeg exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        tracing::debug!(frames = self.frames, "ffmpeg finished");
        Ok(self.frames)
    }
}

impl Drop for Mp4Sink {
    fn drop(&mut self) {
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take() {
            tracing::debug!(frames = self.frames, "ffmpeg abandoned, killing");
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_need_even_sizes_and_positive_fps() {
        assert!(Mp4Settings::new("out.mp4", 120, 200, 60.0).validate().is_ok());
        assert!(Mp4Settings::new("out.mp4", 121, 200, 60.0).validate().is_err());
        assert!(Mp4Settings::new("out.mp4", 0, 200, 60.0).validate().is_err());
        assert!(Mp4Settings::new("out.mp4", 120, 200, 0.0).validate().is_err());
    }

    #[test]
    fn args_describe_raw_rgba_input() {
        let mut s = Mp4Settings::new("clips/flip.mp4", 120, 200, 30.0);
        s.overwrite = false;
        let args: Vec<String> = ffmpeg_args(&s)
            .into_iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(args[0], "-n");
        assert!(args.windows(2).any(|w| w == ["-s", "120x200"]));
        assert!(args.windows(2).any(|w| w == ["-framerate", "30"]));
        assert_eq!(args.last().map(String::as_str), Some("clips/flip.mp4"));
    }

    #[test]
    fn flatten_blends_onto_background() {
        let frame = FrameRGBA {
            width: 2,
            height: 1,
            data: vec![128, 0, 0, 128, 0, 0, 0, 0],
            premultiplied: true,
        };
        let mut out = Vec::new();
        flatten_over(&frame, Rgba8::new(0, 0, 200, 255), &mut out).unwrap();
        assert_eq!(&out[4..], &[0, 0, 200, 255]);
        assert_eq!(out[0], 128);
        assert_eq!(out[3], 255);
        assert!((i32::from(out[2]) - 100).abs() <= 1);
    }

    #[test]
    fn flatten_rejects_short_frames() {
        let frame = FrameRGBA {
            width: 2,
            height: 2,
            data: vec![0; 4],
            premultiplied: true,
        };
        assert!(flatten_over(&frame, Rgba8::BLACK, &mut Vec::new()).is_err());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn dropped_sink_reaps_its_process() {
        let mut cmd = Command::new("cat");
        cmd.arg("-");
        let settings = Mp4Settings::new("unused.mp4", 2, 2, 30.0);
        let mut sink = Mp4Sink::spawn(settings, Rgba8::BLACK, cmd).unwrap();
        let pid = sink.child.as_ref().unwrap().id();
        let frame = FrameRGBA {
            width: 2,
            height: 2,
            data: vec![255; 16],
            premultiplied: true,
        };
        sink.push(&frame).unwrap();

        drop(sink);
        assert!(!Path::new(&format!("/proc/{pid}")).exists());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn finished_sink_reports_frames_written() {
        let settings = Mp4Settings::new("unused.mp4", 2, 2, 30.0);
        let mut sink = Mp4Sink::spawn(settings, Rgba8::BLACK, Command::new("cat")).unwrap();
        let frame = FrameRGBA {
            width: 2,
            height: 2,
            data: vec![0; 16],
            premultiplied: true,
        };
        sink.push(&frame).unwrap();
        sink.push(&frame).unwrap();
        assert_eq!(sink.finish().unwrap(), 2);
    }
}
