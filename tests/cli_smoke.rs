use std::path::PathBuf;

fn exe() -> PathBuf {
    std::env::var_os("CARGO_BIN_EXE_splitflap")
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            let mut p = PathBuf::from("target").join("debug");
            p.push(if cfg!(windows) {
                "splitflap.exe"
            } else {
                "splitflap"
            });
            p
        })
}

#[test]
fn cli_frame_writes_png() {
    let dir = PathBuf::from("target").join("cli_smoke");
    std::fs::create_dir_all(&dir).unwrap();

    let cfg_path = dir.join("flip.json");
    let out_path = dir.join("frame.png");
    let _ = std::fs::remove_file(&out_path);
    std::fs::write(&cfg_path, r#"{"width": 40, "height": 64, "duration_ms": 100}"#).unwrap();

    let status = std::process::Command::new(exe())
        .args(["frame", "--from", "7", "--to", "8", "--angle", "120", "--config"])
        .arg(&cfg_path)
        .arg("--out")
        .arg(&out_path)
        .status()
        .unwrap();

    assert!(status.success());
    let img = image::open(&out_path).unwrap();
    assert_eq!((img.width(), img.height()), (40, 64));
}

#[test]
fn cli_render_writes_png_sequence() {
    let dir = PathBuf::from("target").join("cli_smoke").join("frames");
    let _ = std::fs::remove_dir_all(&dir);

    let status = std::process::Command::new(exe())
        .args(["render", "--from", "0", "--to", "1", "--out"])
        .arg(&dir)
        .status()
        .unwrap();

    assert!(status.success());
    assert!(dir.join("frame_0000.png").exists());
}

#[test]
fn cli_rejects_non_digit() {
    let status = std::process::Command::new(exe())
        .args(["frame", "--from", "12", "--to", "1", "--angle", "0", "--out"])
        .arg(PathBuf::from("target").join("cli_smoke").join("never.png"))
        .status()
        .unwrap();
    assert!(!status.success());
}
