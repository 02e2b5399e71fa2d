//! Integration tests for klimper-cli.
//!
//! These run the built `klimper` binary end to end.

use klimper_io::read_wav_info;
use std::process::Command;
use tempfile::TempDir;

fn klimper_bin() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_klimper"));
    cmd.env("RUST_LOG", "warn");
    cmd
}

// ---------------------------------------------------------------------------
// `klimper render`
// ---------------------------------------------------------------------------

#[test]
fn cli_render_writes_requested_duration() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().join("out.wav");

    let output = klimper_bin()
        .args(["render", "--seconds", "1.5", "--patch", "default"])
        .arg(&output_path)
        .output()
        .expect("failed to run klimper render");

    assert!(
        output.status.success(),
        "render failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let info = read_wav_info(&output_path).unwrap();
    assert_eq!(info.channels, 2);
    assert_eq!(info.bits_per_sample, 16);
    assert_eq!(info.sample_rate, 44100);
    // Rounded up to whole 440-frame blocks
    assert!(
        info.duration_secs >= 1.5 && info.duration_secs < 1.5 + 440.0 / 44100.0,
        "duration {}",
        info.duration_secs
    );
}

#[test]
fn cli_render_with_config_file() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("fast.toml");
    let output_path = temp_dir.path().join("fast.wav");
    std::fs::write(
        &config_path,
        "name = \"Fast\"\n[audio]\nsample_rate = 22050\n[sequencer]\nbpm = 200\n",
    )
    .unwrap();

    let output = klimper_bin()
        .arg("render")
        .arg(&output_path)
        .arg("--config")
        .arg(&config_path)
        .args(["--seconds", "0.5", "--seed", "3"])
        .output()
        .expect("failed to run klimper render");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Fast"), "should name the config: {stdout}");

    let info = read_wav_info(&output_path).unwrap();
    assert_eq!(info.sample_rate, 22050);
}

#[test]
fn cli_render_rejects_unknown_patch() {
    let temp_dir = TempDir::new().unwrap();
    let output = klimper_bin()
        .args(["render", "--patch", "no-such-patch-12345"])
        .arg(temp_dir.path().join("never.wav"))
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("no-such-patch-12345"), "stderr: {stderr}");
}

#[test]
fn cli_render_rejects_bad_tempo() {
    let temp_dir = TempDir::new().unwrap();
    let output = klimper_bin()
        .args(["render", "--patch", "pad", "--bpm", "1000"])
        .arg(temp_dir.path().join("never.wav"))
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(!temp_dir.path().join("never.wav").exists());
}

// ---------------------------------------------------------------------------
// `klimper patches` / `klimper params`
// ---------------------------------------------------------------------------

#[test]
fn cli_patches_lists_builtins() {
    let output = klimper_bin().arg("patches").output().unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    for name in ["default", "bells", "pad", "pluck"] {
        assert!(stdout.contains(name), "patch listing should contain '{name}'");
    }
}

#[test]
fn cli_patches_show_prints_toml() {
    let output = klimper_bin()
        .args(["patches", "--show", "bells"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("[sequencer]"));
    assert!(stdout.contains("bpm = 66"));
}

#[test]
fn cli_params_lists_descriptors() {
    let output = klimper_bin()
        .args(["params", "--patch", "default"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Volume"));
    assert!(stdout.contains("Tempo"));
    assert!(stdout.contains("80 bpm"), "tempo value should be shown: {stdout}");
}
