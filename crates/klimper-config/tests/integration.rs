//! Integration tests for klimper-config.
//!
//! These tests cover file round trips and building the engine from a loaded
//! configuration.

use klimper_config::{ConfigError, KlimperConfig, ValidationError, patches};
use klimper_core::WavetableCache;
use klimper_synth::{Sequencer, Synth};
use tempfile::TempDir;

/// Save then load through the filesystem.
#[test]
fn test_save_and_load() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("nested").join("mine.toml");

    let mut config = patches::find("bells").unwrap();
    config.name = Some("Mine".into());
    config.sequencer.seed = Some(99);
    config.save(&path).expect("save should create parent directories");

    let loaded = KlimperConfig::load(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_load_missing_file() {
    let err = KlimperConfig::load("/nonexistent/klimper/config.toml").unwrap_err();
    assert!(matches!(err, ConfigError::ReadFile { .. }), "got {err:?}");
}

#[test]
fn test_load_malformed_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("bad.toml");
    std::fs::write(&path, "[synth\npolyphony = ").unwrap();
    assert!(matches!(
        KlimperConfig::load(&path),
        Err(ConfigError::TomlParse(_))
    ));
}

#[test]
fn test_validation_error_surfaces_through_config_error() {
    let config = KlimperConfig::from_toml("[synth]\npolyphony = 0\n").unwrap();
    match config.validate() {
        Err(ConfigError::Validation(ValidationError::ZeroPolyphony)) => {}
        other => panic!("expected ZeroPolyphony, got {other:?}"),
    }
}

/// Every built-in patch builds a working synth and sequencer.
#[test]
fn test_patches_build_engines() {
    for patch in patches::builtin() {
        let cache = WavetableCache::new(patch.audio.table_length, 1).unwrap();
        let mut synth = Synth::new(&patch.to_synth_config(), &cache)
            .unwrap_or_else(|e| panic!("patch '{}' synth: {e}", patch.display_name()));
        let mut sequencer = Sequencer::new(&patch.to_sequencer_config(), patch.audio.sample_rate)
            .unwrap_or_else(|e| panic!("patch '{}' sequencer: {e}", patch.display_name()));

        let mut block = vec![0.0f32; patch.audio.sub_block_size];
        let mut peak = 0.0f32;
        for _ in 0..400 {
            block.fill(0.0);
            sequencer.process(&mut synth, block.len() / 2);
            synth.process(&mut block);
            peak = block.iter().fold(peak, |m, s| m.max(s.abs()));
        }
        assert!(peak > 0.0, "patch '{}' should make sound", patch.display_name());
        assert!(peak <= 1.0, "patch '{}' clipped: {peak}", patch.display_name());
    }
}

#[test]
fn test_resolve_patch_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("glass.toml");
    std::fs::write(&path, "name = \"Glass\"\n[sequencer]\nbpm = 72\n").unwrap();

    let patch = patches::resolve(path.to_str().unwrap()).unwrap();
    assert_eq!(patch.display_name(), "Glass");
    assert_eq!(patch.sequencer.bpm, 72);

    let builtin = patches::resolve("Pad").unwrap();
    assert_eq!(builtin.display_name(), "Pad");
}
