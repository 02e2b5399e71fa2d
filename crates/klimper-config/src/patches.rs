//! Built-in patches.
//!
//! Patches are ordinary configuration files embedded at compile time. Only the
//! sections a patch changes are written out; everything else falls back to the
//! defaults.

use crate::config::KlimperConfig;
use crate::error::ConfigError;

/// Identifiers of the built-in patches.
pub static PATCH_NAMES: &[&str] = &["default", "bells", "pad", "pluck"];

static PATCHES_TOML: &[(&str, &str)] = &[
    ("default", DEFAULT_PATCH),
    ("bells", BELLS_PATCH),
    ("pad", PAD_PATCH),
    ("pluck", PLUCK_PATCH),
];

/// The instrument as first shipped.
const DEFAULT_PATCH: &str = r#"
name = "Default"
description = "Soft FM keys wandering through C major"

[synth]
polyphony = 8
volume = 0.2

[synth.envelope1]
attack = 0.1
decay = 0.3
sustain = 0.5
release = 0.5
peak = 1.0

[synth.envelope2]
attack = 0.01
decay = 0.5
sustain = 0.2
release = 0.5
peak = 1.0

[synth.fm]
ratios = [0.5, 1.0, 2.0, 3.0, 4.0]
index_min = 0.0
index_max = 1.0
depth = 0.01

[synth.pan]
spread = 0.75
lfo_min_hz = 0.33
lfo_max_hz = 3.33

[sequencer]
bpm = 80
scale = [48, 50, 52, 53, 55, 57, 59, 60]
running = true
"#;

const BELLS_PATCH: &str = r#"
name = "Bells"
description = "Inharmonic strikes with long ringing tails"

[synth]
volume = 0.25

[synth.envelope1]
attack = 0.002
decay = 1.8
sustain = 0.0
release = 1.2
peak = 1.0

[synth.envelope2]
attack = 0.002
decay = 0.9
sustain = 0.1
release = 0.9
peak = 1.0

[synth.fm]
ratios = [1.41, 2.0, 3.5]
index_min = 1.0
index_max = 3.0

[sequencer]
bpm = 66
scale = [60, 62, 64, 67, 69, 72, 74, 76]
"#;

const PAD_PATCH: &str = r#"
name = "Pad"
description = "Slow swells drifting across the stereo field"

[synth]
volume = 0.3

[synth.envelope1]
attack = 1.5
decay = 1.0
sustain = 0.7
release = 2.5
peak = 1.0

[synth.envelope2]
attack = 2.0
decay = 1.0
sustain = 0.4
release = 2.0
peak = 0.6

[synth.fm]
ratios = [1.0, 2.0]
index_min = 0.0
index_max = 0.5

[synth.pan]
spread = 1.0
lfo_min_hz = 0.1
lfo_max_hz = 0.5

[sequencer]
bpm = 50
scale = [45, 48, 52, 55, 57, 60, 64]
"#;

const PLUCK_PATCH: &str = r#"
name = "Pluck"
description = "Short bright plucks in C minor pentatonic"

[synth.envelope1]
attack = 0.002
decay = 0.25
sustain = 0.0
release = 0.1
peak = 1.0

[synth.envelope2]
attack = 0.002
decay = 0.12
sustain = 0.0
release = 0.05
peak = 1.0

[synth.fm]
ratios = [1.0, 2.0, 3.0]
index_min = 0.5
index_max = 2.0

[synth.pan]
spread = 0.5

[sequencer]
bpm = 128
scale = [48, 51, 53, 55, 58, 60, 63, 65]
"#;

/// All built-in patches, in [`PATCH_NAMES`] order.
///
/// # Example
///
/// ```rust
/// use klimper_config::patches;
///
/// let all = patches::builtin();
/// assert_eq!(all.len(), patches::PATCH_NAMES.len());
/// ```
pub fn builtin() -> Vec<KlimperConfig> {
    PATCHES_TOML
        .iter()
        .filter_map(|(_, toml)| KlimperConfig::from_toml(toml).ok())
        .collect()
}

/// Look up a built-in patch by identifier or display name (case-insensitive).
pub fn find(name: &str) -> Option<KlimperConfig> {
    let wanted = name.to_lowercase();
    PATCHES_TOML.iter().find_map(|(id, toml)| {
        let patch = KlimperConfig::from_toml(toml).ok()?;
        let matches = *id == wanted
            || patch
                .name
                .as_deref()
                .is_some_and(|n| n.to_lowercase() == wanted);
        matches.then_some(patch)
    })
}

/// Embedded TOML source of a built-in patch.
pub fn patch_toml(name: &str) -> Option<&'static str> {
    let wanted = name.to_lowercase();
    PATCHES_TOML
        .iter()
        .find(|(id, _)| *id == wanted)
        .map(|(_, toml)| *toml)
}

/// True if `name` is a built-in patch.
pub fn is_builtin(name: &str) -> bool {
    find(name).is_some()
}

/// Resolve a patch name: built-in patches first, then patch files in the
/// user directory or at the given path.
#[cfg(feature = "std")]
pub fn resolve(name: &str) -> Result<KlimperConfig, ConfigError> {
    if let Some(patch) = find(name) {
        return Ok(patch);
    }
    match crate::paths::find_patch_file(name) {
        Some(path) => KlimperConfig::load(path),
        None => Err(ConfigError::UnknownPatch(name.to_string())),
    }
}
