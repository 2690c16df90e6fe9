//! Built-in configurations for common sound chips.
//!
//! These are embedded at compile time and always available, as starting
//! points for emulator front ends.

use crate::config::BlipConfig;
use crate::error::ConfigError;

/// Array of factory preset names for external access.
pub static FACTORY_PRESET_NAMES: &[&str] = &["nes_ntsc", "nes_pal", "vrc7_mono", "silent"];

/// TOML content for factory presets.
static FACTORY_PRESETS_TOML: &[(&str, &str)] = &[
    ("nes_ntsc", NES_NTSC_PRESET),
    ("nes_pal", NES_PAL_PRESET),
    ("vrc7_mono", VRC7_MONO_PRESET),
    ("silent", SILENT_PRESET),
];

/// NES 2A03 at the NTSC CPU clock.
const NES_NTSC_PRESET: &str = r#"
name = "NES (NTSC)"
description = "2A03 APU at the NTSC CPU clock, five voices in stereo"
sample_rate = 44100
clock_rate = 1789773
length_ms = 100
bass_freq = 90
layout = "stereo"
channel_count = 5
volume = 1.0

[treble]
treble_db = -8.87
rolloff_freq = 8800
"#;

/// NES 2A03 at the PAL CPU clock.
const NES_PAL_PRESET: &str = r#"
name = "NES (PAL)"
description = "2A07 APU at the PAL CPU clock, five voices in stereo"
sample_rate = 44100
clock_rate = 1662607
length_ms = 100
bass_freq = 90
layout = "stereo"
channel_count = 5
volume = 1.0

[treble]
treble_db = -8.87
rolloff_freq = 8800
"#;

/// Konami VRC7 FM expansion mixed down to one buffer.
const VRC7_MONO_PRESET: &str = r#"
name = "VRC7 (mono)"
description = "VRC7 FM expansion, six voices into a single buffer"
sample_rate = 44100
clock_rate = 1789773
length_ms = 100
bass_freq = 16
layout = "mono"
channel_count = 6
volume = 1.0

[treble]
treble_db = -15.0
"#;

/// Keeps a chip running with its output discarded.
const SILENT_PRESET: &str = r#"
name = "Silent"
description = "Runs the chip with no audio output"
sample_rate = 44100
clock_rate = 1789773
layout = "silent"
"#;

/// Get all factory presets.
///
/// # Example
///
/// ```rust
/// use blipwave_config::factory_presets;
///
/// for preset in factory_presets() {
///     println!("{}: {}", preset.name, preset.description.as_deref().unwrap_or(""));
/// }
/// ```
pub fn factory_presets() -> Vec<BlipConfig> {
    FACTORY_PRESETS_TOML
        .iter()
        .filter_map(|(name, toml)| match BlipConfig::from_toml(toml) {
            Ok(config) => Some(config),
            Err(err) => {
                tracing::warn!(preset = *name, error = %err, "factory preset failed to parse");
                None
            }
        })
        .collect()
}

/// Get a factory preset by identifier or display name, case-insensitively.
///
/// # Example
///
/// ```rust
/// use blipwave_config::get_factory_preset;
///
/// let ntsc = get_factory_preset("nes_ntsc").unwrap();
/// assert_eq!(ntsc.clock_rate, 1_789_773);
/// assert!(get_factory_preset("NES (PAL)").is_ok());
/// ```
pub fn get_factory_preset(name: &str) -> Result<BlipConfig, ConfigError> {
    let name_lower = name.to_lowercase();

    for (preset_name, toml) in FACTORY_PRESETS_TOML {
        if preset_name.to_lowercase() == name_lower {
            return BlipConfig::from_toml(toml);
        }
    }

    factory_presets()
        .into_iter()
        .find(|preset| preset.name.to_lowercase() == name_lower)
        .ok_or_else(|| ConfigError::preset_not_found(name))
}

/// Get the identifiers of all factory presets.
pub fn factory_preset_names() -> Vec<&'static str> {
    FACTORY_PRESETS_TOML.iter().map(|(name, _)| *name).collect()
}

/// Check if a name matches a factory preset (case-insensitive).
pub fn is_factory_preset(name: &str) -> bool {
    get_factory_preset(name).is_ok()
}
