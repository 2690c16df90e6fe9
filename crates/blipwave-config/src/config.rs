//! Buffer configuration format and operations.

use blipwave_core::{
    DEFAULT_BASS_FREQ, DEFAULT_LENGTH_MS, DeltaSynth, MultiBuffer, TrebleEq,
};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::validation::{ValidationResult, validate_config};

/// Output layout of a [`BlipConfig`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    /// One buffer.
    #[default]
    Mono,
    /// Left, right and center buffers mixed to interleaved stereo.
    Stereo,
    /// No output.
    Silent,
}

/// Treble response section of a [`BlipConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrebleConfig {
    /// Treble level in dB at half the sample rate.
    #[serde(default = "default_treble_db")]
    pub treble_db: f64,

    /// Frequency where the rolloff begins, 0 for DC.
    #[serde(default)]
    pub rolloff_freq: u32,

    /// Hard cutoff frequency, 0 for none.
    #[serde(default)]
    pub cutoff_freq: u32,
}

impl Default for TrebleConfig {
    fn default() -> Self {
        Self {
            treble_db: default_treble_db(),
            rolloff_freq: 0,
            cutoff_freq: 0,
        }
    }
}

/// Everything needed to set up the buffers and synthesizers of one chip.
///
/// # TOML Format
///
/// ```toml
/// name = "NES (NTSC)"
/// description = "2A03 at the NTSC CPU clock"
/// sample_rate = 44100
/// clock_rate = 1789773
/// length_ms = 100
/// bass_freq = 90
/// layout = "stereo"
/// channel_count = 5
/// volume = 1.0
///
/// [treble]
/// treble_db = -8.87
/// rolloff_freq = 8800
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlipConfig {
    /// Name of the configuration.
    #[serde(default = "default_name")]
    pub name: String,

    /// Optional description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Output sample rate in Hz.
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    /// Chip clock rate in Hz.
    #[serde(default = "default_clock_rate")]
    pub clock_rate: u32,

    /// Buffer length in milliseconds, 0 for the maximum.
    #[serde(default = "default_length_ms")]
    pub length_ms: u32,

    /// High-pass cutoff in Hz, 0 to disable.
    #[serde(default = "default_bass_freq")]
    pub bass_freq: u32,

    /// Output layout.
    #[serde(default)]
    pub layout: Layout,

    /// Number of chip voices.
    #[serde(default = "default_channel_count")]
    pub channel_count: usize,

    /// Volume applied to synthesizers, relative to their amplitude range.
    #[serde(default = "default_volume")]
    pub volume: f64,

    /// Treble response of the kernels.
    #[serde(default)]
    pub treble: TrebleConfig,
}

fn default_name() -> String {
    "Untitled".to_string()
}

fn default_sample_rate() -> u32 {
    44100
}

fn default_clock_rate() -> u32 {
    1_789_773
}

fn default_length_ms() -> u32 {
    DEFAULT_LENGTH_MS
}

fn default_bass_freq() -> u32 {
    DEFAULT_BASS_FREQ
}

fn default_channel_count() -> usize {
    1
}

fn default_volume() -> f64 {
    1.0
}

fn default_treble_db() -> f64 {
    TrebleEq::DEFAULT_TREBLE_DB
}

impl Default for BlipConfig {
    fn default() -> Self {
        Self::new(default_name())
    }
}

impl BlipConfig {
    /// Create a configuration with default values.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            sample_rate: default_sample_rate(),
            clock_rate: default_clock_rate(),
            length_ms: default_length_ms(),
            bass_freq: default_bass_freq(),
            layout: Layout::default(),
            channel_count: default_channel_count(),
            volume: default_volume(),
            treble: TrebleConfig::default(),
        }
    }

    /// Create a configuration with a description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the clock and sample rates.
    pub fn with_rates(mut self, clock_rate: u32, sample_rate: u32) -> Self {
        self.clock_rate = clock_rate;
        self.sample_rate = sample_rate;
        self
    }

    /// Set the output layout.
    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    /// Parse a configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Serialize to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check every field; see [`validate_config`].
    pub fn validate(&self) -> ValidationResult<()> {
        validate_config(self)
    }

    /// Kernel EQ for this configuration's sample rate.
    pub fn treble_eq(&self) -> TrebleEq {
        TrebleEq::with_rolloff(
            self.treble.treble_db,
            self.treble.rolloff_freq,
            self.sample_rate,
        )
        .cutoff(self.treble.cutoff_freq)
    }

    /// Validate, then create and configure the multi-buffer.
    pub fn build(&self) -> Result<MultiBuffer, ConfigError> {
        if let Err(err) = self.validate() {
            tracing::warn!(name = %self.name, error = %err, "config: rejected");
            return Err(err.into());
        }

        let mut multi = match self.layout {
            Layout::Mono => MultiBuffer::mono(),
            Layout::Stereo => MultiBuffer::stereo(),
            Layout::Silent => MultiBuffer::silent(),
        };
        multi.set_sample_rate(self.sample_rate, self.length_ms)?;
        multi.set_clock_rate(self.clock_rate)?;
        multi.set_bass_freq(self.bass_freq);
        multi.set_channel_count(self.channel_count, None)?;

        tracing::debug!(
            name = %self.name,
            layout = ?self.layout,
            sample_rate = self.sample_rate,
            clock_rate = self.clock_rate,
            channels = self.channel_count,
            "config: multi-buffer built"
        );
        Ok(multi)
    }

    /// Apply the treble EQ and volume to a synthesizer.
    pub fn apply_to<S: DeltaSynth>(&self, synth: &mut S) {
        synth.treble_eq(&self.treble_eq());
        synth.volume(self.volume);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blipwave_core::{FastSynth, GoodSynth};

    #[test]
    fn toml_defaults_fill_missing_fields() {
        let config = BlipConfig::from_toml("name = \"Bare\"").unwrap();
        assert_eq!(config.name, "Bare");
        assert_eq!(config.sample_rate, 44100);
        assert_eq!(config.layout, Layout::Mono);
        assert_eq!(config.treble.treble_db, TrebleEq::DEFAULT_TREBLE_DB);
    }

    #[test]
    fn toml_round_trip() {
        let config = BlipConfig::new("Round Trip")
            .with_description("stereo at 48 kHz")
            .with_rates(3_579_545, 48000)
            .with_layout(Layout::Stereo);
        let text = config.to_toml().unwrap();
        assert!(text.contains("layout = \"stereo\""));
        assert_eq!(BlipConfig::from_toml(&text).unwrap(), config);
    }

    #[test]
    fn unknown_layout_rejected() {
        let err = BlipConfig::from_toml("layout = \"quad\"").unwrap_err();
        assert!(matches!(err, ConfigError::TomlParse(_)));
    }

    #[test]
    fn build_configures_buffers() {
        let mut config = BlipConfig::new("Stereo").with_layout(Layout::Stereo);
        config.length_ms = 100;
        config.channel_count = 3;
        let multi = config.build().unwrap();
        assert_eq!(multi.samples_per_frame(), 2);
        assert_eq!(multi.sample_rate(), 44100);
        assert_eq!(multi.length(), 100);
        assert_eq!(multi.channel_count(), 3);
        assert!(multi.channel(2).is_some());
    }

    #[test]
    fn build_rejects_invalid() {
        let config = BlipConfig::new("Broken").with_rates(0, 44100);
        assert!(matches!(config.build(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn treble_eq_uses_sample_rate() {
        let mut config = BlipConfig::default().with_rates(1_789_773, 48000);
        config.treble.rolloff_freq = 8800;
        let eq = config.treble_eq();
        assert_eq!(eq.sample_rate, 48000);
        assert_eq!(eq.rolloff_freq, 8800);
    }

    #[test]
    fn apply_sets_volume_and_eq() {
        let mut config = BlipConfig::default();
        config.volume = 0.5;
        config.treble.treble_db = -24.0;

        let mut full = GoodSynth::new();
        config.apply_to(&mut full);
        assert_eq!(full.eq().treble_db, -24.0);
        assert!(full.delta_factor() > 0);

        let mut fast = FastSynth::new();
        config.apply_to(&mut fast);
        assert_eq!(fast.delta_factor(), 1 << 29);
    }
}
