//! Integration tests for blipwave-config.
//!
//! Builds buffers from presets and inline TOML, drives them with tuned
//! synthesizers, and checks that validation catches what the buffers would
//! reject.

use blipwave_config::{
    BlipConfig, ConfigError, Layout, ValidationError, factory_presets, get_factory_preset,
};
use blipwave_core::{BufferError, DeltaSynth, FastSynth, GoodSynth};
use proptest::prelude::*;

// ============================================================================
// 1. Presets drive real buffers
// ============================================================================

#[test]
fn every_preset_builds() {
    for preset in factory_presets() {
        let multi = preset
            .build()
            .unwrap_or_else(|e| panic!("{} failed to build: {e}", preset.name));
        assert_eq!(multi.channel_count(), preset.channel_count);
        let expected = if preset.layout == Layout::Stereo { 2 } else { 1 };
        assert_eq!(multi.samples_per_frame(), expected);
    }
}

#[test]
fn ntsc_preset_renders_a_frame() {
    let config = get_factory_preset("nes_ntsc").unwrap();
    let mut multi = config.build().unwrap();

    let mut square = GoodSynth::with_range(15);
    config.apply_to(&mut square);
    square.set_output(multi.channel(0).map(|c| c.center));

    let mut time = 0;
    let mut high = true;
    while time < 29780 {
        assert!(square.update_routed(time, if high { 15 } else { 0 }, &mut multi));
        high = !high;
        time += 2034;
    }
    multi.end_frame(29780);

    let avail = multi.samples_avail();
    assert_eq!(avail % 2, 0);
    let mut pcm = vec![0i16; avail];
    assert_eq!(multi.read_samples(&mut pcm, avail), avail);
    assert!(pcm.iter().any(|&s| s != 0));
    // Center output is identical on both sides.
    assert!(pcm.chunks_exact(2).all(|pair| pair[0] == pair[1]));
}

#[test]
fn silent_preset_discards_output() {
    let config = get_factory_preset("silent").unwrap();
    let mut multi = config.build().unwrap();
    let mut synth = FastSynth::new();
    config.apply_to(&mut synth);
    synth.set_output(multi.channel(0).map(|c| c.center));
    assert!(!synth.update_routed(0, 1, &mut multi));
    multi.end_frame(29780);
    assert_eq!(multi.samples_avail(), 0);
}

// ============================================================================
// 2. Inline TOML and validation
// ============================================================================

#[test]
fn inline_config_builds_mono() {
    let config = BlipConfig::from_toml(
        r#"
        name = "SN76489"
        clock_rate = 3579545
        sample_rate = 48000
        length_ms = 50
        bass_freq = 0
        channel_count = 4

        [treble]
        treble_db = -20.0
        cutoff_freq = 16000
        "#,
    )
    .unwrap();
    let multi = config.build().unwrap();
    assert_eq!(multi.samples_per_frame(), 1);
    assert_eq!(multi.length(), 50);
    assert_eq!(config.treble_eq().cutoff_freq, 16000);
}

#[test]
fn validation_matches_buffer_limits() {
    let config = BlipConfig {
        length_ms: 70_000,
        ..BlipConfig::default()
    };
    match config.build() {
        Err(ConfigError::Validation(ValidationError::Buffer(BufferError::LengthTooLong {
            ..
        }))) => {}
        other => panic!("expected length error, got {other:?}"),
    }
}

#[test]
fn validation_collects_every_problem() {
    let mut config = BlipConfig::new("Broken").with_rates(0, 44100);
    config.channel_count = 0;
    config.volume = -1.0;
    match config.validate() {
        Err(ValidationError::Multiple(errors)) => assert_eq!(errors.len(), 3),
        other => panic!("expected three errors, got {other:?}"),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Any configuration that validates also builds.
    #[test]
    fn validated_configs_build(
        clock_rate in 1u32..20_000_000,
        sample_rate in 1u32..200_000,
        length_ms in 0u32..2000,
        bass_freq in 0u32..1000,
        layout in prop_oneof![Just(Layout::Mono), Just(Layout::Stereo), Just(Layout::Silent)],
    ) {
        let config = BlipConfig {
            clock_rate,
            sample_rate,
            length_ms,
            bass_freq,
            layout,
            ..BlipConfig::default()
        };
        if config.validate().is_ok() {
            prop_assert!(config.build().is_ok());
        }
    }
}
