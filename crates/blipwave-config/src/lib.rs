//! Configuration and presets for blipwave sound buffers.
//!
//! This crate turns a declarative description of a sound chip's output
//! (rates, buffer length, bass and treble response, layout and voice count)
//! into configured [`MultiBuffer`](blipwave_core::MultiBuffer)s and tuned
//! synthesizers.
//!
//! # Features
//!
//! - **TOML Format**: Parse and serialize [`BlipConfig`] from strings
//! - **Validation**: Check every field up front, reporting all problems
//! - **Factory Presets**: Built-in configurations for NES, PAL NES, VRC7 and silent output
//!
//! # Example
//!
//! ```rust
//! use blipwave_config::{BlipConfig, get_factory_preset};
//! use blipwave_core::{DeltaSynth, GoodSynth};
//!
//! let config = get_factory_preset("nes_ntsc").unwrap();
//! let mut multi = config.build().unwrap();
//!
//! let mut pulse = GoodSynth::with_range(15);
//! config.apply_to(&mut pulse);
//! pulse.set_output(multi.channel(0).map(|c| c.center));
//! pulse.update_routed(100, 15, &mut multi);
//! multi.end_frame(29780);
//! assert!(multi.samples_avail() > 0);
//!
//! // Or describe one inline
//! let custom = BlipConfig::from_toml(r#"
//!     name = "Game Boy"
//!     clock_rate = 4194304
//!     sample_rate = 48000
//!     layout = "stereo"
//!     channel_count = 4
//! "#).unwrap();
//! assert!(custom.validate().is_ok());
//! ```

mod config;
mod error;

/// Configuration validation.
pub mod validation;

/// Factory presets bundled with the library.
pub mod presets;

pub use config::{BlipConfig, Layout, TrebleConfig};
pub use error::ConfigError;
pub use presets::{factory_preset_names, factory_presets, get_factory_preset, is_factory_preset};
pub use validation::{ValidationError, ValidationResult, validate_config};
