//! Configuration validation.
//!
//! Checks every field of a [`BlipConfig`](crate::BlipConfig) and collects all
//! problems instead of stopping at the first one. Rate and length checks use
//! the same arithmetic the buffers apply, so a configuration that validates
//! also builds.
//!
//! # Example
//!
//! ```rust
//! use blipwave_config::{BlipConfig, ValidationError, validate_config};
//!
//! let mut config = BlipConfig::default();
//! assert!(validate_config(&config).is_ok());
//!
//! config.sample_rate = 0;
//! assert!(matches!(
//!     validate_config(&config),
//!     Err(ValidationError::Zero { field: "sample_rate" })
//! ));
//! ```

use blipwave_core::{BufferError, TrebleEq, clock_factor, samples_for_length};
use thiserror::Error;

use crate::config::BlipConfig;

/// Largest accepted volume.
pub const MAX_VOLUME: f64 = 4.0;

/// Validation error types.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// A field that must be positive is zero.
    #[error("{field} must be greater than zero")]
    Zero {
        /// Name of the field.
        field: &'static str,
    },

    /// Field value out of range.
    #[error("{field} value {value} out of range [{min}, {max}]")]
    OutOfRange {
        /// Name of the field.
        field: &'static str,
        /// The value that was out of range.
        value: f64,
        /// Minimum allowed value.
        min: f64,
        /// Maximum allowed value.
        max: f64,
    },

    /// The rates or length cannot be represented by a buffer.
    #[error("{0}")]
    Buffer(#[from] BufferError),

    /// Multiple validation errors.
    #[error("multiple validation errors: {}", .0.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; "))]
    Multiple(Vec<ValidationError>),
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

fn check_range(
    errors: &mut Vec<ValidationError>,
    field: &'static str,
    value: f64,
    min: f64,
    max: f64,
) {
    if !(min..=max).contains(&value) {
        errors.push(ValidationError::OutOfRange {
            field,
            value,
            min,
            max,
        });
    }
}

/// Validate a configuration, reporting every problem found.
///
/// Returns the single error directly, or [`ValidationError::Multiple`] when
/// there are several.
pub fn validate_config(config: &BlipConfig) -> ValidationResult<()> {
    let mut errors = Vec::new();

    if config.sample_rate == 0 {
        errors.push(ValidationError::Zero {
            field: "sample_rate",
        });
    }
    if config.clock_rate == 0 {
        errors.push(ValidationError::Zero {
            field: "clock_rate",
        });
    }
    if config.channel_count == 0 {
        errors.push(ValidationError::Zero {
            field: "channel_count",
        });
    }

    if config.sample_rate != 0 {
        if config.clock_rate != 0
            && let Err(err) = clock_factor(config.clock_rate, config.sample_rate)
        {
            errors.push(err.into());
        }
        if let Err(err) = samples_for_length(config.sample_rate, config.length_ms) {
            errors.push(err.into());
        }

        let nyquist = f64::from(config.sample_rate) / 2.0;
        check_range(&mut errors, "bass_freq", f64::from(config.bass_freq), 0.0, nyquist);
        check_range(
            &mut errors,
            "treble.rolloff_freq",
            f64::from(config.treble.rolloff_freq),
            0.0,
            nyquist,
        );
        check_range(
            &mut errors,
            "treble.cutoff_freq",
            f64::from(config.treble.cutoff_freq),
            0.0,
            nyquist,
        );
    }

    check_range(
        &mut errors,
        "treble.treble_db",
        config.treble.treble_db,
        TrebleEq::MIN_TREBLE_DB,
        TrebleEq::MAX_TREBLE_DB,
    );
    check_range(&mut errors, "volume", config.volume, 0.0, MAX_VOLUME);

    match errors.len() {
        0 => Ok(()),
        1 => Err(errors.remove(0)),
        _ => Err(ValidationError::Multiple(errors)),
    }
}
