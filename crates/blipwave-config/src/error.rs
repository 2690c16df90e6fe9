//! Error types for configuration operations.

use blipwave_core::BufferError;
use thiserror::Error;

/// Errors that can occur while loading, checking or applying a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to parse TOML
    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Failed to serialize TOML
    #[error("failed to serialize TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// Preset not found
    #[error("preset not found: {0}")]
    PresetNotFound(String),

    /// Validation errors
    #[error("validation failed: {0}")]
    Validation(#[from] crate::validation::ValidationError),

    /// The buffers rejected the configuration
    #[error("buffer configuration failed: {0}")]
    Buffer(#[from] BufferError),
}

impl ConfigError {
    /// Create a preset not found error.
    pub fn preset_not_found(name: impl Into<String>) -> Self {
        ConfigError::PresetNotFound(name.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ValidationError;
    use std::error::Error;

    #[test]
    fn preset_not_found_display() {
        let err = ConfigError::preset_not_found("famicom");
        assert_eq!(err.to_string(), "preset not found: famicom");
    }

    #[test]
    fn validation_display() {
        let err = ConfigError::from(ValidationError::Zero {
            field: "sample_rate",
        });
        assert_eq!(
            err.to_string(),
            "validation failed: sample_rate must be greater than zero"
        );
    }

    #[test]
    fn buffer_error_display_and_source() {
        let err = ConfigError::from(BufferError::InvalidChannelCount(0));
        assert_eq!(
            err.to_string(),
            "buffer configuration failed: channel count must be at least 1, got 0"
        );
        assert!(err.source().is_some(), "Buffer must expose its source");
    }

    #[test]
    fn toml_parse_source_is_some() {
        let parse_err = toml::from_str::<toml::Value>("= nope").unwrap_err();
        let err = ConfigError::from(parse_err);
        assert!(err.to_string().starts_with("failed to parse TOML"));
        assert!(err.source().is_some(), "TomlParse must expose its source");
    }

    #[test]
    fn preset_not_found_has_no_source() {
        let err = ConfigError::preset_not_found("x");
        assert!(err.source().is_none());
    }
}
