//! Error types for configuration loading and preview export.
//!
//! World generation itself never fails; degenerate inputs produce empty
//! outputs instead.

/// Errors raised while loading or validating a [`GenerationConfig`](crate::GenerationConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the config file from disk.
    #[error("failed to read config: {0}")]
    Read(#[source] std::io::Error),

    /// Failed to write the config file to disk.
    #[error("failed to write config: {0}")]
    Write(#[source] std::io::Error),

    /// Failed to parse TOML content.
    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),

    /// Failed to serialize config to TOML.
    #[error("failed to serialize config: {0}")]
    Serialize(#[source] toml::ser::Error),

    #[error("map size must be a finite, non-negative number (got {0})")]
    InvalidMapSize(f64),

    #[error("map size {got} exceeds the {max} m limit")]
    MapTooLarge { got: f64, max: f64 },

    #[error("segments must be in 1..={max} (got {got})")]
    InvalidSegments { got: u32, max: u32 },

    #[error("at most {max} checkpoints are supported (got {got})")]
    TooManyCheckpoints { got: u32, max: u32 },

    #[error("unknown map variant '{0}'")]
    UnknownVariant(String),
}

/// Errors raised while exporting a map preview image.
#[derive(Debug, thiserror::Error)]
pub enum PreviewError {
    #[error("preview size must be at least 2 pixels (got {0})")]
    TooSmall(u32),

    #[error("failed to write preview image: {0}")]
    Image(#[from] image::ImageError),
}
