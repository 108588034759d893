//! Error types for drishti-amcl

use thiserror::Error;

use crate::sensors::ModelType;

/// Rejected configuration.
///
/// Raised by the `set_model_*` calls and config loading, never during an
/// update.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("Mixture weights must sum to 1, got {0}")]
    MixtureSum(f64),

    #[error("Model {0:?} is not supported by this scanner")]
    UnsupportedModel(ModelType),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

impl ConfigError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

/// Rejected map construction input.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MapError {
    #[error("Map must have at least one cell")]
    Empty,

    #[error("Expected {expected} cells, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Resolution must be positive, got {0}")]
    InvalidResolution(f64),

    #[error("Rows have different lengths")]
    RaggedRows,

    #[error("Unrecognised map cell {0:?}")]
    InvalidCell(char),
}

/// Crate-level error.
#[derive(Error, Debug)]
pub enum DrishtiError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Map(#[from] MapError),
}

pub type Result<T> = std::result::Result<T, DrishtiError>;
