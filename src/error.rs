//! Error types for boundary extraction

use thiserror::Error;

/// Result type for boundary extraction
pub type ExtractResult<T> = Result<T, ExtractError>;

/// Errors surfaced by [`MaskToPolygon`](crate::MaskToPolygon)
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExtractError {
    /// Scaling requested without a target size, or an unusable setting
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// No foreground region survived morphological cleanup
    #[error("empty mask: no foreground contour found")]
    EmptyMask,

    /// Mask is not a well-formed 2D grid of non-negative numbers
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl ExtractError {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration(message.into())
    }

    pub(crate) fn input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }
}
