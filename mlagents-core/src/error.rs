//! Errors in the library.
use thiserror::Error;

/// Errors in the library.
#[derive(Error, Debug, PartialEq)]
pub enum MlagentsError {
    /// The shape of an array does not match the layout of its buffer key.
    #[error("Shape mismatch for {key}: expected {expected}, got {actual:?}")]
    ShapeMismatch {
        /// Buffer key of the array.
        key: String,

        /// Expected layout.
        expected: String,

        /// Actual shape.
        actual: Vec<usize>,
    },

    /// An action component required by the operation is absent.
    #[error("Missing field: {0}")]
    MissingField(&'static str),

    /// Action spec is not usable.
    #[error("Invalid action spec: {0}")]
    InvalidActionSpec(String),
}
