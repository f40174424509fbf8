//! Validation errors for form input.

use thiserror::Error;

/// Form input rejected before any request is sent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field was left blank.
    #[error("{0} is required")]
    MissingField(&'static str),

    /// The rating is not a whole number.
    #[error("rating must be a whole number, got {0:?}")]
    RatingNotANumber(String),

    /// The rating is outside the accepted range.
    #[error("rating must be between {min} and {max}, got {got}")]
    RatingOutOfRange {
        /// Lowest accepted rating.
        min: u8,
        /// Highest accepted rating.
        max: u8,
        /// The rejected value.
        got: i64,
    },

    /// A tag with this name already exists.
    #[error("tag {0:?} already exists")]
    DuplicateTag(String),
}
