use thiserror::Error;

/// Rejections produced by the bookmark validation pipeline. The Display
/// strings are the exact 400 response bodies, so changing them breaks the
/// API contract.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("'{0}' is required")]
    MissingField(&'static str),
    #[error("'Rating' must be a number between 0 and 5")]
    InvalidRating(serde_json::Value),
    #[error("'url' must be a valid url")]
    InvalidUrl(String),
}
