//! Validation pipeline for bookmark creation payloads.
//!
//! Checks run in a fixed order and stop at the first failure: presence of
//! `title`, `url` and `rating`, then the rating range, then the url shape.
//! Presence means truthy, so an empty string or a numeric zero rating is
//! reported as missing rather than invalid.

use serde_json::Value;

use crate::error::ValidationError;
use crate::model::{CreateBookmark, NewBookmark};

pub fn validate_bookmark(payload: CreateBookmark) -> Result<NewBookmark, ValidationError> {
    let title = match payload.title.filter(|t| !t.is_empty()) {
        Some(title) => title,
        None => {
            tracing::error!("title is required");
            return Err(ValidationError::MissingField("title"));
        }
    };

    let url = match payload.url.filter(|u| !u.is_empty()) {
        Some(url) => url,
        None => {
            tracing::error!("url is required");
            return Err(ValidationError::MissingField("url"));
        }
    };

    let rating_value = match payload.rating.filter(is_truthy) {
        Some(value) => value,
        None => {
            tracing::error!("rating is required");
            return Err(ValidationError::MissingField("rating"));
        }
    };

    let rating = match parse_rating(&rating_value) {
        Some(rating) if (0.0..=5.0).contains(&rating) => rating,
        _ => {
            tracing::error!("Invalid rating: {}. Must be a number between 0 and 5", rating_value);
            return Err(ValidationError::InvalidRating(rating_value));
        }
    };

    if !is_web_uri(&url) {
        tracing::error!("Invalid url: {}", url);
        return Err(ValidationError::InvalidUrl(url));
    }

    Ok(NewBookmark {
        title,
        url,
        description: payload.description.unwrap_or_default(),
        rating,
    })
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// The rating may arrive as a JSON number or as a string carrying one.
fn parse_rating(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

/// An absolute web uri: parses, http or https, and carries a host.
fn is_web_uri(value: &str) -> bool {
    match url::Url::parse(value) {
        Ok(parsed) => matches!(parsed.scheme(), "http" | "https") && parsed.has_host(),
        Err(_) => false,
    }
}
