use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bookmark {
    pub id: String,
    pub title: String,
    pub url: String,
    pub description: String,
    pub rating: f64,
}

/// A bookmark that passed validation and is ready to be stored.
#[derive(Debug, Clone)]
pub struct NewBookmark {
    pub title: String,
    pub url: String,
    pub description: String,
    pub rating: f64,
}

/// Raw creation payload. `rating` stays a loose JSON value here so the
/// validation pipeline owns the numeric check instead of serde.
#[derive(Debug, Default, Deserialize)]
pub struct CreateBookmark {
    pub title: Option<String>,
    pub url: Option<String>,
    pub description: Option<String>,
    pub rating: Option<serde_json::Value>,
}
