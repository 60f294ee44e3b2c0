//! HTTP handlers for the bookmarks API.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::info;

use crate::model::{Bookmark, CreateBookmark};
use crate::sanitize::serialize_bookmark;
use crate::store::BookmarkStore;
use crate::validate::validate_bookmark;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn BookmarkStore>,
    pub api_token: String,
}

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Serialize)]
struct ErrorBody {
    message: String,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

fn success<T: Serialize>(data: T) -> Response {
    (StatusCode::OK, Json(data)).into_response()
}

// Validation rejections go out as plain text, not wrapped json.
fn bad_request(msg: String) -> Response {
    (StatusCode::BAD_REQUEST, msg).into_response()
}

fn not_found(msg: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: ErrorBody {
                message: msg.to_string(),
            },
        }),
    )
        .into_response()
}

fn internal_error(msg: &str) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: ErrorBody {
                message: msg.to_string(),
            },
        }),
    )
        .into_response()
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn healthcheck() -> impl IntoResponse {
    info!("got healthcheck request");
    Json(serde_json::json!({ "status": "ok" }))
}

pub async fn list_bookmarks(State(state): State<AppState>) -> Response {
    match state.store.list().await {
        Ok(bookmarks) => {
            let bookmarks: Vec<Bookmark> = bookmarks.into_iter().map(serialize_bookmark).collect();
            success(bookmarks)
        }
        Err(e) => {
            tracing::error!("Failed to list bookmarks: {}", e);
            internal_error("server error")
        }
    }
}

pub async fn create_bookmark(
    State(state): State<AppState>,
    Json(payload): Json<CreateBookmark>,
) -> Response {
    let new_bookmark = match validate_bookmark(payload) {
        Ok(bookmark) => bookmark,
        Err(e) => return bad_request(e.to_string()),
    };

    match state.store.insert(new_bookmark).await {
        Ok(bookmark) => {
            tracing::info!("Bookmark with id {} created.", bookmark.id);
            let location = format!("/bookmarks/{}", bookmark.id);
            (
                StatusCode::CREATED,
                [(header::LOCATION, location)],
                Json(serialize_bookmark(bookmark)),
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!("Failed to create bookmark: {}", e);
            internal_error("server error")
        }
    }
}

pub async fn get_bookmark(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.store.get(&id).await {
        Ok(Some(bookmark)) => success(serialize_bookmark(bookmark)),
        Ok(None) => {
            tracing::error!("Bookmark with id {} not found.", id);
            not_found("Bookmark not found")
        }
        Err(e) => {
            tracing::error!("Failed to get bookmark: {}", e);
            internal_error("server error")
        }
    }
}

pub async fn delete_bookmark(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.store.delete(&id).await {
        Ok(true) => {
            tracing::info!("Bookmark with id {} deleted", id);
            (StatusCode::NO_CONTENT, ()).into_response()
        }
        Ok(false) => {
            tracing::error!("Bookmark with id {} not found.", id);
            not_found("Bookmark not found")
        }
        Err(e) => {
            tracing::error!("Failed to delete bookmark: {}", e);
            internal_error("server error")
        }
    }
}
