//! Bearer token authentication middleware.
//!
//! Every `/bookmarks` route requires the configured token in the
//! `Authorization` header as `Bearer <token>`. The healthcheck stays
//! outside the guard.

use axum::Json;
use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::handler::AppState;

pub async fn require_bearer_token(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    let authorized = match auth_header {
        Some(header) if header.starts_with("Bearer ") => &header[7..] == state.api_token,
        _ => false,
    };

    if !authorized {
        tracing::error!("Unauthorized request to path: {}", request.uri().path());
        return (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({ "error": "Unauthorized request" })),
        )
            .into_response();
    }

    next.run(request).await
}
