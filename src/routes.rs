use axum::{
    Router, middleware,
    routing::{delete, get, post},
};

use crate::auth::require_bearer_token;
use crate::handler::{self, AppState};

/// Assemble the service router. The healthcheck is public, everything
/// under `/bookmarks` sits behind the bearer token guard.
pub fn router(state: AppState) -> Router {
    let bookmarks = Router::new()
        .route("/bookmarks", get(handler::list_bookmarks))
        .route("/bookmarks", post(handler::create_bookmark))
        .route("/bookmarks/:id", get(handler::get_bookmark))
        .route("/bookmarks/:id", delete(handler::delete_bookmark))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            require_bearer_token,
        ));

    Router::new()
        .route("/", get(handler::healthcheck))
        .merge(bookmarks)
        .with_state(state)
}
