//! Route definitions for categories and genres.

use axum::routing::{delete, get};
use axum::Router;

use crate::handlers::catalog;
use crate::state::AppState;

/// Routes mounted at `/categories`.
///
/// ```text
/// GET    /          -> list_categories
/// POST   /          -> create_category (admin)
/// DELETE /{slug}    -> delete_category (admin)
/// ```
pub fn categories_router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(catalog::list_categories).post(catalog::create_category),
        )
        .route("/{slug}", delete(catalog::delete_category))
}

/// Routes mounted at `/genres`.
///
/// ```text
/// GET    /          -> list_genres
/// POST   /          -> create_genre (admin)
/// DELETE /{slug}    -> delete_genre (admin)
/// ```
pub fn genres_router() -> Router<AppState> {
    Router::new()
        .route("/", get(catalog::list_genres).post(catalog::create_genre))
        .route("/{slug}", delete(catalog::delete_genre))
}
