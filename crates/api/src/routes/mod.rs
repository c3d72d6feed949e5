pub mod auth;
pub mod catalog;
pub mod health;
pub mod titles;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/signup                                     sign up, mail a code (public)
/// /auth/token                                      exchange code for token (public)
///
/// /users                                           list, create (admin only)
/// /users/me                                        get, patch own profile
/// /users/{username}                                get, patch, delete (admin only)
///
/// /categories                                      list (public), create (admin)
/// /categories/{slug}                               delete (admin)
/// /genres                                          list (public), create (admin)
/// /genres/{slug}                                   delete (admin)
///
/// /titles                                          list (public), create (admin)
/// /titles/{id}                                     get (public), patch, delete (admin)
/// /titles/{title_id}/reviews                       list (public), create (auth)
/// /titles/{title_id}/reviews/{id}                  get (public), patch, delete (author+)
/// /titles/{title_id}/reviews/{review_id}/comments       list, create
/// /titles/{title_id}/reviews/{review_id}/comments/{id}  get, patch, delete
/// ```
///
/// Trailing slashes are stripped before routing (see [`crate::router`]).
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/users", users::router())
        .nest("/categories", catalog::categories_router())
        .nest("/genres", catalog::genres_router())
        .nest("/titles", titles::router())
}
