use axum::routing::get;
use axum::Router;

use crate::handlers::users;
use crate::state::AppState;

/// Routes mounted at `/users`.
///
/// `/me` is a static segment and wins over `/{username}`; the username
/// `me` is reserved at sign-up so no account can be shadowed.
///
/// ```text
/// GET    /               -> list_users   (admin)
/// POST   /               -> create_user  (admin)
/// GET    /me             -> get_me
/// PATCH  /me             -> update_me
/// GET    /{username}     -> get_user     (admin)
/// PATCH  /{username}     -> update_user  (admin)
/// DELETE /{username}     -> delete_user  (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(users::list_users).post(users::create_user))
        .route("/me", get(users::get_me).patch(users::update_me))
        .route(
            "/{username}",
            get(users::get_user)
                .patch(users::update_user)
                .delete(users::delete_user),
        )
}
