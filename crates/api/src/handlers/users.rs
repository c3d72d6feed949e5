//! Handlers for user management.
//!
//! `/users` and `/users/{username}` are admin only. `/users/me` lets any
//! authenticated user read and edit their own profile, except the role.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use yamdb_core::error::{CoreError, FieldErrors};
use yamdb_core::roles::Role;
use yamdb_core::text::reject_nul;
use yamdb_core::users::{validate_email, validate_person_name, validate_username};
use yamdb_db::models::user::{CreateUser, UpdateUser, UserListParams, UserResponse};
use yamdb_db::repositories::UserRepo;

use crate::error::AppResult;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::middleware::rbac::{RequireAdmin, RequireAuth};
use crate::query::SearchParams;
use crate::state::AppState;

/// Request body for `POST /users`.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub role: Role,
}

/// Request body for `PATCH /users/{username}` and `PATCH /users/me`.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub role: Option<Role>,
}

impl UpdateUserRequest {
    fn validate(&self) -> Result<(), CoreError> {
        let mut errors = FieldErrors::new();
        if let Some(username) = &self.username {
            errors.check("username", validate_username(username));
        }
        if let Some(email) = &self.email {
            errors.check("email", validate_email(email));
        }
        if let Some(first_name) = &self.first_name {
            errors.check("first_name", validate_person_name(first_name));
        }
        if let Some(last_name) = &self.last_name {
            errors.check("last_name", validate_person_name(last_name));
        }
        if let Some(bio) = &self.bio {
            errors.check("bio", reject_nul(bio));
        }
        errors.into_result()
    }

    fn into_update(self) -> UpdateUser {
        UpdateUser {
            username: self.username,
            email: self.email,
            first_name: self.first_name,
            last_name: self.last_name,
            bio: self.bio,
            role: self.role,
        }
    }
}

// ---------------------------------------------------------------------------
// Admin user management
// ---------------------------------------------------------------------------

/// GET /api/v1/users
///
/// List users ordered by username. Supports `?search=` on the username.
pub async fn list_users(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<SearchParams>,
) -> AppResult<impl IntoResponse> {
    let page = UserRepo::list(
        &state.pool,
        &UserListParams {
            search: params.term(),
            limit: params.limit,
            offset: params.offset,
        },
    )
    .await?;

    Ok(Json(page.map(|u| UserResponse::from(&u))))
}

/// POST /api/v1/users
///
/// Create a user directly. The new account has no confirmation code until
/// it goes through sign-up.
pub async fn create_user(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    ApiJson(input): ApiJson<CreateUserRequest>,
) -> AppResult<impl IntoResponse> {
    let mut errors = FieldErrors::new();
    errors.check("username", validate_username(&input.username));
    errors.check("email", validate_email(&input.email));
    errors.check("first_name", validate_person_name(&input.first_name));
    errors.check("last_name", validate_person_name(&input.last_name));
    errors.check("bio", reject_nul(&input.bio));
    errors.into_result()?;

    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            username: input.username,
            email: input.email,
            first_name: input.first_name,
            last_name: input.last_name,
            bio: input.bio,
            role: input.role,
            is_superuser: false,
        },
    )
    .await?;

    tracing::info!(
        user_id = user.id,
        role = %user.role,
        admin_id = admin.user_id,
        "User created by admin",
    );

    Ok((StatusCode::CREATED, Json(UserResponse::from(&user))))
}

/// GET /api/v1/users/{username}
pub async fn get_user(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    ApiPath(username): ApiPath<String>,
) -> AppResult<impl IntoResponse> {
    let user = UserRepo::find_by_username(&state.pool, &username)
        .await?
        .ok_or_else(|| CoreError::not_found("User", &username))?;

    Ok(Json(UserResponse::from(&user)))
}

/// PATCH /api/v1/users/{username}
pub async fn update_user(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    ApiPath(username): ApiPath<String>,
    ApiJson(input): ApiJson<UpdateUserRequest>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;

    let existing = UserRepo::find_by_username(&state.pool, &username)
        .await?
        .ok_or_else(|| CoreError::not_found("User", &username))?;

    let user = UserRepo::update(&state.pool, existing.id, &input.into_update())
        .await?
        .ok_or_else(|| CoreError::not_found("User", &username))?;

    tracing::info!(user_id = user.id, admin_id = admin.user_id, "User updated by admin");

    Ok(Json(UserResponse::from(&user)))
}

/// DELETE /api/v1/users/{username}
///
/// Removes the user together with their reviews and comments.
pub async fn delete_user(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    ApiPath(username): ApiPath<String>,
) -> AppResult<impl IntoResponse> {
    let user = UserRepo::find_by_username(&state.pool, &username)
        .await?
        .ok_or_else(|| CoreError::not_found("User", &username))?;

    if !UserRepo::delete(&state.pool, user.id).await? {
        return Err(CoreError::not_found("User", &username).into());
    }

    tracing::info!(user_id = user.id, admin_id = admin.user_id, "User deleted");

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Own profile
// ---------------------------------------------------------------------------

/// GET /api/v1/users/me
pub async fn get_me(
    RequireAuth(auth): RequireAuth,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let user = UserRepo::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or_else(|| CoreError::not_found("User", &auth.username))?;

    Ok(Json(UserResponse::from(&user)))
}

/// PATCH /api/v1/users/me
///
/// Edit the caller's own profile. A `role` in the body is ignored.
pub async fn update_me(
    RequireAuth(auth): RequireAuth,
    State(state): State<AppState>,
    ApiJson(input): ApiJson<UpdateUserRequest>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;

    let update = UpdateUser {
        role: None,
        ..input.into_update()
    };
    let user = UserRepo::update(&state.pool, auth.user_id, &update)
        .await?
        .ok_or_else(|| CoreError::not_found("User", &auth.username))?;

    tracing::info!(user_id = user.id, "Profile updated");

    Ok(Json(UserResponse::from(&user)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_validation_checks_only_present_fields() {
        assert!(UpdateUserRequest::default().validate().is_ok());

        let input = UpdateUserRequest {
            username: Some("me".into()),
            email: Some("broken".into()),
            ..Default::default()
        };
        match input.validate() {
            Err(CoreError::InvalidFields(errors)) => {
                assert!(errors.contains("username"));
                assert!(errors.contains("email"));
                assert!(!errors.contains("first_name"));
            }
            other => panic!("expected field errors, got {other:?}"),
        }
    }

    #[test]
    fn bio_with_nul_is_a_field_error() {
        let input = UpdateUserRequest {
            bio: Some("x\0y".into()),
            ..Default::default()
        };
        match input.validate() {
            Err(CoreError::InvalidFields(errors)) => assert!(errors.contains("bio")),
            other => panic!("expected field errors, got {other:?}"),
        }
    }
}
