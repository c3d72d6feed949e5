//! Handlers for comments nested under
//! `/titles/{title_id}/reviews/{review_id}/comments`.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use yamdb_core::error::{CoreError, FieldErrors};
use yamdb_core::review::validate_text;
use yamdb_core::types::DbId;
use yamdb_db::models::comment::CreateComment;
use yamdb_db::repositories::CommentRepo;

use super::reviews::load_review;
use crate::error::AppResult;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::middleware::rbac::RequireAuth;
use crate::query::PaginationParams;
use crate::state::AppState;

/// Request body for `POST` and `PATCH` on comments.
#[derive(Debug, Default, Deserialize)]
pub struct CommentRequest {
    pub text: Option<String>,
}

impl CommentRequest {
    /// The validated text. Required on both create and update.
    fn text(self) -> Result<String, CoreError> {
        let mut errors = FieldErrors::new();
        match &self.text {
            Some(text) => errors.check("text", validate_text(text)),
            None => errors.add("text", "This field is required"),
        }
        errors.into_result()?;
        Ok(self.text.unwrap_or_default())
    }
}

/// GET /api/v1/titles/{title_id}/reviews/{review_id}/comments
pub async fn list_comments(
    State(state): State<AppState>,
    ApiPath((title_id, review_id)): ApiPath<(DbId, DbId)>,
    ApiQuery(params): ApiQuery<PaginationParams>,
) -> AppResult<impl IntoResponse> {
    load_review(&state.pool, title_id, review_id).await?;
    let page =
        CommentRepo::list_for_review(&state.pool, review_id, params.limit, params.offset).await?;
    Ok(Json(page))
}

/// POST /api/v1/titles/{title_id}/reviews/{review_id}/comments
pub async fn create_comment(
    RequireAuth(auth): RequireAuth,
    State(state): State<AppState>,
    ApiPath((title_id, review_id)): ApiPath<(DbId, DbId)>,
    ApiJson(input): ApiJson<CommentRequest>,
) -> AppResult<impl IntoResponse> {
    load_review(&state.pool, title_id, review_id).await?;
    let text = input.text()?;

    let comment = CommentRepo::create(
        &state.pool,
        &CreateComment {
            review_id,
            author_id: auth.user_id,
            text,
        },
    )
    .await?;

    tracing::info!(
        comment_id = comment.id,
        review_id,
        user_id = auth.user_id,
        "Comment created",
    );

    Ok((StatusCode::CREATED, Json(comment)))
}

/// GET /api/v1/titles/{title_id}/reviews/{review_id}/comments/{comment_id}
pub async fn get_comment(
    State(state): State<AppState>,
    ApiPath((title_id, review_id, comment_id)): ApiPath<(DbId, DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    load_review(&state.pool, title_id, review_id).await?;
    let comment = CommentRepo::find_in_review(&state.pool, review_id, comment_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Comment", comment_id))?;
    Ok(Json(comment))
}

/// PATCH /api/v1/titles/{title_id}/reviews/{review_id}/comments/{comment_id}
pub async fn update_comment(
    RequireAuth(auth): RequireAuth,
    State(state): State<AppState>,
    ApiPath((title_id, review_id, comment_id)): ApiPath<(DbId, DbId, DbId)>,
    ApiJson(input): ApiJson<CommentRequest>,
) -> AppResult<impl IntoResponse> {
    load_review(&state.pool, title_id, review_id).await?;
    let comment = CommentRepo::find_in_review(&state.pool, review_id, comment_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Comment", comment_id))?;
    auth.actor.ensure_can_modify(comment.author_id)?;

    let text = input.text()?;
    let comment = CommentRepo::update_text(&state.pool, comment.id, &text)
        .await?
        .ok_or_else(|| CoreError::not_found("Comment", comment_id))?;

    tracing::info!(comment_id, review_id, user_id = auth.user_id, "Comment updated");

    Ok(Json(comment))
}

/// DELETE /api/v1/titles/{title_id}/reviews/{review_id}/comments/{comment_id}
pub async fn delete_comment(
    RequireAuth(auth): RequireAuth,
    State(state): State<AppState>,
    ApiPath((title_id, review_id, comment_id)): ApiPath<(DbId, DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    load_review(&state.pool, title_id, review_id).await?;
    let comment = CommentRepo::find_in_review(&state.pool, review_id, comment_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Comment", comment_id))?;
    auth.actor.ensure_can_modify(comment.author_id)?;

    if !CommentRepo::delete(&state.pool, comment.id).await? {
        return Err(CoreError::not_found("Comment", comment_id).into());
    }

    tracing::info!(comment_id, review_id, user_id = auth.user_id, "Comment deleted");

    Ok(StatusCode::NO_CONTENT)
}
