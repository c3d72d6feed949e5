//! Handlers for reviews nested under `/titles/{title_id}/reviews`.
//!
//! Reading is public. Any authenticated user may post one review per
//! title; authors, moderators and admins may edit or delete it.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use yamdb_core::error::{CoreError, FieldErrors, NON_FIELD_ERRORS};
use yamdb_core::review::{validate_score, validate_text};
use yamdb_core::types::DbId;
use yamdb_db::models::review::{CreateReview, Review, UpdateReview};
use yamdb_db::repositories::{ReviewRepo, TitleRepo};
use yamdb_db::DbPool;

use crate::error::AppResult;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::middleware::rbac::RequireAuth;
use crate::query::PaginationParams;
use crate::state::AppState;

const REQUIRED: &str = "This field is required";

/// Request body for `POST` and `PATCH` on reviews.
#[derive(Debug, Default, Deserialize)]
pub struct ReviewRequest {
    pub text: Option<String>,
    pub score: Option<i32>,
}

impl ReviewRequest {
    fn validate(&self, creating: bool) -> Result<(), CoreError> {
        let mut errors = FieldErrors::new();
        match &self.text {
            Some(text) => errors.check("text", validate_text(text)),
            None if creating => errors.add("text", REQUIRED),
            None => {}
        }
        match self.score {
            Some(score) => errors.check("score", validate_score(score)),
            None if creating => errors.add("score", REQUIRED),
            None => {}
        }
        errors.into_result()
    }
}

async fn ensure_title(pool: &DbPool, title_id: DbId) -> AppResult<()> {
    if TitleRepo::exists(pool, title_id).await? {
        Ok(())
    } else {
        Err(CoreError::not_found("Title", title_id).into())
    }
}

/// Load a review that belongs to `title_id`, 404 otherwise.
pub(crate) async fn load_review(
    pool: &DbPool,
    title_id: DbId,
    review_id: DbId,
) -> AppResult<Review> {
    ensure_title(pool, title_id).await?;
    let review = ReviewRepo::find_in_title(pool, title_id, review_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Review", review_id))?;
    Ok(review)
}

/// GET /api/v1/titles/{title_id}/reviews
///
/// Newest first.
pub async fn list_reviews(
    State(state): State<AppState>,
    ApiPath(title_id): ApiPath<DbId>,
    ApiQuery(params): ApiQuery<PaginationParams>,
) -> AppResult<impl IntoResponse> {
    ensure_title(&state.pool, title_id).await?;
    let page =
        ReviewRepo::list_for_title(&state.pool, title_id, params.limit, params.offset).await?;
    Ok(Json(page))
}

/// POST /api/v1/titles/{title_id}/reviews
pub async fn create_review(
    RequireAuth(auth): RequireAuth,
    State(state): State<AppState>,
    ApiPath(title_id): ApiPath<DbId>,
    ApiJson(input): ApiJson<ReviewRequest>,
) -> AppResult<impl IntoResponse> {
    ensure_title(&state.pool, title_id).await?;
    input.validate(true)?;

    if ReviewRepo::exists_for_author(&state.pool, title_id, auth.user_id).await? {
        return Err(
            CoreError::field(NON_FIELD_ERRORS, "You have already reviewed this title").into(),
        );
    }

    let review = ReviewRepo::create(
        &state.pool,
        &CreateReview {
            title_id,
            author_id: auth.user_id,
            text: input.text.unwrap_or_default(),
            score: input.score.unwrap_or_default(),
        },
    )
    .await?;

    tracing::info!(
        review_id = review.id,
        title_id,
        user_id = auth.user_id,
        score = review.score,
        "Review created",
    );

    Ok((StatusCode::CREATED, Json(review)))
}

/// GET /api/v1/titles/{title_id}/reviews/{review_id}
pub async fn get_review(
    State(state): State<AppState>,
    ApiPath((title_id, review_id)): ApiPath<(DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    let review = load_review(&state.pool, title_id, review_id).await?;
    Ok(Json(review))
}

/// PATCH /api/v1/titles/{title_id}/reviews/{review_id}
pub async fn update_review(
    RequireAuth(auth): RequireAuth,
    State(state): State<AppState>,
    ApiPath((title_id, review_id)): ApiPath<(DbId, DbId)>,
    ApiJson(input): ApiJson<ReviewRequest>,
) -> AppResult<impl IntoResponse> {
    let review = load_review(&state.pool, title_id, review_id).await?;
    auth.actor.ensure_can_modify(review.author_id)?;
    input.validate(false)?;

    let review = ReviewRepo::update(
        &state.pool,
        review.id,
        &UpdateReview {
            text: input.text,
            score: input.score,
        },
    )
    .await?
    .ok_or_else(|| CoreError::not_found("Review", review_id))?;

    tracing::info!(review_id, title_id, user_id = auth.user_id, "Review updated");

    Ok(Json(review))
}

/// DELETE /api/v1/titles/{title_id}/reviews/{review_id}
///
/// Comments on the review are deleted with it.
pub async fn delete_review(
    RequireAuth(auth): RequireAuth,
    State(state): State<AppState>,
    ApiPath((title_id, review_id)): ApiPath<(DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    let review = load_review(&state.pool, title_id, review_id).await?;
    auth.actor.ensure_can_modify(review.author_id)?;

    if !ReviewRepo::delete(&state.pool, review.id).await? {
        return Err(CoreError::not_found("Review", review_id).into());
    }

    tracing::info!(review_id, title_id, user_id = auth.user_id, "Review deleted");

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn creation_requires_text_and_score() {
        let err = ReviewRequest::default().validate(true).unwrap_err();
        assert_matches!(
            err,
            CoreError::InvalidFields(ref f) if f.contains("text") && f.contains("score")
        );
    }

    #[test]
    fn update_checks_score_bounds() {
        let input = ReviewRequest {
            text: None,
            score: Some(11),
        };
        assert_matches!(input.validate(false), Err(CoreError::InvalidFields(_)));
        assert!(ReviewRequest::default().validate(false).is_ok());
    }
}
