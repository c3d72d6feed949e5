//! Handlers for categories and genres.
//!
//! Both catalogs behave identically: public listing with `?search=`,
//! admin-only create and delete, addressed by slug.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use yamdb_core::catalog::{validate_name, validate_slug};
use yamdb_core::error::{CoreError, FieldErrors};
use yamdb_db::models::catalog::{CatalogKind, CatalogListParams, CreateCatalogEntry};
use yamdb_db::repositories::CatalogRepo;

use crate::error::AppResult;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::query::SearchParams;
use crate::state::AppState;

/// Request body for creating a category or genre.
#[derive(Debug, Deserialize)]
pub struct CatalogEntryRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub slug: String,
}

// ---------------------------------------------------------------------------
// Shared implementation
// ---------------------------------------------------------------------------

async fn list_entries(
    state: &AppState,
    kind: CatalogKind,
    params: SearchParams,
) -> AppResult<impl IntoResponse> {
    let page = CatalogRepo::list(
        &state.pool,
        kind,
        &CatalogListParams {
            search: params.term(),
            limit: params.limit,
            offset: params.offset,
        },
    )
    .await?;
    Ok(Json(page))
}

async fn create_entry(
    state: &AppState,
    admin: &AuthUser,
    kind: CatalogKind,
    input: CatalogEntryRequest,
) -> AppResult<impl IntoResponse> {
    let mut errors = FieldErrors::new();
    errors.check("name", validate_name(&input.name));
    errors.check("slug", validate_slug(&input.slug));
    errors.into_result()?;

    let entry = CatalogRepo::create(
        &state.pool,
        kind,
        &CreateCatalogEntry {
            name: input.name,
            slug: input.slug,
        },
    )
    .await?;

    tracing::info!(
        kind = kind.entity(),
        id = entry.id,
        slug = %entry.slug,
        user_id = admin.user_id,
        "Catalog entry created",
    );

    Ok((StatusCode::CREATED, Json(entry)))
}

async fn delete_entry(
    state: &AppState,
    admin: &AuthUser,
    kind: CatalogKind,
    slug: String,
) -> AppResult<impl IntoResponse> {
    if !CatalogRepo::delete_by_slug(&state.pool, kind, &slug).await? {
        return Err(CoreError::not_found(kind.entity(), &slug).into());
    }

    tracing::info!(
        kind = kind.entity(),
        slug = %slug,
        user_id = admin.user_id,
        "Catalog entry deleted",
    );

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

/// GET /api/v1/categories
pub async fn list_categories(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<SearchParams>,
) -> AppResult<impl IntoResponse> {
    list_entries(&state, CatalogKind::Category, params).await
}

/// POST /api/v1/categories
pub async fn create_category(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    ApiJson(input): ApiJson<CatalogEntryRequest>,
) -> AppResult<impl IntoResponse> {
    create_entry(&state, &admin, CatalogKind::Category, input).await
}

/// DELETE /api/v1/categories/{slug}
///
/// Titles in the category remain, with no category.
pub async fn delete_category(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    ApiPath(slug): ApiPath<String>,
) -> AppResult<impl IntoResponse> {
    delete_entry(&state, &admin, CatalogKind::Category, slug).await
}

// ---------------------------------------------------------------------------
// Genres
// ---------------------------------------------------------------------------

/// GET /api/v1/genres
pub async fn list_genres(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<SearchParams>,
) -> AppResult<impl IntoResponse> {
    list_entries(&state, CatalogKind::Genre, params).await
}

/// POST /api/v1/genres
pub async fn create_genre(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    ApiJson(input): ApiJson<CatalogEntryRequest>,
) -> AppResult<impl IntoResponse> {
    create_entry(&state, &admin, CatalogKind::Genre, input).await
}

/// DELETE /api/v1/genres/{slug}
pub async fn delete_genre(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    ApiPath(slug): ApiPath<String>,
) -> AppResult<impl IntoResponse> {
    delete_entry(&state, &admin, CatalogKind::Genre, slug).await
}
