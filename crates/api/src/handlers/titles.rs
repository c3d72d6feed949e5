//! Handlers for titles.
//!
//! Titles are written with genre and category slugs and read back with
//! both resolved to `{name, slug}` plus the aggregated `rating`.

use std::collections::BTreeSet;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Deserializer};
use yamdb_core::catalog::{current_year, validate_name, validate_year};
use yamdb_core::error::{CoreError, FieldErrors};
use yamdb_core::text::reject_nul;
use yamdb_core::types::DbId;
use yamdb_db::models::catalog::CatalogKind;
use yamdb_db::models::title::{CreateTitle, TitleFilter, UpdateTitle};
use yamdb_db::repositories::{CatalogRepo, TitleRepo};
use yamdb_db::DbPool;

use crate::error::AppResult;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::middleware::rbac::RequireAdmin;
use crate::query::TitleQuery;
use crate::state::AppState;

const REQUIRED: &str = "This field is required";
const NOT_NULL: &str = "This field may not be null";

/// Keep an explicit `null` distinguishable from an absent field.
fn explicit_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Request body for `POST /titles` and `PATCH /titles/{id}`.
///
/// Every field is optional at the type level; creation checks that the
/// required ones are present so all problems are reported together.
#[derive(Debug, Default, Deserialize)]
pub struct TitleWriteRequest {
    pub name: Option<String>,
    pub year: Option<i32>,
    pub description: Option<String>,
    /// Genre slugs. Replaces the whole set on update.
    #[serde(default, deserialize_with = "explicit_null")]
    pub genre: Option<Option<Vec<String>>>,
    /// Category slug. Outer `None` means absent, inner `None` an explicit null.
    #[serde(default, deserialize_with = "explicit_null")]
    pub category: Option<Option<String>>,
}

/// Slugs of a write request resolved to ids.
#[derive(Debug, Default)]
struct ResolvedRefs {
    category_id: Option<DbId>,
    genre_ids: Option<Vec<DbId>>,
}

impl TitleWriteRequest {
    /// Check field formats and, for creation, presence of required fields.
    fn validate(&self, creating: bool) -> FieldErrors {
        let mut errors = FieldErrors::new();

        match &self.name {
            Some(name) => errors.check("name", validate_name(name)),
            None if creating => errors.add("name", REQUIRED),
            None => {}
        }
        match self.year {
            Some(year) => errors.check("year", validate_year(year, current_year())),
            None if creating => errors.add("year", REQUIRED),
            None => {}
        }
        if let Some(description) = &self.description {
            errors.check("description", reject_nul(description));
        }
        match &self.genre {
            Some(Some(slugs)) if slugs.is_empty() => {
                errors.add("genre", "At least one genre is required")
            }
            Some(Some(_)) => {}
            Some(None) => errors.add("genre", NOT_NULL),
            None if creating => errors.add("genre", REQUIRED),
            None => {}
        }
        match &self.category {
            Some(Some(_)) => {}
            Some(None) => errors.add("category", NOT_NULL),
            None if creating => errors.add("category", REQUIRED),
            None => {}
        }

        errors
    }

    /// Validate, then look up the referenced slugs. Unknown slugs are
    /// reported as field errors alongside any format problems.
    async fn resolve(&self, pool: &DbPool, creating: bool) -> AppResult<ResolvedRefs> {
        let mut errors = self.validate(creating);
        let mut refs = ResolvedRefs::default();

        if let Some(Some(slug)) = &self.category {
            match CatalogRepo::find_by_slug(pool, CatalogKind::Category, slug).await? {
                Some(category) => refs.category_id = Some(category.id),
                None => errors.add("category", format!("Unknown category '{slug}'")),
            }
        }

        let genre = self.genre.as_ref().and_then(Option::as_ref);
        if let Some(slugs) = genre.filter(|s| !s.is_empty()) {
            let wanted: BTreeSet<&str> = slugs.iter().map(String::as_str).collect();
            let found = CatalogRepo::find_by_slugs(pool, CatalogKind::Genre, slugs).await?;
            let missing: Vec<&str> = wanted
                .iter()
                .copied()
                .filter(|slug| !found.iter().any(|g| g.slug == *slug))
                .collect();
            if missing.is_empty() {
                refs.genre_ids = Some(found.into_iter().map(|g| g.id).collect());
            } else {
                errors.add("genre", format!("Unknown genre(s): {}", missing.join(", ")));
            }
        }

        errors.into_result()?;
        Ok(refs)
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/titles
///
/// Filters: `category`, `genre` (slug substring), `name` (substring), `year`.
pub async fn list_titles(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<TitleQuery>,
) -> AppResult<impl IntoResponse> {
    let filter = TitleFilter {
        category: params.category.filter(|s| !s.is_empty()),
        genre: params.genre.filter(|s| !s.is_empty()),
        name: params.name.filter(|s| !s.is_empty()),
        year: params.year,
        limit: params.limit,
        offset: params.offset,
    };
    let page = TitleRepo::list(&state.pool, &filter).await?;
    Ok(Json(page))
}

/// GET /api/v1/titles/{id}
pub async fn get_title(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<DbId>,
) -> AppResult<impl IntoResponse> {
    let title = TitleRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("Title", id))?;
    Ok(Json(title))
}

/// POST /api/v1/titles
pub async fn create_title(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    ApiJson(input): ApiJson<TitleWriteRequest>,
) -> AppResult<impl IntoResponse> {
    let refs = input.resolve(&state.pool, true).await?;

    let title = TitleRepo::create(
        &state.pool,
        &CreateTitle {
            name: input.name.unwrap_or_default(),
            year: input.year.unwrap_or_default(),
            description: input.description.unwrap_or_default(),
            category_id: refs.category_id,
            genre_ids: refs.genre_ids.unwrap_or_default(),
        },
    )
    .await?;

    tracing::info!(title_id = title.id, user_id = admin.user_id, "Title created");

    Ok((StatusCode::CREATED, Json(title)))
}

/// PATCH /api/v1/titles/{id}
pub async fn update_title(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<DbId>,
    ApiJson(input): ApiJson<TitleWriteRequest>,
) -> AppResult<impl IntoResponse> {
    if !TitleRepo::exists(&state.pool, id).await? {
        return Err(CoreError::not_found("Title", id).into());
    }

    let refs = input.resolve(&state.pool, false).await?;

    let title = TitleRepo::update(
        &state.pool,
        id,
        &UpdateTitle {
            name: input.name,
            year: input.year,
            description: input.description,
            category_id: refs.category_id,
            genre_ids: refs.genre_ids,
        },
    )
    .await?
    .ok_or_else(|| CoreError::not_found("Title", id))?;

    tracing::info!(title_id = id, user_id = admin.user_id, "Title updated");

    Ok(Json(title))
}

/// DELETE /api/v1/titles/{id}
///
/// Reviews of the title and their comments are deleted with it.
pub async fn delete_title(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<DbId>,
) -> AppResult<impl IntoResponse> {
    if !TitleRepo::delete(&state.pool, id).await? {
        return Err(CoreError::not_found("Title", id).into());
    }

    tracing::info!(title_id = id, user_id = admin.user_id, "Title deleted");

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creation_requires_core_fields() {
        let errors = TitleWriteRequest::default().validate(true);
        for field in ["name", "year", "genre", "category"] {
            assert!(errors.contains(field), "{field} should be required");
        }
        assert!(!errors.contains("description"));
    }

    #[test]
    fn partial_update_accepts_empty_body() {
        assert!(TitleWriteRequest::default().validate(false).is_empty());
    }

    #[test]
    fn future_year_and_empty_genre_are_rejected() {
        let input = TitleWriteRequest {
            year: Some(current_year() + 1),
            genre: Some(Some(vec![])),
            ..Default::default()
        };
        let errors = input.validate(false);
        assert!(errors.contains("year"));
        assert!(errors.contains("genre"));
    }

    #[test]
    fn explicit_null_differs_from_absent() {
        let input: TitleWriteRequest =
            serde_json::from_str(r#"{"category": null, "genre": null}"#).unwrap();
        let errors = input.validate(false);
        assert_eq!(errors.get("category"), Some(&[NOT_NULL.to_string()][..]));
        assert_eq!(errors.get("genre"), Some(&[NOT_NULL.to_string()][..]));

        let absent: TitleWriteRequest = serde_json::from_str("{}").unwrap();
        assert!(absent.validate(false).is_empty());
    }

    #[test]
    fn description_with_nul_is_rejected() {
        let input = TitleWriteRequest {
            description: Some("bad\0text".into()),
            ..Default::default()
        };
        assert!(input.validate(false).contains("description"));
    }
}
