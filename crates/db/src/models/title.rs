//! Title entity model and DTOs.

use serde::Serialize;
use sqlx::FromRow;
use yamdb_core::types::DbId;

use super::catalog::CatalogEntry;

/// A title row joined with its category and aggregated rating.
#[derive(Debug, Clone, FromRow)]
pub struct TitleRow {
    pub id: DbId,
    pub name: String,
    pub year: i32,
    pub description: String,
    /// Mean review score, `NULL` when the title has no reviews.
    pub rating: Option<f64>,
    pub category_id: Option<DbId>,
    pub category_name: Option<String>,
    pub category_slug: Option<String>,
}

/// A genre attached to a title, as read from `title_genres`.
#[derive(Debug, Clone, FromRow)]
pub struct TitleGenre {
    pub title_id: DbId,
    pub id: DbId,
    pub name: String,
    pub slug: String,
}

/// A title with its genres and category resolved.
#[derive(Debug, Clone, Serialize)]
pub struct Title {
    pub id: DbId,
    pub name: String,
    pub year: i32,
    pub rating: Option<f64>,
    pub description: String,
    pub genre: Vec<CatalogEntry>,
    pub category: Option<CatalogEntry>,
}

impl Title {
    /// Assemble a title from its row and the genres linked to it.
    pub fn from_parts(row: TitleRow, genre: Vec<CatalogEntry>) -> Self {
        let category = match (row.category_id, row.category_name, row.category_slug) {
            (Some(id), Some(name), Some(slug)) => Some(CatalogEntry { id, name, slug }),
            _ => None,
        };
        Self {
            id: row.id,
            name: row.name,
            year: row.year,
            rating: row.rating,
            description: row.description,
            genre,
            category,
        }
    }
}

/// DTO for creating a title. Slugs are already resolved to ids.
#[derive(Debug, Clone)]
pub struct CreateTitle {
    pub name: String,
    pub year: i32,
    pub description: String,
    pub category_id: Option<DbId>,
    pub genre_ids: Vec<DbId>,
}

/// DTO for updating a title. `genre_ids` replaces the whole set when present.
#[derive(Debug, Clone, Default)]
pub struct UpdateTitle {
    pub name: Option<String>,
    pub year: Option<i32>,
    pub description: Option<String>,
    pub category_id: Option<DbId>,
    pub genre_ids: Option<Vec<DbId>>,
}

/// Filters accepted by the title listing.
#[derive(Debug, Clone, Default)]
pub struct TitleFilter {
    /// Case-insensitive category slug substring.
    pub category: Option<String>,
    /// Case-insensitive genre slug substring.
    pub genre: Option<String>,
    /// Case-insensitive name substring.
    pub name: Option<String>,
    /// Exact release year.
    pub year: Option<i32>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(category: Option<(DbId, &str, &str)>) -> TitleRow {
        TitleRow {
            id: 1,
            name: "Solaris".into(),
            year: 1972,
            description: String::new(),
            rating: Some(8.5),
            category_id: category.map(|c| c.0),
            category_name: category.map(|c| c.1.to_string()),
            category_slug: category.map(|c| c.2.to_string()),
        }
    }

    #[test]
    fn from_parts_resolves_category() {
        let title = Title::from_parts(row(Some((3, "Films", "films"))), vec![]);
        let category = title.category.expect("category should be set");
        assert_eq!(category.slug, "films");
        assert_eq!(title.rating, Some(8.5));
    }

    #[test]
    fn from_parts_without_category() {
        let title = Title::from_parts(row(None), vec![]);
        assert!(title.category.is_none());
    }
}
