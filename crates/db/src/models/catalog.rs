//! Categories and genres.
//!
//! Both tables share the same shape (`name` + unique `slug`), so a single
//! model parameterized by [`CatalogKind`] serves them.

use serde::Serialize;
use sqlx::FromRow;
use yamdb_core::types::DbId;

/// Which catalog table an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogKind {
    Category,
    Genre,
}

impl CatalogKind {
    pub fn table(&self) -> &'static str {
        match self {
            Self::Category => "categories",
            Self::Genre => "genres",
        }
    }

    /// Entity name used in error messages.
    pub fn entity(&self) -> &'static str {
        match self {
            Self::Category => "Category",
            Self::Genre => "Genre",
        }
    }
}

/// A row from `categories` or `genres`. Serializes as `{name, slug}`.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct CatalogEntry {
    #[serde(skip_serializing)]
    pub id: DbId,
    pub name: String,
    pub slug: String,
}

/// DTO for creating a category or genre.
#[derive(Debug, Clone)]
pub struct CreateCatalogEntry {
    pub name: String,
    pub slug: String,
}

/// Listing parameters for categories and genres.
#[derive(Debug, Clone, Default)]
pub struct CatalogListParams {
    /// Case-insensitive name substring.
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
