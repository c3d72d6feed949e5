//! Repository for the `categories` and `genres` tables.

use sqlx::PgPool;
use yamdb_core::search::{
    clamp_limit, clamp_offset, contains_pattern, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE,
};

use crate::models::catalog::{CatalogEntry, CatalogKind, CatalogListParams, CreateCatalogEntry};
use crate::models::page::Page;

/// Column list shared by both catalog tables.
const COLUMNS: &str = "id, name, slug";

/// Provides CRUD operations for categories and genres.
pub struct CatalogRepo;

impl CatalogRepo {
    /// Insert a new entry, returning the created row.
    pub async fn create(
        pool: &PgPool,
        kind: CatalogKind,
        input: &CreateCatalogEntry,
    ) -> Result<CatalogEntry, sqlx::Error> {
        let query = format!(
            "INSERT INTO {} (name, slug) VALUES ($1, $2) RETURNING {COLUMNS}",
            kind.table()
        );
        sqlx::query_as::<_, CatalogEntry>(&query)
            .bind(&input.name)
            .bind(&input.slug)
            .fetch_one(pool)
            .await
    }

    /// Find an entry by its slug.
    pub async fn find_by_slug(
        pool: &PgPool,
        kind: CatalogKind,
        slug: &str,
    ) -> Result<Option<CatalogEntry>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM {} WHERE slug = $1", kind.table());
        sqlx::query_as::<_, CatalogEntry>(&query)
            .bind(slug)
            .fetch_optional(pool)
            .await
    }

    /// Find all entries whose slug is in `slugs`. Unknown slugs are skipped.
    pub async fn find_by_slugs(
        pool: &PgPool,
        kind: CatalogKind,
        slugs: &[String],
    ) -> Result<Vec<CatalogEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM {} WHERE slug = ANY($1) ORDER BY name",
            kind.table()
        );
        sqlx::query_as::<_, CatalogEntry>(&query)
            .bind(slugs)
            .fetch_all(pool)
            .await
    }

    /// List entries ordered by name, optionally filtered by a name substring.
    pub async fn list(
        pool: &PgPool,
        kind: CatalogKind,
        params: &CatalogListParams,
    ) -> Result<Page<CatalogEntry>, sqlx::Error> {
        let limit = clamp_limit(params.limit, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE);
        let offset = clamp_offset(params.offset);
        let pattern = params.search.as_deref().map(contains_pattern);

        let query = format!(
            "SELECT {COLUMNS} FROM {} \
             WHERE ($1::TEXT IS NULL OR name ILIKE $1) \
             ORDER BY name, id \
             LIMIT $2 OFFSET $3",
            kind.table()
        );
        let results = sqlx::query_as::<_, CatalogEntry>(&query)
            .bind(&pattern)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await?;

        let count_query = format!(
            "SELECT COUNT(*) FROM {} WHERE ($1::TEXT IS NULL OR name ILIKE $1)",
            kind.table()
        );
        let count = sqlx::query_scalar::<_, i64>(&count_query)
            .bind(&pattern)
            .fetch_one(pool)
            .await?;

        Ok(Page { count, results })
    }

    /// Delete an entry by slug.
    ///
    /// Titles in a deleted category keep existing with no category; a
    /// deleted genre is unlinked from its titles. Returns `true` if a row
    /// was deleted.
    pub async fn delete_by_slug(
        pool: &PgPool,
        kind: CatalogKind,
        slug: &str,
    ) -> Result<bool, sqlx::Error> {
        let query = format!("DELETE FROM {} WHERE slug = $1", kind.table());
        let result = sqlx::query(&query).bind(slug).execute(pool).await?;
        Ok(result.rows_affected() > 0)
    }
}
