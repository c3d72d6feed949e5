//! Repository for the `titles` and `title_genres` tables.
//!
//! Titles are always read with their category joined in, their genres
//! attached, and `rating` computed as the mean of their review scores.

use std::collections::HashMap;

use sqlx::PgPool;
use yamdb_core::search::{
    clamp_limit, clamp_offset, contains_pattern, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE,
};
use yamdb_core::types::DbId;

use crate::models::catalog::CatalogEntry;
use crate::models::page::Page;
use crate::models::title::{CreateTitle, Title, TitleFilter, TitleGenre, TitleRow, UpdateTitle};

/// Select list + joins producing a [`TitleRow`].
const SELECT_TITLE_ROWS: &str = "\
    SELECT t.id, t.name, t.year, t.description, \
           (SELECT AVG(r.score)::FLOAT8 FROM reviews r WHERE r.title_id = t.id) AS rating, \
           t.category_id, c.name AS category_name, c.slug AS category_slug \
    FROM titles t \
    LEFT JOIN categories c ON c.id = t.category_id";

/// Listing filter. `$1` category slug pattern, `$2` genre slug pattern,
/// `$3` name pattern, `$4` exact year.
const LIST_FILTER: &str = "\
    WHERE ($1::TEXT IS NULL OR c.slug ILIKE $1) \
      AND ($2::TEXT IS NULL OR EXISTS ( \
            SELECT 1 FROM title_genres tg \
            JOIN genres g ON g.id = tg.genre_id \
            WHERE tg.title_id = t.id AND g.slug ILIKE $2)) \
      AND ($3::TEXT IS NULL OR t.name ILIKE $3) \
      AND ($4::INT IS NULL OR t.year = $4)";

/// Provides CRUD operations for titles and their genre links.
pub struct TitleRepo;

impl TitleRepo {
    /// Insert a title and its genre links in one transaction.
    pub async fn create(pool: &PgPool, input: &CreateTitle) -> Result<Title, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let id = sqlx::query_scalar::<_, DbId>(
            "INSERT INTO titles (name, year, description, category_id) \
             VALUES ($1, $2, $3, $4) \
             RETURNING id",
        )
        .bind(&input.name)
        .bind(input.year)
        .bind(&input.description)
        .bind(input.category_id)
        .fetch_one(&mut *tx)
        .await?;

        Self::set_genres_inner(&mut tx, id, &input.genre_ids).await?;

        tx.commit().await?;

        Self::find_by_id(pool, id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    /// Find a title by ID, fully resolved.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Title>, sqlx::Error> {
        let query = format!("{SELECT_TITLE_ROWS} WHERE t.id = $1");
        let row = sqlx::query_as::<_, TitleRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;

        match row {
            Some(row) => {
                let mut genres = Self::genres_for(pool, &[row.id]).await?;
                let genre = genres.remove(&row.id).unwrap_or_default();
                Ok(Some(Title::from_parts(row, genre)))
            }
            None => Ok(None),
        }
    }

    /// Whether a title with this ID exists.
    pub async fn exists(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM titles WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    /// List titles matching `filter`, ordered by name.
    ///
    /// Genres for the whole page are fetched in a single query.
    pub async fn list(pool: &PgPool, filter: &TitleFilter) -> Result<Page<Title>, sqlx::Error> {
        let limit = clamp_limit(filter.limit, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE);
        let offset = clamp_offset(filter.offset);
        let category = filter.category.as_deref().map(contains_pattern);
        let genre = filter.genre.as_deref().map(contains_pattern);
        let name = filter.name.as_deref().map(contains_pattern);

        let query = format!(
            "{SELECT_TITLE_ROWS} {LIST_FILTER} \
             ORDER BY t.name, t.id \
             LIMIT $5 OFFSET $6"
        );
        let rows = sqlx::query_as::<_, TitleRow>(&query)
            .bind(&category)
            .bind(&genre)
            .bind(&name)
            .bind(filter.year)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await?;

        let count_query = format!(
            "SELECT COUNT(*) FROM titles t \
             LEFT JOIN categories c ON c.id = t.category_id \
             {LIST_FILTER}"
        );
        let count = sqlx::query_scalar::<_, i64>(&count_query)
            .bind(&category)
            .bind(&genre)
            .bind(&name)
            .bind(filter.year)
            .fetch_one(pool)
            .await?;

        let ids: Vec<DbId> = rows.iter().map(|r| r.id).collect();
        let mut genres = Self::genres_for(pool, &ids).await?;

        let results = rows
            .into_iter()
            .map(|row| {
                let genre = genres.remove(&row.id).unwrap_or_default();
                Title::from_parts(row, genre)
            })
            .collect();

        Ok(Page { count, results })
    }

    /// Update a title. Only non-`None` fields are applied; `genre_ids`
    /// replaces the whole genre set.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateTitle,
    ) -> Result<Option<Title>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let updated = sqlx::query_scalar::<_, DbId>(
            "UPDATE titles SET \
                name = COALESCE($2, name), \
                year = COALESCE($3, year), \
                description = COALESCE($4, description), \
                category_id = COALESCE($5, category_id) \
             WHERE id = $1 \
             RETURNING id",
        )
        .bind(id)
        .bind(&input.name)
        .bind(input.year)
        .bind(&input.description)
        .bind(input.category_id)
        .fetch_optional(&mut *tx)
        .await?;

        if updated.is_none() {
            return Ok(None);
        }

        if let Some(ref genre_ids) = input.genre_ids {
            Self::set_genres_inner(&mut tx, id, genre_ids).await?;
        }

        tx.commit().await?;
        Self::find_by_id(pool, id).await
    }

    /// Delete a title. Reviews and their comments cascade.
    ///
    /// Returns `true` if a row was deleted.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM titles WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // -----------------------------------------------------------------------
    // Genre link helpers
    // -----------------------------------------------------------------------

    /// Genres for each of `title_ids`, ordered by name.
    async fn genres_for(
        pool: &PgPool,
        title_ids: &[DbId],
    ) -> Result<HashMap<DbId, Vec<CatalogEntry>>, sqlx::Error> {
        let mut by_title: HashMap<DbId, Vec<CatalogEntry>> = HashMap::new();
        if title_ids.is_empty() {
            return Ok(by_title);
        }

        let links = sqlx::query_as::<_, TitleGenre>(
            "SELECT tg.title_id, g.id, g.name, g.slug \
             FROM title_genres tg \
             JOIN genres g ON g.id = tg.genre_id \
             WHERE tg.title_id = ANY($1) \
             ORDER BY g.name, g.id",
        )
        .bind(title_ids)
        .fetch_all(pool)
        .await?;

        for link in links {
            by_title.entry(link.title_id).or_default().push(CatalogEntry {
                id: link.id,
                name: link.name,
                slug: link.slug,
            });
        }
        Ok(by_title)
    }

    /// Replace all genre links for a title.
    async fn set_genres_inner(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        title_id: DbId,
        genre_ids: &[DbId],
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM title_genres WHERE title_id = $1")
            .bind(title_id)
            .execute(&mut **tx)
            .await?;

        sqlx::query(
            "INSERT INTO title_genres (title_id, genre_id) \
             SELECT $1, UNNEST($2::BIGINT[]) \
             ON CONFLICT DO NOTHING",
        )
        .bind(title_id)
        .bind(genre_ids)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }
}
