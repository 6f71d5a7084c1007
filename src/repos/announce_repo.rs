/*
 * Responsibility
 * - announces CRUD (create / delete / paged list)
 */
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::repos::error::RepoResult;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AnnounceRow {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub url: Option<String>,
    pub created_at: DateTime<Utc>,
}

pub async fn create(
    db: &PgPool,
    title: &str,
    content: &str,
    url: Option<&str>,
) -> RepoResult<AnnounceRow> {
    let row = sqlx::query_as::<_, AnnounceRow>(
        r#"
        INSERT INTO announces (title, content, url)
        VALUES ($1, $2, $3)
        RETURNING id, title, content, url, created_at
        "#,
    )
    .bind(title)
    .bind(content)
    .bind(url)
    .fetch_one(db)
    .await?;

    Ok(row)
}

/// Deleting a missing id is not an error; returns whether a row went away.
pub async fn delete(db: &PgPool, id: i64) -> RepoResult<bool> {
    let result = sqlx::query(
        r#"
        DELETE FROM announces
        WHERE id = $1
        "#,
    )
    .bind(id)
    .execute(db)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// `page` is 1-based. Offsets that do not fit in an i64 read an empty page.
pub async fn list(db: &PgPool, page: i64, page_size: i64) -> RepoResult<Vec<AnnounceRow>> {
    let Some(offset) = page_offset(page, page_size) else {
        return Ok(Vec::new());
    };

    let rows = sqlx::query_as::<_, AnnounceRow>(
        r#"
        SELECT id, title, content, url, created_at
        FROM announces
        ORDER BY id DESC
        LIMIT $1 OFFSET $2
        "#,
    )
    .bind(page_size)
    .bind(offset)
    .fetch_all(db)
    .await?;

    Ok(rows)
}

pub fn page_offset(page: i64, page_size: i64) -> Option<i64> {
    (page.max(1) - 1).checked_mul(page_size)
}

#[cfg(test)]
mod tests {
    use super::page_offset;

    #[test]
    fn pages_are_one_based() {
        assert_eq!(page_offset(1, 10), Some(0));
        assert_eq!(page_offset(3, 10), Some(20));
        assert_eq!(page_offset(0, 10), Some(0));
    }

    #[test]
    fn offset_overflow_is_none() {
        assert_eq!(page_offset(i64::MAX, 50), None);
        assert_eq!(page_offset(i64::MIN, 50), Some(0));
    }
}
