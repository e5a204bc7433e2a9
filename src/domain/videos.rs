//! Video domain - DB queries for the `videos` table
//!
//! All functions use the generic Executor pattern, allowing them to work with
//! both `&PgPool` (for standalone queries) and `&mut PgConnection` (for transactions).

use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{Executor, Postgres};

use crate::models::{NewVideo, Thumbnails, VideoRecord};

#[derive(Debug, sqlx::FromRow)]
pub struct VideoRow {
    pub id: i64,
    pub title: Option<String>,
    pub description: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub thumbnails: Option<Json<Thumbnails>>,
}

impl From<VideoRow> for VideoRecord {
    fn from(row: VideoRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            description: row.description,
            published_at: row.published_at,
            thumbnails: row.thumbnails.map(|t| t.0),
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CountResult {
    count: i64,
}

/// Create the videos table if it does not exist yet
pub async fn ensure_table<'e, E>(executor: E) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS videos (
            id BIGSERIAL PRIMARY KEY,
            title TEXT,
            description TEXT,
            published_at TIMESTAMPTZ,
            thumbnails JSONB
        )
        "#,
    )
    .execute(executor)
    .await?;

    Ok(())
}

/// Insert a batch of videos in a single statement.
/// No uniqueness constraint: the same upstream item inserted twice yields two rows.
pub async fn insert_videos<'e, E>(executor: E, videos: &[NewVideo]) -> Result<u64, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    if videos.is_empty() {
        return Ok(0);
    }

    let mut titles = Vec::with_capacity(videos.len());
    let mut descriptions = Vec::with_capacity(videos.len());
    let mut published = Vec::with_capacity(videos.len());
    let mut thumbnails = Vec::with_capacity(videos.len());

    for video in videos {
        titles.push(video.title.clone());
        descriptions.push(video.description.clone());
        published.push(video.published_at);
        thumbnails.push(
            video
                .thumbnails
                .as_ref()
                .map(serde_json::to_value)
                .transpose()
                .map_err(|e| sqlx::Error::Encode(Box::new(e)))?,
        );
    }

    // WITH ORDINALITY keeps BIGSERIAL ids in batch order
    let result = sqlx::query(
        r#"
        INSERT INTO videos (title, description, published_at, thumbnails)
        SELECT title, description, published_at, thumbnails
        FROM UNNEST($1::text[], $2::text[], $3::timestamptz[], $4::jsonb[])
            WITH ORDINALITY AS batch(title, description, published_at, thumbnails, position)
        ORDER BY position
        "#,
    )
    .bind(titles)
    .bind(descriptions)
    .bind(published)
    .bind(thumbnails)
    .execute(executor)
    .await?;

    Ok(result.rows_affected())
}

/// Count all stored videos
pub async fn count_videos<'e, E>(executor: E) -> Result<i64, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let result: CountResult = sqlx::query_as("SELECT COUNT(*) as count FROM videos")
        .fetch_one(executor)
        .await?;

    Ok(result.count)
}

/// One page of videos, newest first. Negative skip/limit are passed through
/// and rejected by Postgres.
pub async fn list_videos_page<'e, E>(
    executor: E,
    skip: i64,
    limit: i64,
) -> Result<Vec<VideoRow>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        r#"
        SELECT id, title, description, published_at, thumbnails
        FROM videos
        ORDER BY published_at DESC NULLS LAST, id ASC
        LIMIT $1 OFFSET $2
        "#,
    )
    .bind(limit)
    .bind(skip)
    .fetch_all(executor)
    .await
}

/// Videos whose title or description contains `needle`, case-insensitively.
/// The needle is matched literally.
pub async fn search_videos<'e, E>(executor: E, needle: &str) -> Result<Vec<VideoRow>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let pattern = format!("%{}%", escape_like(needle));

    sqlx::query_as(
        r#"
        SELECT id, title, description, published_at, thumbnails
        FROM videos
        WHERE title ILIKE $1 ESCAPE '\' OR description ILIKE $1 ESCAPE '\'
        ORDER BY id ASC
        "#,
    )
    .bind(pattern)
    .fetch_all(executor)
    .await
}

/// Escape LIKE metacharacters so the input only ever matches itself
pub fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
