//! Storage backends for video records.
//!
//! Ingestion writes and the query routes read through [`VideoStore`]. The
//! Postgres backend is used when `DATABASE_URL` is configured; otherwise the
//! process falls back to [`MemoryStore`]. Every method is a single storage
//! primitive, so a count followed by a page read may observe different data
//! if an ingestion cycle lands in between.

use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Mutex;
use thiserror::Error;

use crate::domain::videos;
use crate::models::{NewVideo, VideoRecord};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("invalid page window: skip={skip}, limit={limit}")]
    InvalidWindow { skip: i64, limit: i64 },

    #[error("store lock poisoned")]
    Poisoned,
}

#[async_trait]
pub trait VideoStore: Send + Sync {
    /// Insert the whole batch in one operation, returning the number written
    async fn insert_many(&self, videos: &[NewVideo]) -> Result<u64, StoreError>;

    /// Total number of stored records
    async fn count(&self) -> Result<i64, StoreError>;

    /// Records ordered newest first, skipping `skip` and returning at most `limit`
    async fn list_page(&self, skip: i64, limit: i64) -> Result<Vec<VideoRecord>, StoreError>;

    /// Records whose title or description contains `needle`, ignoring case
    async fn search(&self, needle: &str) -> Result<Vec<VideoRecord>, StoreError>;
}

/// Postgres-backed store
#[derive(Clone)]
pub struct PgVideoStore {
    db: PgPool,
}

impl PgVideoStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl VideoStore for PgVideoStore {
    async fn insert_many(&self, batch: &[NewVideo]) -> Result<u64, StoreError> {
        Ok(videos::insert_videos(&self.db, batch).await?)
    }

    async fn count(&self) -> Result<i64, StoreError> {
        Ok(videos::count_videos(&self.db).await?)
    }

    async fn list_page(&self, skip: i64, limit: i64) -> Result<Vec<VideoRecord>, StoreError> {
        let rows = videos::list_videos_page(&self.db, skip, limit).await?;
        Ok(rows.into_iter().map(VideoRecord::from).collect())
    }

    async fn search(&self, needle: &str) -> Result<Vec<VideoRecord>, StoreError> {
        let rows = videos::search_videos(&self.db, needle).await?;
        Ok(rows.into_iter().map(VideoRecord::from).collect())
    }
}

/// In-process store with the same ordering and matching rules as Postgres
#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<Vec<VideoRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn contains_ignore_case(field: Option<&str>, needle: &str) -> bool {
    field.is_some_and(|value| value.to_lowercase().contains(needle))
}

#[async_trait]
impl VideoStore for MemoryStore {
    async fn insert_many(&self, batch: &[NewVideo]) -> Result<u64, StoreError> {
        let mut records = self.records.lock().map_err(|_| StoreError::Poisoned)?;
        let mut next_id = records.last().map(|r| r.id).unwrap_or(0);
        for video in batch {
            next_id += 1;
            records.push(VideoRecord::from_new(next_id, video.clone()));
        }
        Ok(batch.len() as u64)
    }

    async fn count(&self) -> Result<i64, StoreError> {
        let records = self.records.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(records.len() as i64)
    }

    async fn list_page(&self, skip: i64, limit: i64) -> Result<Vec<VideoRecord>, StoreError> {
        // Postgres rejects negative OFFSET/LIMIT; keep the same contract here
        if skip < 0 || limit < 0 {
            return Err(StoreError::InvalidWindow { skip, limit });
        }

        let records = self.records.lock().map_err(|_| StoreError::Poisoned)?;
        let mut sorted: Vec<&VideoRecord> = records.iter().collect();
        // Newest first, undated last, insertion order on ties (stable sort)
        sorted.sort_by(|a, b| match (a.published_at, b.published_at) {
            (Some(x), Some(y)) => y.cmp(&x),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        });

        Ok(sorted
            .into_iter()
            .skip(skip as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn search(&self, needle: &str) -> Result<Vec<VideoRecord>, StoreError> {
        let needle = needle.to_lowercase();
        let records = self.records.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(records
            .iter()
            .filter(|r| {
                contains_ignore_case(r.title.as_deref(), &needle)
                    || contains_ignore_case(r.description.as_deref(), &needle)
            })
            .cloned()
            .collect())
    }
}
