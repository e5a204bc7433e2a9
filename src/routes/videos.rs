//! Video read endpoints (/api/videos, /api/search)

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::AppState;
use crate::constants::{DEFAULT_PAGE, DEFAULT_PER_PAGE};
use crate::models::VideoRecord;
use crate::services::error::{InternalError, LogErr};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/videos", get(list_videos))
        .route("/api/search", get(search_videos))
}

/// Raw query params. Kept as strings so malformed numbers fall back to
/// defaults instead of rejecting the request.
#[derive(Debug, Deserialize)]
struct ListVideosQuery {
    page: Option<String>,
    #[serde(rename = "perPage")]
    per_page: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ListVideosResponse {
    videos: Vec<VideoRecord>,
    current_page: i64,
    total_pages: i64,
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    query: Option<String>,
}

#[derive(Debug, Serialize)]
struct SearchResponse {
    videos: Vec<VideoRecord>,
}

/// Lenient integer parse: leading whitespace, optional sign, an optional
/// `0x`/`0X` prefix switching to hexadecimal, then as many digits as are
/// present. Anything after the digits is ignored.
/// Returns `None` when no digits are found.
fn parse_leading_int(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (negative, unsigned) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let (radix, digits) = match unsigned.get(..2) {
        Some("0x" | "0X") => (16, &unsigned[2..]),
        _ => (10, unsigned),
    };

    let end = digits
        .find(|c: char| !c.is_digit(radix))
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }

    let magnitude = digits[..end]
        .chars()
        .filter_map(|c| c.to_digit(radix))
        .fold(0i64, |acc, d| {
            acc.saturating_mul(i64::from(radix))
                .saturating_add(i64::from(d))
        });
    Some(if negative { -magnitude } else { magnitude })
}

/// Parsed value, or `default` when missing, non-numeric, or zero
fn int_param(raw: Option<&str>, default: i64) -> i64 {
    raw.and_then(parse_leading_int)
        .filter(|v| *v != 0)
        .unwrap_or(default)
}

/// ceil(total / per_page). A non-positive page size yields 0 pages.
fn total_pages(total: i64, per_page: i64) -> i64 {
    if per_page <= 0 {
        return 0;
    }
    total / per_page + i64::from(total % per_page != 0)
}

/// GET /api/videos?page=&perPage= - Stored videos, newest first.
/// `page` is echoed back unclamped; past the last page the list is empty.
async fn list_videos(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListVideosQuery>,
) -> Result<Json<ListVideosResponse>, InternalError> {
    let page = int_param(query.page.as_deref(), DEFAULT_PAGE);
    let per_page = int_param(query.per_page.as_deref(), DEFAULT_PER_PAGE);

    let total = state.store.count().await.log_500("Error fetching videos")?;

    let skip = (page - 1).saturating_mul(per_page);
    let videos = state
        .store
        .list_page(skip, per_page)
        .await
        .log_500("Error fetching videos")?;

    Ok(Json(ListVideosResponse {
        videos,
        current_page: page,
        total_pages: total_pages(total, per_page),
    }))
}

/// GET /api/search?query= - Every video whose title or description contains
/// `query` (case-insensitive, literal). No pagination.
async fn search_videos(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<SearchResponse>, InternalError> {
    let needle = query.query.unwrap_or_default();

    let videos = state
        .store
        .search(&needle)
        .await
        .log_500("Error searching videos")?;

    Ok(Json(SearchResponse { videos }))
}
