//! Application constants

/// YouTube Data API search endpoint
pub const YOUTUBE_SEARCH_URL: &str = "https://www.googleapis.com/youtube/v3/search";

/// Keyword every ingestion cycle searches for
pub const SEARCH_TAG: &str = "football";

/// Upstream result shape: snippet payload, videos only, newest first
pub const SEARCH_PART: &str = "snippet";
pub const SEARCH_TYPE: &str = "video";
pub const SEARCH_ORDER: &str = "date";

/// Maximum results per upstream request (API ceiling is 50)
pub const SEARCH_MAX_RESULTS: u32 = 50;

/// Seconds between ingestion cycles
pub const DEFAULT_FETCH_INTERVAL_SECS: u64 = 10;

/// Default listen port
pub const DEFAULT_PORT: u16 = 3000;

/// Default page number for /api/videos
pub const DEFAULT_PAGE: i64 = 1;

/// Default page size for /api/videos
pub const DEFAULT_PER_PAGE: i64 = 10;
