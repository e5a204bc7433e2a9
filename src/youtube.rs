use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;

use crate::constants::{SEARCH_MAX_RESULTS, SEARCH_ORDER, SEARCH_PART, SEARCH_TAG, SEARCH_TYPE};
use crate::models::{NewVideo, Thumbnails};

#[derive(Debug, Error)]
pub enum YouTubeError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("YouTube API error ({status}): {body}")]
    Api { status: StatusCode, body: String },
}

/// Body of a search.list response. Only the fields we store are modelled.
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    pub items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
pub struct SearchItem {
    pub snippet: Snippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snippet {
    pub title: Option<String>,
    pub description: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub thumbnails: Option<Thumbnails>,
}

impl From<SearchItem> for NewVideo {
    fn from(item: SearchItem) -> Self {
        let snippet = item.snippet;
        Self {
            title: snippet.title,
            description: snippet.description,
            published_at: snippet.published_at,
            thumbnails: snippet.thumbnails,
        }
    }
}

/// Where an ingestion cycle gets its videos from
#[async_trait]
pub trait VideoSource: Send + Sync {
    async fn fetch_latest(&self) -> Result<Vec<SearchItem>, YouTubeError>;
}

#[derive(Clone)]
pub struct YouTubeClient {
    api_key: String,
    search_url: String,
    http: Client,
}

impl YouTubeClient {
    pub fn new(api_key: &str, search_url: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            search_url: search_url.to_string(),
            http: Client::new(),
        }
    }

    /// Most recent football videos, newest first
    pub async fn search_latest(&self) -> Result<SearchResponse, YouTubeError> {
        let max_results = SEARCH_MAX_RESULTS.to_string();
        let params = [
            ("key", self.api_key.as_str()),
            ("q", SEARCH_TAG),
            ("part", SEARCH_PART),
            ("maxResults", max_results.as_str()),
            ("type", SEARCH_TYPE),
            ("order", SEARCH_ORDER),
        ];

        let resp = self.http.get(&self.search_url).query(&params).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await?;
            return Err(YouTubeError::Api { status, body });
        }

        let search: SearchResponse = resp.json().await?;
        Ok(search)
    }
}

#[async_trait]
impl VideoSource for YouTubeClient {
    async fn fetch_latest(&self) -> Result<Vec<SearchItem>, YouTubeError> {
        Ok(self.search_latest().await?.items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Json, Router, extract::Query, http::StatusCode as AxumStatus, routing::get};
    use serde_json::json;
    use std::collections::HashMap;

    fn sample_body() -> serde_json::Value {
        json!({
            "kind": "youtube#searchListResponse",
            "items": [
                {
                    "id": { "kind": "youtube#video", "videoId": "abc123" },
                    "snippet": {
                        "publishedAt": "2024-05-04T18:30:00Z",
                        "channelId": "UC1",
                        "title": "Late winner in the derby",
                        "description": "Full highlights",
                        "thumbnails": {
                            "default": { "url": "https://i.ytimg.com/vi/abc123/default.jpg", "width": 120, "height": 90 },
                            "high": { "url": "https://i.ytimg.com/vi/abc123/hqdefault.jpg", "width": 480, "height": 360 }
                        }
                    }
                },
                {
                    "id": { "kind": "youtube#video", "videoId": "def456" },
                    "snippet": { "title": "No description or date" }
                }
            ]
        })
    }

    /// Serve `body` with `status` on a random local port, echoing the query
    /// string back in a header so the test can inspect it.
    async fn spawn_upstream(status: AxumStatus, body: serde_json::Value) -> String {
        let app = Router::new().route(
            "/youtube/v3/search",
            get(move |Query(params): Query<HashMap<String, String>>| {
                let body = body.clone();
                async move {
                    let expected = [
                        ("key", "test-key"),
                        ("q", "football"),
                        ("part", "snippet"),
                        ("maxResults", "50"),
                        ("type", "video"),
                        ("order", "date"),
                    ];
                    for (k, v) in expected {
                        if params.get(k).map(String::as_str) != Some(v) {
                            return (AxumStatus::BAD_REQUEST, Json(json!({ "missing": k })));
                        }
                    }
                    (status, Json(body))
                }
            }),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind upstream");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve upstream");
        });

        format!("http://{}/youtube/v3/search", addr)
    }

    #[tokio::test]
    async fn search_latest_sends_fixed_query_and_parses_items() {
        let url = spawn_upstream(AxumStatus::OK, sample_body()).await;
        let client = YouTubeClient::new("test-key", &url);

        let items = client.fetch_latest().await.expect("fetch");
        assert_eq!(items.len(), 2);

        let videos: Vec<NewVideo> = items.into_iter().map(NewVideo::from).collect();
        assert_eq!(videos[0].title.as_deref(), Some("Late winner in the derby"));
        assert_eq!(videos[0].description.as_deref(), Some("Full highlights"));
        assert_eq!(
            videos[0].published_at,
            Some("2024-05-04T18:30:00Z".parse().expect("timestamp"))
        );
        let thumbs = videos[0].thumbnails.as_ref().expect("thumbnails");
        assert_eq!(thumbs["high"].0["width"], 480);
        assert_eq!(thumbs["default"].0["url"], "https://i.ytimg.com/vi/abc123/default.jpg");

        assert_eq!(videos[1].title.as_deref(), Some("No description or date"));
        assert!(videos[1].description.is_none());
        assert!(videos[1].published_at.is_none());
        assert!(videos[1].thumbnails.is_none());
    }

    #[tokio::test]
    async fn api_error_status_is_reported() {
        let url = spawn_upstream(
            AxumStatus::FORBIDDEN,
            json!({ "error": { "code": 403, "message": "quotaExceeded" } }),
        )
        .await;
        let client = YouTubeClient::new("test-key", &url);

        match client.fetch_latest().await {
            Err(YouTubeError::Api { status, body }) => {
                assert_eq!(status, StatusCode::FORBIDDEN);
                assert!(body.contains("quotaExceeded"));
            }
            other => panic!("expected API error, got {:?}", other.map(|v| v.len())),
        }
    }

    #[tokio::test]
    async fn malformed_payload_fails_the_fetch() {
        let url = spawn_upstream(AxumStatus::OK, json!({ "items": [{ "id": "no snippet" }] })).await;
        let client = YouTubeClient::new("test-key", &url);

        assert!(matches!(client.fetch_latest().await, Err(YouTubeError::Http(_))));
    }

    #[tokio::test]
    async fn unusual_thumbnails_do_not_fail_the_fetch() {
        let thumbnails = json!({
            "default": { "width": 120, "height": 90 },
            "maxres": { "url": "u", "width": "1280" }
        });
        let body = json!({
            "items": [
                { "snippet": { "title": "Odd thumbnails", "thumbnails": thumbnails.clone() } },
                { "snippet": { "title": "Plain" } }
            ]
        });
        let url = spawn_upstream(AxumStatus::OK, body).await;
        let client = YouTubeClient::new("test-key", &url);

        let items = client.fetch_latest().await.expect("fetch");
        assert_eq!(items.len(), 2);

        let video = NewVideo::from(items.into_iter().next().expect("first item"));
        let stored = serde_json::to_value(video.thumbnails.expect("thumbnails")).expect("serialize");
        assert_eq!(stored, thumbnails);
    }
}
