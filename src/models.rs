//! Shared data models used across modules

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One thumbnail variant as delivered by the upstream API.
///
/// Usually `{ url, width, height }`, but never validated: whatever JSON the
/// upstream sends is stored and served back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Thumbnail(pub serde_json::Value);

/// Size name ("default", "medium", "high", ...) to thumbnail metadata
pub type Thumbnails = BTreeMap<String, Thumbnail>;

/// A video about to be stored. Fields missing upstream stay `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewVideo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnails: Option<Thumbnails>,
}

/// A stored video. Never updated or deleted once written.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoRecord {
    /// Storage-assigned identifier, exposed under the document-store name
    #[serde(rename = "_id")]
    pub id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnails: Option<Thumbnails>,
}

impl VideoRecord {
    pub fn from_new(id: i64, video: NewVideo) -> Self {
        Self {
            id,
            title: video.title,
            description: video.description,
            published_at: video.published_at,
            thumbnails: video.thumbnails,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thumbnail_keeps_unknown_keys() {
        let raw = serde_json::json!({
            "url": "https://i.ytimg.com/vi/abc/hq.jpg",
            "width": 480,
            "height": 360,
            "format": "jpeg"
        });
        let thumb: Thumbnail = serde_json::from_value(raw.clone()).expect("deserialize");
        assert_eq!(thumb.0["width"], 480);
        assert_eq!(serde_json::to_value(&thumb).expect("serialize"), raw);
    }

    #[test]
    fn thumbnail_accepts_any_shape() {
        let raw = serde_json::json!({
            "default": { "width": 120, "height": 90 },
            "maxres": { "url": "u", "width": "1280" },
            "odd": "not an object"
        });
        let thumbs: Thumbnails = serde_json::from_value(raw.clone()).expect("deserialize");

        assert!(thumbs["default"].0.get("url").is_none());
        assert_eq!(thumbs["maxres"].0["width"], "1280");
        assert_eq!(thumbs["odd"].0, "not an object");
        assert_eq!(serde_json::to_value(&thumbs).expect("serialize"), raw);
    }

    #[test]
    fn record_serializes_with_document_field_names() {
        let record = VideoRecord::from_new(
            7,
            NewVideo {
                title: Some("Derby highlights".to_string()),
                description: None,
                published_at: Some("2024-03-01T12:00:00Z".parse().expect("timestamp")),
                thumbnails: None,
            },
        );
        let json = serde_json::to_value(&record).expect("serialize");
        assert_eq!(json["_id"], 7);
        assert_eq!(json["title"], "Derby highlights");
        assert_eq!(json["publishedAt"], "2024-03-01T12:00:00Z");
        assert!(json.get("description").is_none());
        assert!(json.get("thumbnails").is_none());
    }
}
