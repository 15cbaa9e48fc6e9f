use crate::services::normalizer::format_number;
use rocket::http::{ContentType, Status};
use rocket::request::Request;
use rocket::response::Responder;
use rocket::serde::{Deserialize, Serialize};
use rocket::{response, Response};
use std::fmt;
use std::io::Cursor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Youtube,
    Tiktok,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Youtube => "youtube",
            Platform::Tiktok => "tiktok",
        }
    }

    /// Capitalized platform name as shown to users ("Youtube", "Tiktok").
    pub fn display_name(&self) -> &'static str {
        match self {
            Platform::Youtube => "Youtube",
            Platform::Tiktok => "Tiktok",
        }
    }

    /// Title used when neither the user nor a provider supplied one.
    pub fn default_title(&self) -> String {
        format!("{} Video", self.display_name())
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Engagement counters plus their compact, human readable form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoStats {
    pub views: u64,
    pub likes: u64,
    pub comments: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shares: Option<u64>,
    pub views_formatted: String,
    pub likes_formatted: String,
    pub comments_formatted: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shares_formatted: Option<String>,
}

impl VideoStats {
    pub fn new(views: u64, likes: u64, comments: u64, shares: Option<u64>) -> Self {
        Self {
            views,
            likes,
            comments,
            shares,
            views_formatted: format_number(views),
            likes_formatted: format_number(likes),
            comments_formatted: format_number(comments),
            shares_formatted: shares.map(format_number),
        }
    }
}

/// Normalized result of a metadata lookup, whichever provider produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct VideoMetadata {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub hashtags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<VideoStats>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_short: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl VideoMetadata {
    /// Minimal record returned when every TikTok tier failed.
    pub fn placeholder(title: &str) -> Self {
        Self {
            title: title.to_string(),
            error: Some("All methods failed".to_string()),
            ..Self::default()
        }
    }
}

/// A saved video as kept in the session collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub hashtags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    pub url: String,
    pub embed_url: String,
    pub platform: Platform,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<VideoStats>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_short: Option<bool>,
    pub created_at: String,
}

/// Body of `POST /api/videos`. Every field except `url` is an optional user edit.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddVideoRequest {
    pub url: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub hashtags: Option<String>,
    #[serde(default)]
    pub metadata: Option<VideoMetadata>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifyResponse {
    pub platform: Platform,
    pub video_id: String,
    pub embed_url: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub youtube_enabled: bool,
    pub tiktok_official_enabled: bool,
    pub rapidapi_enabled: bool,
    pub saved_videos: usize,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    #[serde(skip)]
    pub status: Status,
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl ErrorResponse {
    pub fn new(status: Status, error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            error: error.into(),
            message: message.into(),
            details: None,
            suggestion: None,
        }
    }

    pub fn bad_request(error: impl Into<String>) -> Self {
        let error = error.into();
        Self::new(Status::BadRequest, error.clone(), error)
    }

    pub fn internal(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Status::InternalServerError, error, message)
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

impl<'r> Responder<'r, 'static> for ErrorResponse {
    fn respond_to(self, _: &'r Request<'_>) -> response::Result<'static> {
        let json = serde_json::to_string(&self).map_err(|_| Status::InternalServerError)?;
        Response::build()
            .status(self.status)
            .header(ContentType::JSON)
            .sized_body(json.len(), Cursor::new(json))
            .ok()
    }
}
