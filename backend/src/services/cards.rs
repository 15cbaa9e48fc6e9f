//! Display-ready card data for the dashboard grid, so clients only have to
//! lay the fields out.

use crate::models::{Platform, Video, VideoStats};
use serde::Serialize;

pub const GRID_LIMIT: usize = 20;
pub const VISIBLE_HASHTAGS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Vertical,
    Horizontal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatLabels {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub views: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub likes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoCard {
    pub id: String,
    pub title: String,
    pub url: String,
    pub embed_url: String,
    pub platform: Platform,
    pub orientation: Orientation,
    pub badges: Vec<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_line: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<StatLabels>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub hashtags: Vec<String>,
    pub hidden_hashtags: usize,
}

/// `45s` under a minute, `m:ss` otherwise. Zero means unknown.
pub fn format_duration(seconds: u64) -> Option<String> {
    match seconds {
        0 => None,
        1..=59 => Some(format!("{seconds}s")),
        _ => Some(format!("{}:{:02}", seconds / 60, seconds % 60)),
    }
}

/// Thousands-separated integer, `1234567` -> `1,234,567`.
pub fn format_with_separators(number: u64) -> String {
    let digits = number.to_string();
    let len = digits.len();
    let mut result = String::with_capacity(len + len / 3);

    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result
}

fn stat_label(count: u64, formatted: &str) -> Option<String> {
    if count == 0 {
        None
    } else if formatted.is_empty() {
        Some(format_with_separators(count))
    } else {
        Some(formatted.to_string())
    }
}

fn stat_labels(stats: &VideoStats) -> StatLabels {
    StatLabels {
        views: stat_label(stats.views, &stats.views_formatted),
        likes: stat_label(stats.likes, &stats.likes_formatted),
        comments: stat_label(stats.comments, &stats.comments_formatted),
    }
}

impl From<&Video> for VideoCard {
    fn from(video: &Video) -> Self {
        let is_short = video.is_short.unwrap_or(false);
        let is_tiktok = video.platform == Platform::Tiktok;

        let mut badges = Vec::new();
        if is_short {
            badges.push("Short");
        }
        if is_tiktok {
            badges.push("TikTok");
        }

        VideoCard {
            id: video.id.clone(),
            title: video.title.clone(),
            url: video.url.clone(),
            embed_url: video.embed_url.clone(),
            platform: video.platform,
            orientation: if is_short || is_tiktok {
                Orientation::Vertical
            } else {
                Orientation::Horizontal
            },
            badges,
            duration_label: video.duration.and_then(format_duration),
            author_line: video
                .author
                .as_ref()
                .map(|author| format!("{} • {}", video.platform.display_name(), author)),
            stats: video.stats.as_ref().map(stat_labels),
            description: video.description.clone(),
            hashtags: video.hashtags.iter().take(VISIBLE_HASHTAGS).cloned().collect(),
            hidden_hashtags: video.hashtags.len().saturating_sub(VISIBLE_HASHTAGS),
        }
    }
}

/// Cards for the newest [`GRID_LIMIT`] videos. `videos` is expected newest first.
pub fn build_grid(videos: &[Video]) -> Vec<VideoCard> {
    videos.iter().take(GRID_LIMIT).map(VideoCard::from).collect()
}
