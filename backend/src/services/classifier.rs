use crate::models::Platform;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref YOUTUBE_RE: Regex = Regex::new(
        r#"(?:youtube\.com/(?:[^/]+/.+/|(?:v|e(?:mbed)?|shorts)/|.*[?&]v=)|youtu\.be/)([^"&?/\s]{11})"#
    )
    .unwrap();
    static ref TIKTOK_RE: Regex = Regex::new(r"tiktok\.com/.*/video/(\d+)").unwrap();
}

/// Platform, video id and embed link derived from a pasted URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedUrl {
    pub platform: Platform,
    pub video_id: String,
    pub embed_url: String,
}

impl ClassifiedUrl {
    fn youtube(video_id: &str) -> Self {
        Self {
            platform: Platform::Youtube,
            video_id: video_id.to_string(),
            embed_url: format!("https://www.youtube.com/embed/{video_id}?autoplay=1"),
        }
    }

    fn tiktok(video_id: &str) -> Self {
        Self {
            platform: Platform::Tiktok,
            video_id: video_id.to_string(),
            embed_url: format!("https://www.tiktok.com/embed/v2/{video_id}"),
        }
    }
}

/// Recognizes YouTube (`watch?v=`, `youtu.be/`, `/embed/`, `/shorts/`) and
/// TikTok (`/video/{digits}`) links. Returns `None` for anything else.
pub fn classify_url(url: &str) -> Option<ClassifiedUrl> {
    let url = url.trim();

    if let Some(captures) = YOUTUBE_RE.captures(url) {
        return captures.get(1).map(|m| ClassifiedUrl::youtube(m.as_str()));
    }

    TIKTOK_RE
        .captures(url)
        .and_then(|captures| captures.get(1))
        .map(|m| ClassifiedUrl::tiktok(m.as_str()))
}
