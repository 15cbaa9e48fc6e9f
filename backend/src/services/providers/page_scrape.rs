//! Last resort for TikTok: fetch the public video page like a browser would
//! and read whatever the HTML exposes. TikTok changes this markup without
//! notice, so everything here is best effort.

use super::{ProviderError, Providers};
use crate::models::{VideoMetadata, VideoStats};
use crate::services::normalizer::{count_field, extract_hashtags, first_string, tiktok_handle};
use lazy_static::lazy_static;
use log::{info, warn};
use regex::Regex;
use serde_json::Value;

const DEFAULT_TITLE: &str = "TikTok Video";

const BROWSER_HEADERS: [(&str, &str); 4] = [
    (
        "User-Agent",
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    ),
    (
        "Accept",
        "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,image/apng,*/*;q=0.8,application/signed-exchange;v=b3;q=0.7",
    ),
    ("Accept-Language", "en-US,en;q=0.9"),
    ("Upgrade-Insecure-Requests", "1"),
];

lazy_static! {
    static ref REHYDRATION_RE: Regex = Regex::new(
        r#"(?s)<script id="__UNIVERSAL_DATA_FOR_REHYDRATION__" type="application/json">(.*?)</script>"#
    )
    .unwrap();
    static ref TITLE_RE: Regex = Regex::new(r"(?i)<title[^>]*>([^<]+)</title>").unwrap();
    static ref USERNAME_META_RE: Regex =
        Regex::new(r#"(?i)<meta[^>]*property="profile:username"[^>]*content="([^"]*)"[^>]*>"#).unwrap();
    static ref DESCRIPTION_META_RE: Regex =
        Regex::new(r#"(?i)<meta[^>]*name="description"[^>]*content="([^"]*)"[^>]*>"#).unwrap();
}

pub async fn fetch_page(providers: &Providers, url: &str) -> Result<VideoMetadata, ProviderError> {
    let mut request = providers.client().get(url);
    for (name, value) in BROWSER_HEADERS {
        request = request.header(name, value);
    }

    let response = request.send().await?;
    if !response.status().is_success() {
        return Err(ProviderError::Status(response.status().as_u16()));
    }

    let html = response.text().await?;
    info!("Fetched TikTok page, {} bytes", html.len());
    Ok(parse_page(&html))
}

/// Embedded rehydration JSON when present, otherwise the basic meta tags.
pub fn parse_page(html: &str) -> VideoMetadata {
    match rehydration_item(html) {
        Some(item) => normalize_item(&item),
        None => {
            info!("No usable rehydration data, falling back to meta tags");
            parse_meta_tags(html)
        }
    }
}

fn rehydration_item(html: &str) -> Option<Value> {
    let raw = REHYDRATION_RE.captures(html)?.get(1)?.as_str();
    let mut data: Value = match serde_json::from_str(raw) {
        Ok(data) => data,
        Err(e) => {
            warn!("Failed to parse rehydration JSON: {e:?}");
            return None;
        }
    };

    let item = data
        .pointer_mut("/__DEFAULT_SCOPE__/webapp.video-detail/itemInfo/itemStruct")?
        .take();
    item.is_object().then_some(item)
}

fn normalize_item(item: &Value) -> VideoMetadata {
    let description = first_string(&[&item["desc"]]);
    let stats = &item["stats"];

    VideoMetadata {
        title: description.clone().unwrap_or_else(|| DEFAULT_TITLE.to_string()),
        author: first_string(&[&item["author"]["uniqueId"]]).map(|name| tiktok_handle(&name)),
        hashtags: description.as_deref().map(extract_hashtags).unwrap_or_default(),
        description,
        thumbnail: first_string(&[&item["video"]["cover"]]),
        stats: Some(VideoStats::new(
            count_field(&stats["playCount"]),
            count_field(&stats["diggCount"]),
            count_field(&stats["commentCount"]),
            Some(count_field(&stats["shareCount"])),
        )),
        duration: Some(count_field(&item["video"]["duration"])).filter(|d| *d > 0),
        ..VideoMetadata::default()
    }
}

fn capture(re: &Regex, html: &str) -> Option<String> {
    re.captures(html)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str().trim().to_string())
}

fn parse_meta_tags(html: &str) -> VideoMetadata {
    let title = capture(&TITLE_RE, html)
        .map(|title| title.replace(" | TikTok", "").trim().to_string())
        .filter(|title| !title.is_empty())
        .unwrap_or_else(|| DEFAULT_TITLE.to_string());

    let description = capture(&DESCRIPTION_META_RE, html).filter(|d| !d.is_empty());

    VideoMetadata {
        title,
        author: capture(&USERNAME_META_RE, html)
            .filter(|name| !name.is_empty())
            .map(|name| tiktok_handle(&name)),
        hashtags: description.as_deref().map(extract_hashtags).unwrap_or_default(),
        description,
        ..VideoMetadata::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::providers::test_support::{offline_config, spawn_stub, StubResponse};
    use serde_json::json;

    fn page_with_item(item: Value) -> String {
        let data = json!({
            "__DEFAULT_SCOPE__": {
                "webapp.video-detail": {"itemInfo": {"itemStruct": item}}
            }
        });
        format!(
            "<html><head><title>ignored | TikTok</title></head><body>\
             <script id=\"__UNIVERSAL_DATA_FOR_REHYDRATION__\" type=\"application/json\">{data}</script>\
             </body></html>"
        )
    }

    #[test]
    fn reads_embedded_item_struct() {
        let html = page_with_item(json!({
            "desc": "Sunset timelapse #nature #sky",
            "author": {"uniqueId": "creator"},
            "video": {"cover": "https://p16.tiktokcdn.com/cover.jpg", "duration": 15},
            "stats": {"playCount": 45000, "diggCount": 3100, "commentCount": 12, "shareCount": 4}
        }));

        let metadata = parse_page(&html);
        assert_eq!(metadata.title, "Sunset timelapse #nature #sky");
        assert_eq!(metadata.author.as_deref(), Some("@creator"));
        assert_eq!(metadata.hashtags, vec!["nature", "sky"]);
        assert_eq!(metadata.thumbnail.as_deref(), Some("https://p16.tiktokcdn.com/cover.jpg"));
        assert_eq!(metadata.duration, Some(15));
        let stats = metadata.stats.unwrap();
        assert_eq!(stats.views_formatted, "45.0K");
        assert_eq!(stats.shares, Some(4));
        assert!(metadata.error.is_none());
    }

    #[test]
    fn meta_tags_are_used_without_rehydration_data() {
        let html = r#"<html><head>
            <title>Cooking pasta | TikTok</title>
            <meta property="profile:username" content="chef">
            <meta name="description" content="Quick dinner #pasta #food">
            </head></html>"#;

        let metadata = parse_page(html);
        assert_eq!(metadata.title, "Cooking pasta");
        assert_eq!(metadata.author.as_deref(), Some("@chef"));
        assert_eq!(metadata.description.as_deref(), Some("Quick dinner #pasta #food"));
        assert_eq!(metadata.hashtags, vec!["pasta", "food"]);
        assert!(metadata.stats.is_none());
    }

    #[test]
    fn broken_json_falls_back_to_meta_tags() {
        let html = "<title>Fallback | TikTok</title>\
            <script id=\"__UNIVERSAL_DATA_FOR_REHYDRATION__\" type=\"application/json\">{not json</script>";
        assert_eq!(parse_page(html).title, "Fallback");
    }

    #[test]
    fn missing_item_struct_falls_back_to_meta_tags() {
        let html = "<title>Other page | TikTok</title>\
            <script id=\"__UNIVERSAL_DATA_FOR_REHYDRATION__\" type=\"application/json\">{\"__DEFAULT_SCOPE__\":{}}</script>";
        assert_eq!(parse_page(html).title, "Other page");
    }

    #[test]
    fn bare_page_gets_default_title() {
        let metadata = parse_page("<html><body>nothing here</body></html>");
        assert_eq!(metadata.title, DEFAULT_TITLE);
        assert!(metadata.author.is_none());
        assert!(metadata.hashtags.is_empty());
    }

    #[tokio::test]
    async fn sends_browser_headers() {
        let stub = spawn_stub(vec![StubResponse::html("<title>Clip | TikTok</title>")]).await;
        let providers = Providers::new(offline_config());

        let metadata = fetch_page(&providers, &format!("{}/@creator/video/1", stub.base_url))
            .await
            .unwrap();
        assert_eq!(metadata.title, "Clip");

        let request = stub.requests()[0].to_lowercase();
        assert!(request.starts_with("get /@creator/video/1 "));
        assert!(request.contains("user-agent: mozilla/5.0"));
        assert!(request.contains("accept-language: en-us,en;q=0.9"));
    }

    #[tokio::test]
    async fn blocked_page_is_a_failure() {
        let stub = spawn_stub(vec![StubResponse::status(403, "blocked")]).await;
        let err = fetch_page(&Providers::new(offline_config()), &stub.base_url)
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Status(403)));
    }
}
