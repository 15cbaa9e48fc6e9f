//! RapidAPI hosted TikTok scrapers. Both need `RAPIDAPI_KEY`.

use super::{ProviderError, Providers};
use crate::models::{VideoMetadata, VideoStats};
use crate::services::normalizer::{count_field, extract_hashtags, first_string, tiktok_handle};
use log::info;
use reqwest::RequestBuilder;
use serde_json::{json, Value};

const NO_WATERMARK_HOST: &str = "tiktok-video-no-watermark2.p.rapidapi.com";
const SCRAPER_HOST: &str = "tiktok-scraper7.p.rapidapi.com";
const DEFAULT_TITLE: &str = "TikTok Video";

fn rapidapi_key(providers: &Providers) -> Result<&str, ProviderError> {
    providers
        .config()
        .rapidapi_key
        .as_deref()
        .ok_or(ProviderError::NotConfigured("RapidAPI key"))
}

async fn send_keyed(
    request: RequestBuilder,
    key: &str,
    host: &str,
) -> Result<Value, ProviderError> {
    let response = request
        .header("X-RapidAPI-Key", key)
        .header("X-RapidAPI-Host", host)
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(ProviderError::Status(response.status().as_u16()));
    }

    Ok(response.json::<Value>().await?)
}

/// Watermark-removal proxy, second tier of the TikTok chain.
pub async fn fetch_no_watermark(
    providers: &Providers,
    url: &str,
) -> Result<VideoMetadata, ProviderError> {
    let key = rapidapi_key(providers)?;
    let request = providers
        .client()
        .post(&providers.config().endpoints.rapidapi_no_watermark)
        .json(&json!({ "url": url }));

    let body = send_keyed(request, key, NO_WATERMARK_HOST).await?;
    if body["code"].as_i64() != Some(0) || !body["data"].is_object() {
        return Err(ProviderError::shape(format!(
            "no-watermark proxy answered code {} without data",
            body["code"]
        )));
    }

    info!("RapidAPI no-watermark proxy resolved {url}");
    Ok(normalize_no_watermark(&body["data"]))
}

pub fn normalize_no_watermark(data: &Value) -> VideoMetadata {
    let video = &data["video"];
    let description = first_string(&[&video["title"], &data["title"]]);

    let counters = if data["stats"].is_object() {
        &data["stats"]
    } else {
        data
    };

    VideoMetadata {
        title: description.clone().unwrap_or_else(|| DEFAULT_TITLE.to_string()),
        author: first_string(&[&data["author"]["unique_id"]]).map(|name| tiktok_handle(&name)),
        hashtags: description.as_deref().map(extract_hashtags).unwrap_or_default(),
        description,
        thumbnail: first_string(&[&video["cover"], &video["dynamic_cover"], &data["cover"]]),
        stats: Some(VideoStats::new(
            count_field(&counters["play_count"]),
            count_field(&counters["digg_count"]),
            count_field(&counters["comment_count"]),
            Some(count_field(&counters["share_count"])),
        )),
        ..VideoMetadata::default()
    }
}

/// Alternative scraper exposed on its own route; not part of the fallback chain.
pub async fn fetch_scraper(providers: &Providers, url: &str) -> Result<VideoMetadata, ProviderError> {
    let key = rapidapi_key(providers)?;
    let request = providers
        .client()
        .get(&providers.config().endpoints.rapidapi_scraper)
        .query(&[("url", url)]);

    let body = send_keyed(request, key, SCRAPER_HOST).await?;
    if body["success"].as_bool() != Some(true) || !body["data"].is_object() {
        return Err(ProviderError::shape("invalid TikTok video or scraper response"));
    }

    info!("RapidAPI scraper resolved {url}");
    Ok(normalize_scraper(&body["data"]))
}

pub fn normalize_scraper(data: &Value) -> VideoMetadata {
    let description = first_string(&[&data["title"], &data["desc"]]);
    let stats = &data["stats"];

    VideoMetadata {
        title: description.clone().unwrap_or_else(|| DEFAULT_TITLE.to_string()),
        author: first_string(&[&data["author"]["username"]]).map(|name| tiktok_handle(&name)),
        hashtags: description.as_deref().map(extract_hashtags).unwrap_or_default(),
        description,
        thumbnail: first_string(&[&data["video"]["cover"], &data["video"]["thumbnail"]]),
        stats: Some(VideoStats::new(
            count_field(&stats["views"]),
            count_field(&stats["likes"]),
            count_field(&stats["comments"]),
            Some(count_field(&stats["shares"])),
        )),
        ..VideoMetadata::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::providers::test_support::{offline_config, spawn_stub, StubResponse};

    const URL: &str = "https://www.tiktok.com/@creator/video/7234567890123456789";
    const UNUSED: &str = crate::services::providers::test_support::UNREACHABLE;

    fn keyed(no_watermark: &str, scraper: &str) -> Providers {
        let mut config = offline_config();
        config.rapidapi_key = Some("rapid-key".to_string());
        config.endpoints.rapidapi_no_watermark = no_watermark.to_string();
        config.endpoints.rapidapi_scraper = scraper.to_string();
        Providers::new(config)
    }

    #[test]
    fn no_watermark_payload_maps_nested_stats() {
        let data = json!({
            "author": {"unique_id": "creator"},
            "video": {"title": "Dance #fyp #dance", "dynamic_cover": "dyn.webp"},
            "stats": {"play_count": 1200000, "digg_count": 3400, "comment_count": 56, "share_count": 7}
        });
        let metadata = normalize_no_watermark(&data);
        assert_eq!(metadata.title, "Dance #fyp #dance");
        assert_eq!(metadata.author.as_deref(), Some("@creator"));
        assert_eq!(metadata.hashtags, vec!["fyp", "dance"]);
        assert_eq!(metadata.thumbnail.as_deref(), Some("dyn.webp"));
        let stats = metadata.stats.unwrap();
        assert_eq!(stats.views_formatted, "1.2M");
        assert_eq!(stats.likes_formatted, "3.4K");
        assert_eq!(stats.shares, Some(7));
    }

    #[test]
    fn no_watermark_flat_payload_is_accepted() {
        let data = json!({
            "title": "Flat shape",
            "cover": "flat.jpg",
            "play_count": "900",
            "digg_count": 12
        });
        let metadata = normalize_no_watermark(&data);
        assert_eq!(metadata.title, "Flat shape");
        assert_eq!(metadata.thumbnail.as_deref(), Some("flat.jpg"));
        assert!(metadata.author.is_none());
        assert_eq!(metadata.stats.unwrap().views, 900);
    }

    #[test]
    fn scraper_payload_prefers_title_over_desc() {
        let data = json!({
            "title": "",
            "desc": "From desc #alt",
            "author": {"username": "someone"},
            "video": {"thumbnail": "thumb.jpg"},
            "stats": {"views": 10, "likes": 2, "comments": 1, "shares": 0}
        });
        let metadata = normalize_scraper(&data);
        assert_eq!(metadata.title, "From desc #alt");
        assert_eq!(metadata.author.as_deref(), Some("@someone"));
        assert_eq!(metadata.hashtags, vec!["alt"]);
        assert_eq!(metadata.thumbnail.as_deref(), Some("thumb.jpg"));
    }

    #[tokio::test]
    async fn missing_key_disables_both_hosts() {
        let providers = Providers::new(offline_config());
        assert!(matches!(
            fetch_no_watermark(&providers, URL).await,
            Err(ProviderError::NotConfigured(_))
        ));
        assert!(matches!(
            fetch_scraper(&providers, URL).await,
            Err(ProviderError::NotConfigured(_))
        ));
    }

    #[tokio::test]
    async fn no_watermark_posts_url_with_rapidapi_headers() {
        let stub = spawn_stub(vec![StubResponse::json(json!({
            "code": 0,
            "data": {"author": {"unique_id": "creator"}, "video": {"title": "ok"}}
        }))])
        .await;
        let providers = keyed(&format!("{}/", stub.base_url), UNUSED);

        let metadata = fetch_no_watermark(&providers, URL).await.unwrap();
        assert_eq!(metadata.title, "ok");

        let request = &stub.requests()[0];
        let lowered = request.to_lowercase();
        assert!(request.starts_with("POST / "));
        assert!(lowered.contains("x-rapidapi-key: rapid-key"));
        assert!(lowered.contains("x-rapidapi-host: tiktok-video-no-watermark2.p.rapidapi.com"));
        assert!(request.contains("7234567890123456789"));
    }

    #[tokio::test]
    async fn nonzero_code_is_a_failure() {
        let stub = spawn_stub(vec![StubResponse::json(json!({"code": -1, "msg": "Url parsing is failed"}))]).await;
        let providers = keyed(&stub.base_url, UNUSED);
        assert!(matches!(
            fetch_no_watermark(&providers, URL).await,
            Err(ProviderError::Shape(_))
        ));
    }

    #[tokio::test]
    async fn scraper_sends_url_as_query() {
        let stub = spawn_stub(vec![StubResponse::json(json!({
            "success": true,
            "data": {"title": "scraped", "stats": {"views": 5}}
        }))])
        .await;
        let providers = keyed(UNUSED, &format!("{}/", stub.base_url));

        let metadata = fetch_scraper(&providers, URL).await.unwrap();
        assert_eq!(metadata.title, "scraped");

        let request = &stub.requests()[0];
        assert!(request.starts_with("GET /?url=https%3A%2F%2Fwww.tiktok.com"));
        assert!(request
            .to_lowercase()
            .contains("x-rapidapi-host: tiktok-scraper7.p.rapidapi.com"));
    }

    #[tokio::test]
    async fn scraper_unsuccessful_body_and_status_fail() {
        let stub = spawn_stub(vec![
            StubResponse::json(json!({"success": false})),
            StubResponse::status(429, "too many requests"),
        ])
        .await;
        let providers = keyed(UNUSED, &stub.base_url);
        assert!(matches!(
            fetch_scraper(&providers, URL).await,
            Err(ProviderError::Shape(_))
        ));
        assert!(matches!(
            fetch_scraper(&providers, URL).await,
            Err(ProviderError::Status(429))
        ));
    }
}
