use super::{ProviderError, Providers};
use crate::models::{VideoMetadata, VideoStats};
use crate::services::normalizer::{
    count_field, extract_hashtags, first_string, is_youtube_short,
    parse_iso8601_duration_to_seconds,
};
use log::info;
use serde_json::Value;

const VIDEO_PARTS: &str = "snippet,statistics,contentDetails";

/// Looks a video up through the YouTube Data API `videos` endpoint.
/// Documentation: https://developers.google.com/youtube/v3/docs/videos
pub async fn fetch_video(
    providers: &Providers,
    video_id: &str,
    original_url: Option<&str>,
) -> Result<VideoMetadata, ProviderError> {
    let api_key = providers
        .config()
        .youtube_api_key
        .as_deref()
        .ok_or(ProviderError::NotConfigured("YouTube API key"))?;

    let url = format!("{}/videos", providers.config().endpoints.youtube_api);
    let response = providers
        .client()
        .get(&url)
        .query(&[("id", video_id), ("part", VIDEO_PARTS), ("key", api_key)])
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(ProviderError::Status(response.status().as_u16()));
    }

    let body = response.json::<Value>().await?;
    let item = body["items"]
        .as_array()
        .and_then(|items| items.first())
        .ok_or(ProviderError::NotFound)?;

    info!("Fetched YouTube metadata for video {video_id}");
    Ok(normalize_video(item, original_url))
}

/// Maps one `items[]` entry of a `videos` response.
pub fn normalize_video(item: &Value, original_url: Option<&str>) -> VideoMetadata {
    let snippet = &item["snippet"];
    let statistics = &item["statistics"];
    let raw_duration = item["contentDetails"]["duration"].as_str();

    let description = snippet["description"].as_str().unwrap_or("");

    VideoMetadata {
        title: snippet["title"].as_str().unwrap_or("").to_string(),
        author: first_string(&[&snippet["channelTitle"]]),
        description: Some(description.to_string()).filter(|d| !d.is_empty()),
        hashtags: extract_hashtags(description),
        thumbnail: first_string(&[
            &snippet["thumbnails"]["high"]["url"],
            &snippet["thumbnails"]["default"]["url"],
        ]),
        stats: Some(VideoStats::new(
            count_field(&statistics["viewCount"]),
            count_field(&statistics["likeCount"]),
            count_field(&statistics["commentCount"]),
            None,
        )),
        published_at: first_string(&[&snippet["publishedAt"]]),
        duration: Some(raw_duration.map_or(0, parse_iso8601_duration_to_seconds)),
        is_short: Some(is_youtube_short(original_url, raw_duration)),
        channel_id: first_string(&[&snippet["channelId"]]),
        error: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::providers::test_support::{offline_config, spawn_stub, StubResponse};
    use serde_json::json;

    fn sample_item() -> Value {
        json!({
            "id": "dQw4w9WgXcQ",
            "snippet": {
                "title": "Never Gonna Give You Up",
                "channelTitle": "Rick Astley",
                "channelId": "UCuAXFkgsw1L7xaCfnd5JJOw",
                "publishedAt": "2009-10-25T06:57:33Z",
                "description": "Official video #rickroll #80s",
                "thumbnails": {
                    "default": {"url": "https://i.ytimg.com/vi/dQw4w9WgXcQ/default.jpg"},
                    "high": {"url": "https://i.ytimg.com/vi/dQw4w9WgXcQ/hqdefault.jpg"}
                }
            },
            "statistics": {"viewCount": "1500000000", "likeCount": "17000000", "commentCount": "2400"},
            "contentDetails": {"duration": "PT3M33S"}
        })
    }

    #[test]
    fn normalizes_full_item() {
        let metadata = normalize_video(
            &sample_item(),
            Some("https://www.youtube.com/watch?v=dQw4w9WgXcQ"),
        );
        assert_eq!(metadata.title, "Never Gonna Give You Up");
        assert_eq!(metadata.author.as_deref(), Some("Rick Astley"));
        assert_eq!(metadata.hashtags, vec!["rickroll", "80s"]);
        assert_eq!(
            metadata.thumbnail.as_deref(),
            Some("https://i.ytimg.com/vi/dQw4w9WgXcQ/hqdefault.jpg")
        );
        assert_eq!(metadata.duration, Some(213));
        assert_eq!(metadata.is_short, Some(false));
        assert_eq!(metadata.published_at.as_deref(), Some("2009-10-25T06:57:33Z"));
        assert_eq!(metadata.channel_id.as_deref(), Some("UCuAXFkgsw1L7xaCfnd5JJOw"));

        let stats = metadata.stats.unwrap();
        assert_eq!(stats.views, 1_500_000_000);
        assert_eq!(stats.views_formatted, "1500.0M");
        assert_eq!(stats.likes_formatted, "17.0M");
        assert_eq!(stats.comments_formatted, "2.4K");
        assert_eq!(stats.shares, None);
    }

    #[test]
    fn sparse_item_falls_back_to_defaults() {
        let item = json!({"snippet": {"title": "Bare", "thumbnails": {"default": {"url": "d.jpg"}}}});
        let metadata = normalize_video(&item, Some("https://youtube.com/shorts/abcdefghijk"));
        assert_eq!(metadata.thumbnail.as_deref(), Some("d.jpg"));
        assert_eq!(metadata.duration, Some(0));
        assert_eq!(metadata.is_short, Some(true));
        assert!(metadata.description.is_none());
        assert!(metadata.hashtags.is_empty());
        assert_eq!(metadata.stats.unwrap().views, 0);
    }

    #[tokio::test]
    async fn missing_key_fails_without_network() {
        let providers = Providers::new(offline_config());
        let err = fetch_video(&providers, "dQw4w9WgXcQ", None).await.unwrap_err();
        assert!(matches!(err, ProviderError::NotConfigured(_)));
    }

    #[tokio::test]
    async fn queries_videos_endpoint_with_key_and_parts() {
        let stub = spawn_stub(vec![StubResponse::json(json!({"items": [sample_item()]}))]).await;
        let mut config = offline_config();
        config.youtube_api_key = Some("yt-key".to_string());
        config.endpoints.youtube_api = stub.base_url.clone();
        let providers = Providers::new(config);

        let metadata = fetch_video(&providers, "dQw4w9WgXcQ", None).await.unwrap();
        assert_eq!(metadata.title, "Never Gonna Give You Up");

        let requests = stub.requests();
        let request_line = requests[0].lines().next().unwrap().to_string();
        assert!(request_line.starts_with("GET /videos?"), "{request_line}");
        assert!(request_line.contains("id=dQw4w9WgXcQ"));
        assert!(request_line.contains("key=yt-key"));
        assert!(request_line.contains("part=snippet%2Cstatistics%2CcontentDetails"));
    }

    #[tokio::test]
    async fn empty_items_is_not_found() {
        let stub = spawn_stub(vec![StubResponse::json(json!({"items": []}))]).await;
        let mut config = offline_config();
        config.youtube_api_key = Some("yt-key".to_string());
        config.endpoints.youtube_api = stub.base_url.clone();

        let err = fetch_video(&Providers::new(config), "dQw4w9WgXcQ", None)
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::NotFound));
    }

    #[tokio::test]
    async fn error_status_is_reported() {
        let stub = spawn_stub(vec![StubResponse::status(403, "quota exceeded")]).await;
        let mut config = offline_config();
        config.youtube_api_key = Some("yt-key".to_string());
        config.endpoints.youtube_api = stub.base_url.clone();

        let err = fetch_video(&Providers::new(config), "dQw4w9WgXcQ", None)
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Status(403)));
    }
}
