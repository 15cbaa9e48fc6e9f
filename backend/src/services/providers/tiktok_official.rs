use super::{ProviderError, Providers};
use crate::config::TikTokCredentials;
use crate::models::{VideoMetadata, VideoStats};
use crate::services::normalizer::{count_field, extract_hashtags, first_string, tiktok_handle};
use lazy_static::lazy_static;
use log::{info, warn};
use regex::Regex;
use serde_json::{json, Value};

const DEFAULT_TITLE: &str = "TikTok Video";

const RESEARCH_FIELDS: [&str; 12] = [
    "id",
    "video_description",
    "create_time",
    "region_code",
    "share_count",
    "view_count",
    "like_count",
    "comment_count",
    "music_id",
    "hashtag_names",
    "username",
    "display_name",
];

const DISPLAY_FIELDS: &str =
    "id,title,video_description,duration,cover_image_url,like_count,comment_count,share_count,view_count";

lazy_static! {
    static ref VIDEO_ID_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"tiktok\.com/.*/video/(\d+)").unwrap(),
        Regex::new(r"tiktok\.com/v/(\d+)").unwrap(),
        Regex::new(r"vm\.tiktok\.com/([A-Za-z0-9]+)").unwrap(),
        Regex::new(r"tiktok\.com/@[^/]+/video/(\d+)").unwrap(),
    ];
}

/// Video id as understood by the official API, including `vm.tiktok.com`
/// short codes.
pub fn extract_video_id(url: &str) -> Option<String> {
    VIDEO_ID_PATTERNS
        .iter()
        .find_map(|pattern| pattern.captures(url))
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str().to_string())
}

/// Client-credentials token, then the research and display endpoints in turn.
pub async fn fetch_video(providers: &Providers, url: &str) -> Result<VideoMetadata, ProviderError> {
    let credentials = providers
        .config()
        .tiktok_credentials
        .as_ref()
        .ok_or(ProviderError::NotConfigured("TikTok API credentials"))?;

    let video_id = extract_video_id(url)
        .ok_or_else(|| ProviderError::InvalidInput(format!("no TikTok video id in {url}")))?;

    let token = get_access_token(providers, credentials).await?;
    info!("TikTok access token obtained, fetching video {video_id}");

    match query_research_api(providers, &token, &video_id).await {
        Ok(Some(metadata)) => return Ok(metadata),
        Ok(None) => info!("TikTok research API returned no video for {video_id}"),
        Err(e) => warn!("TikTok research API failed: {e}"),
    }

    match query_display_api(providers, &token, &video_id).await {
        Ok(Some(metadata)) => Ok(metadata),
        Ok(None) => Err(ProviderError::shape(format!(
            "no TikTok API endpoint returned video {video_id}"
        ))),
        Err(e) => {
            warn!("TikTok display API failed: {e}");
            Err(e)
        }
    }
}

async fn get_access_token(
    providers: &Providers,
    credentials: &TikTokCredentials,
) -> Result<String, ProviderError> {
    let url = format!("{}/oauth/token/", providers.config().endpoints.tiktok_api);
    let response = providers
        .client()
        .post(&url)
        .header("Cache-Control", "no-cache")
        .form(&[
            ("client_key", credentials.client_key.as_str()),
            ("client_secret", credentials.client_secret.as_str()),
            ("grant_type", "client_credentials"),
        ])
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        return Err(ProviderError::Status(status.as_u16()));
    }

    let body = response.json::<Value>().await?;
    first_string(&[&body["access_token"]])
        .ok_or_else(|| ProviderError::shape("no access_token in token response"))
}

async fn query_research_api(
    providers: &Providers,
    token: &str,
    video_id: &str,
) -> Result<Option<VideoMetadata>, ProviderError> {
    let url = format!(
        "{}/research/video/query/",
        providers.config().endpoints.tiktok_api
    );
    let request_body = json!({
        "query": {
            "and": [
                { "operation": "EQ", "field_name": "video_id", "field_values": [video_id] }
            ]
        },
        "max_count": 1,
        "fields": RESEARCH_FIELDS,
    });

    let response = providers
        .client()
        .post(&url)
        .bearer_auth(token)
        .json(&request_body)
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(ProviderError::Status(response.status().as_u16()));
    }

    let body = response.json::<Value>().await?;
    Ok(body["data"]["videos"]
        .as_array()
        .and_then(|videos| videos.first())
        .map(normalize_research_video))
}

async fn query_display_api(
    providers: &Providers,
    token: &str,
    video_id: &str,
) -> Result<Option<VideoMetadata>, ProviderError> {
    let url = format!("{}/video/list/", providers.config().endpoints.tiktok_api);
    let response = providers
        .client()
        .get(&url)
        .bearer_auth(token)
        .query(&[("fields", DISPLAY_FIELDS)])
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(ProviderError::Status(response.status().as_u16()));
    }

    let body = response.json::<Value>().await?;
    Ok(body["data"]["videos"].as_array().and_then(|videos| {
        videos
            .iter()
            .find(|video| id_matches(&video["id"], video_id))
            .map(normalize_display_video)
    }))
}

fn id_matches(id: &Value, video_id: &str) -> bool {
    match id {
        Value::String(s) => s == video_id,
        Value::Number(n) => n.to_string() == video_id,
        _ => false,
    }
}

fn stats_from(video: &Value) -> VideoStats {
    VideoStats::new(
        count_field(&video["view_count"]),
        count_field(&video["like_count"]),
        count_field(&video["comment_count"]),
        Some(count_field(&video["share_count"])),
    )
}

fn normalize_research_video(video: &Value) -> VideoMetadata {
    let description = first_string(&[&video["video_description"]]);
    let author = first_string(&[&video["display_name"], &video["username"]]);

    VideoMetadata {
        title: description.clone().unwrap_or_else(|| DEFAULT_TITLE.to_string()),
        author: author.as_deref().map(tiktok_handle),
        hashtags: description.as_deref().map(extract_hashtags).unwrap_or_default(),
        description,
        stats: Some(stats_from(video)),
        duration: Some(0),
        ..VideoMetadata::default()
    }
}

fn normalize_display_video(video: &Value) -> VideoMetadata {
    let description = first_string(&[&video["title"], &video["video_description"]]);

    VideoMetadata {
        title: description.clone().unwrap_or_else(|| DEFAULT_TITLE.to_string()),
        author: Some(tiktok_handle("TikTok User")),
        hashtags: description.as_deref().map(extract_hashtags).unwrap_or_default(),
        description,
        thumbnail: first_string(&[&video["cover_image_url"]]),
        stats: Some(stats_from(video)),
        duration: Some(count_field(&video["duration"])),
        ..VideoMetadata::default()
    }
}
