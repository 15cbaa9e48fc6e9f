use crate::models::{ClassifyResponse, ErrorResponse, VideoMetadata};
use crate::services::classifier::classify_url;
use crate::services::providers::{rapidapi, tiktok_official, ProviderError};
use crate::services::resolver::ResolveError;
use crate::AppState;
use log::{error, info};
use rocket::serde::json::Json;
use rocket::{get, FromForm, State};

type MetadataResult = Result<Json<VideoMetadata>, ErrorResponse>;

#[derive(Debug, FromForm)]
pub struct YoutubeQuery {
    #[field(name = "videoId")]
    pub video_id: Option<String>,
    #[field(name = "originalUrl")]
    pub original_url: Option<String>,
}

fn required(value: Option<String>, error: &str) -> Result<String, ErrorResponse> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ErrorResponse::bad_request(error))
}

#[get("/youtube?<params..>")]
pub async fn youtube_metadata(params: YoutubeQuery, state: &State<AppState>) -> MetadataResult {
    let video_id = required(params.video_id, "Video ID is required")?;
    let metadata = state
        .resolver
        .resolve_youtube(&video_id, params.original_url.as_deref())
        .await
        .map_err(ErrorResponse::from)?;
    Ok(Json(metadata))
}

/// Full fallback chain. Answers 200 even when every tier failed.
#[get("/tiktok?<url>")]
pub async fn tiktok_metadata(url: Option<String>, state: &State<AppState>) -> MetadataResult {
    let url = required(url, "Video URL is required")?;
    info!("TikTok metadata requested for {url}");
    Ok(Json(state.resolver.resolve_tiktok(&url).await))
}

#[get("/tiktok-official?<url>")]
pub async fn tiktok_official_metadata(
    url: Option<String>,
    state: &State<AppState>,
) -> MetadataResult {
    let url = required(url, "Video URL is required")?;

    match tiktok_official::fetch_video(state.resolver.providers(), &url).await {
        Ok(metadata) => Ok(Json(metadata)),
        Err(ProviderError::NotConfigured(_)) => Err(ErrorResponse::internal(
            "TikTok API credentials not configured",
            "Set TIKTOK_CLIENT_KEY and TIKTOK_CLIENT_SECRET to use the official API",
        )),
        Err(ProviderError::InvalidInput(_)) => Err(ErrorResponse::bad_request("Invalid TikTok URL")),
        Err(e) => {
            error!("TikTok official API failed: {e:?}");
            Err(
                ErrorResponse::internal("TikTok Official API failed", "The official TikTok API request failed")
                    .with_details(e.to_string())
                    .with_suggestion("Using fallback methods"),
            )
        }
    }
}

#[get("/tiktok-alt?<url>")]
pub async fn tiktok_alt_metadata(url: Option<String>, state: &State<AppState>) -> MetadataResult {
    let url = required(url, "Video URL is required")?;

    match rapidapi::fetch_scraper(state.resolver.providers(), &url).await {
        Ok(metadata) => Ok(Json(metadata)),
        Err(ProviderError::NotConfigured(_)) => Err(ErrorResponse::internal(
            "RapidAPI key not configured",
            "Set RAPIDAPI_KEY to use the alternative scraper",
        )),
        Err(e) => {
            error!("TikTok alternative scraper failed: {e:?}");
            Err(
                ErrorResponse::internal("Failed to fetch TikTok video data", e.to_string()),
            )
        }
    }
}

#[get("/classify?<url>")]
pub async fn classify(url: Option<String>) -> Result<Json<ClassifyResponse>, ErrorResponse> {
    let url = required(url, "Video URL is required")?;
    let classified = classify_url(&url).ok_or_else(|| {
        ErrorResponse::from(ResolveError::Invalid(
            "Only YouTube and TikTok video links are supported".to_string(),
        ))
    })?;

    Ok(Json(ClassifyResponse {
        platform: classified.platform,
        video_id: classified.video_id,
        embed_url: classified.embed_url,
    }))
}
