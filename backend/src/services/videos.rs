use crate::models::{AddVideoRequest, ErrorResponse, Video, VideoMetadata};
use crate::services::classifier::{classify_url, ClassifiedUrl};
use crate::services::collection::VideoCollection;
use crate::services::normalizer::{parse_hashtag_input, MAX_HASHTAGS};
use crate::services::resolver::{MetadataResolver, ResolveError};
use chrono::{DateTime, Utc};
use log::{info, warn};
use std::future::Future;

/// A field the user left untouched keeps the fetched value; an edited one
/// wins, and editing it to blank clears it.
fn edited(provided: Option<String>, fetched: Option<String>) -> Option<String> {
    match provided {
        Some(value) => Some(value.trim().to_string()).filter(|v| !v.is_empty()),
        None => fetched,
    }
}

pub fn build_video(
    classified: &ClassifiedUrl,
    request: AddVideoRequest,
    metadata: Option<VideoMetadata>,
    now: DateTime<Utc>,
) -> Video {
    let metadata = metadata.unwrap_or_default();
    let platform = classified.platform;

    let fetched_title = Some(metadata.title).filter(|t| !t.trim().is_empty());
    let title = edited(request.title, fetched_title).unwrap_or_else(|| platform.default_title());

    let mut hashtags = match request.hashtags {
        Some(input) => parse_hashtag_input(&input),
        None => metadata.hashtags,
    };
    hashtags.truncate(MAX_HASHTAGS);

    Video {
        id: format!(
            "{}-{}-{}",
            platform,
            classified.video_id,
            now.timestamp_millis()
        ),
        title,
        description: edited(request.description, metadata.description),
        hashtags,
        author: edited(request.author, metadata.author),
        url: request.url.trim().to_string(),
        embed_url: classified.embed_url.clone(),
        platform,
        thumbnail: metadata.thumbnail,
        stats: metadata.stats,
        published_at: metadata.published_at,
        channel_id: metadata.channel_id,
        duration: metadata.duration,
        is_short: metadata.is_short,
        created_at: now.to_rfc3339(),
    }
}

/// Classifies, fills in metadata when the client sent none, and prepends the
/// result. Only an unrecognized URL fails; lookup errors are logged and the
/// video is saved with whatever the user typed.
pub async fn add_video(
    resolver: &MetadataResolver,
    collection: &VideoCollection,
    request: AddVideoRequest,
) -> Result<Video, ErrorResponse> {
    add_video_with(collection, request, |classified, url| async move {
        resolver.resolve(&classified, &url).await
    })
    .await
}

pub async fn add_video_with<F, Fut>(
    collection: &VideoCollection,
    mut request: AddVideoRequest,
    resolve: F,
) -> Result<Video, ErrorResponse>
where
    F: FnOnce(ClassifiedUrl, String) -> Fut,
    Fut: Future<Output = Result<VideoMetadata, ResolveError>>,
{
    let classified = classify_url(&request.url).ok_or_else(|| {
        ErrorResponse::bad_request("Invalid video URL")
            .with_details("Only YouTube and TikTok video links are supported")
    })?;

    let metadata = match request.metadata.take() {
        Some(metadata) => Some(metadata),
        None => match resolve(classified.clone(), request.url.trim().to_string()).await {
            Ok(metadata) => Some(metadata),
            Err(e) => {
                warn!("Saving {} without fetched metadata: {e}", request.url);
                None
            }
        },
    };

    let video = build_video(&classified, request, metadata, Utc::now());
    if !collection.add(video.clone()) {
        return Err(ErrorResponse::internal(
            "Failed to save video",
            "The video collection is unavailable",
        ));
    }
    info!("Saved {} video {}", video.platform, video.id);
    Ok(video)
}
