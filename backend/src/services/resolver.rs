use crate::config::AppConfig;
use crate::models::{ErrorResponse, Platform, VideoMetadata};
use crate::services::classifier::ClassifiedUrl;
use crate::services::providers::{youtube, ProviderError, Providers, TikTokTier};
use log::{error, info, warn};
use rocket::http::Status;
use std::future::Future;

const TIKTOK_PLACEHOLDER_TITLE: &str = "TikTok Video";

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("{0}")]
    Invalid(String),
    #[error("YouTube API key not configured")]
    NotConfigured,
    #[error("Video not found")]
    NotFound,
    #[error("Failed to fetch video data: {0}")]
    Upstream(ProviderError),
}

impl ResolveError {
    pub fn status(&self) -> Status {
        match self {
            ResolveError::Invalid(_) => Status::BadRequest,
            ResolveError::NotFound => Status::NotFound,
            ResolveError::NotConfigured | ResolveError::Upstream(_) => Status::InternalServerError,
        }
    }
}

impl From<ProviderError> for ResolveError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::NotConfigured(_) => ResolveError::NotConfigured,
            ProviderError::NotFound => ResolveError::NotFound,
            ProviderError::InvalidInput(message) => ResolveError::Invalid(message),
            other => ResolveError::Upstream(other),
        }
    }
}

impl From<ResolveError> for ErrorResponse {
    fn from(err: ResolveError) -> Self {
        match &err {
            ResolveError::Upstream(cause) => {
                ErrorResponse::new(err.status(), "Failed to fetch video data", cause.to_string())
            }
            _ => {
                let message = err.to_string();
                ErrorResponse::new(err.status(), message.clone(), message)
            }
        }
    }
}

/// Turns a classified URL into metadata. YouTube has a single source and may
/// fail; TikTok walks its tiers and always yields something.
#[derive(Clone)]
pub struct MetadataResolver {
    providers: Providers,
}

impl MetadataResolver {
    pub fn new(config: AppConfig) -> Self {
        Self {
            providers: Providers::new(config),
        }
    }

    pub fn providers(&self) -> &Providers {
        &self.providers
    }

    pub fn config(&self) -> &AppConfig {
        self.providers.config()
    }

    pub async fn resolve_youtube(
        &self,
        video_id: &str,
        original_url: Option<&str>,
    ) -> Result<VideoMetadata, ResolveError> {
        youtube::fetch_video(&self.providers, video_id, original_url)
            .await
            .map_err(|e| {
                warn!("YouTube lookup for {video_id} failed: {e}");
                ResolveError::from(e)
            })
    }

    pub async fn resolve_tiktok(&self, url: &str) -> VideoMetadata {
        let providers = &self.providers;
        match run_tiers(&TikTokTier::ORDER, |tier| tier.resolve(providers, url)).await {
            Some(metadata) => metadata,
            None => {
                error!("All TikTok methods failed for {url}");
                VideoMetadata::placeholder(TIKTOK_PLACEHOLDER_TITLE)
            }
        }
    }

    pub async fn resolve(
        &self,
        classified: &ClassifiedUrl,
        original_url: &str,
    ) -> Result<VideoMetadata, ResolveError> {
        match classified.platform {
            Platform::Youtube => {
                self.resolve_youtube(&classified.video_id, Some(original_url))
                    .await
            }
            Platform::Tiktok => Ok(self.resolve_tiktok(original_url).await),
        }
    }
}

/// Tries each tier in order and stops at the first success.
async fn run_tiers<F, Fut>(tiers: &[TikTokTier], mut attempt: F) -> Option<VideoMetadata>
where
    F: FnMut(TikTokTier) -> Fut,
    Fut: Future<Output = Result<VideoMetadata, ProviderError>>,
{
    for &tier in tiers {
        info!("Trying {tier}...");
        match attempt(tier).await {
            Ok(metadata) => {
                info!("{tier} succeeded");
                return Some(metadata);
            }
            Err(e) => warn!("{tier} failed: {e}"),
        }
    }
    None
}
