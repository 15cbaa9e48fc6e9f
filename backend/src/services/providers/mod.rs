//! One module per external metadata source. Every provider produces the same
//! [`VideoMetadata`] shape or a [`ProviderError`]; none of them retries or
//! falls back on its own, that is the resolver's job.

pub mod page_scrape;
pub mod rapidapi;
pub mod tiktok_official;
pub mod youtube;

use crate::config::AppConfig;
use crate::models::VideoMetadata;
use reqwest::Client;
use std::fmt;
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("{0} not configured")]
    NotConfigured(&'static str),
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("upstream returned HTTP {0}")]
    Status(u16),
    #[error("unexpected response: {0}")]
    Shape(String),
    #[error("video not found")]
    NotFound,
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl ProviderError {
    pub fn shape(message: impl Into<String>) -> Self {
        ProviderError::Shape(message.into())
    }
}

/// Shared HTTP client plus configuration handed to every provider call.
#[derive(Clone)]
pub struct Providers {
    client: Client,
    config: Arc<AppConfig>,
}

impl Providers {
    pub fn new(config: AppConfig) -> Self {
        Self {
            client: Client::new(),
            config: Arc::new(config),
        }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}

/// The TikTok fallback chain. Tiers are tried in [`TikTokTier::ORDER`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TikTokTier {
    Official,
    ThirdParty,
    PageScrape,
}

impl TikTokTier {
    pub const ORDER: [TikTokTier; 3] = [
        TikTokTier::Official,
        TikTokTier::ThirdParty,
        TikTokTier::PageScrape,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            TikTokTier::Official => "TikTok official API",
            TikTokTier::ThirdParty => "RapidAPI no-watermark",
            TikTokTier::PageScrape => "page scraping",
        }
    }

    pub async fn resolve(
        self,
        providers: &Providers,
        url: &str,
    ) -> Result<VideoMetadata, ProviderError> {
        match self {
            TikTokTier::Official => tiktok_official::fetch_video(providers, url).await,
            TikTokTier::ThirdParty => rapidapi::fetch_no_watermark(providers, url).await,
            TikTokTier::PageScrape => page_scrape::fetch_page(providers, url).await,
        }
    }
}

impl fmt::Display for TikTokTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
