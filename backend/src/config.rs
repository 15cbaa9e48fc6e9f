use anyhow::Result;
use env_logger::Builder;
use log::{info, warn, LevelFilter};
use rocket::http::Method;
use rocket_cors::{AllowedHeaders, AllowedOrigins, CorsOptions};
use std::env;

pub const DEFAULT_ALLOWED_ORIGIN: &str = "http://localhost:3000";

pub const YOUTUBE_API_BASE: &str = "https://www.googleapis.com/youtube/v3";
pub const TIKTOK_API_BASE: &str = "https://open.tiktokapis.com/v2";
pub const RAPIDAPI_NO_WATERMARK_URL: &str = "https://tiktok-video-no-watermark2.p.rapidapi.com/";
pub const RAPIDAPI_SCRAPER_URL: &str = "https://tiktok-scraper7.p.rapidapi.com/";

/// Client credentials for the official TikTok API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TikTokCredentials {
    pub client_key: String,
    pub client_secret: String,
}

/// Where each provider sends its requests. Defaults point at the real services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderEndpoints {
    pub youtube_api: String,
    pub tiktok_api: String,
    pub rapidapi_no_watermark: String,
    pub rapidapi_scraper: String,
}

impl Default for ProviderEndpoints {
    fn default() -> Self {
        Self {
            youtube_api: YOUTUBE_API_BASE.to_string(),
            tiktok_api: TIKTOK_API_BASE.to_string(),
            rapidapi_no_watermark: RAPIDAPI_NO_WATERMARK_URL.to_string(),
            rapidapi_scraper: RAPIDAPI_SCRAPER_URL.to_string(),
        }
    }
}

/// Secrets and settings read once at startup. A missing secret disables the
/// tier that needs it and nothing else.
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub rapidapi_key: Option<String>,
    pub youtube_api_key: Option<String>,
    pub tiktok_credentials: Option<TikTokCredentials>,
    pub endpoints: ProviderEndpoints,
    pub allowed_origins: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let tiktok_credentials = match (read("TIKTOK_CLIENT_KEY"), read("TIKTOK_CLIENT_SECRET")) {
            (Some(client_key), Some(client_secret)) => Some(TikTokCredentials {
                client_key,
                client_secret,
            }),
            (None, None) => None,
            _ => {
                warn!("Only one of TIKTOK_CLIENT_KEY / TIKTOK_CLIENT_SECRET is set; official TikTok API disabled");
                None
            }
        };

        let allowed_origins = read("CORS_ALLOWED_ORIGINS")
            .map(|origins| {
                origins
                    .split(',')
                    .map(|origin| origin.trim().to_string())
                    .filter(|origin| !origin.is_empty())
                    .collect::<Vec<_>>()
            })
            .filter(|origins| !origins.is_empty())
            .unwrap_or_else(|| vec![DEFAULT_ALLOWED_ORIGIN.to_string()]);

        Self {
            rapidapi_key: read("RAPIDAPI_KEY"),
            youtube_api_key: read("YOUTUBE_API_KEY"),
            tiktok_credentials,
            endpoints: ProviderEndpoints::default(),
            allowed_origins,
        }
    }

    pub fn log_summary(&self) {
        let state = |enabled: bool| if enabled { "enabled" } else { "disabled" };
        info!(
            "YouTube API: {}, TikTok official API: {}, RapidAPI tiers: {}",
            state(self.youtube_api_key.is_some()),
            state(self.tiktok_credentials.is_some()),
            state(self.rapidapi_key.is_some()),
        );
    }
}

pub fn init_logger() {
    Builder::new()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();
    info!("Starting Rocket backend...");
}

pub fn load_environment() {
    dotenv::dotenv().ok();
}

pub fn create_cors(allowed_origins: &[String]) -> Result<rocket_cors::Cors> {
    let cors = CorsOptions::default()
        .allowed_origins(AllowedOrigins::some_exact(allowed_origins))
        .allowed_methods(
            vec![Method::Get, Method::Post, Method::Options]
                .into_iter()
                .map(From::from)
                .collect(),
        )
        .allowed_headers(AllowedHeaders::some(&["Accept", "Content-Type"]))
        .to_cors()
        .map_err(|e| anyhow::anyhow!("Failed to create CORS options: {}", e))?;

    Ok(cors)
}
