use crate::models::HealthResponse;
use crate::AppState;
use rocket::serde::json::Json;
use rocket::{get, State};

#[get("/health")]
pub async fn health(state: &State<AppState>) -> Json<HealthResponse> {
    let config = state.resolver.config();
    Json(HealthResponse {
        status: "ok".to_string(),
        youtube_enabled: config.youtube_api_key.is_some(),
        tiktok_official_enabled: config.tiktok_credentials.is_some(),
        rapidapi_enabled: config.rapidapi_key.is_some(),
        saved_videos: state.collection.len(),
    })
}
