use crate::models::{AddVideoRequest, ErrorResponse, Video};
use crate::services::cards::{build_grid, VideoCard};
use crate::services::videos::add_video;
use crate::AppState;
use log::info;
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::{get, post, State};

#[get("/videos")]
pub async fn list_videos(state: &State<AppState>) -> Json<Vec<Video>> {
    let videos = state.collection.list();
    info!("Listing {} saved videos", videos.len());
    Json(videos)
}

#[get("/videos/cards")]
pub async fn video_cards(state: &State<AppState>) -> Json<Vec<VideoCard>> {
    Json(build_grid(&state.collection.list()))
}

#[post("/videos", format = "json", data = "<request>")]
pub async fn create_video(
    request: Json<AddVideoRequest>,
    state: &State<AppState>,
) -> Result<(Status, Json<Video>), ErrorResponse> {
    let video = add_video(&state.resolver, &state.collection, request.into_inner()).await?;
    Ok((Status::Created, Json(video)))
}
