pub mod metadata;
mod monitor;
pub mod videos;

pub use metadata::*;
pub use monitor::*;
pub use videos::*;

use crate::models::ErrorResponse;
use rocket::http::Status;
use rocket::{Catcher, Request, Route};

#[catch(400)]
fn bad_request(_: &Request) -> ErrorResponse {
    ErrorResponse::bad_request("Malformed request body")
}

#[catch(422)]
fn unprocessable(_: &Request) -> ErrorResponse {
    ErrorResponse::new(
        Status::UnprocessableEntity,
        "Invalid request body",
        "The request body is missing required fields or has the wrong shape",
    )
}

pub fn catchers() -> Vec<Catcher> {
    catchers![bad_request, unprocessable]
}

pub fn routes() -> Vec<Route> {
    routes![
        youtube_metadata,
        tiktok_metadata,
        tiktok_official_metadata,
        tiktok_alt_metadata,
        classify,
        list_videos,
        video_cards,
        create_video,
        health,
    ]
}
