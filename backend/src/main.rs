#[macro_use]
extern crate rocket;

mod api;
mod config;
mod models;
mod services;

use crate::config::{create_cors, init_logger, load_environment, AppConfig};
use crate::services::collection::VideoCollection;
use crate::services::resolver::MetadataResolver;
use rocket::{Build, Rocket};

pub struct AppState {
    pub resolver: MetadataResolver,
    pub collection: VideoCollection,
}

pub fn build_rocket(config: AppConfig) -> anyhow::Result<Rocket<Build>> {
    let cors = create_cors(&config.allowed_origins)?;
    let state = AppState {
        resolver: MetadataResolver::new(config),
        collection: VideoCollection::new(),
    };

    Ok(rocket::build()
        .manage(state)
        .attach(cors)
        .mount("/api", api::routes())
        .register("/api", api::catchers()))
}

#[rocket::main]
async fn main() -> anyhow::Result<()> {
    load_environment();
    init_logger();

    let config = AppConfig::from_env();
    config.log_summary();

    let _rocket = build_rocket(config)?
        .launch()
        .await
        .map_err(|e| anyhow::anyhow!("Rocket failed to launch: {e}"))?;
    Ok(())
}
