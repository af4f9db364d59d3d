use std::sync::Arc;
use anyhow::Context;
use bb8_postgres::bb8::Pool;
use bb8_postgres::PostgresConnectionManager;
use bb8_postgres::tokio_postgres::NoTls;
use clap::Parser;
use dotenv::dotenv;
use crate::config::Config;
use crate::controller::AppState;
use crate::repositories::postgres_repo::PostgresConnectionRepo;
use crate::services::discovery::DiscoveryService;
use crate::services::nominatim::Geocoder;
use crate::services::overpass::OverpassClient;

pub mod config;
pub mod controller;
pub mod helpers;
pub mod models;
pub mod repositories;
pub mod services;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = Config::parse();

    let manager = PostgresConnectionManager::new_from_stringlike(&config.database_url, NoTls)
        .context("Invalid DATABASE_URL")?;
    let postgres_connection = Pool::builder()
        .max_size(config.max_db_connections)
        .build(manager)
        .await
        .context("Error building the postgres connection pool")?;
    let postgres_repo = Arc::new(PostgresConnectionRepo::new(postgres_connection));

    let http_client = reqwest::Client::new();
    let geocoder = Geocoder::new(http_client.clone(), config.nominatim_url.clone());
    let poi_client = OverpassClient::new(http_client, config.overpass_url.clone());
    let discovery = Arc::new(DiscoveryService::new(
        geocoder.clone(),
        poi_client,
        postgres_repo.clone(),
    ));

    let app_state = AppState {
        postgres_repo,
        discovery,
        geocoder,
    };

    controller::serve(app_state, &config).await
}
