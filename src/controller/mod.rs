use std::net::SocketAddr;
use std::sync::Arc;
use anyhow::Context;
use axum::http::HeaderValue;
use axum::Router;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::Method;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{info, warn};
use crate::config::Config;
use crate::helpers::handler_404::page_not_found_handler;
use crate::repositories::postgres_repo::PostgresConnectionRepo;
use crate::services::discovery::DiscoveryService;
use crate::services::nominatim::Geocoder;

pub mod discover_controller;
pub mod health_check;
pub mod restaurant_controller;

#[derive(Clone)]
pub struct AppState {
    pub postgres_repo: Arc<PostgresConnectionRepo>,
    pub discovery: Arc<DiscoveryService>,
    pub geocoder: Geocoder,
}

pub async fn serve(
    app_state: AppState,
    config: &Config,
) -> anyhow::Result<()> {
    let application = router_endpoints(app_state)
        .layer(
            ServiceBuilder::new()
                .layer(
                    CorsLayer::new()
                        .allow_methods([
                            Method::GET,
                            Method::POST,
                            Method::PUT,
                            Method::DELETE,
                            Method::OPTIONS
                        ])
                        .allow_origin(allowed_origins(&config.origin_urls))
                        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
                )
                .layer(CompressionLayer::new())
        )
        .fallback(page_not_found_handler);

    let port = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("API server listening on port: {} ({})", port, config.environment);
    axum::Server::bind(&port)
        .serve(application.into_make_service())
        .await
        .context("Error spinning up the API server")
}

pub fn router_endpoints(app_state: AppState) -> Router {
    health_check::router()
        .merge(discover_controller::router(app_state.clone()))
        .nest("/api/restaurants", restaurant_controller::router(app_state))
}

fn allowed_origins(origin_urls: &str) -> AllowOrigin {
    if origin_urls.trim() == "*" {
        return AllowOrigin::any();
    }

    let origins: Vec<HeaderValue> = origin_urls
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Ignoring invalid origin '{}' due to: {}", origin, e);
                None
            }
        })
        .collect();

    AllowOrigin::list(origins)
}
