use std::sync::Arc;
use axum::{Extension, Json, Router};
use axum::extract::Query;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use serde::{Deserialize, Serialize};
use tracing::warn;
use crate::controller::AppState;
use crate::models::discovery::{Coordinate, GeocodeResult};
use crate::services::discovery::{DiscoveryRequest, DiscoveryService, DEFAULT_LIMIT, DEFAULT_RADIUS_METERS};
use crate::services::nominatim::Geocoder;

const DEFAULT_LOCATION_CANDIDATES: usize = 5;
const MAX_LOCATION_CANDIDATES: usize = 10;
const MIN_LOCATION_QUERY_LENGTH: usize = 2;

pub fn router(app_state: AppState) -> Router {
    Router::new()
        .route("/api/discover", get(discover_restaurants))
        .route("/api/locations", get(search_locations))
        .route_layer(Extension(app_state.discovery))
        .route_layer(Extension(app_state.geocoder))
}

fn default_radius() -> i64 {
    DEFAULT_RADIUS_METERS
}

fn default_limit() -> i64 {
    DEFAULT_LIMIT
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct DiscoverParam {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub location: Option<String>,
    pub name: Option<String>,
    #[serde(default = "default_radius")]
    pub radius: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

impl DiscoverParam {
    /// A coordinate only counts when both halves are present.
    fn into_request(self) -> anyhow::Result<DiscoveryRequest> {
        let coordinate = match (self.lat, self.lng) {
            (Some(lat), Some(lng)) => Some(Coordinate::new(lat, lng)?),
            _ => None,
        };

        Ok(DiscoveryRequest {
            coordinate,
            location_text: self.location,
            name_filter: self.name,
            radius_meters: self.radius,
            limit: self.limit,
        })
    }
}

pub async fn discover_restaurants(
    Extension(discovery): Extension<Arc<DiscoveryService>>,
    Query(query): Query<DiscoverParam>,
) -> impl IntoResponse {
    return match query.into_request() {
        Ok(request) => {
            let response = discovery.discover(request).await;
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            warn!("Rejected discovery request due to: {}", e);
            (StatusCode::BAD_REQUEST, e.to_string()).into_response()
        }
    };
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct LocationSearchParam {
    #[serde(default)]
    pub q: String,
    pub limit: Option<usize>,
}

pub async fn search_locations(
    Extension(geocoder): Extension<Geocoder>,
    Query(query): Query<LocationSearchParam>,
) -> impl IntoResponse {
    let place_name = query.q.trim();
    if place_name.chars().count() < MIN_LOCATION_QUERY_LENGTH {
        return (StatusCode::OK, Json(Vec::<GeocodeResult>::new())).into_response();
    }

    let limit = query.limit
        .unwrap_or(DEFAULT_LOCATION_CANDIDATES)
        .clamp(1, MAX_LOCATION_CANDIDATES);
    let candidates = geocoder.geocode_multiple(place_name, limit).await;

    (StatusCode::OK, Json(candidates)).into_response()
}
