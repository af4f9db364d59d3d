use std::sync::Arc;
use axum::{Extension, Json, Router};
use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use serde::{Deserialize, Serialize};
use tracing::warn;
use crate::controller::AppState;
use crate::repositories::postgres_repo::PostgresConnectionRepo;

pub fn router(app_state: AppState) -> Router {
    Router::new()
        .route("/search", get(search_restaurants))
        .route("/:restaurant_id", get(retrieve_restaurant))
        .route_layer(Extension(app_state.postgres_repo))
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct SearchRestaurantParam {
    #[serde(default)]
    pub q: String,
}

pub async fn search_restaurants(
    Extension(postgres_repo): Extension<Arc<PostgresConnectionRepo>>,
    Query(query): Query<SearchRestaurantParam>,
) -> impl IntoResponse {
    let restaurants_res = postgres_repo
        .search_restaurants(
            query.q.trim()
        ).await;

    return match restaurants_res {
        Ok(restaurants) => {
            (StatusCode::OK, Json(restaurants)).into_response()
        }
        Err(e) => {
            warn!("Something went wrong searching for restaurants due to: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to search restaurants, please try again!"
            ).into_response()
        }
    };
}

pub async fn retrieve_restaurant(
    Extension(postgres_repo): Extension<Arc<PostgresConnectionRepo>>,
    Path(restaurant_id): Path<String>,
) -> impl IntoResponse {
    let restaurant_res = postgres_repo
        .find_by_id(
            &restaurant_id
        ).await;

    return match restaurant_res {
        Ok(Some(restaurant)) => {
            (StatusCode::OK, Json(restaurant)).into_response()
        }
        Ok(None) => {
            (StatusCode::NOT_FOUND, "Restaurant not found").into_response()
        }
        Err(e) => {
            warn!("Something went wrong retrieving restaurant {} due to: {}", restaurant_id, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to retrieve restaurant, please try again!"
            ).into_response()
        }
    };
}
