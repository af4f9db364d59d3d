use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use crate::models::discovery::Coordinate;

/// A manually curated restaurant from the local catalog.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct LocalRestaurant {
    pub id: String,
    pub name: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl LocalRestaurant {
    /// Only available when both halves of the coordinate are stored.
    pub fn coordinate(&self) -> Option<Coordinate> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) => Some(Coordinate { lat, lng }),
            _ => None,
        }
    }
}
