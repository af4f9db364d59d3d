use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use crate::models::restaurant::LocalRestaurant;

const LOCAL_CATEGORY: &str = "restaurant";

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    /// Builds a coordinate from caller-supplied values, rejecting anything
    /// outside of lat [-90, 90] / lng [-180, 180].
    pub fn new(lat: f64, lng: f64) -> anyhow::Result<Self> {
        if !(-90.0..=90.0).contains(&lat) {
            return Err(anyhow!("Latitude {} is outside of [-90, 90]", lat));
        }
        if !(-180.0..=180.0).contains(&lng) {
            return Err(anyhow!("Longitude {} is outside of [-180, 180]", lng));
        }

        Ok(Self { lat, lng })
    }
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct GeocodeResult {
    pub display_name: String,
    pub coordinate: Coordinate,
}

/// An eatery returned by the external map source.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct ExternalPoi {
    pub external_id: i64,
    pub name: String,
    pub cuisine: Option<String>,
    pub address: String,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub opening_hours: Option<String>,
    pub category: String,
    pub coordinate: Coordinate,
}

/// Identity of a discovered item. Serialized inline as `source` plus the
/// id field belonging to that source.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(tag = "source", rename_all = "lowercase")]
pub enum ItemSource {
    External { external_id: i64 },
    Local { id: String },
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct DiscoveredItem {
    #[serde(flatten)]
    pub source: ItemSource,
    pub name: String,
    pub cuisine: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub opening_hours: Option<String>,
    pub category: String,
    pub coordinate: Coordinate,
    pub distance_km: Option<f64>,
}

impl DiscoveredItem {
    pub fn from_external(poi: ExternalPoi, distance_km: Option<f64>) -> Self {
        Self {
            source: ItemSource::External { external_id: poi.external_id },
            name: poi.name,
            cuisine: poi.cuisine,
            address: Some(poi.address),
            city: poi.city,
            state: poi.state,
            country: poi.country,
            phone: poi.phone,
            website: poi.website,
            opening_hours: poi.opening_hours,
            category: poi.category,
            coordinate: poi.coordinate,
            distance_km,
        }
    }

    pub fn from_local(
        restaurant: LocalRestaurant,
        coordinate: Coordinate,
        distance_km: Option<f64>,
    ) -> Self {
        Self {
            source: ItemSource::Local { id: restaurant.id },
            name: restaurant.name,
            cuisine: None,
            address: restaurant.address,
            city: restaurant.city,
            state: restaurant.state,
            country: restaurant.country,
            phone: None,
            website: None,
            opening_hours: None,
            category: LOCAL_CATEGORY.to_string(),
            coordinate,
            distance_km,
        }
    }
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct DiscoveryResponse {
    pub resolved_location: Option<String>,
    pub center: Option<Coordinate>,
    pub total_count: usize,
    pub items: Vec<DiscoveredItem>,
}

impl DiscoveryResponse {
    pub fn new(
        resolved_location: Option<String>,
        center: Option<Coordinate>,
        items: Vec<DiscoveredItem>,
    ) -> Self {
        Self {
            resolved_location,
            center,
            total_count: items.len(),
            items,
        }
    }
}
