use std::cmp::Ordering;
use std::sync::Arc;
use tracing::{info, warn};
use crate::helpers::distance::{haversine, round_to_hundredths};
use crate::models::discovery::{Coordinate, DiscoveredItem, DiscoveryResponse, ExternalPoi};
use crate::models::restaurant::LocalRestaurant;
use crate::repositories::catalog::RestaurantCatalog;
use crate::services::nominatim::Geocoder;
use crate::services::overpass::OverpassClient;

pub const DEFAULT_RADIUS_METERS: i64 = 5000;
pub const MIN_RADIUS_METERS: i64 = 500;
pub const MAX_RADIUS_METERS: i64 = 50000;

pub const DEFAULT_LIMIT: i64 = 100;
pub const MIN_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 200;

/// Geographic center of the contiguous United States.
pub const FALLBACK_CENTER: Coordinate = Coordinate { lat: 39.8283, lng: -98.5795 };
pub const FALLBACK_LABEL: &str = "Central United States (default)";
pub const FALLBACK_RADIUS_METERS: u32 = 50000;

/// Local restaurants may sit this far beyond the search radius.
pub const LOCAL_OVERSHOOT_FACTOR: f64 = 1.5;

#[derive(Clone, Debug, PartialEq)]
pub struct DiscoveryRequest {
    pub coordinate: Option<Coordinate>,
    pub location_text: Option<String>,
    pub name_filter: Option<String>,
    pub radius_meters: i64,
    pub limit: i64,
}

impl Default for DiscoveryRequest {
    fn default() -> Self {
        Self {
            coordinate: None,
            location_text: None,
            name_filter: None,
            radius_meters: DEFAULT_RADIUS_METERS,
            limit: DEFAULT_LIMIT,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum CenterResolution {
    Resolved {
        center: Coordinate,
        label: Option<String>,
        radius_meters: u32,
    },
    Unresolvable {
        label: String,
    },
}

/// Merges nearby eateries from the external map source with the local
/// catalog into one distance-ranked list.
pub struct DiscoveryService {
    geocoder: Geocoder,
    poi_client: OverpassClient,
    catalog: Arc<dyn RestaurantCatalog>,
}

impl DiscoveryService {
    pub fn new(
        geocoder: Geocoder,
        poi_client: OverpassClient,
        catalog: Arc<dyn RestaurantCatalog>,
    ) -> Self {
        Self {
            geocoder,
            poi_client,
            catalog,
        }
    }

    pub async fn discover(&self, request: DiscoveryRequest) -> DiscoveryResponse {
        let radius_meters = clamp_radius(request.radius_meters);
        let limit = clamp_limit(request.limit);
        let location_text = non_blank(request.location_text.as_deref());
        let name_filter = non_blank(request.name_filter.as_deref());

        let (center, label, radius_meters) = match self
            .resolve_center(request.coordinate, location_text, radius_meters)
            .await
        {
            CenterResolution::Resolved { center, label, radius_meters } => (center, label, radius_meters),
            CenterResolution::Unresolvable { label } => {
                return DiscoveryResponse::new(Some(label), None, Vec::new());
            }
        };

        let (pois, local_restaurants) = tokio::join!(
            self.poi_client.find_nearby(center, radius_meters, name_filter, limit),
            self.search_catalog(name_filter.unwrap_or("")),
        );

        let external_count = pois.len();
        let items = merge_results(center, radius_meters, pois, local_restaurants);
        info!(
            "Discovered {} eateries ({} external, {} local) around ({}, {}) radius={}m",
            items.len(), external_count, items.len() - external_count, center.lat, center.lng, radius_meters
        );

        DiscoveryResponse::new(label, Some(center), items)
    }

    /// Picks the search center. A typed place name beats raw coordinates,
    /// raw coordinates beat the continental fallback.
    pub async fn resolve_center(
        &self,
        coordinate: Option<Coordinate>,
        location_text: Option<&str>,
        radius_meters: u32,
    ) -> CenterResolution {
        match (coordinate, location_text) {
            (Some(coordinate), Some(location)) => match self.geocoder.geocode(location).await {
                Some(geocoded) => CenterResolution::Resolved {
                    center: geocoded.coordinate,
                    label: Some(geocoded.display_name),
                    radius_meters,
                },
                None => CenterResolution::Resolved {
                    center: coordinate,
                    label: None,
                    radius_meters,
                },
            },
            (Some(coordinate), None) => CenterResolution::Resolved {
                center: coordinate,
                label: None,
                radius_meters,
            },
            (None, Some(location)) => match self.geocoder.geocode(location).await {
                Some(geocoded) => CenterResolution::Resolved {
                    center: geocoded.coordinate,
                    label: Some(geocoded.display_name),
                    radius_meters,
                },
                None => CenterResolution::Unresolvable {
                    label: format!("Could not find location: {}", location),
                },
            },
            (None, None) => CenterResolution::Resolved {
                center: FALLBACK_CENTER,
                label: Some(FALLBACK_LABEL.to_string()),
                radius_meters: FALLBACK_RADIUS_METERS,
            },
        }
    }

    async fn search_catalog(&self, query: &str) -> Vec<LocalRestaurant> {
        match self.catalog.search_by_text(query).await {
            Ok(restaurants) => restaurants,
            Err(e) => {
                warn!("Local catalog search for '{}' failed due to: {}", query, e);
                Vec::new()
            }
        }
    }
}

pub fn clamp_radius(radius_meters: i64) -> u32 {
    radius_meters.clamp(MIN_RADIUS_METERS, MAX_RADIUS_METERS) as u32
}

pub fn clamp_limit(limit: i64) -> usize {
    limit.clamp(MIN_LIMIT, MAX_LIMIT) as usize
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// External items first, then local items within the overshoot allowance,
/// stably sorted by distance with unknown distances last.
pub fn merge_results(
    center: Coordinate,
    radius_meters: u32,
    pois: Vec<ExternalPoi>,
    local_restaurants: Vec<LocalRestaurant>,
) -> Vec<DiscoveredItem> {
    let max_local_km = f64::from(radius_meters) / 1000.0 * LOCAL_OVERSHOOT_FACTOR;

    let external = pois.into_iter().map(|poi| {
        let distance = round_to_hundredths(haversine(center, poi.coordinate));
        DiscoveredItem::from_external(poi, Some(distance))
    });

    let local = local_restaurants.into_iter().filter_map(|restaurant| {
        let coordinate = restaurant.coordinate()?;
        let distance = haversine(center, coordinate);
        if distance > max_local_km {
            return None;
        }
        Some(DiscoveredItem::from_local(restaurant, coordinate, Some(round_to_hundredths(distance))))
    });

    let mut items: Vec<DiscoveredItem> = external.chain(local).collect();
    items.sort_by(compare_distance);
    items
}

fn compare_distance(a: &DiscoveredItem, b: &DiscoveredItem) -> Ordering {
    match (a.distance_km, b.distance_km) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
