use reqwest::Client;
use reqwest::header::USER_AGENT;
use serde::Deserialize;
use serde_with::{serde_as, DefaultOnError, DefaultOnNull, DisplayFromStr, PickFirst};
use tracing::{info, warn};
use crate::models::discovery::{Coordinate, GeocodeResult};
use crate::services::FRESHBITE_USER_AGENT;

/// Resolves free-text place names through a Nominatim search endpoint.
///
/// Every failure (transport, non-success status, empty or unparseable body)
/// is logged and reported as "nothing found".
#[derive(Clone)]
pub struct Geocoder {
    client: Client,
    search_url: String,
}

#[serde_as]
#[derive(Deserialize, Debug)]
struct NominatimPlace {
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    display_name: String,
    #[serde_as(as = "DefaultOnError<PickFirst<(_, DisplayFromStr)>>")]
    #[serde(default)]
    lat: f64,
    #[serde_as(as = "DefaultOnError<PickFirst<(_, DisplayFromStr)>>")]
    #[serde(default)]
    lon: f64,
}

impl From<NominatimPlace> for GeocodeResult {
    fn from(place: NominatimPlace) -> Self {
        GeocodeResult {
            display_name: place.display_name,
            coordinate: Coordinate {
                lat: place.lat,
                lng: place.lon,
            },
        }
    }
}

impl Geocoder {
    pub fn new(client: Client, search_url: impl Into<String>) -> Self {
        Self {
            client,
            search_url: search_url.into(),
        }
    }

    pub async fn geocode(&self, place_name: &str) -> Option<GeocodeResult> {
        match self.search(place_name, 1).await {
            Ok(places) => {
                let result = places.into_iter().next().map(GeocodeResult::from);
                if let Some(found) = &result {
                    info!(
                        "Geocoded '{}' -> ({}, {}) = {}",
                        place_name, found.coordinate.lat, found.coordinate.lng, found.display_name
                    );
                }
                result
            }
            Err(e) => {
                warn!("Geocoding failed for '{}' due to: {}", place_name, e);
                None
            }
        }
    }

    /// Candidate matches for autocomplete and disambiguation.
    pub async fn geocode_multiple(&self, place_name: &str, limit: usize) -> Vec<GeocodeResult> {
        match self.search(place_name, limit).await {
            Ok(places) => places.into_iter().map(GeocodeResult::from).collect(),
            Err(e) => {
                warn!("Multi-geocoding failed for '{}' due to: {}", place_name, e);
                Vec::new()
            }
        }
    }

    async fn search(
        &self,
        place_name: &str,
        limit: usize,
    ) -> anyhow::Result<Vec<NominatimPlace>> {
        let limit = limit.to_string();
        let places = self.client
            .get(&self.search_url)
            .header(USER_AGENT, FRESHBITE_USER_AGENT)
            .query(&[
                ("q", place_name),
                ("format", "json"),
                ("limit", limit.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json::<Vec<NominatimPlace>>()
            .await?;

        Ok(places)
    }
}
