use std::collections::HashMap;
use reqwest::Client;
use reqwest::header::USER_AGENT;
use serde::Deserialize;
use tracing::{info, warn};
use crate::models::discovery::{Coordinate, ExternalPoi};
use crate::services::FRESHBITE_USER_AGENT;

/// Upper bound requested from Overpass when results are post-filtered by name.
pub const NAME_FILTER_FETCH_LIMIT: usize = 500;

const EATERY_AMENITIES: &str = "restaurant|fast_food|cafe";
const DEFAULT_CATEGORY: &str = "restaurant";

/// Finds named eateries around a coordinate through an Overpass interpreter.
#[derive(Clone)]
pub struct OverpassClient {
    client: Client,
    interpreter_url: String,
}

#[derive(Deserialize, Debug, Default)]
struct OverpassResponse {
    #[serde(default)]
    elements: Vec<OverpassElement>,
}

#[derive(Deserialize, Debug)]
struct OverpassElement {
    #[serde(default)]
    id: i64,
    lat: Option<f64>,
    lon: Option<f64>,
    center: Option<OverpassCenter>,
    #[serde(default)]
    tags: HashMap<String, String>,
}

#[derive(Deserialize, Debug)]
struct OverpassCenter {
    lat: Option<f64>,
    lon: Option<f64>,
}

impl OverpassElement {
    fn tag(&self, key: &str) -> Option<String> {
        self.tags.get(key).cloned()
    }

    /// Ways report their position in `center`, nodes directly.
    fn coordinate(&self) -> Coordinate {
        let (lat, lon) = match &self.center {
            Some(center) => (center.lat, center.lon),
            None => (self.lat, self.lon),
        };
        Coordinate {
            lat: lat.unwrap_or(0.0),
            lng: lon.unwrap_or(0.0),
        }
    }

    fn street_address(&self) -> String {
        let parts: Vec<&str> = ["addr:housenumber", "addr:street"]
            .iter()
            .filter_map(|key| self.tags.get(*key))
            .map(|part| part.trim())
            .filter(|part| !part.is_empty())
            .collect();
        parts.join(" ")
    }

    fn into_poi(self) -> Option<ExternalPoi> {
        let name = self.tag("name").filter(|name| !name.trim().is_empty())?;

        Some(ExternalPoi {
            external_id: self.id,
            cuisine: self.tag("cuisine"),
            address: self.street_address(),
            city: self.tag("addr:city"),
            state: self.tag("addr:state"),
            country: self.tag("addr:country"),
            phone: self.tag("phone"),
            website: self.tag("website"),
            opening_hours: self.tag("opening_hours"),
            category: self.tag("amenity").unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            coordinate: self.coordinate(),
            name,
        })
    }
}

impl OverpassClient {
    pub fn new(client: Client, interpreter_url: impl Into<String>) -> Self {
        Self {
            client,
            interpreter_url: interpreter_url.into(),
        }
    }

    /// Named restaurants, fast food outlets and cafes within `radius_meters`
    /// of `center`. The name filter is applied after retrieval; Overpass is
    /// never asked to match names. Any failure yields an empty list.
    pub async fn find_nearby(
        &self,
        center: Coordinate,
        radius_meters: u32,
        name_filter: Option<&str>,
        limit: usize,
    ) -> Vec<ExternalPoi> {
        let fetch_limit = match name_filter {
            Some(_) => NAME_FILTER_FETCH_LIMIT,
            None => limit,
        };
        let query = build_query(center, radius_meters, fetch_limit);

        let response = match self.interpret(&query).await {
            Ok(response) => response,
            Err(e) => {
                warn!("Overpass query failed near ({}, {}) due to: {}", center.lat, center.lng, e);
                return Vec::new();
            }
        };

        let pois = parse_elements(response);
        info!(
            "Overpass returned {} named eateries near ({}, {}) radius={}m",
            pois.len(), center.lat, center.lng, radius_meters
        );

        let filtered = filter_and_truncate(pois, name_filter, limit);
        if let Some(name) = name_filter {
            info!("After name filter '{}': {} eateries", name, filtered.len());
        }
        filtered
    }

    async fn interpret(&self, query: &str) -> anyhow::Result<OverpassResponse> {
        let response = self.client
            .post(&self.interpreter_url)
            .header(USER_AGENT, FRESHBITE_USER_AGENT)
            .form(&[("data", query)])
            .send()
            .await?
            .error_for_status()?
            .json::<OverpassResponse>()
            .await?;

        Ok(response)
    }
}

/// Overpass QL selecting named eatery nodes and ways around `center`.
pub fn build_query(center: Coordinate, radius_meters: u32, fetch_limit: usize) -> String {
    let around = format!("(around:{},{:.7},{:.7})", radius_meters, center.lat, center.lng);
    let selector = format!("[\"amenity\"~\"{}\"][\"name\"]{}", EATERY_AMENITIES, around);

    format!(
        "[out:json][timeout:25];\n(\n  node{selector};\n  way{selector};\n);\nout center body {fetch_limit};\n"
    )
}

fn parse_elements(response: OverpassResponse) -> Vec<ExternalPoi> {
    response.elements
        .into_iter()
        .filter_map(OverpassElement::into_poi)
        .collect()
}

/// Case-insensitive substring match on the name, then keep the first `limit`.
fn filter_and_truncate(
    pois: Vec<ExternalPoi>,
    name_filter: Option<&str>,
    limit: usize,
) -> Vec<ExternalPoi> {
    let needle = name_filter.map(str::to_lowercase);

    pois.into_iter()
        .filter(|poi| match &needle {
            Some(needle) => poi.name.to_lowercase().contains(needle.as_str()),
            None => true,
        })
        .take(limit)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const PHOENIX: Coordinate = Coordinate { lat: 33.45, lng: -112.07 };

    fn response_from(value: serde_json::Value) -> OverpassResponse {
        serde_json::from_value(value).unwrap()
    }

    fn poi_named(name: &str) -> ExternalPoi {
        ExternalPoi {
            external_id: 1,
            name: name.to_string(),
            cuisine: None,
            address: String::new(),
            city: None,
            state: None,
            country: None,
            phone: None,
            website: None,
            opening_hours: None,
            category: "fast_food".to_string(),
            coordinate: PHOENIX,
        }
    }

    #[test]
    fn query_embeds_fixed_precision_center_and_radius() {
        let query = build_query(PHOENIX, 5000, 100);

        assert!(query.starts_with("[out:json][timeout:25];"));
        assert!(query.contains("node[\"amenity\"~\"restaurant|fast_food|cafe\"][\"name\"](around:5000,33.4500000,-112.0700000);"));
        assert!(query.contains("way[\"amenity\"~\"restaurant|fast_food|cafe\"][\"name\"](around:5000,33.4500000,-112.0700000);"));
        assert!(query.ends_with("out center body 100;\n"));
    }

    #[test]
    fn unnamed_elements_are_dropped() {
        let pois = parse_elements(response_from(json!({
            "elements": [
                {"id": 1, "lat": 1.0, "lon": 2.0, "tags": {"amenity": "cafe"}},
                {"id": 2, "lat": 1.0, "lon": 2.0, "tags": {"amenity": "cafe", "name": "   "}},
                {"id": 3, "lat": 1.0, "lon": 2.0},
                {"id": 4, "lat": 1.0, "lon": 2.0, "tags": {"name": "Kept"}}
            ]
        })));

        assert_eq!(pois.len(), 1);
        assert_eq!(pois[0].external_id, 4);
        assert_eq!(pois[0].category, "restaurant");
    }

    #[test]
    fn ways_use_center_and_nodes_use_direct_coordinates() {
        let pois = parse_elements(response_from(json!({
            "elements": [
                {"type": "node", "id": 10, "lat": 33.1, "lon": -112.1, "tags": {"name": "Node Diner"}},
                {"type": "way", "id": 11, "center": {"lat": 33.2, "lon": -112.2}, "tags": {"name": "Way Grill"}}
            ]
        })));

        assert_eq!(pois[0].coordinate, Coordinate { lat: 33.1, lng: -112.1 });
        assert_eq!(pois[1].coordinate, Coordinate { lat: 33.2, lng: -112.2 });
    }

    #[test]
    fn address_joins_house_number_and_street() {
        let pois = parse_elements(response_from(json!({
            "elements": [
                {"id": 1, "lat": 0.0, "lon": 0.0, "tags": {"name": "A", "addr:housenumber": "12", "addr:street": "Main St"}},
                {"id": 2, "lat": 0.0, "lon": 0.0, "tags": {"name": "B", "addr:street": "Main St"}},
                {"id": 3, "lat": 0.0, "lon": 0.0, "tags": {"name": "C", "addr:housenumber": "12"}},
                {"id": 4, "lat": 0.0, "lon": 0.0, "tags": {"name": "D"}}
            ]
        })));

        let addresses: Vec<&str> = pois.iter().map(|poi| poi.address.as_str()).collect();
        assert_eq!(addresses, vec!["12 Main St", "Main St", "12", ""]);
    }

    #[test]
    fn optional_tags_are_carried_over() {
        let pois = parse_elements(response_from(json!({
            "elements": [{
                "id": 99, "lat": 1.0, "lon": 1.0,
                "tags": {
                    "name": "Taqueria", "amenity": "fast_food", "cuisine": "mexican",
                    "addr:city": "Phoenix", "addr:state": "AZ", "addr:country": "US",
                    "phone": "+1 602 555 0100", "website": "https://taqueria.example",
                    "opening_hours": "Mo-Su 10:00-22:00"
                }
            }]
        })));

        let poi = &pois[0];
        assert_eq!(poi.category, "fast_food");
        assert_eq!(poi.cuisine.as_deref(), Some("mexican"));
        assert_eq!(poi.city.as_deref(), Some("Phoenix"));
        assert_eq!(poi.state.as_deref(), Some("AZ"));
        assert_eq!(poi.country.as_deref(), Some("US"));
        assert_eq!(poi.phone.as_deref(), Some("+1 602 555 0100"));
        assert_eq!(poi.website.as_deref(), Some("https://taqueria.example"));
        assert_eq!(poi.opening_hours.as_deref(), Some("Mo-Su 10:00-22:00"));
    }

    #[test]
    fn name_filter_is_case_insensitive_substring() {
        let candidates = vec![
            poi_named("McDonald's"),
            poi_named("KFC"),
            poi_named("McDonalds Express"),
        ];

        let kept = filter_and_truncate(candidates, Some("mcdonald"), 100);

        let names: Vec<&str> = kept.iter().map(|poi| poi.name.as_str()).collect();
        assert_eq!(names, vec!["McDonald's", "McDonalds Express"]);
    }

    #[test]
    fn truncation_keeps_the_first_entries() {
        let candidates = (0..15).map(|i| poi_named(&format!("Cafe {}", i))).collect();

        let kept = filter_and_truncate(candidates, None, 10);

        assert_eq!(kept.len(), 10);
        assert_eq!(kept[0].name, "Cafe 0");
        assert_eq!(kept[9].name, "Cafe 9");
    }

    #[tokio::test]
    async fn find_nearby_posts_form_query_and_filters_by_name() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/interpreter"))
            .and(header("user-agent", FRESHBITE_USER_AGENT))
            .and(header("content-type", "application/x-www-form-urlencoded"))
            .and(body_string_contains("out+center+body+500"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "elements": [
                    {"id": 1, "lat": 33.45, "lon": -112.07, "tags": {"name": "McDonald's", "amenity": "fast_food"}},
                    {"id": 2, "lat": 33.45, "lon": -112.07, "tags": {"name": "KFC", "amenity": "fast_food"}},
                    {"id": 3, "center": {"lat": 33.46, "lon": -112.06}, "tags": {"name": "McDonalds Express"}},
                    {"id": 4, "lat": 33.45, "lon": -112.07, "tags": {"amenity": "cafe"}}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = OverpassClient::new(Client::new(), format!("{}/api/interpreter", server.uri()));
        let pois = client.find_nearby(PHOENIX, 5000, Some("mcdonald"), 10).await;

        let ids: Vec<i64> = pois.iter().map(|poi| poi.external_id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[tokio::test]
    async fn find_nearby_requests_exactly_limit_without_filter() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_string_contains("out+center+body+25"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"elements": []})))
            .expect(1)
            .mount(&server)
            .await;

        let client = OverpassClient::new(Client::new(), server.uri());
        assert!(client.find_nearby(PHOENIX, 5000, None, 25).await.is_empty());
    }

    #[tokio::test]
    async fn find_nearby_is_empty_on_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/timeout"))
            .respond_with(ResponseTemplate::new(504))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/garbage"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{\"elements\": [ oops"))
            .mount(&server)
            .await;

        let timeout = OverpassClient::new(Client::new(), format!("{}/timeout", server.uri()));
        let garbage = OverpassClient::new(Client::new(), format!("{}/garbage", server.uri()));

        assert!(timeout.find_nearby(PHOENIX, 5000, None, 10).await.is_empty());
        assert!(garbage.find_nearby(PHOENIX, 5000, Some("kfc"), 10).await.is_empty());
    }
}
