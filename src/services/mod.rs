pub mod discovery;
pub mod nominatim;
pub mod overpass;

/// Identifies this application to the OpenStreetMap services, as their
/// usage policies require.
pub const FRESHBITE_USER_AGENT: &str = "FreshBite/1.0 (dish-review-app)";
