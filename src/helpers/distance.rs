use crate::models::discovery::Coordinate;

/// Mean Earth radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance in kilometers. Not rounded.
pub fn haversine(center: Coordinate, point: Coordinate) -> f64 {
    let d_lat = (point.lat - center.lat).to_radians();
    let d_lng = (point.lng - center.lng).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + center.lat.to_radians().cos() * point.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

pub fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
