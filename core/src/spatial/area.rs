use geo::{Area, Centroid, MultiPolygon, Polygon};

pub const SQFT_PER_SQM: f64 = 10.764;
pub const SQFT_PER_ACRE: f64 = 43_560.0;
/// Meters per degree of longitude at the equator.
const METERS_PER_DEGREE: f64 = 111_320.0;

/// Converts a planar area in square degrees to square feet, scaling both axes
/// by the longitude length at `center_lat`.
pub fn square_degrees_to_sqft(area: f64, center_lat: f64) -> f64 {
    let meters_per_degree = METERS_PER_DEGREE * center_lat.to_radians().cos();
    area * meters_per_degree * meters_per_degree * SQFT_PER_SQM
}

pub fn sqft_to_acres(sqft: f64) -> f64 {
    sqft / SQFT_PER_ACRE
}

/// Latitude used as the scale reference for a zone.
pub fn reference_latitude(zone: &Polygon<f64>) -> f64 {
    zone.centroid().map(|point| point.y()).unwrap_or_default()
}

pub fn polygon_sqft(polygon: &Polygon<f64>, center_lat: f64) -> f64 {
    square_degrees_to_sqft(polygon.unsigned_area(), center_lat)
}

pub fn multi_polygon_sqft(multi: &MultiPolygon<f64>, center_lat: f64) -> f64 {
    square_degrees_to_sqft(multi.unsigned_area(), center_lat)
}
