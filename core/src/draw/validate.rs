use crate::contract::UserPolygon;
use crate::draw::tool::{DrawCreateEvent, DrawnGeometry};

/// Reasons a finished gesture is refused before it reaches the session.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawRejection {
    #[error("draw event carried no features")]
    Empty,
    #[error("Invalid shape. Please draw a polygon (closed area), not a line or point.")]
    NotAPolygon,
    #[error("Polygon too small. Please draw at least 3 points to create a valid area.")]
    TooSmall,
}

/// Accepts only a single Polygon whose outer ring has at least 4 entries
/// (3 vertices plus the closing point).
pub fn validate_create(event: &DrawCreateEvent) -> Result<UserPolygon, DrawRejection> {
    let feature = event.features.first().ok_or(DrawRejection::Empty)?;
    let DrawnGeometry::Polygon(rings) = &feature.geometry else {
        return Err(DrawRejection::NotAPolygon);
    };
    let ring = rings.first().ok_or(DrawRejection::TooSmall)?;
    if ring.len() < 4 {
        return Err(DrawRejection::TooSmall);
    }
    UserPolygon::new(ring.clone()).map_err(|_| DrawRejection::TooSmall)
}
