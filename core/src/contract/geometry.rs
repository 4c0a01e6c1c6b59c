use geo::{Coord, LineString, MultiPolygon, Polygon};
use serde::{Deserialize, Serialize};

/// Longitude/latitude pair, encoded as a two-element JSON array.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position(pub f64, pub f64);

impl Position {
    pub fn new(lng: f64, lat: f64) -> Self {
        Self(lng, lat)
    }

    pub fn lng(&self) -> f64 {
        self.0
    }

    pub fn lat(&self) -> f64 {
        self.1
    }
}

impl From<Position> for Coord<f64> {
    fn from(position: Position) -> Self {
        Coord {
            x: position.0,
            y: position.1,
        }
    }
}

impl From<Coord<f64>> for Position {
    fn from(coord: Coord<f64>) -> Self {
        Position(coord.x, coord.y)
    }
}

/// Explicitly closed sequence of positions.
pub type Ring = Vec<Position>;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("ring has {0} coordinates, at least 4 are required")]
    TooFewCoordinates(usize),
    #[error("ring has {0} distinct vertices, at least 3 are required")]
    TooFewVertices(usize),
    #[error("ring is not closed")]
    OpenRing,
    #[error("expected exactly one ring, found {0}")]
    RingCount(usize),
    #[error("coordinate is not finite")]
    NonFinite,
}

/// Checks that a ring is closed and spans at least three distinct vertices.
pub fn validate_ring(ring: &[Position]) -> Result<(), GeometryError> {
    if ring
        .iter()
        .any(|position| !position.0.is_finite() || !position.1.is_finite())
    {
        return Err(GeometryError::NonFinite);
    }
    if ring.len() < 4 {
        return Err(GeometryError::TooFewCoordinates(ring.len()));
    }
    if ring.first() != ring.last() {
        return Err(GeometryError::OpenRing);
    }
    let mut distinct: Vec<Position> = Vec::with_capacity(ring.len());
    for position in &ring[..ring.len() - 1] {
        if !distinct.contains(position) {
            distinct.push(*position);
        }
    }
    if distinct.len() < 3 {
        return Err(GeometryError::TooFewVertices(distinct.len()));
    }
    Ok(())
}

/// Geometry of a classified region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum FeatureGeometry {
    Polygon(Vec<Ring>),
    MultiPolygon(Vec<Vec<Ring>>),
}

fn ring_to_line(ring: &[Position]) -> LineString<f64> {
    LineString::from(ring.iter().map(|p| Coord::from(*p)).collect::<Vec<_>>())
}

fn rings_to_polygon(rings: &[Ring]) -> Option<Polygon<f64>> {
    let (exterior, interiors) = rings.split_first()?;
    Some(Polygon::new(
        ring_to_line(exterior),
        interiors.iter().map(|ring| ring_to_line(ring)).collect(),
    ))
}

fn line_to_ring(line: &LineString<f64>) -> Ring {
    line.coords().map(|coord| Position::from(*coord)).collect()
}

impl FeatureGeometry {
    pub fn to_multi_polygon(&self) -> MultiPolygon<f64> {
        match self {
            FeatureGeometry::Polygon(rings) => {
                MultiPolygon::new(rings_to_polygon(rings).into_iter().collect())
            }
            FeatureGeometry::MultiPolygon(polygons) => MultiPolygon::new(
                polygons
                    .iter()
                    .filter_map(|rings| rings_to_polygon(rings))
                    .collect(),
            ),
        }
    }

    /// Collapses single-member collections into a plain `Polygon`.
    pub fn from_multi_polygon(multi: &MultiPolygon<f64>) -> Self {
        let mut polygons: Vec<Vec<Ring>> = multi
            .iter()
            .map(|polygon| {
                std::iter::once(polygon.exterior())
                    .chain(polygon.interiors())
                    .map(line_to_ring)
                    .collect()
            })
            .collect();
        if polygons.len() == 1 {
            FeatureGeometry::Polygon(polygons.remove(0))
        } else {
            FeatureGeometry::MultiPolygon(polygons)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeatureTag {
    Feature,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeatureCollectionTag {
    FeatureCollection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum PolygonGeometry {
    Polygon(Vec<Ring>),
}

/// Wire shape of the analysis request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolygonFeature {
    #[serde(rename = "type")]
    pub kind: FeatureTag,
    pub geometry: PolygonGeometry,
    #[serde(default)]
    pub properties: Option<serde_json::Map<String, serde_json::Value>>,
}

/// The zone drawn by the user: one closed ring, immutable once captured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "PolygonFeature", try_from = "PolygonFeature")]
pub struct UserPolygon {
    ring: Ring,
}

impl UserPolygon {
    pub fn new(ring: Ring) -> Result<Self, GeometryError> {
        validate_ring(&ring)?;
        Ok(Self { ring })
    }

    pub fn ring(&self) -> &[Position] {
        &self.ring
    }

    /// Vertices without the closing duplicate.
    pub fn vertices(&self) -> &[Position] {
        &self.ring[..self.ring.len() - 1]
    }

    pub fn to_polygon(&self) -> Polygon<f64> {
        Polygon::new(ring_to_line(&self.ring), Vec::new())
    }

    /// `(west, south, east, north)` of the ring.
    pub fn bounds(&self) -> (f64, f64, f64, f64) {
        self.ring.iter().fold(
            (f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
            |(w, s, e, n), p| (w.min(p.0), s.min(p.1), e.max(p.0), n.max(p.1)),
        )
    }
}

impl From<UserPolygon> for PolygonFeature {
    fn from(polygon: UserPolygon) -> Self {
        PolygonFeature {
            kind: FeatureTag::Feature,
            geometry: PolygonGeometry::Polygon(vec![polygon.ring]),
            properties: Some(serde_json::Map::new()),
        }
    }
}

impl TryFrom<PolygonFeature> for UserPolygon {
    type Error = GeometryError;

    fn try_from(feature: PolygonFeature) -> Result<Self, Self::Error> {
        let PolygonGeometry::Polygon(mut rings) = feature.geometry;
        if rings.len() != 1 {
            return Err(GeometryError::RingCount(rings.len()));
        }
        UserPolygon::new(rings.remove(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn square() -> Ring {
        vec![
            Position(0.0, 0.0),
            Position(1.0, 0.0),
            Position(1.0, 1.0),
            Position(0.0, 1.0),
            Position(0.0, 0.0),
        ]
    }

    #[test]
    fn user_polygon_serializes_as_geojson_feature() {
        let polygon = UserPolygon::new(square()).unwrap();
        let value = serde_json::to_value(&polygon).unwrap();
        assert_eq!(value["type"], "Feature");
        assert_eq!(value["geometry"]["type"], "Polygon");
        assert_eq!(value["geometry"]["coordinates"][0][2], json!([1.0, 1.0]));
        assert_eq!(value["properties"], json!({}));
    }

    #[test]
    fn user_polygon_rejects_open_and_degenerate_rings() {
        let mut open = square();
        open.pop();
        open.push(Position(0.5, 0.5));
        assert_eq!(UserPolygon::new(open), Err(GeometryError::OpenRing));

        let triangle_missing_closure = square()[..3].to_vec();
        assert_eq!(
            UserPolygon::new(triangle_missing_closure),
            Err(GeometryError::TooFewCoordinates(3))
        );

        let collapsed = vec![Position(1.0, 1.0); 4];
        assert_eq!(
            UserPolygon::new(collapsed),
            Err(GeometryError::TooFewVertices(1))
        );
    }

    #[test]
    fn deserializing_rejects_multiple_rings() {
        let body = json!({
            "type": "Feature",
            "geometry": {"type": "Polygon", "coordinates": [square(), square()]},
        });
        assert!(serde_json::from_value::<UserPolygon>(body).is_err());
    }

    #[test]
    fn multipolygon_roundtrips_through_geo() {
        let geometry = FeatureGeometry::MultiPolygon(vec![vec![square()], vec![square()]]);
        let multi = geometry.to_multi_polygon();
        assert_eq!(multi.0.len(), 2);
        assert_eq!(FeatureGeometry::from_multi_polygon(&multi), geometry);

        let single = MultiPolygon::new(vec![UserPolygon::new(square()).unwrap().to_polygon()]);
        assert!(matches!(
            FeatureGeometry::from_multi_polygon(&single),
            FeatureGeometry::Polygon(_)
        ));
    }

    #[test]
    fn bounds_cover_every_vertex() {
        let polygon = UserPolygon::new(square()).unwrap();
        assert_eq!(polygon.bounds(), (0.0, 0.0, 1.0, 1.0));
        assert_eq!(polygon.vertices().len(), 4);
    }
}
