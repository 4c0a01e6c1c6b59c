use crate::generator::landcover::classify_tile;
use crate::workflow::config::ServiceConfig;
use doodlecore::contract::{
    AnalysisMetadata, AnalysisResponse, DetectedFeature, FeatureGeometry, UserPolygon,
};
use doodlecore::spatial::area::{multi_polygon_sqft, polygon_sqft, reference_latitude};
use doodlecore::spatial::{tile_count, tile_grid};
use doodlecore::Category;
use geo::{BooleanOps, Intersects, Line, MultiPolygon, Polygon};
use log::info;
use std::time::Instant;

/// Ways an analysis request is refused. The message is returned to the client
/// verbatim as `detail`.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum AnalyzeError {
    #[error("Analysis zone too large, please draw a smaller area")]
    ZoneTooLarge { tiles: u64, max: usize },
    #[error("Analysis zone has no area")]
    EmptyZone,
    #[error("Analysis zone must not cross itself")]
    SelfIntersecting,
}

/// True when two non-neighbouring edges of the exterior ring touch.
fn crosses_itself(zone: &Polygon<f64>) -> bool {
    let edges: Vec<Line<f64>> = zone
        .exterior()
        .lines()
        .filter(|line| line.start != line.end)
        .collect();
    let count = edges.len();
    (0..count).any(|i| {
        (i + 2..count)
            .filter(|j| !(i == 0 && *j == count - 1))
            .any(|j| edges[i].intersects(&edges[j]))
    })
}

/// Synthetic stand-in for the imagery pipeline: tiles the zone, labels every
/// tile cell, clips the cells to the zone and sums areas per category.
#[derive(Clone)]
pub struct Analyzer {
    config: ServiceConfig,
}

impl Analyzer {
    pub fn new(config: ServiceConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn execute(&self, polygon: &UserPolygon) -> Result<AnalysisResponse, AnalyzeError> {
        let started = Instant::now();
        let zone = polygon.to_polygon();
        if crosses_itself(&zone) {
            return Err(AnalyzeError::SelfIntersecting);
        }
        let center_lat = reference_latitude(&zone);
        let total_area_sqft = polygon_sqft(&zone, center_lat);
        if total_area_sqft <= 0.0 {
            return Err(AnalyzeError::EmptyZone);
        }

        let bounds = polygon.bounds();
        let count = tile_count(bounds, self.config.zoom);
        if count > self.config.max_tiles as u64 {
            return Err(AnalyzeError::ZoneTooLarge {
                tiles: count,
                max: self.config.max_tiles,
            });
        }
        let tiles = tile_grid(bounds, self.config.zoom);

        let mut pieces: Vec<(Category, Vec<Polygon<f64>>)> =
            Category::ALL.iter().map(|c| (*c, Vec::new())).collect();
        for tile in &tiles {
            for (category, cell) in classify_tile(
                tile,
                self.config.cells_per_tile,
                self.config.seed,
                &self.config.weights,
            ) {
                let clipped = cell.intersection(&zone);
                if let Some((_, bucket)) = pieces.iter_mut().find(|(c, _)| *c == category) {
                    bucket.extend(clipped);
                }
            }
        }

        let mut features = Vec::new();
        let mut areas = Vec::new();
        for (category, polygons) in pieces {
            if polygons.is_empty() {
                continue;
            }
            let merged = MultiPolygon::new(polygons);
            let area_sqft = multi_polygon_sqft(&merged, center_lat);
            if area_sqft <= 0.0 {
                continue;
            }
            areas.push((category, area_sqft));
            features.push(DetectedFeature::new(
                FeatureGeometry::from_multi_polygon(&merged),
                category.into(),
                area_sqft,
            ));
        }

        let processing_time_ms = started.elapsed().as_secs_f64() * 1000.0;
        info!(
            "analyzed zone: {:.0} sq ft, {} tiles, {} categories in {:.1} ms",
            total_area_sqft,
            tiles.len(),
            features.len(),
            processing_time_ms
        );

        Ok(AnalysisResponse::new(
            features,
            AnalysisMetadata::from_areas(
                total_area_sqft,
                &areas,
                tiles.len() as u32,
                processing_time_ms,
            ),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use doodlecore::contract::Position;

    fn block() -> UserPolygon {
        UserPolygon::new(vec![
            Position(-117.1610, 32.7190),
            Position(-117.1595, 32.7190),
            Position(-117.1595, 32.7202),
            Position(-117.1610, 32.7202),
            Position(-117.1610, 32.7190),
        ])
        .unwrap()
    }

    #[test]
    fn analyzer_derives_percentages_from_areas() {
        let analyzer = Analyzer::new(ServiceConfig::default());
        let response = analyzer.execute(&block()).unwrap();
        let metadata = &response.metadata;

        assert!(metadata.total_area_sqft > 0.0);
        assert!(metadata.tiles_processed >= 1);
        let pct_sum: f64 = Category::ALL.iter().map(|c| metadata.share(*c).pct).sum();
        assert!((pct_sum - 100.0).abs() < 0.5, "pct sum {}", pct_sum);
        for feature in &response.features {
            let category = feature.category().known().unwrap();
            let share = metadata.share(category);
            assert_eq!(share.sqft, feature.properties.area_sqft);
            assert!((share.pct - share.sqft / metadata.total_area_sqft * 100.0).abs() < 1e-9);
        }
    }

    #[test]
    fn analyzer_is_deterministic_for_a_seed() {
        let analyzer = Analyzer::new(ServiceConfig::default());
        let first = analyzer.execute(&block()).unwrap();
        let second = analyzer.execute(&block()).unwrap();
        assert_eq!(first.features, second.features);
    }

    #[test]
    fn oversized_zone_is_refused() {
        let config = ServiceConfig {
            max_tiles: 1,
            ..Default::default()
        };
        let err = Analyzer::new(config).execute(&block()).unwrap_err();
        assert!(matches!(err, AnalyzeError::ZoneTooLarge { max: 1, .. }));
        assert_eq!(
            err.to_string(),
            "Analysis zone too large, please draw a smaller area"
        );
    }

    #[test]
    fn continent_sized_zone_is_refused_before_tiling() {
        let continent = UserPolygon::new(vec![
            Position(-125.0, 25.0),
            Position(-67.0, 25.0),
            Position(-67.0, 49.0),
            Position(-125.0, 25.0),
        ])
        .unwrap();
        let err = Analyzer::new(ServiceConfig::default())
            .execute(&continent)
            .unwrap_err();
        match err {
            AnalyzeError::ZoneTooLarge { tiles, max } => {
                assert_eq!(max, 50);
                assert!(tiles > 100_000_000, "tiles {}", tiles);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn bowtie_zone_is_refused() {
        let bowtie = UserPolygon::new(vec![
            Position(-117.1610, 32.7190),
            Position(-117.1595, 32.7202),
            Position(-117.1595, 32.7190),
            Position(-117.1610, 32.7202),
            Position(-117.1610, 32.7190),
        ])
        .unwrap();
        let err = Analyzer::new(ServiceConfig::default())
            .execute(&bowtie)
            .unwrap_err();
        assert_eq!(err, AnalyzeError::SelfIntersecting);
        assert_eq!(err.to_string(), "Analysis zone must not cross itself");
    }

    #[test]
    fn simple_rings_do_not_cross_themselves() {
        assert!(!crosses_itself(&block().to_polygon()));
        let triangle = UserPolygon::new(vec![
            Position(0.0, 0.0),
            Position(1.0, 0.0),
            Position(0.0, 1.0),
            Position(0.0, 0.0),
        ])
        .unwrap();
        assert!(!crosses_itself(&triangle.to_polygon()));
        let concave = UserPolygon::new(vec![
            Position(0.0, 0.0),
            Position(2.0, 0.0),
            Position(2.0, 2.0),
            Position(1.0, 1.0),
            Position(0.0, 2.0),
            Position(0.0, 0.0),
        ])
        .unwrap();
        assert!(!crosses_itself(&concave.to_polygon()));
    }
}
