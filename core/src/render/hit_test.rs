use crate::contract::{CategoryKey, Position};
use crate::render::layers::CategoryOverlay;
use geo::{Coord, Intersects, Point};

/// Feature picked by a click, anchored where the user clicked.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureHit {
    pub layer_id: String,
    pub category: CategoryKey,
    pub area_sqft: f64,
    pub anchor: Position,
}

/// Queries the visible fill layers, topmost (last drawn) first.
pub fn pick_feature(overlays: &[CategoryOverlay<'_>], at: Position) -> Option<FeatureHit> {
    let point = Point::from(Coord::from(at));
    overlays
        .iter()
        .rev()
        .filter(|overlay| overlay.visible)
        .flat_map(|overlay| {
            overlay
                .features
                .iter()
                .rev()
                .map(move |feature| (overlay, feature))
        })
        .find(|(_, feature)| feature.geometry.to_multi_polygon().intersects(&point))
        .map(|(overlay, feature)| FeatureHit {
            layer_id: overlay.fill_layer_id(),
            category: feature.properties.category.clone(),
            area_sqft: feature.properties.area_sqft,
            anchor: at,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::{
        AnalysisMetadata, AnalysisResponse, Category, DetectedFeature, FeatureGeometry,
        UserPolygon,
    };
    use crate::render::layers::category_overlays;
    use crate::session::{AnalysisState, LayerVisibility};

    fn square(x0: f64, size: f64) -> FeatureGeometry {
        FeatureGeometry::Polygon(vec![vec![
            Position(x0, 0.0),
            Position(x0 + size, 0.0),
            Position(x0 + size, size),
            Position(x0, size),
            Position(x0, 0.0),
        ]])
    }

    fn state() -> AnalysisState {
        let polygon = UserPolygon::new(vec![
            Position(0.0, 0.0),
            Position(10.0, 0.0),
            Position(10.0, 10.0),
            Position(0.0, 0.0),
        ])
        .unwrap();
        AnalysisState::Complete {
            polygon,
            result: AnalysisResponse::new(
                vec![
                    DetectedFeature::new(square(0.0, 4.0), Category::Vegetation.into(), 900.0),
                    DetectedFeature::new(square(1.0, 1.0), Category::Buildings.into(), 120.5),
                ],
                AnalysisMetadata::from_areas(1000.0, &[], 1, 5.0),
            ),
        }
    }

    #[test]
    fn topmost_layer_wins() {
        let state = state();
        let overlays = category_overlays(&state, &LayerVisibility::default());
        let hit = pick_feature(&overlays, Position(1.5, 0.5)).unwrap();
        assert_eq!(hit.category, CategoryKey::Known(Category::Buildings));
        assert_eq!(hit.layer_id, "buildings-fill");
        assert_eq!(hit.area_sqft, 120.5);
    }

    #[test]
    fn hidden_layers_are_not_hit() {
        let state = state();
        let mut visibility = LayerVisibility::default();
        visibility.toggle(Category::Buildings);
        let overlays = category_overlays(&state, &visibility);
        let hit = pick_feature(&overlays, Position(1.5, 0.5)).unwrap();
        assert_eq!(hit.category, CategoryKey::Known(Category::Vegetation));
        assert_eq!(hit.layer_id, "vegetation-fill");
    }

    #[test]
    fn empty_space_misses() {
        let state = state();
        let overlays = category_overlays(&state, &LayerVisibility::default());
        assert!(pick_feature(&overlays, Position(8.0, 8.0)).is_none());
    }
}
