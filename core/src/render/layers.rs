use crate::contract::{CategoryKey, DetectedFeature, Rgb};
use crate::session::{AnalysisState, LayerVisibility};

pub const FILL_OPACITY: f32 = 0.4;
pub const OUTLINE_OPACITY: f32 = 0.8;
pub const OUTLINE_WIDTH: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FillStyle {
    pub color: Rgb,
    pub opacity: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineStyle {
    pub color: Rgb,
    pub width: f32,
    pub opacity: f32,
}

/// Paired fill and outline layers for one category present in the result.
#[derive(Debug, Clone)]
pub struct CategoryOverlay<'a> {
    pub category: &'a CategoryKey,
    pub features: Vec<&'a DetectedFeature>,
    pub fill: FillStyle,
    pub outline: LineStyle,
    pub visible: bool,
}

impl CategoryOverlay<'_> {
    /// Name of the fill layer clicks are queried against.
    pub fn fill_layer_id(&self) -> String {
        format!("{}-fill", self.category)
    }
}

/// Groups the completed result's features by category, in order of first
/// appearance. Any other state yields no overlays.
pub fn category_overlays<'a>(
    state: &'a AnalysisState,
    visibility: &LayerVisibility,
) -> Vec<CategoryOverlay<'a>> {
    let Some(result) = state.result() else {
        return Vec::new();
    };

    let mut overlays: Vec<CategoryOverlay<'a>> = Vec::new();
    for feature in &result.features {
        let category = feature.category();
        match overlays
            .iter_mut()
            .find(|overlay| overlay.category == category)
        {
            Some(overlay) => overlay.features.push(feature),
            None => {
                let color = category.color();
                overlays.push(CategoryOverlay {
                    category,
                    features: vec![feature],
                    fill: FillStyle {
                        color,
                        opacity: FILL_OPACITY,
                    },
                    outline: LineStyle {
                        color,
                        width: OUTLINE_WIDTH,
                        opacity: OUTLINE_OPACITY,
                    },
                    visible: visibility.is_key_visible(category),
                });
            }
        }
    }
    overlays
}
