use crate::contract::category::{Category, CategoryKey};
use crate::contract::geometry::{FeatureCollectionTag, FeatureGeometry, FeatureTag};
use serde::{Deserialize, Serialize};

/// Classification properties attached to each returned region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureProperties {
    pub category: CategoryKey,
    pub area_sqft: f64,
    pub color: String,
}

/// One classified region as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedFeature {
    #[serde(rename = "type")]
    pub kind: FeatureTag,
    pub geometry: FeatureGeometry,
    pub properties: FeatureProperties,
}

impl DetectedFeature {
    pub fn new(geometry: FeatureGeometry, category: CategoryKey, area_sqft: f64) -> Self {
        let color = category.color().to_hex();
        Self {
            kind: FeatureTag::Feature,
            geometry,
            properties: FeatureProperties {
                category,
                area_sqft,
                color,
            },
        }
    }

    pub fn category(&self) -> &CategoryKey {
        &self.properties.category
    }
}

/// Area and share of the zone for a single category.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CategoryShare {
    pub sqft: f64,
    pub pct: f64,
}

/// Aggregate statistics for one analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisMetadata {
    pub total_area_sqft: f64,
    pub vegetation_sqft: f64,
    pub vegetation_pct: f64,
    pub water_sqft: f64,
    pub water_pct: f64,
    pub buildings_sqft: f64,
    pub buildings_pct: f64,
    pub roads_sqft: f64,
    pub roads_pct: f64,
    pub bare_soil_sqft: f64,
    pub bare_soil_pct: f64,
    pub other_sqft: f64,
    pub other_pct: f64,
    pub tiles_processed: u32,
    pub processing_time_ms: f64,
}

fn percentage(part: f64, total: f64) -> f64 {
    if total > 0.0 {
        part / total * 100.0
    } else {
        0.0
    }
}

impl AnalysisMetadata {
    /// Builds metadata from per-category areas; percentages are derived here.
    /// Categories missing from `areas` count as zero.
    pub fn from_areas(
        total_area_sqft: f64,
        areas: &[(Category, f64)],
        tiles_processed: u32,
        processing_time_ms: f64,
    ) -> Self {
        let area = |wanted: Category| -> f64 {
            areas
                .iter()
                .filter(|(category, _)| *category == wanted)
                .map(|(_, sqft)| sqft)
                .sum()
        };
        let (vegetation, water, buildings, roads, bare_soil, other) = (
            area(Category::Vegetation),
            area(Category::Water),
            area(Category::Buildings),
            area(Category::Roads),
            area(Category::BareSoil),
            area(Category::Other),
        );

        Self {
            total_area_sqft,
            vegetation_sqft: vegetation,
            vegetation_pct: percentage(vegetation, total_area_sqft),
            water_sqft: water,
            water_pct: percentage(water, total_area_sqft),
            buildings_sqft: buildings,
            buildings_pct: percentage(buildings, total_area_sqft),
            roads_sqft: roads,
            roads_pct: percentage(roads, total_area_sqft),
            bare_soil_sqft: bare_soil,
            bare_soil_pct: percentage(bare_soil, total_area_sqft),
            other_sqft: other,
            other_pct: percentage(other, total_area_sqft),
            tiles_processed,
            processing_time_ms,
        }
    }

    pub fn share(&self, category: Category) -> CategoryShare {
        let (sqft, pct) = match category {
            Category::Vegetation => (self.vegetation_sqft, self.vegetation_pct),
            Category::Water => (self.water_sqft, self.water_pct),
            Category::Buildings => (self.buildings_sqft, self.buildings_pct),
            Category::Roads => (self.roads_sqft, self.roads_pct),
            Category::BareSoil => (self.bare_soil_sqft, self.bare_soil_pct),
            Category::Other => (self.other_sqft, self.other_pct),
        };
        CategoryShare { sqft, pct }
    }
}

/// Full reply of `POST /analyze`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResponse {
    #[serde(rename = "type")]
    pub kind: FeatureCollectionTag,
    pub features: Vec<DetectedFeature>,
    pub metadata: AnalysisMetadata,
}

impl AnalysisResponse {
    pub fn new(features: Vec<DetectedFeature>, metadata: AnalysisMetadata) -> Self {
        Self {
            kind: FeatureCollectionTag::FeatureCollection,
            features,
            metadata,
        }
    }
}
