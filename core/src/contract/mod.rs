pub mod category;
pub mod geometry;
pub mod response;

pub use category::{Category, CategoryKey, Rgb, FALLBACK_COLOR};
pub use geometry::{FeatureGeometry, GeometryError, Position, Ring, UserPolygon};
pub use response::{AnalysisMetadata, AnalysisResponse, CategoryShare, DetectedFeature};
