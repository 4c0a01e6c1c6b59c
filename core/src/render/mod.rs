pub mod hit_test;
pub mod layers;

pub use hit_test::{pick_feature, FeatureHit};
pub use layers::{category_overlays, CategoryOverlay, FillStyle, LineStyle};
