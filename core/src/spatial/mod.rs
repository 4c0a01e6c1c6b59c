pub mod area;
pub mod projection;
pub mod tiles;

pub use area::{sqft_to_acres, SQFT_PER_ACRE};
pub use projection::Viewport;
pub use tiles::{tile_count, tile_grid, TileCoord};
