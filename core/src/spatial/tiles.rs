use crate::contract::Position;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Slippy-map tile index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileCoord {
    pub x: u32,
    pub y: u32,
    pub zoom: u8,
}

fn tiles_per_side(zoom: u8) -> f64 {
    2f64.powi(zoom as i32)
}

pub fn tile_containing(position: Position, zoom: u8) -> TileCoord {
    let n = tiles_per_side(zoom);
    let lat = position.lat().to_radians();
    let x = ((position.lng() + 180.0) / 360.0 * n).floor();
    let y = ((1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0 * n).floor();
    TileCoord {
        x: x.clamp(0.0, n - 1.0) as u32,
        y: y.clamp(0.0, n - 1.0) as u32,
        zoom,
    }
}

/// North-west corner of tile `(x, y)`.
pub fn tile_corner(x: u32, y: u32, zoom: u8) -> Position {
    let n = tiles_per_side(zoom);
    let lng = x as f64 / n * 360.0 - 180.0;
    let lat = (PI * (1.0 - 2.0 * y as f64 / n)).sinh().atan().to_degrees();
    Position::new(lng, lat)
}

impl TileCoord {
    /// `(west, south, east, north)` covered by the tile.
    pub fn bounds(&self) -> (f64, f64, f64, f64) {
        let north_west = tile_corner(self.x, self.y, self.zoom);
        let south_east = tile_corner(self.x + 1, self.y + 1, self.zoom);
        (
            north_west.lng(),
            south_east.lat(),
            south_east.lng(),
            north_west.lat(),
        )
    }
}

fn corner_tiles(bounds: (f64, f64, f64, f64), zoom: u8) -> (TileCoord, TileCoord) {
    let (west, south, east, north) = bounds;
    (
        tile_containing(Position::new(west, north), zoom),
        tile_containing(Position::new(east, south), zoom),
    )
}

/// Number of tiles `tile_grid` would return, without building the list.
pub fn tile_count(bounds: (f64, f64, f64, f64), zoom: u8) -> u64 {
    let (north_west, south_east) = corner_tiles(bounds, zoom);
    let columns = south_east.x.saturating_sub(north_west.x) as u64 + 1;
    let rows = south_east.y.saturating_sub(north_west.y) as u64 + 1;
    columns * rows
}

/// Every tile intersecting `(west, south, east, north)`, column by column.
pub fn tile_grid(bounds: (f64, f64, f64, f64), zoom: u8) -> Vec<TileCoord> {
    let (north_west, south_east) = corner_tiles(bounds, zoom);

    (north_west.x..=south_east.x)
        .flat_map(|x| (north_west.y..=south_east.y).map(move |y| TileCoord { x, y, zoom }))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tile_bounds_contain_the_seed_position() {
        let position = Position::new(-117.16, 32.72);
        let tile = tile_containing(position, 18);
        let (west, south, east, north) = tile.bounds();
        assert!(west <= position.lng() && position.lng() < east);
        assert!(south < position.lat() && position.lat() <= north);
    }

    #[test]
    fn grid_spans_both_corners() {
        let bounds = (-117.1610, 32.7190, -117.1590, 32.7210);
        let grid = tile_grid(bounds, 18);
        let nw = tile_containing(Position::new(bounds.0, bounds.3), 18);
        let se = tile_containing(Position::new(bounds.2, bounds.1), 18);
        let expected = ((se.x - nw.x + 1) * (se.y - nw.y + 1)) as usize;
        assert_eq!(grid.len(), expected);
        assert!(grid.len() > 1);
        assert!(grid.contains(&nw) && grid.contains(&se));
        assert_eq!(tile_count(bounds, 18), grid.len() as u64);
    }

    #[test]
    fn continent_count_needs_no_allocation() {
        let bounds = (-125.0, 25.0, -67.0, 49.0);
        let count = tile_count(bounds, 18);
        assert!(count > 100_000_000, "count {}", count);
        assert_eq!(tile_count((-117.16, 32.72, -117.16, 32.72), 18), 1);
    }
}
