use crate::contract::Position;
use std::f64::consts::PI;

/// Pixel edge of one world tile at zoom 0 (vector-style tiles).
pub const TILE_SIZE: f64 = 512.0;
pub const MIN_ZOOM: u8 = 1;
pub const MAX_ZOOM: u8 = 20;
/// Web Mercator is undefined beyond this latitude.
pub const MAX_LATITUDE: f64 = 85.051_128_78;

fn world_size(zoom: u8) -> f64 {
    TILE_SIZE * 2f64.powi(zoom as i32)
}

fn to_world(position: Position, zoom: u8) -> (f64, f64) {
    let size = world_size(zoom);
    let lat = position.lat().clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
    let x = (position.lng() + 180.0) / 360.0 * size;
    let y = (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0 * size;
    (x, y)
}

fn from_world(x: f64, y: f64, zoom: u8) -> Position {
    let size = world_size(zoom);
    let lng = x / size * 360.0 - 180.0;
    let lat = (PI * (1.0 - 2.0 * y / size)).sinh().atan().to_degrees();
    Position::new(lng, lat)
}

/// Fixed-size Web Mercator view onto the map, in image pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub center: Position,
    pub zoom: u8,
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(center: Position, zoom: u8, width: u32, height: u32) -> Self {
        Self {
            center,
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
            width,
            height,
        }
    }

    /// Pixel offset from the top-left corner of the view.
    pub fn to_pixel(&self, position: Position) -> (f64, f64) {
        let (cx, cy) = to_world(self.center, self.zoom);
        let (x, y) = to_world(position, self.zoom);
        (
            x - cx + self.width as f64 / 2.0,
            y - cy + self.height as f64 / 2.0,
        )
    }

    pub fn to_position(&self, px: f64, py: f64) -> Position {
        let (cx, cy) = to_world(self.center, self.zoom);
        from_world(
            cx + px - self.width as f64 / 2.0,
            cy + py - self.height as f64 / 2.0,
            self.zoom,
        )
    }

    /// Content follows the pointer: dragging right moves the center west.
    pub fn panned(&self, dx: f64, dy: f64) -> Self {
        let (cx, cy) = to_world(self.center, self.zoom);
        let size = world_size(self.zoom);
        let x = (cx - dx).rem_euclid(size);
        let y = (cy - dy).clamp(0.0, size);
        Self {
            center: from_world(x, y, self.zoom),
            ..*self
        }
    }

    pub fn zoomed(&self, delta: i8) -> Self {
        let zoom = (self.zoom as i16 + delta as i16).clamp(MIN_ZOOM as i16, MAX_ZOOM as i16);
        Self {
            zoom: zoom as u8,
            ..*self
        }
    }

    /// `(west, south, east, north)` of the visible area.
    pub fn bounds(&self) -> (f64, f64, f64, f64) {
        let north_west = self.to_position(0.0, 0.0);
        let south_east = self.to_position(self.width as f64, self.height as f64);
        (
            north_west.lng(),
            south_east.lat(),
            south_east.lng(),
            north_west.lat(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view() -> Viewport {
        Viewport::new(Position::new(-117.16, 32.72), 15, 1024, 768)
    }

    #[test]
    fn center_maps_to_middle_of_view() {
        let (x, y) = view().to_pixel(Position::new(-117.16, 32.72));
        assert!((x - 512.0).abs() < 1e-6);
        assert!((y - 384.0).abs() < 1e-6);
    }

    #[test]
    fn pixel_roundtrip_is_stable() {
        let viewport = view();
        let position = viewport.to_position(100.0, 650.0);
        let (x, y) = viewport.to_pixel(position);
        assert!((x - 100.0).abs() < 1e-6);
        assert!((y - 650.0).abs() < 1e-6);
    }

    #[test]
    fn panning_shifts_content_with_pointer() {
        let viewport = view();
        let anchor = viewport.to_position(200.0, 200.0);
        let moved = viewport.panned(50.0, -20.0);
        let (x, y) = moved.to_pixel(anchor);
        assert!((x - 250.0).abs() < 1e-6);
        assert!((y - 180.0).abs() < 1e-6);
    }

    #[test]
    fn zoom_is_clamped() {
        assert_eq!(view().zoomed(40).zoom, MAX_ZOOM);
        assert_eq!(view().zoomed(-40).zoom, MIN_ZOOM);
        let (west, south, east, north) = view().bounds();
        assert!(west < -117.16 && east > -117.16);
        assert!(south < 32.72 && north > 32.72);
    }
}
