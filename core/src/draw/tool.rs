use crate::contract::{Position, Ring};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawMode {
    SimpleSelect,
    DrawPolygon,
}

/// Geometry of a finished drawing gesture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum DrawnGeometry {
    Point(Position),
    LineString(Vec<Position>),
    Polygon(Vec<Ring>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawnFeature {
    pub geometry: DrawnGeometry,
}

/// Fired once per completed gesture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawCreateEvent {
    pub features: Vec<DrawnFeature>,
}

/// Vertex-by-vertex polygon drawing on top of the map.
///
/// Only [`DrawController`](crate::draw::DrawController) creates one, so a mounted
/// map never hosts more than a single tool.
#[derive(Debug)]
pub struct DrawTool {
    mode: DrawMode,
    vertices: Vec<Position>,
    features: Vec<DrawnFeature>,
}

impl DrawTool {
    pub(crate) fn new() -> Self {
        Self {
            mode: DrawMode::SimpleSelect,
            vertices: Vec::new(),
            features: Vec::new(),
        }
    }

    pub fn mode(&self) -> DrawMode {
        self.mode
    }

    /// Vertices of the shape being drawn.
    pub fn vertices(&self) -> &[Position] {
        &self.vertices
    }

    /// Shapes finished since the last `delete_all`.
    pub fn features(&self) -> &[DrawnFeature] {
        &self.features
    }

    /// Switching mode always discards the shape in progress.
    pub fn change_mode(&mut self, mode: DrawMode) {
        self.vertices.clear();
        self.mode = mode;
    }

    pub fn delete_all(&mut self) {
        self.vertices.clear();
        self.features.clear();
    }

    /// Consecutive duplicates are dropped. Ignored outside `DrawPolygon`.
    pub fn add_vertex(&mut self, position: Position) -> bool {
        if self.mode != DrawMode::DrawPolygon || self.vertices.last() == Some(&position) {
            return false;
        }
        self.vertices.push(position);
        true
    }

    /// Completes the gesture. The shape type follows the number of vertices
    /// placed: three or more close into a polygon, two form a line, one a point.
    pub fn finish(&mut self) -> Option<DrawCreateEvent> {
        if self.mode != DrawMode::DrawPolygon || self.vertices.is_empty() {
            return None;
        }
        let mut vertices = std::mem::take(&mut self.vertices);
        let geometry = match vertices.len() {
            1 => DrawnGeometry::Point(vertices[0]),
            2 => DrawnGeometry::LineString(vertices),
            _ => {
                vertices.push(vertices[0]);
                DrawnGeometry::Polygon(vec![vertices])
            }
        };
        let feature = DrawnFeature { geometry };
        self.features.push(feature.clone());
        self.mode = DrawMode::SimpleSelect;
        Some(DrawCreateEvent {
            features: vec![feature],
        })
    }
}
