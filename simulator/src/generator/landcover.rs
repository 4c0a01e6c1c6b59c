use doodlecore::spatial::TileCoord;
use doodlecore::Category;
use geo::{Coord, Polygon, Rect};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Relative frequency of each category in synthetic tiles.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CategoryWeights {
    pub vegetation: u32,
    pub water: u32,
    pub buildings: u32,
    pub roads: u32,
    pub bare_soil: u32,
    pub other: u32,
}

impl Default for CategoryWeights {
    fn default() -> Self {
        Self {
            vegetation: 30,
            water: 10,
            buildings: 20,
            roads: 15,
            bare_soil: 10,
            other: 15,
        }
    }
}

impl CategoryWeights {
    fn weight(&self, category: Category) -> u32 {
        match category {
            Category::Vegetation => self.vegetation,
            Category::Water => self.water,
            Category::Buildings => self.buildings,
            Category::Roads => self.roads,
            Category::BareSoil => self.bare_soil,
            Category::Other => self.other,
        }
    }

    fn total(&self) -> u32 {
        Category::ALL.iter().map(|c| self.weight(*c)).sum()
    }

    fn pick(&self, rng: &mut StdRng) -> Category {
        let total = self.total();
        if total == 0 {
            return Category::Other;
        }
        let mut roll = rng.gen_range(0..total);
        for category in Category::ALL {
            let weight = self.weight(category);
            if roll < weight {
                return category;
            }
            roll -= weight;
        }
        Category::Other
    }
}

/// Deterministic per-tile seed so the same zone always classifies the same way.
fn tile_seed(seed: u64, tile: &TileCoord) -> u64 {
    seed ^ (((tile.x as u64) << 32) | tile.y as u64) ^ ((tile.zoom as u64) << 58)
}

/// Splits a tile into `cells x cells` squares and labels each one.
pub fn classify_tile(
    tile: &TileCoord,
    cells: u32,
    seed: u64,
    weights: &CategoryWeights,
) -> Vec<(Category, Polygon<f64>)> {
    let cells = cells.max(1);
    let (west, south, east, north) = tile.bounds();
    let step_x = (east - west) / cells as f64;
    let step_y = (north - south) / cells as f64;
    let mut rng = StdRng::seed_from_u64(tile_seed(seed, tile));

    let mut labelled = Vec::with_capacity((cells * cells) as usize);
    for row in 0..cells {
        for col in 0..cells {
            let min = Coord {
                x: west + col as f64 * step_x,
                y: south + row as f64 * step_y,
            };
            let max = Coord {
                x: min.x + step_x,
                y: min.y + step_y,
            };
            labelled.push((weights.pick(&mut rng), Rect::new(min, max).to_polygon()));
        }
    }
    labelled
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Area;

    fn tile() -> TileCoord {
        TileCoord {
            x: 45_234,
            y: 105_103,
            zoom: 18,
        }
    }

    #[test]
    fn cells_cover_the_tile() {
        let cells = classify_tile(&tile(), 4, 7, &CategoryWeights::default());
        assert_eq!(cells.len(), 16);
        let (west, south, east, north) = tile().bounds();
        let tile_area = (east - west) * (north - south);
        let covered: f64 = cells.iter().map(|(_, cell)| cell.unsigned_area()).sum();
        assert!((covered - tile_area).abs() < tile_area * 1e-9);
    }

    #[test]
    fn classification_is_reproducible() {
        let weights = CategoryWeights::default();
        let first: Vec<Category> = classify_tile(&tile(), 3, 11, &weights)
            .into_iter()
            .map(|(c, _)| c)
            .collect();
        let second: Vec<Category> = classify_tile(&tile(), 3, 11, &weights)
            .into_iter()
            .map(|(c, _)| c)
            .collect();
        assert_eq!(first, second);
    }

    #[test]
    fn single_weight_forces_category() {
        let weights = CategoryWeights {
            vegetation: 0,
            water: 1,
            buildings: 0,
            roads: 0,
            bare_soil: 0,
            other: 0,
        };
        assert!(classify_tile(&tile(), 2, 3, &weights)
            .iter()
            .all(|(category, _)| *category == Category::Water));
    }
}
