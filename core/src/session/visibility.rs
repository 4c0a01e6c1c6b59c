use crate::contract::{Category, CategoryKey};

/// Per-category overlay visibility. Independent of what the response contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerVisibility {
    flags: [bool; 6],
}

impl Default for LayerVisibility {
    fn default() -> Self {
        Self { flags: [true; 6] }
    }
}

fn slot(category: Category) -> usize {
    match category {
        Category::Vegetation => 0,
        Category::Water => 1,
        Category::Buildings => 2,
        Category::Roads => 3,
        Category::BareSoil => 4,
        Category::Other => 5,
    }
}

impl LayerVisibility {
    pub fn is_visible(&self, category: Category) -> bool {
        self.flags[slot(category)]
    }

    /// Unrecognized categories have no toggle and always render.
    pub fn is_key_visible(&self, key: &CategoryKey) -> bool {
        key.known().map_or(true, |category| self.is_visible(category))
    }

    pub fn toggle(&mut self, category: Category) {
        let flag = &mut self.flags[slot(category)];
        *flag = !*flag;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn all_visible(&self) -> bool {
        self.flags.iter().all(|flag| *flag)
    }
}
