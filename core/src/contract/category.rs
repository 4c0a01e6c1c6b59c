use serde::{Deserialize, Serialize};
use std::fmt;

/// Fixed land-cover labels reported by the analysis backend.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Vegetation,
    Water,
    Buildings,
    Roads,
    BareSoil,
    Other,
}

/// 8-bit RGB triple parsed from the legend's hex colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Color used for categories the client does not know about.
pub const FALLBACK_COLOR: Rgb = Rgb::new(0x99, 0x99, 0x99);

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Vegetation,
        Category::Water,
        Category::Buildings,
        Category::Roads,
        Category::BareSoil,
        Category::Other,
    ];

    /// Wire label, also used as the layer id prefix.
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Vegetation => "vegetation",
            Category::Water => "water",
            Category::Buildings => "buildings",
            Category::Roads => "roads",
            Category::BareSoil => "bare_soil",
            Category::Other => "other",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Category::Vegetation => "Vegetation",
            Category::Water => "Water",
            Category::Buildings => "Buildings",
            Category::Roads => "Roads",
            Category::BareSoil => "Bare Soil",
            Category::Other => "Other",
        }
    }

    pub fn color(self) -> Rgb {
        match self {
            Category::Vegetation => Rgb::new(0x22, 0xc5, 0x5e),
            Category::Water => Rgb::new(0x3b, 0x82, 0xf6),
            Category::Buildings => Rgb::new(0xef, 0x44, 0x44),
            Category::Roads => Rgb::new(0x6b, 0x72, 0x80),
            Category::BareSoil => Rgb::new(0xd9, 0x77, 0x06),
            Category::Other => Rgb::new(0xa3, 0xa3, 0xa3),
        }
    }

    /// Legend glyph shown next to the summary row.
    pub fn marker(self) -> char {
        match self {
            Category::Buildings | Category::Roads => '■',
            Category::Other => '□',
            _ => '●',
        }
    }

    pub fn parse(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|category| category.as_str() == label)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category label as received on the wire; unknown labels are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CategoryKey {
    Known(Category),
    Unrecognized(String),
}

impl CategoryKey {
    pub fn as_str(&self) -> &str {
        match self {
            CategoryKey::Known(category) => category.as_str(),
            CategoryKey::Unrecognized(label) => label,
        }
    }

    pub fn known(&self) -> Option<Category> {
        match self {
            CategoryKey::Known(category) => Some(*category),
            CategoryKey::Unrecognized(_) => None,
        }
    }

    pub fn color(&self) -> Rgb {
        self.known().map(Category::color).unwrap_or(FALLBACK_COLOR)
    }

    /// Human label for popups: the first underscore becomes a space and every
    /// word starts upper-case.
    pub fn title(&self) -> String {
        self.as_str()
            .replacen('_', " ", 1)
            .split(' ')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                    None => String::new(),
                }
            })
            .collect::<Vec<String>>()
            .join(" ")
    }
}

impl From<Category> for CategoryKey {
    fn from(category: Category) -> Self {
        CategoryKey::Known(category)
    }
}

impl From<String> for CategoryKey {
    fn from(label: String) -> Self {
        match Category::parse(&label) {
            Some(category) => CategoryKey::Known(category),
            None => CategoryKey::Unrecognized(label),
        }
    }
}

impl From<CategoryKey> for String {
    fn from(key: CategoryKey) -> Self {
        match key {
            CategoryKey::Known(category) => category.as_str().to_string(),
            CategoryKey::Unrecognized(label) => label,
        }
    }
}

impl fmt::Display for CategoryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_labels_fall_back_to_gray() {
        let key = CategoryKey::from("parking".to_string());
        assert_eq!(key, CategoryKey::Unrecognized("parking".into()));
        assert_eq!(key.color(), FALLBACK_COLOR);
        assert_eq!(
            CategoryKey::from("bare_soil".to_string()).color().to_hex(),
            "#d97706"
        );
    }

    #[test]
    fn popup_title_capitalizes_each_word() {
        assert_eq!(CategoryKey::from(Category::BareSoil).title(), "Bare Soil");
        assert_eq!(CategoryKey::from(Category::Water).title(), "Water");
        assert_eq!(
            CategoryKey::Unrecognized("parking_lot_area".into()).title(),
            "Parking Lot_area"
        );
    }

    #[test]
    fn category_key_serializes_as_plain_label() {
        let json = serde_json::to_string(&CategoryKey::from(Category::Roads)).unwrap();
        assert_eq!(json, "\"roads\"");
    }
}
