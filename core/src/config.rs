use crate::contract::Position;
use crate::spatial::Viewport;
use log::warn;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";
pub const API_URL_VAR: &str = "DOODLE_API_URL";
pub const MAP_TOKEN_VAR: &str = "DOODLE_MAP_TOKEN";
pub const MAP_LON_VAR: &str = "DOODLE_MAP_LON";
pub const MAP_LAT_VAR: &str = "DOODLE_MAP_LAT";
pub const MAP_ZOOM_VAR: &str = "DOODLE_MAP_ZOOM";

const STATIC_STYLE: &str = "mapbox/satellite-streets-v12";

/// Client settings, read once at startup and never changed afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub api_base: String,
    pub map_token: Option<String>,
    pub initial_center: Position,
    pub initial_zoom: u8,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_URL.into(),
            map_token: None,
            initial_center: Position::new(-117.16, 32.72),
            initial_zoom: 15,
        }
    }
}

fn parsed<T: std::str::FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("ignoring unparsable {}={:?}", key, raw);
            None
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key/value source; unset or blank values keep
    /// their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let api_base = lookup(API_URL_VAR)
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or(defaults.api_base);
        let map_token = lookup(MAP_TOKEN_VAR)
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty());
        let lng = parsed(&lookup, MAP_LON_VAR).unwrap_or(defaults.initial_center.lng());
        let lat = parsed(&lookup, MAP_LAT_VAR).unwrap_or(defaults.initial_center.lat());
        let initial_zoom = parsed(&lookup, MAP_ZOOM_VAR).unwrap_or(defaults.initial_zoom);

        Self {
            api_base,
            map_token,
            initial_center: Position::new(lng, lat),
            initial_zoom,
        }
    }

    pub fn analyze_url(&self) -> String {
        format!("{}/analyze", self.api_base)
    }

    /// Static satellite image covering `viewport`, if a map token is set.
    pub fn static_map_url(&self, viewport: &Viewport) -> Option<String> {
        let token = self.map_token.as_ref()?;
        Some(format!(
            "https://api.mapbox.com/styles/v1/{}/static/{:.6},{:.6},{}/{}x{}?access_token={}",
            STATIC_STYLE,
            viewport.center.lng(),
            viewport.center.lat(),
            viewport.zoom,
            viewport.width,
            viewport.height,
            token
        ))
    }
}
