use crate::generator::landcover::CategoryWeights;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

/// Settings of the synthetic analysis service.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServiceConfig {
    pub bind: SocketAddr,
    /// Slippy-map zoom used to tile the zone.
    pub zoom: u8,
    /// Zones needing more tiles than this are refused.
    pub max_tiles: usize,
    /// Classification cells per tile edge.
    pub cells_per_tile: u32,
    pub seed: u64,
    /// Artificial delay before each reply.
    pub latency_ms: u64,
    pub weights: CategoryWeights,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 8000)),
            zoom: 18,
            max_tiles: 50,
            cells_per_tile: 4,
            seed: 0,
            latency_ms: 0,
            weights: CategoryWeights::default(),
        }
    }
}

impl ServiceConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading service config {}", path_ref.display()))?;
        let config: ServiceConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing service config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn from_args(port: u16, max_tiles: usize, seed: u64, latency_ms: u64) -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], port)),
            max_tiles,
            seed,
            latency_ms,
            ..Default::default()
        }
    }

    pub fn latency(&self) -> Duration {
        Duration::from_millis(self.latency_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn config_from_args_sets_port() {
        let cfg = ServiceConfig::from_args(9100, 20, 5, 250);
        assert_eq!(cfg.bind.port(), 9100);
        assert_eq!(cfg.zoom, 18);
        assert_eq!(cfg.latency(), Duration::from_millis(250));
    }

    #[test]
    fn config_load_reads_partial_yaml() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(b"max_tiles: 12\nseed: 99\nweights:\n  water: 80\n")
            .unwrap();
        let path = temp.into_temp_path();
        let cfg = ServiceConfig::load(&path).unwrap();
        assert_eq!(cfg.max_tiles, 12);
        assert_eq!(cfg.seed, 99);
        assert_eq!(cfg.weights.water, 80);
        assert_eq!(cfg.weights.vegetation, 30);
        assert_eq!(cfg.bind, ServiceConfig::default().bind);
    }

    #[test]
    fn config_load_reports_missing_file() {
        let err = ServiceConfig::load("/nonexistent/doodle.yaml").unwrap_err();
        assert!(err.to_string().contains("reading service config"));
    }
}
