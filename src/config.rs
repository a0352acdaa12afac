use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::fs;
use anyhow::{Context, Result};

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub input: InputConfig,
    #[serde(default)]
    pub query: QueryConfig,
    #[serde(default)]
    pub range: RangeConfig,
    #[serde(default)]
    pub map: MapConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct InputConfig {
    pub dataset: PathBuf,
    #[serde(default = "default_null_marker")]
    pub null_marker: String,
}

fn default_null_marker() -> String {
    "\\N".to_string()
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct QueryConfig {
    pub postal_prefix_len: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        QueryConfig { postal_prefix_len: 4 }
    }
}

/// Slider bounds published to the presentation layer.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct RangeConfig {
    pub easting_domain: (f64, f64),
    pub northing_domain: (f64, f64),
    pub step: f64,
    pub default_easting: (f64, f64),
    pub default_northing: (f64, f64),
}

impl Default for RangeConfig {
    fn default() -> Self {
        RangeConfig {
            easting_domain: (0.0, 700_000.0),
            northing_domain: (0.0, 1_200_000.0),
            step: 10_000.0,
            default_easting: (100_000.0, 550_000.0),
            default_northing: (300_000.0, 900_000.0),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MapConfig {
    pub area_zoom: u8,
    pub address_zoom: u8,
    pub area_radius: u32,
    pub address_radius: u32,
    pub area_color: String,    // Hex code
    pub address_color: String, // Hex code
}

impl Default for MapConfig {
    fn default() -> Self {
        MapConfig {
            area_zoom: 10,
            address_zoom: 12,
            area_radius: 150,
            address_radius: 100,
            area_color: "#0096FF".to_string(),
            address_color: "#FF0000".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
    pub static_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig { port: 8080, static_dir: None }
    }
}

impl AppConfig {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let mut config: AppConfig = toml::from_str(&content)
            .with_context(|| "Failed to parse TOML configuration")?;

        // Dataset paths are relative to the config file, not the working directory.
        if config.input.dataset.is_relative() {
            if let Some(dir) = path.parent() {
                config.input.dataset = dir.join(&config.input.dataset);
            }
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_input_section_is_required() {
        let config: AppConfig = toml::from_str(
            r#"
            [input]
            dataset = "pubs.csv"
            "#,
        )
        .unwrap();

        assert_eq!(config.input.null_marker, "\\N");
        assert_eq!(config.query.postal_prefix_len, 4);
        assert_eq!(config.range, RangeConfig::default());
        assert_eq!(config.map.area_zoom, 10);
        assert_eq!(config.map.address_zoom, 12);
        assert_eq!(config.server.port, 8080);
        assert!(config.server.static_dir.is_none());
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let config: AppConfig = toml::from_str(
            r##"
            [input]
            dataset = "pubs.csv"
            null_marker = "NULL"

            [range]
            step = 5000.0

            [map]
            area_color = "#00FF00"
            "##,
        )
        .unwrap();

        assert_eq!(config.input.null_marker, "NULL");
        assert_eq!(config.range.step, 5000.0);
        assert_eq!(config.range.easting_domain, (0.0, 700_000.0));
        assert_eq!(config.map.area_color, "#00FF00");
        assert_eq!(config.map.address_color, "#FF0000");
    }

    #[test]
    fn dataset_path_resolves_against_config_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[input]\ndataset = \"data/pubs.csv\"\n").unwrap();

        let config = AppConfig::load_from_file(&path).unwrap();
        assert_eq!(config.input.dataset, dir.path().join("data/pubs.csv"));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = AppConfig::load_from_file(Path::new("/nonexistent/pubmap.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
