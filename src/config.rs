use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::fs;
use anyhow::{Context, Result};

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub input: InputConfig,
    pub columns: ColumnRoles,
    pub map: MapConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct InputConfig {
    /// District boundary geometry (.shp or .geojson), already in lon/lat degrees.
    pub boundary_file: PathBuf,
    /// Attribute/property holding the district name.
    pub district_column: String,
    /// District of interest; matched by substring.
    pub district_name: String,
}

/// Column names carrying the recognized semantic roles in uploaded tables.
#[derive(Debug, Deserialize, Clone)]
pub struct ColumnRoles {
    pub latitude: String,
    pub longitude: String,
    pub facility_name: String,
    pub address: String,
    pub date: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MapConfig {
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    pub boundary_color: String, // CSS color, e.g. "#FF6347"
    pub boundary_weight: f64,
    #[serde(default = "default_zoom")]
    pub zoom_start: u8,
}

fn default_width() -> u32 {
    1200
}

fn default_height() -> u32 {
    800
}

fn default_zoom() -> u8 {
    12
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

impl AppConfig {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config: AppConfig = toml::from_str(&content)
            .with_context(|| "Failed to parse TOML configuration")?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_config() {
        let toml_src = r##"
            [input]
            boundary_file = "infile/districts.geojson"
            district_column = "district"
            district_name = "Saha"

            [columns]
            latitude = "latitude"
            longitude = "longitude"
            facility_name = "facility_name"
            address = "address"
            date = "date"

            [map]
            boundary_color = "#FF6347"
            boundary_weight = 2.5

            [server]
            port = 8080
        "##;
        let config: AppConfig = toml::from_str(toml_src).unwrap();
        assert_eq!(config.map.width, 1200);
        assert_eq!(config.map.height, 800);
        assert_eq!(config.map.zoom_start, 12);
        assert_eq!(config.columns.date, "date");
        assert_eq!(config.server.port, 8080);
    }
}
