use crate::config::AppConfig;
use anyhow::{Context, Result, anyhow};
use geo::MultiPolygon;
use geo::bounding_rect::BoundingRect;
use shapefile::Reader;
use std::fs::File;
use std::io::BufReader;

/// Load the district boundary once at startup. The resulting value is
/// immutable and injected into the renderer by the composition root.
///
/// Features are kept when their district attribute contains the configured
/// district name; their polygons are merged into a single MultiPolygon.
pub fn load_boundary(config: &AppConfig) -> Result<MultiPolygon<f64>> {
    let path = &config.input.boundary_file;
    println!("Loading boundary from {:?}...", path);

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|s: &str| s.to_lowercase())
        .ok_or_else(|| anyhow!("Boundary file has no extension"))?;

    let boundary = match extension.as_str() {
        "shp" => load_from_shapefile(config)?,
        "json" | "geojson" => load_from_geojson(config)?,
        _ => return Err(anyhow!("Unsupported boundary format: {}", extension)),
    };

    if boundary.0.is_empty() {
        return Err(anyhow!(
            "No boundary feature matched district '{}'",
            config.input.district_name
        ));
    }

    check_geographic_degrees(&boundary)?;
    println!("Boundary loaded: {} polygon(s)", boundary.0.len());
    Ok(boundary)
}

fn load_from_shapefile(config: &AppConfig) -> Result<MultiPolygon<f64>> {
    let mut reader = Reader::from_path(&config.input.boundary_file)
        .with_context(|| format!("Failed to open Shapefile: {:?}", config.input.boundary_file))?;

    let mut polygons = Vec::new();

    for result in reader.iter_shapes_and_records() {
        let (shape, record) = result?;

        let name = match record.get(&config.input.district_column) {
            Some(shapefile::dbase::FieldValue::Character(Some(s))) => s.clone(),
            Some(shapefile::dbase::FieldValue::Character(None)) | None => continue,
            Some(_) => {
                return Err(anyhow!(
                    "District column '{}' must be a string",
                    config.input.district_column
                ));
            }
        };

        if !name.contains(&config.input.district_name) {
            continue;
        }

        let mp: MultiPolygon<f64> = match shape {
            shapefile::Shape::Polygon(p) => p
                .try_into()
                .map_err(|e| anyhow!("Failed to convert polygon: {:?}", e))?,
            shapefile::Shape::PolygonM(p) => p
                .try_into()
                .map_err(|e| anyhow!("Failed to convert polygonM: {:?}", e))?,
            shapefile::Shape::PolygonZ(p) => p
                .try_into()
                .map_err(|e| anyhow!("Failed to convert polygonZ: {:?}", e))?,
            _ => continue, // Skip non-polygon shapes
        };
        polygons.extend(mp.0);
    }

    Ok(MultiPolygon::new(polygons))
}

fn load_from_geojson(config: &AppConfig) -> Result<MultiPolygon<f64>> {
    let file = File::open(&config.input.boundary_file).with_context(|| {
        format!(
            "Failed to open GeoJSON boundary: {:?}",
            config.input.boundary_file
        )
    })?;
    let geojson = geojson::GeoJson::from_reader(BufReader::new(file))
        .context("Failed to parse boundary GeoJSON")?;
    boundary_from_geojson(geojson, &config.input.district_column, &config.input.district_name)
}

fn boundary_from_geojson(
    geojson: geojson::GeoJson,
    district_column: &str,
    district_name: &str,
) -> Result<MultiPolygon<f64>> {
    let collection = match geojson {
        geojson::GeoJson::FeatureCollection(fc) => fc,
        _ => return Err(anyhow!("Boundary GeoJSON must be a FeatureCollection")),
    };

    let mut polygons = Vec::new();

    for feature in collection.features {
        let name = feature
            .properties
            .as_ref()
            .and_then(|props| props.get(district_column))
            .and_then(|v| v.as_str());

        match name {
            Some(n) if n.contains(district_name) => {}
            _ => continue,
        }

        let Some(geometry) = feature.geometry else {
            continue;
        };
        let geo_geom: geo::Geometry<f64> = geometry
            .value
            .try_into()
            .map_err(|e| anyhow!("Failed to convert boundary geometry: {:?}", e))?;

        match geo_geom {
            geo::Geometry::Polygon(p) => polygons.push(p),
            geo::Geometry::MultiPolygon(mp) => polygons.extend(mp.0),
            _ => continue, // Skip points/lines
        }
    }

    Ok(MultiPolygon::new(polygons))
}

/// The renderer assumes lon/lat degrees. Files in a projected CRS must be
/// reprojected before use; this surfaces that early instead of drawing a
/// boundary in the middle of the ocean.
fn check_geographic_degrees(boundary: &MultiPolygon<f64>) -> Result<()> {
    let rect = boundary
        .bounding_rect()
        .ok_or_else(|| anyhow!("Boundary geometry is empty"))?;
    let lon_ok = rect.min().x >= -180.0 && rect.max().x <= 180.0;
    let lat_ok = rect.min().y >= -90.0 && rect.max().y <= 90.0;
    if lon_ok && lat_ok {
        Ok(())
    } else {
        Err(anyhow!(
            "Boundary coordinates fall outside lon/lat degrees; reproject the file to EPSG:4326"
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DISTRICTS: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": { "sggnm": "Saha-gu" },
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[128.9, 35.0], [129.0, 35.0], [129.0, 35.1], [128.9, 35.0]]]
                }
            },
            {
                "type": "Feature",
                "properties": { "sggnm": "Jung-gu" },
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[129.1, 35.2], [129.2, 35.2], [129.2, 35.3], [129.1, 35.2]]]
                }
            }
        ]
    }"#;

    #[test]
    fn keeps_only_the_matching_district() {
        let geojson: geojson::GeoJson = DISTRICTS.parse().unwrap();
        let boundary = boundary_from_geojson(geojson, "sggnm", "Saha").unwrap();
        assert_eq!(boundary.0.len(), 1);
        check_geographic_degrees(&boundary).unwrap();
    }

    #[test]
    fn no_match_yields_empty_multipolygon() {
        let geojson: geojson::GeoJson = DISTRICTS.parse().unwrap();
        let boundary = boundary_from_geojson(geojson, "sggnm", "Nowhere").unwrap();
        assert!(boundary.0.is_empty());
    }

    #[test]
    fn projected_coordinates_are_rejected() {
        let mp = MultiPolygon::new(vec![geo::Polygon::new(
            geo::LineString::from(vec![
                (512000.0, 178000.0),
                (513000.0, 178000.0),
                (513000.0, 179000.0),
            ]),
            vec![],
        )]);
        assert!(check_geographic_degrees(&mp).is_err());
    }
}
