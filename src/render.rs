use crate::config::{ColumnRoles, MapConfig};
use crate::types::{Marker, Record};
use anyhow::{Context, Result};
use geo::MultiPolygon;
use serde::Serialize;

/// Build one marker per coordinate-valid record. Records with a missing or
/// non-numeric latitude/longitude contribute no marker (they still appear in
/// the companion table).
pub fn build_markers(
    records: &[Record],
    roles: &ColumnRoles,
    popup_fields: &[String],
) -> Vec<Marker> {
    records
        .iter()
        .filter_map(|record| {
            let lat = record.get(&roles.latitude).as_number()?;
            let lon = record.get(&roles.longitude).as_number()?;
            let popup_lines = popup_fields
                .iter()
                .map(|field| (field.clone(), record.get(field).display()))
                .collect();
            Some(Marker {
                lat,
                lon,
                label: record.get(&roles.facility_name).display(),
                popup_lines,
            })
        })
        .collect()
}

/// Arithmetic mean of the marker coordinates. None when no record carried a
/// usable coordinate pair; the page then falls back to the boundary extent.
pub fn map_center(markers: &[Marker]) -> Option<(f64, f64)> {
    if markers.is_empty() {
        return None;
    }
    let n = markers.len() as f64;
    let lat = markers.iter().map(|m| m.lat).sum::<f64>() / n;
    let lon = markers.iter().map(|m| m.lon).sum::<f64>() / n;
    Some((lat, lon))
}

/// The companion table of the full filtered subset, dates already in their
/// YYYY-MM-DD display form.
#[derive(Debug, Clone, Serialize)]
pub struct TableView {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

pub fn table_view(columns: &[String], records: &[Record]) -> TableView {
    let rows = records
        .iter()
        .map(|record| columns.iter().map(|c| record.get(c).display()).collect())
        .collect();
    TableView {
        columns: columns.to_vec(),
        rows,
    }
}

pub fn boundary_geojson(boundary: &MultiPolygon<f64>) -> Result<String> {
    let geometry = geojson::Geometry::new(geojson::Value::from(boundary));
    serde_json::to_string(&geometry).context("Failed to serialize boundary GeoJSON")
}

/// Render the filtered subset as a self-contained Leaflet page: boundary
/// overlay, one marker per valid record, optional marker clustering.
pub fn render_map(
    boundary_geojson: &str,
    markers: &[Marker],
    clustering: bool,
    map: &MapConfig,
) -> Result<String> {
    let markers_json =
        serde_json::to_string(markers).context("Failed to serialize markers")?;
    let center_json = match map_center(markers) {
        Some((lat, lon)) => format!("[{lat}, {lon}]"),
        None => "null".to_string(),
    };

    let html = MAP_TEMPLATE
        .replace("__WIDTH__", &map.width.to_string())
        .replace("__HEIGHT__", &map.height.to_string())
        .replace("__ZOOM__", &map.zoom_start.to_string())
        .replace("__BOUNDARY_COLOR__", &map.boundary_color)
        .replace("__BOUNDARY_WEIGHT__", &map.boundary_weight.to_string())
        .replace("__BOUNDARY__", boundary_geojson)
        .replace("__CENTER__", &center_json)
        .replace("__CLUSTERING__", if clustering { "true" } else { "false" })
        .replace("__MARKERS__", &markers_json);

    Ok(html)
}

const MAP_TEMPLATE: &str = r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <title>Senior centers map</title>
  <link rel="stylesheet" href="https://cdnjs.cloudflare.com/ajax/libs/leaflet/1.9.4/leaflet.css"
    crossorigin="anonymous" referrerpolicy="no-referrer" />
  <script src="https://cdnjs.cloudflare.com/ajax/libs/leaflet/1.9.4/leaflet.js"
    crossorigin="anonymous" referrerpolicy="no-referrer"></script>
  <link rel="stylesheet" href="https://unpkg.com/leaflet.markercluster@1.4.1/dist/MarkerCluster.css" />
  <link rel="stylesheet" href="https://unpkg.com/leaflet.markercluster@1.4.1/dist/MarkerCluster.Default.css" />
  <script src="https://unpkg.com/leaflet.markercluster@1.4.1/dist/leaflet.markercluster.js"></script>
  <style>
    body { margin: 0; }
    #map { width: __WIDTH__px; height: __HEIGHT__px; }
    .facility-label b { white-space: nowrap; }
    .popup-line { color: blue; font-size: 12px; margin: 2px 0; }
  </style>
</head>
<body>
  <div id="map"></div>
  <script>
    const boundary = __BOUNDARY__;
    const center = __CENTER__;
    const useClustering = __CLUSTERING__;
    const markers = __MARKERS__;

    const map = L.map('map');
    L.tileLayer('https://{s}.basemaps.cartocdn.com/light_all/{z}/{x}/{y}{r}.png', {
      attribution: '&copy; <a href="https://www.openstreetmap.org/copyright">OpenStreetMap</a> contributors &amp; <a href="https://carto.com/attributions">CARTO</a>'
    }).addTo(map);

    const boundaryLayer = L.geoJSON(boundary, {
      style: { color: '__BOUNDARY_COLOR__', weight: __BOUNDARY_WEIGHT__, fill: false }
    }).addTo(map);

    if (center) {
      map.setView(center, __ZOOM__);
    } else {
      map.fitBounds(boundaryLayer.getBounds());
    }

    function esc(text) {
      const div = document.createElement('div');
      div.textContent = String(text);
      return div.innerHTML;
    }

    const group = useClustering ? L.markerClusterGroup() : map;
    for (const m of markers) {
      let popup = "<div style='width: 250px;'>";
      for (const [field, value] of m.popup_lines) {
        popup += "<p class='popup-line'>" + esc(field) + ": " + esc(value) + "</p>";
      }
      popup += "</div>";
      L.marker([m.lat, m.lon])
        .bindTooltip("<b class='facility-label'>" + esc(m.label) + "</b>", { permanent: true })
        .bindPopup(popup, { maxWidth: 400 })
        .addTo(group);
    }
    if (useClustering) {
      map.addLayer(group);
    }
  </script>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FieldValue;
    use std::collections::HashMap;

    fn roles() -> ColumnRoles {
        ColumnRoles {
            latitude: "latitude".to_string(),
            longitude: "longitude".to_string(),
            facility_name: "facility_name".to_string(),
            address: "address".to_string(),
            date: "date".to_string(),
        }
    }

    fn map_config() -> MapConfig {
        MapConfig {
            width: 1200,
            height: 800,
            boundary_color: "#FF6347".to_string(),
            boundary_weight: 2.5,
            zoom_start: 12,
        }
    }

    fn record(pairs: &[(&str, FieldValue)]) -> Record {
        let values: HashMap<String, FieldValue> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();
        Record { values }
    }

    fn sample_records() -> Vec<Record> {
        vec![
            record(&[
                ("facility_name", FieldValue::Text("A".into())),
                ("latitude", FieldValue::Number(35.0)),
                ("longitude", FieldValue::Number(129.0)),
            ]),
            record(&[
                ("facility_name", FieldValue::Text("B".into())),
                ("latitude", FieldValue::Number(36.0)),
                ("longitude", FieldValue::Number(128.0)),
            ]),
            record(&[
                ("facility_name", FieldValue::Text("C".into())),
                ("latitude", FieldValue::Missing),
                ("longitude", FieldValue::Number(128.5)),
            ]),
        ]
    }

    #[test]
    fn coordinate_less_records_get_no_marker_but_stay_in_table() {
        let records = sample_records();
        let markers = build_markers(&records, &roles(), &["facility_name".into()]);
        assert_eq!(markers.len(), 2);

        let columns = vec!["facility_name".to_string(), "latitude".to_string()];
        let table = table_view(&columns, &records);
        assert_eq!(table.rows.len(), 3);
        assert_eq!(table.rows[2], vec!["C".to_string(), String::new()]);
    }

    #[test]
    fn center_is_the_coordinate_mean() {
        let markers = build_markers(&sample_records(), &roles(), &[]);
        assert_eq!(map_center(&markers), Some((35.5, 128.5)));
        assert_eq!(map_center(&[]), None);
    }

    #[test]
    fn popup_dates_use_display_form() {
        let records = vec![record(&[
            ("facility_name", FieldValue::Text("A".into())),
            ("latitude", FieldValue::Number(35.0)),
            ("longitude", FieldValue::Number(129.0)),
            (
                "date",
                FieldValue::Date(chrono::NaiveDate::from_ymd_opt(2021, 7, 9).unwrap()),
            ),
        ])];
        let markers = build_markers(&records, &roles(), &["date".into()]);
        assert_eq!(
            markers[0].popup_lines,
            vec![("date".to_string(), "2021-07-09".to_string())]
        );
    }

    #[test]
    fn clustering_changes_grouping_only() {
        let markers = build_markers(&sample_records(), &roles(), &[]);
        let boundary = r#"{"type":"MultiPolygon","coordinates":[]}"#;

        let clustered = render_map(boundary, &markers, true, &map_config()).unwrap();
        let plain = render_map(boundary, &markers, false, &map_config()).unwrap();

        let markers_json = serde_json::to_string(&markers).unwrap();
        assert!(clustered.contains(&markers_json));
        assert!(plain.contains(&markers_json));
        assert!(clustered.contains("const useClustering = true"));
        assert!(plain.contains("const useClustering = false"));
    }

    #[test]
    fn page_carries_fixed_dimensions_and_boundary_style() {
        let html = render_map("{}", &[], true, &map_config()).unwrap();
        assert!(html.contains("width: 1200px; height: 800px"));
        assert!(html.contains("color: '#FF6347', weight: 2.5"));
    }
}
