use crate::config::ColumnRoles;
use crate::types::{FieldValue, Record, RecordSet};
use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use csv::ReaderBuilder;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

pub fn load_records_from_path(path: &Path, roles: &ColumnRoles) -> Result<RecordSet> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open data file: {:?}", path))?;
    load_records(file, roles)
}

/// Parse an uploaded CSV table into a RecordSet.
///
/// Cells are typed by column role: coordinate columns parse as numbers, the
/// date column as a calendar date, everything else stays text. Parse
/// failures become Missing sentinels rather than errors. When the date
/// column is present, rows with an empty date cell are dropped entirely.
pub fn load_records<R: Read>(reader: R, roles: &ColumnRoles) -> Result<RecordSet> {
    let mut rdr = ReaderBuilder::new().from_reader(reader);
    let headers = rdr.headers().context("Failed to read CSV header row")?.clone();

    if headers.is_empty() {
        return Err(anyhow!("Uploaded table has no header row"));
    }

    let columns: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    let date_idx = columns.iter().position(|c| *c == roles.date);
    let date_column = date_idx.map(|i| columns[i].clone());

    let mut records = Vec::new();

    for result in rdr.records() {
        let row = result.context("Malformed CSV row in upload")?;

        // Null-date rows are dropped before parsing; coordinate-less rows
        // are kept and only skipped at render time.
        if let Some(idx) = date_idx {
            if row.get(idx).map_or(true, |v| v.trim().is_empty()) {
                continue;
            }
        }

        let mut values = HashMap::new();
        for (i, column) in columns.iter().enumerate() {
            let raw = row.get(i).unwrap_or("").trim();
            values.insert(column.clone(), type_cell(column, raw, roles));
        }
        records.push(Record { values });
    }

    Ok(RecordSet {
        columns,
        records,
        date_column,
    })
}

fn type_cell(column: &str, raw: &str, roles: &ColumnRoles) -> FieldValue {
    if raw.is_empty() {
        return FieldValue::Missing;
    }
    if column == roles.latitude || column == roles.longitude {
        return match raw.parse::<f64>() {
            Ok(n) if n.is_finite() => FieldValue::Number(n),
            _ => FieldValue::Missing,
        };
    }
    if column == roles.date {
        return match parse_date(raw) {
            Some(d) => FieldValue::Date(d),
            None => FieldValue::Missing,
        };
    }
    FieldValue::Text(raw.to_string())
}

/// Lenient date parsing over the formats seen in municipal exports.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    const FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d", "%d/%m/%Y"];
    for fmt in FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(raw, fmt) {
            return Some(d);
        }
    }
    // Timestamps like "2021-03-04 00:00:00" keep their date part.
    if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.date());
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roles() -> ColumnRoles {
        ColumnRoles {
            latitude: "latitude".to_string(),
            longitude: "longitude".to_string(),
            facility_name: "facility_name".to_string(),
            address: "address".to_string(),
            date: "date".to_string(),
        }
    }

    #[test]
    fn drops_null_date_rows_and_keeps_unparsable_as_missing() {
        let csv_src = "\
facility_name,latitude,longitude,date
Center A,35.1,128.9,2020-05-01
Center B,35.2,128.8,
Center C,35.3,128.7,not-a-date
";
        let set = load_records(csv_src.as_bytes(), &roles()).unwrap();
        assert_eq!(set.records.len(), 2); // Center B dropped
        assert_eq!(
            set.records[0].get("date").as_date(),
            NaiveDate::from_ymd_opt(2020, 5, 1)
        );
        assert!(set.records[1].get("date").is_missing());
    }

    #[test]
    fn keeps_rows_without_coordinates() {
        let csv_src = "\
facility_name,latitude,longitude
Center A,35.1,128.9
Center B,,
Center C,bogus,128.7
";
        let set = load_records(csv_src.as_bytes(), &roles()).unwrap();
        assert_eq!(set.records.len(), 3);
        assert!(set.records[1].get("latitude").is_missing());
        assert!(set.records[2].get("latitude").is_missing());
        assert_eq!(set.records[2].get("longitude").as_number(), Some(128.7));
        assert!(set.date_column.is_none());
    }

    #[test]
    fn malformed_csv_is_an_error() {
        // Unclosed quote makes the reader fail mid-stream.
        let csv_src = "a,b\n\"broken,1\n2,3\n";
        assert!(load_records(csv_src.as_bytes(), &roles()).is_err());
    }

    #[test]
    fn date_round_trips_through_display_form() {
        let d = parse_date("2021-12-31").unwrap();
        let formatted = FieldValue::Date(d).display();
        assert_eq!(formatted, "2021-12-31");
        assert_eq!(parse_date(&formatted), Some(d));
    }

    #[test]
    fn parses_timestamp_date_part() {
        assert_eq!(
            parse_date("2021-03-04 00:00:00"),
            NaiveDate::from_ymd_opt(2021, 3, 4)
        );
    }
}
