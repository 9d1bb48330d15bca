use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;

/// A single typed cell value. Columns carry a small closed set of semantic
/// roles (coordinate, date, label, free text), so every cell lands in one of
/// these variants at load time instead of being re-interpreted per use.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Number(f64),
    Date(NaiveDate),
    Missing,
}

impl FieldValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            FieldValue::Date(d) => Some(*d),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, FieldValue::Missing)
    }

    /// Natural string form: dates as YYYY-MM-DD, integral numbers without a
    /// trailing ".0", missing as the empty string.
    pub fn display(&self) -> String {
        match self {
            FieldValue::Text(s) => s.clone(),
            FieldValue::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    format!("{n}")
                }
            }
            FieldValue::Date(d) => d.format("%Y-%m-%d").to_string(),
            FieldValue::Missing => String::new(),
        }
    }
}

/// One parsed row of the uploaded table.
#[derive(Debug, Clone)]
pub struct Record {
    pub values: HashMap<String, FieldValue>,
}

impl Record {
    pub fn get(&self, column: &str) -> &FieldValue {
        self.values.get(column).unwrap_or(&FieldValue::Missing)
    }
}

/// The uploaded collection. Column order is preserved for the companion
/// table; `date_column` is set when the configured date column was present
/// in the header.
#[derive(Debug, Clone)]
pub struct RecordSet {
    pub columns: Vec<String>,
    pub records: Vec<Record>,
    pub date_column: Option<String>,
}

impl RecordSet {
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }
}

/// One map marker derived from a coordinate-valid record.
#[derive(Debug, Clone, Serialize)]
pub struct Marker {
    pub lat: f64,
    pub lon: f64,
    /// Permanent tooltip text (the facility name).
    pub label: String,
    /// Popup body, one (field, value) line per chosen popup field.
    pub popup_lines: Vec<(String, String)>,
}
