use crate::types::{Record, RecordSet};
use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// The accumulated set of active column filters. Only columns explicitly
/// added participate; each categorical restriction and the year range is a
/// pure AND-combined predicate, so evaluation order never matters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterSpec {
    /// Inclusive (min, max) year range over the date column.
    pub year_range: Option<(i32, i32)>,
    /// Column name -> accepted value set (natural string forms).
    pub categorical: BTreeMap<String, BTreeSet<String>>,
}

impl FilterSpec {
    /// Add a categorical column, defaulting to all observed distinct values.
    /// Re-adding an existing column leaves its current selection alone.
    pub fn add_column(&mut self, set: &RecordSet, column: &str) {
        self.categorical
            .entry(column.to_string())
            .or_insert_with(|| distinct_values(set, column));
    }

    pub fn set_values(&mut self, column: &str, values: BTreeSet<String>) {
        self.categorical.insert(column.to_string(), values);
    }

    /// Apply every active restriction to the record set.
    pub fn apply(&self, set: &RecordSet) -> Vec<Record> {
        set.records
            .iter()
            .filter(|r| self.matches(set, r))
            .cloned()
            .collect()
    }

    fn matches(&self, set: &RecordSet, record: &Record) -> bool {
        if let (Some(date_col), Some((min, max))) = (&set.date_column, self.year_range) {
            // Missing dates fail the range test rather than erroring.
            match record.get(date_col).as_date() {
                Some(d) => {
                    let year = d.year();
                    if year < min || year > max {
                        return false;
                    }
                }
                None => return false,
            }
        }

        for (column, accepted) in &self.categorical {
            let value = record.get(column);
            if value.is_missing() || !accepted.contains(&value.display()) {
                return false;
            }
        }

        true
    }
}

/// Observed non-missing distinct values of a column, in natural string form.
pub fn distinct_values(set: &RecordSet, column: &str) -> BTreeSet<String> {
    set.records
        .iter()
        .map(|r| r.get(column))
        .filter(|v| !v.is_missing())
        .map(|v| v.display())
        .collect()
}

/// Min-max year span of the date column, used as the default slider range.
/// None when there is no date column or no parsable date.
pub fn year_bounds(set: &RecordSet) -> Option<(i32, i32)> {
    let date_col = set.date_column.as_ref()?;
    let years: Vec<i32> = set
        .records
        .iter()
        .filter_map(|r| r.get(date_col).as_date())
        .map(|d| d.year())
        .collect();
    let min = *years.iter().min()?;
    let max = *years.iter().max()?;
    Some((min, max))
}
