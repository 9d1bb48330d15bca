use crate::config::ColumnRoles;
use crate::filter::{self, FilterSpec};
use crate::types::{Record, RecordSet};
use std::collections::BTreeSet;

/// Per-session mutable store: the current upload, the accumulated filters
/// and the rendering preferences. Explicitly passed into each handler; the
/// server keeps exactly one behind a lock, with the current interaction as
/// the single writer.
#[derive(Debug, Default)]
pub struct SessionContext {
    pub records: Option<RecordSet>,
    pub filters: FilterSpec,
    pub clustering: bool,
    pub popup_fields: Vec<String>,
}

impl SessionContext {
    pub fn new(roles: &ColumnRoles) -> Self {
        SessionContext {
            records: None,
            filters: FilterSpec::default(),
            clustering: true,
            popup_fields: vec![roles.facility_name.clone(), roles.address.clone()],
        }
    }

    /// A new upload replaces the prior collection. Filters on columns absent
    /// from the new schema are pruned; the year range resets to the new
    /// data's full span. Popup fields are likewise trimmed to the schema.
    pub fn replace_records(&mut self, set: RecordSet) {
        self.filters
            .categorical
            .retain(|column, _| set.has_column(column));
        self.filters.year_range = filter::year_bounds(&set);
        self.popup_fields.retain(|f| set.has_column(f));
        self.records = Some(set);
    }

    pub fn add_filter_column(&mut self, column: &str) {
        if let Some(set) = &self.records {
            self.filters.add_column(set, column);
        }
    }

    pub fn set_filter_values(&mut self, column: &str, values: BTreeSet<String>) {
        self.filters.set_values(column, values);
    }

    pub fn set_year_range(&mut self, min: i32, max: i32) {
        self.filters.year_range = Some((min, max));
    }

    /// The current filtered subset; empty when nothing is uploaded.
    pub fn filtered(&self) -> Vec<Record> {
        match &self.records {
            Some(set) => self.filters.apply(set),
            None => Vec::new(),
        }
    }
}
