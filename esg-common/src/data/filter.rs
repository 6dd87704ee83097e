use super::loader::Dataset;
use super::types::{RawRow, Selection};

/// Rows of the table matching one selection, in source order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilteredSet<'a> {
    rows: Vec<&'a RawRow>,
}

impl<'a> FilteredSet<'a> {
    pub fn rows(&self) -> &[&'a RawRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Narrow the table to one entity and, when given, one metric.
///
/// Keys match either the display name or the code column. No match is an
/// empty set, never an error.
pub fn filter<'a>(dataset: &'a Dataset, entity: &str, metric: Option<&str>) -> FilteredSet<'a> {
    let rows = dataset
        .rows()
        .iter()
        .filter(|row| row.matches_entity(entity))
        .filter(|row| metric.map_or(true, |m| row.matches_metric(m)))
        .collect();
    FilteredSet { rows }
}

pub fn filter_selection<'a>(dataset: &'a Dataset, selection: &Selection) -> FilteredSet<'a> {
    filter(dataset, &selection.entity, selection.metric.as_deref())
}
