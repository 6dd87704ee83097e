use tracing::debug;

use super::filter::FilteredSet;
use super::types::Record;

/// Output of a reshape pass. `skipped` counts dropped (row, year) cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reshaped {
    pub records: Vec<Record>,
    pub skipped: usize,
}

/// Parse a column label as a four-digit year.
pub fn parse_year_label(label: &str) -> Option<i32> {
    let label = label.trim();
    if label.len() != 4 || !label.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    label.parse().ok()
}

fn parse_value(cell: &str) -> Option<f64> {
    let cell = cell.trim();
    if cell.is_empty() {
        return None;
    }
    cell.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Melt wide rows into long-form records.
///
/// Order is (row order, year column order). Cells with an unparseable year
/// label or a missing / non-numeric / non-finite value are skipped.
pub fn reshape(set: &FilteredSet<'_>, year_columns: &[String]) -> Reshaped {
    let years: Vec<Option<i32>> = year_columns.iter().map(|l| parse_year_label(l)).collect();

    let mut out = Reshaped::default();
    for row in set.rows() {
        for (idx, year) in years.iter().enumerate() {
            let value = row.cells.get(idx).and_then(|c| parse_value(c));
            match (year, value) {
                (Some(year), Some(value)) => out.records.push(Record {
                    entity: row.entity.clone(),
                    metric: row.metric.clone(),
                    metric_code: row.metric_code.clone(),
                    year: *year,
                    value,
                }),
                _ => out.skipped += 1,
            }
        }
    }

    debug!(
        "Reshaped {} rows into {} records ({} cells skipped)",
        set.len(),
        out.records.len(),
        out.skipped
    );
    out
}
