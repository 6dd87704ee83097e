// esg-common/src/data/loader.rs
// Wide ESG table loader: header cleanup, identity columns, year columns

use csv::StringRecord;
use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

use super::reshape::parse_year_label;
use super::types::{LoadError, LoadResult, RawRow};

// =================================================================
// Column Layout
// =================================================================

/// Names of the identity columns and where the year run starts.
///
/// `year_offset` counts retained columns, i.e. after malformed index
/// columns have been dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnLayout {
    pub entity: String,
    pub entity_code: String,
    pub metric: String,
    pub metric_code: String,
    pub year_offset: usize,
}

impl Default for ColumnLayout {
    fn default() -> Self {
        Self {
            entity: "Country Name".to_string(),
            entity_code: "Country Code".to_string(),
            metric: "Indicator Name".to_string(),
            metric_code: "Indicator Code".to_string(),
            year_offset: 4,
        }
    }
}

/// Auto-generated index columns ("Unnamed: 0") and blank headers.
pub fn is_malformed_label(label: &str) -> bool {
    let label = label.trim();
    label.is_empty() || label.starts_with("Unnamed")
}

// =================================================================
// Dataset
// =================================================================

/// The loaded table. Read-only after `load`.
#[derive(Debug, Clone)]
pub struct Dataset {
    rows: Vec<RawRow>,
    year_columns: Vec<String>,
    source: String,
}

impl Dataset {
    pub fn load<P: AsRef<Path>>(path: P) -> LoadResult<Self> {
        Self::load_with_layout(path, &ColumnLayout::default())
    }

    pub fn load_with_layout<P: AsRef<Path>>(path: P, layout: &ColumnLayout) -> LoadResult<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(file, layout, &path.display().to_string())
    }

    pub fn from_reader<R: Read>(reader: R, layout: &ColumnLayout, source: &str) -> LoadResult<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').to_string())
            .collect();

        // Positions (in the raw file) of the columns we keep
        let retained: Vec<usize> = headers
            .iter()
            .enumerate()
            .filter(|(_, label)| !is_malformed_label(label))
            .map(|(idx, _)| idx)
            .collect();

        let dropped = headers.len() - retained.len();
        if dropped > 0 {
            debug!("Dropped {} malformed column(s) from '{}'", dropped, source);
        }

        let find = |name: &str| -> LoadResult<usize> {
            retained
                .iter()
                .copied()
                .find(|&idx| headers[idx] == name)
                .ok_or_else(|| LoadError::MissingColumn(name.to_string()))
        };

        let entity_idx = find(&layout.entity)?;
        let entity_code_idx = find(&layout.entity_code)?;
        let metric_idx = find(&layout.metric)?;
        let metric_code_idx = find(&layout.metric_code)?;

        let year_positions: Vec<usize> = retained.iter().copied().skip(layout.year_offset).collect();
        let year_columns: Vec<String> = year_positions.iter().map(|&idx| headers[idx].clone()).collect();

        if !year_columns.iter().any(|label| parse_year_label(label).is_some()) {
            return Err(LoadError::NoYearColumns(source.to_string()));
        }

        let cell = |record: &StringRecord, idx: usize| record.get(idx).unwrap_or("").to_string();

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result?;
            rows.push(RawRow {
                entity: cell(&record, entity_idx),
                entity_code: cell(&record, entity_code_idx),
                metric: cell(&record, metric_idx),
                metric_code: cell(&record, metric_code_idx),
                cells: year_positions.iter().map(|&idx| cell(&record, idx)).collect(),
            });
        }

        info!(
            "Loaded dataset '{}': {} rows, {} year columns",
            source,
            rows.len(),
            year_columns.len()
        );

        Ok(Self {
            rows,
            year_columns,
            source: source.to_string(),
        })
    }

    pub fn rows(&self) -> &[RawRow] {
        &self.rows
    }

    pub fn year_columns(&self) -> &[String] {
        &self.year_columns
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Distinct entity names in first-seen order.
    pub fn entities(&self) -> Vec<&str> {
        distinct(self.rows.iter().map(|r| r.entity.as_str()))
    }

    /// Distinct metric names in first-seen order.
    pub fn metrics(&self) -> Vec<&str> {
        distinct(self.rows.iter().map(|r| r.metric.as_str()))
    }

    pub fn metrics_for(&self, entity: &str) -> Vec<&str> {
        distinct(
            self.rows
                .iter()
                .filter(|r| r.matches_entity(entity))
                .map(|r| r.metric.as_str()),
        )
    }
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    let mut seen = HashSet::new();
    values.filter(|v| !v.is_empty() && seen.insert(*v)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = "\
Unnamed: 0,Country Name,Country Code,Indicator Name,Indicator Code,1960,1961,2022
0,Chile,CHL,CO2 emissions (metric tons per capita),EN.ATM.CO2E.PC,1.1,,4.5
1,Chile,CHL,GDP growth (annual %),NY.GDP.MKTP.KD.ZG,3.2,4.8,2.4
2,Peru,PER,CO2 emissions (metric tons per capita),EN.ATM.CO2E.PC,0.7,0.8,1.9
";

    fn sample() -> Dataset {
        Dataset::from_reader(SAMPLE.as_bytes(), &ColumnLayout::default(), "sample").unwrap()
    }

    #[test]
    fn test_unnamed_columns_are_dropped() {
        let ds = sample();
        assert_eq!(ds.year_columns(), &["1960", "1961", "2022"]);
        assert_eq!(ds.rows().len(), 3);
        assert_eq!(ds.rows()[0].entity, "Chile");
        assert_eq!(ds.rows()[0].cells, vec!["1.1", "", "4.5"]);
    }

    #[test]
    fn test_distinct_values_keep_first_seen_order() {
        let ds = sample();
        assert_eq!(ds.entities(), vec!["Chile", "Peru"]);
        assert_eq!(
            ds.metrics(),
            vec!["CO2 emissions (metric tons per capita)", "GDP growth (annual %)"]
        );
        assert_eq!(ds.metrics_for("PER"), vec!["CO2 emissions (metric tons per capita)"]);
    }

    #[test]
    fn test_missing_identity_column() {
        let csv = "Country Name,Indicator Name,Indicator Code,1960\nChile,x,y,1\n";
        let err = Dataset::from_reader(csv.as_bytes(), &ColumnLayout::default(), "t").unwrap_err();
        assert!(matches!(err, LoadError::MissingColumn(ref c) if c == "Country Code"));
    }

    #[test]
    fn test_no_year_columns() {
        let csv = "Country Name,Country Code,Indicator Name,Indicator Code,Notes\nChile,CHL,x,y,z\n";
        let err = Dataset::from_reader(csv.as_bytes(), &ColumnLayout::default(), "t").unwrap_err();
        assert!(matches!(err, LoadError::NoYearColumns(_)));
    }

    #[test]
    fn test_unreadable_file() {
        let err = Dataset::load("does/not/exist.csv").unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }

    #[test]
    fn test_load_from_file_with_bom() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "\u{feff}Country Name,Country Code,Indicator Name,Indicator Code,2021,2022\nWakanda,WAK,m,M1,1,2\n"
        )
        .unwrap();
        let ds = Dataset::load(file.path()).unwrap();
        assert_eq!(ds.entities(), vec!["Wakanda"]);
        assert_eq!(ds.year_columns(), &["2021", "2022"]);
    }

    #[test]
    fn test_short_rows_are_padded() {
        let csv = "Country Name,Country Code,Indicator Name,Indicator Code,2020,2021\nChile,CHL,m,M1,5\n";
        let ds = Dataset::from_reader(csv.as_bytes(), &ColumnLayout::default(), "t").unwrap();
        assert_eq!(ds.rows()[0].cells, vec!["5", ""]);
    }
}
