use std::io::Write;

use super::snapshot::Snapshot;
use super::variation::VariedRecord;

/// Interchange layout for exported records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// A single JSON array of record objects.
    JsonArray,
    /// One record object per line.
    JsonLines,
}

impl ExportFormat {
    /// `.jsonl` / `.ndjson` select JSON Lines, anything else a JSON array.
    pub fn from_path(path: &str) -> Self {
        if path.ends_with(".jsonl") || path.ends_with(".ndjson") {
            ExportFormat::JsonLines
        } else {
            ExportFormat::JsonArray
        }
    }
}

/// Records of one snapshot as a JSON array.
pub fn records_json(snapshot: &Snapshot) -> serde_json::Result<String> {
    serde_json::to_string(&snapshot.records)
}

/// Records of several snapshots, concatenated in the given order.
pub fn write_records<'a, W, I>(writer: &mut W, snapshots: I, format: ExportFormat) -> serde_json::Result<usize>
where
    W: Write,
    I: IntoIterator<Item = &'a Snapshot>,
{
    let records: Vec<&VariedRecord> = snapshots.into_iter().flat_map(|s| s.records.iter()).collect();

    match format {
        ExportFormat::JsonArray => serde_json::to_writer(&mut *writer, &records)?,
        ExportFormat::JsonLines => {
            for record in &records {
                serde_json::to_writer(&mut *writer, record)?;
                writer.write_all(b"\n").map_err(serde_json::Error::io)?;
            }
        }
    }
    Ok(records.len())
}
