use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::ser::{Serialize, SerializeMap, Serializer};

use super::error::Result;
use super::model::Table;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

// ---------------------------------------------------------------------------
// Report types
// ---------------------------------------------------------------------------

/// Memory use of one column.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ColumnMemory {
    pub memory_mb: f64,
    pub percent_of_total: f64,
    /// Dtype label, e.g. `int8` or `category`.
    pub dtype: String,
}

/// Per-column memory use of a table, in column order.
///
/// Serializes as one JSON object keyed by column name; the total is not part
/// of the serialized form.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryReport {
    pub total_mb: f64,
    pub columns: Vec<(String, ColumnMemory)>,
}

impl MemoryReport {
    pub fn get(&self, column: &str) -> Option<&ColumnMemory> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, mem)| mem)
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl Serialize for MemoryReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (name, mem) in &self.columns {
            map.serialize_entry(name, mem)?;
        }
        map.end()
    }
}

// ---------------------------------------------------------------------------
// Analysis
// ---------------------------------------------------------------------------

/// Measure the deep memory use of every column of `table`.
pub fn analyze(table: &Table) -> MemoryReport {
    let sizes: Vec<(&str, usize, String)> = table
        .iter()
        .map(|(name, col)| (name, col.deep_size(), col.dtype().to_string()))
        .collect();
    let total_bytes: usize = sizes.iter().map(|(_, bytes, _)| bytes).sum();

    let columns = sizes
        .into_iter()
        .map(|(name, bytes, dtype)| {
            let percent_of_total = if total_bytes == 0 {
                0.0
            } else {
                bytes as f64 / total_bytes as f64 * 100.0
            };
            let mem = ColumnMemory {
                memory_mb: bytes as f64 / BYTES_PER_MB,
                percent_of_total,
                dtype,
            };
            (name.to_string(), mem)
        })
        .collect();

    MemoryReport {
        total_mb: total_bytes as f64 / BYTES_PER_MB,
        columns,
    }
}

// ---------------------------------------------------------------------------
// Persistence
// ---------------------------------------------------------------------------

/// Write `report` as pretty JSON (four-space indent), replacing `path`.
pub fn save_report(report: &MemoryReport, path: &Path) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut writer, formatter);
    report.serialize(&mut ser)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}
