use std::path::Path;

use super::error::Result;
use super::model::Table;

/// Write `table` as CSV with a header row and no index column, replacing
/// `path`. Missing values become empty fields.
pub fn write_csv(table: &Table, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(table.column_names())?;

    let columns: Vec<_> = table.iter().map(|(_, col)| col).collect();
    let mut row = Vec::with_capacity(columns.len());
    for idx in 0..table.n_rows() {
        row.clear();
        row.extend(
            columns
                .iter()
                .map(|col| col.cell(idx).map(|c| c.to_string()).unwrap_or_default()),
        );
        writer.write_record(&row)?;
    }
    writer.flush()?;
    Ok(())
}
