use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use csv::StringRecord;

use super::error::{FrameError, Result};
use super::model::{Column, FloatData, IntData, Table};

/// Default number of rows per batch for [`load_columns_chunked`].
pub const DEFAULT_CHUNK_SIZE: usize = 10_000;

/// Tokens read as a missing value.
const NA_TOKENS: &[&str] = &[
    "", "NA", "N/A", "n/a", "NaN", "nan", "-NaN", "-nan", "NULL", "null", "None", "<NA>",
    "#N/A", "#N/A N/A", "#NA", "1.#IND", "-1.#IND", "1.#QNAN", "-1.#QNAN",
];

const BOOL_TOKENS: &[(&str, bool)] = &[
    ("True", true),
    ("true", true),
    ("TRUE", true),
    ("False", false),
    ("false", false),
    ("FALSE", false),
];

// ---------------------------------------------------------------------------
// Full load
// ---------------------------------------------------------------------------

/// Load every column of a CSV file with a header row.
pub fn load_csv(path: &Path) -> Result<Table> {
    let mut reader = open_reader(path)?;
    let headers = unique_headers(reader.headers()?);
    let width = headers.len();
    let selection: Vec<(String, usize)> = headers
        .into_iter()
        .enumerate()
        .map(|(idx, name)| (name, idx))
        .collect();

    let mut raw: Vec<Vec<String>> = vec![Vec::new(); selection.len()];
    let mut record = StringRecord::new();
    let mut row = 0;
    while reader.read_record(&mut record)? {
        push_record(&record, width, row, &selection, &mut raw)?;
        row += 1;
    }

    build_table(&selection, raw)
}

// ---------------------------------------------------------------------------
// Chunked subset load
// ---------------------------------------------------------------------------

/// Reads a CSV file in batches of at most `chunk_size` rows, keeping only
/// the requested columns. Each item is one typed batch.
pub struct ChunkedCsvReader {
    reader: csv::Reader<File>,
    width: usize,
    selection: Vec<(String, usize)>,
    chunk_size: usize,
    rows_read: usize,
    done: bool,
}

impl ChunkedCsvReader {
    /// Open `path` and resolve `columns` against its header. Duplicate
    /// requests collapse to one column.
    pub fn open(path: &Path, columns: &[String], chunk_size: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(FrameError::ZeroChunkSize);
        }
        let mut reader = open_reader(path)?;
        let headers = unique_headers(reader.headers()?);

        let mut selection: Vec<(String, usize)> = Vec::with_capacity(columns.len());
        for name in columns {
            if selection.iter().any(|(n, _)| n == name) {
                continue;
            }
            let idx = headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| FrameError::ColumnNotFound(name.clone()))?;
            selection.push((name.clone(), idx));
        }

        Ok(ChunkedCsvReader {
            reader,
            width: headers.len(),
            selection,
            chunk_size,
            rows_read: 0,
            done: false,
        })
    }

    /// Column names in output order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.selection.iter().map(|(name, _)| name.as_str())
    }

    fn read_chunk(&mut self) -> Result<Option<Table>> {
        let mut raw: Vec<Vec<String>> = vec![Vec::new(); self.selection.len()];
        let mut record = StringRecord::new();
        let mut n = 0;
        while n < self.chunk_size {
            if !self.reader.read_record(&mut record)? {
                self.done = true;
                break;
            }
            push_record(&record, self.width, self.rows_read, &self.selection, &mut raw)?;
            self.rows_read += 1;
            n += 1;
        }
        if n == 0 {
            return Ok(None);
        }
        log::debug!("read chunk of {n} rows ({} total)", self.rows_read);
        build_table(&self.selection, raw).map(Some)
    }
}

impl Iterator for ChunkedCsvReader {
    type Item = Result<Table>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.read_chunk() {
            Ok(chunk) => chunk.map(Ok),
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// Load `columns` from `path` in batches of `chunk_size` rows and
/// concatenate the batches in file order.
pub fn load_columns_chunked(path: &Path, columns: &[String], chunk_size: usize) -> Result<Table> {
    let reader = ChunkedCsvReader::open(path, columns, chunk_size)?;
    let empty = Table::from_columns(
        reader
            .column_names()
            .map(|name| (name.to_string(), Column::Text(Vec::new()))),
    )?;

    let mut combined: Option<Table> = None;
    for chunk in reader {
        let chunk = chunk?;
        combined = Some(match combined {
            Some(acc) => acc.vstack(chunk)?,
            None => chunk,
        });
    }
    Ok(combined.unwrap_or(empty))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Header names with repeats renamed `name.1`, `name.2`, ... skipping any
/// suffix already taken by another header.
fn unique_headers(headers: &StringRecord) -> Vec<String> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    headers
        .iter()
        .map(|header| {
            let mut name = header.to_string();
            let mut seen = counts.get(&name).copied().unwrap_or(0);
            while seen > 0 {
                counts.insert(name.clone(), seen + 1);
                name = format!("{name}.{seen}");
                seen = counts.get(&name).copied().unwrap_or(0);
            }
            counts.insert(name.clone(), seen + 1);
            name
        })
        .collect()
}

fn open_reader(path: &Path) -> Result<csv::Reader<File>> {
    let file = File::open(path).map_err(|source| FrameError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(file))
}

/// Copy the selected fields of one record into the per-column buffers.
/// Short rows are padded with missing values; long rows are an error.
fn push_record(
    record: &StringRecord,
    width: usize,
    row: usize,
    selection: &[(String, usize)],
    raw: &mut [Vec<String>],
) -> Result<()> {
    if record.len() > width {
        return Err(FrameError::RaggedRow {
            row,
            expected: width,
            found: record.len(),
        });
    }
    for ((_, idx), buf) in selection.iter().zip(raw.iter_mut()) {
        buf.push(record.get(*idx).unwrap_or("").to_string());
    }
    Ok(())
}

fn build_table(selection: &[(String, usize)], raw: Vec<Vec<String>>) -> Result<Table> {
    Table::from_columns(
        selection
            .iter()
            .zip(raw)
            .map(|((name, _), values)| (name.clone(), infer_column(values))),
    )
}

fn is_na(s: &str) -> bool {
    NA_TOKENS.contains(&s)
}

fn parse_bool(s: &str) -> Option<bool> {
    BOOL_TOKENS
        .iter()
        .find(|(token, _)| *token == s)
        .map(|(_, b)| *b)
}

/// Type a column of raw CSV fields: int64, float64, bool, or text.
pub fn infer_column(raw: Vec<String>) -> Column {
    if raw.is_empty() {
        return Column::Text(Vec::new());
    }
    let has_na = raw.iter().any(|s| is_na(s));
    if raw.iter().all(|s| is_na(s)) {
        return Column::Float(FloatData::F64(vec![f64::NAN; raw.len()]));
    }

    if !has_na {
        let ints: Option<Vec<i64>> = raw.iter().map(|s| s.parse().ok()).collect();
        if let Some(ints) = ints {
            return Column::Int(IntData::I64(ints));
        }
    }

    let floats: Option<Vec<f64>> = raw
        .iter()
        .map(|s| if is_na(s) { Some(f64::NAN) } else { s.parse().ok() })
        .collect();
    if let Some(floats) = floats {
        return Column::Float(FloatData::F64(floats));
    }

    if !has_na {
        let bools: Option<Vec<bool>> = raw.iter().map(|s| parse_bool(s)).collect();
        if let Some(bools) = bools {
            return Column::Bool(bools);
        }
    }

    Column::Text(
        raw.into_iter()
            .map(|s| if is_na(&s) { None } else { Some(s) })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Dtype;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn write_csv(dir: &tempfile::TempDir, body: &str) -> std::path::PathBuf {
        let path = dir.path().join("input.csv");
        let mut file = File::create(&path).unwrap();
        file.write_all(body.as_bytes()).unwrap();
        path
    }

    #[test]
    fn infers_numeric_bool_and_text() {
        assert_eq!(infer_column(strings(&["1", "-2"])).dtype(), Dtype::Int64);
        assert_eq!(infer_column(strings(&["1", ""])).dtype(), Dtype::Float64);
        assert_eq!(infer_column(strings(&["1.5", "2"])).dtype(), Dtype::Float64);
        assert_eq!(infer_column(strings(&["True", "false"])).dtype(), Dtype::Bool);
        assert_eq!(infer_column(strings(&["True", ""])).dtype(), Dtype::Object);
        assert_eq!(infer_column(strings(&["M", "7"])).dtype(), Dtype::Object);
        assert_eq!(infer_column(strings(&["", "NA"])).dtype(), Dtype::Float64);
        assert_eq!(infer_column(Vec::new()).dtype(), Dtype::Object);
    }

    #[test]
    fn text_keeps_missing_as_none() {
        let col = infer_column(strings(&["a", "", "b"]));
        assert_eq!(
            col,
            Column::Text(vec![Some("a".into()), None, Some("b".into())])
        );
    }

    #[test]
    fn load_csv_reads_all_columns_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(&dir, "id,name,score\n1,ann,0.5\n2,bob,\n");
        let table = load_csv(&path).unwrap();
        assert_eq!(table.column_names(), ["id", "name", "score"]);
        assert_eq!(table.n_rows(), 2);
        assert_eq!(table.column("id").unwrap().dtype(), Dtype::Int64);
        assert_eq!(table.column("score").unwrap().dtype(), Dtype::Float64);
    }

    #[test]
    fn load_csv_missing_file_is_open_error() {
        let err = load_csv(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(matches!(err, FrameError::Open { .. }));
    }

    #[test]
    fn short_rows_are_padded_long_rows_fail() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(&dir, "a,b\n1\n2,3\n");
        let table = load_csv(&path).unwrap();
        assert_eq!(table.column("b").unwrap().dtype(), Dtype::Float64);

        let path = write_csv(&dir, "a,b\n1,2,3\n");
        assert!(matches!(load_csv(&path), Err(FrameError::RaggedRow { row: 0, .. })));
    }

    #[test]
    fn chunked_load_matches_full_load_across_batches() {
        let dir = tempfile::tempdir().unwrap();
        let mut body = String::from("id,label,value\n");
        for i in 0..25 {
            body.push_str(&format!("{i},l{},{}.5\n", i % 3, i));
        }
        let path = write_csv(&dir, &body);

        let columns = strings(&["value", "id"]);
        let subset = load_columns_chunked(&path, &columns, 10).unwrap();
        assert_eq!(subset.column_names(), ["value", "id"]);
        assert_eq!(subset.n_rows(), 25);

        let full = load_csv(&path).unwrap();
        assert_eq!(subset.column("id"), full.column("id"));
        assert_eq!(subset.column("value"), full.column("value"));
    }

    #[test]
    fn chunked_reader_yields_bounded_batches() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(&dir, "x\n1\n2\n3\n4\n5\n");
        let sizes: Vec<usize> = ChunkedCsvReader::open(&path, &strings(&["x"]), 2)
            .unwrap()
            .map(|chunk| chunk.unwrap().n_rows())
            .collect();
        assert_eq!(sizes, vec![2, 2, 1]);
    }

    #[test]
    fn batches_with_different_types_are_widened() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(&dir, "n\n1\n2\n2.5\nx\n");
        let subset = load_columns_chunked(&path, &strings(&["n"]), 2).unwrap();
        assert_eq!(
            subset.column("n"),
            Some(&Column::Text(vec![
                Some("1".into()),
                Some("2".into()),
                Some("2.5".into()),
                Some("x".into()),
            ]))
        );
    }

    #[test]
    fn missing_column_fails_the_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(&dir, "a,b\n1,2\n");
        let err = load_columns_chunked(&path, &strings(&["a", "zzz"]), 10).unwrap_err();
        assert!(matches!(err, FrameError::ColumnNotFound(name) if name == "zzz"));
    }

    #[test]
    fn zero_chunk_size_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(&dir, "a\n1\n");
        assert!(matches!(
            load_columns_chunked(&path, &strings(&["a"]), 0),
            Err(FrameError::ZeroChunkSize)
        ));
    }

    #[test]
    fn repeated_headers_get_numbered_suffixes() {
        let record = StringRecord::from(vec!["a", "a", "b", "a", "a.1"]);
        assert_eq!(unique_headers(&record), ["a", "a.1", "b", "a.2", "a.1.1"]);
    }

    #[test]
    fn duplicate_header_columns_all_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(&dir, "a,a,b\n1,2,3\n");
        let table = load_csv(&path).unwrap();
        assert_eq!(table.column_names(), ["a", "a.1", "b"]);
        assert_eq!(table.column("a").unwrap().to_f64(), Some(vec![1.0]));
        assert_eq!(table.column("a.1").unwrap().to_f64(), Some(vec![2.0]));

        let subset = load_columns_chunked(&path, &strings(&["a.1", "b"]), 10).unwrap();
        assert_eq!(subset.column("a.1").unwrap().to_f64(), Some(vec![2.0]));
    }

    #[test]
    fn header_only_source_gives_empty_subset() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(&dir, "a,b\n");
        let subset = load_columns_chunked(&path, &strings(&["b", "b"]), 10).unwrap();
        assert_eq!(subset.column_names(), ["b"]);
        assert_eq!(subset.n_rows(), 0);
    }
}
