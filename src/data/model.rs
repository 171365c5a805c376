use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::mem::size_of;

use super::error::{FrameError, Result};

// ---------------------------------------------------------------------------
// Dtype – the label reported for a column
// ---------------------------------------------------------------------------

/// Storage type of a column, named after the usual dataframe dtype labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dtype {
    Object,
    Bool,
    Int8,
    Int16,
    Int32,
    Int64,
    Float32,
    Float64,
    Category,
}

impl Dtype {
    pub fn label(self) -> &'static str {
        match self {
            Dtype::Object => "object",
            Dtype::Bool => "bool",
            Dtype::Int8 => "int8",
            Dtype::Int16 => "int16",
            Dtype::Int32 => "int32",
            Dtype::Int64 => "int64",
            Dtype::Float32 => "float32",
            Dtype::Float64 => "float64",
            Dtype::Category => "category",
        }
    }

    /// Integer and floating dtypes of any width.
    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            Dtype::Int8
                | Dtype::Int16
                | Dtype::Int32
                | Dtype::Int64
                | Dtype::Float32
                | Dtype::Float64
        )
    }
}

impl fmt::Display for Dtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Cell – a borrowed view of one value
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cell<'a> {
    Null,
    Text(&'a str),
    Bool(bool),
    Int(i64),
    Float32(f32),
    Float(f64),
}

impl Cell<'_> {
    /// Missing values, including NaN floats.
    pub fn is_null(&self) -> bool {
        match self {
            Cell::Null => true,
            Cell::Float32(v) => v.is_nan(),
            Cell::Float(v) => v.is_nan(),
            _ => false,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Cell::Int(i) => Some(i as f64),
            Cell::Float32(v) if !v.is_nan() => Some(v as f64),
            Cell::Float(v) if !v.is_nan() => Some(v),
            _ => None,
        }
    }
}

/// CSV spelling of a value: missing is empty and floats always keep a
/// decimal point or exponent so they reload as floats.
impl fmt::Display for Cell<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Null => Ok(()),
            Cell::Text(s) => f.write_str(s),
            Cell::Bool(true) => f.write_str("True"),
            Cell::Bool(false) => f.write_str("False"),
            Cell::Int(i) => write!(f, "{i}"),
            Cell::Float32(v) if v.is_nan() => Ok(()),
            Cell::Float32(v) => write!(f, "{v:?}"),
            Cell::Float(v) if v.is_nan() => Ok(()),
            Cell::Float(v) => write!(f, "{v:?}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Numeric storage
// ---------------------------------------------------------------------------

/// Signed integer storage at one of four widths.
#[derive(Debug, Clone, PartialEq)]
pub enum IntData {
    I8(Vec<i8>),
    I16(Vec<i16>),
    I32(Vec<i32>),
    I64(Vec<i64>),
}

impl IntData {
    /// Store `values` at the smallest signed width that holds all of them.
    pub fn narrowest(values: Vec<i64>) -> Self {
        let (min, max) = values
            .iter()
            .fold((0i64, 0i64), |(lo, hi), &v| (lo.min(v), hi.max(v)));
        let fits = |lo: i64, hi: i64| min >= lo && max <= hi;

        if fits(i8::MIN.into(), i8::MAX.into()) {
            IntData::I8(values.into_iter().map(|v| v as i8).collect())
        } else if fits(i16::MIN.into(), i16::MAX.into()) {
            IntData::I16(values.into_iter().map(|v| v as i16).collect())
        } else if fits(i32::MIN.into(), i32::MAX.into()) {
            IntData::I32(values.into_iter().map(|v| v as i32).collect())
        } else {
            IntData::I64(values)
        }
    }

    pub fn len(&self) -> usize {
        match self {
            IntData::I8(v) => v.len(),
            IntData::I16(v) => v.len(),
            IntData::I32(v) => v.len(),
            IntData::I64(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bytes per value.
    pub fn width(&self) -> usize {
        match self {
            IntData::I8(_) => size_of::<i8>(),
            IntData::I16(_) => size_of::<i16>(),
            IntData::I32(_) => size_of::<i32>(),
            IntData::I64(_) => size_of::<i64>(),
        }
    }

    pub fn dtype(&self) -> Dtype {
        match self {
            IntData::I8(_) => Dtype::Int8,
            IntData::I16(_) => Dtype::Int16,
            IntData::I32(_) => Dtype::Int32,
            IntData::I64(_) => Dtype::Int64,
        }
    }

    pub fn get(&self, idx: usize) -> Option<i64> {
        match self {
            IntData::I8(v) => v.get(idx).map(|&x| x.into()),
            IntData::I16(v) => v.get(idx).map(|&x| x.into()),
            IntData::I32(v) => v.get(idx).map(|&x| x.into()),
            IntData::I64(v) => v.get(idx).copied(),
        }
    }

    pub fn to_i64(&self) -> Vec<i64> {
        match self {
            IntData::I8(v) => v.iter().map(|&x| x.into()).collect(),
            IntData::I16(v) => v.iter().map(|&x| x.into()).collect(),
            IntData::I32(v) => v.iter().map(|&x| x.into()).collect(),
            IntData::I64(v) => v.clone(),
        }
    }

    /// Widen to `i64`, reusing the buffer when it already is one.
    pub fn into_i64(self) -> Vec<i64> {
        match self {
            IntData::I64(v) => v,
            other => other.to_i64(),
        }
    }
}

/// Floating point storage; NaN marks a missing value.
#[derive(Debug, Clone, PartialEq)]
pub enum FloatData {
    F32(Vec<f32>),
    F64(Vec<f64>),
}

impl FloatData {
    pub fn len(&self) -> usize {
        match self {
            FloatData::F32(v) => v.len(),
            FloatData::F64(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn width(&self) -> usize {
        match self {
            FloatData::F32(_) => size_of::<f32>(),
            FloatData::F64(_) => size_of::<f64>(),
        }
    }

    pub fn dtype(&self) -> Dtype {
        match self {
            FloatData::F32(_) => Dtype::Float32,
            FloatData::F64(_) => Dtype::Float64,
        }
    }

    pub fn to_f64(&self) -> Vec<f64> {
        match self {
            FloatData::F32(v) => v.iter().map(|&x| x.into()).collect(),
            FloatData::F64(v) => v.clone(),
        }
    }

    pub fn into_f64(self) -> Vec<f64> {
        match self {
            FloatData::F64(v) => v,
            other => other.to_f64(),
        }
    }
}

// ---------------------------------------------------------------------------
// Categorical – dictionary of distinct strings plus per-row codes
// ---------------------------------------------------------------------------

/// Code used for a missing value.
pub const NULL_CODE: i64 = -1;

#[derive(Debug, Clone, PartialEq)]
pub struct Categorical {
    /// Sorted distinct values.
    categories: Vec<String>,
    /// Index into `categories` per row, [`NULL_CODE`] when missing.
    codes: IntData,
}

impl Categorical {
    pub fn from_values(values: &[Option<String>]) -> Self {
        let categories: Vec<String> = values
            .iter()
            .flatten()
            .map(String::as_str)
            .collect::<BTreeSet<&str>>()
            .into_iter()
            .map(str::to_string)
            .collect();

        let codes = values
            .iter()
            .map(|v| match v {
                Some(s) => categories
                    .binary_search(s)
                    .map_or(NULL_CODE, |i| i as i64),
                None => NULL_CODE,
            })
            .collect();

        Categorical {
            categories,
            codes: IntData::narrowest(codes),
        }
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn codes(&self) -> &IntData {
        &self.codes
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&str> {
        let code = self.codes.get(idx)?;
        usize::try_from(code)
            .ok()
            .and_then(|c| self.categories.get(c))
            .map(String::as_str)
    }
}

// ---------------------------------------------------------------------------
// Column – tagged storage variant
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    /// Free text; `None` is a missing value.
    Text(Vec<Option<String>>),
    Bool(Vec<bool>),
    Int(IntData),
    Float(FloatData),
    Categorical(Categorical),
}

impl Column {
    pub fn len(&self) -> usize {
        match self {
            Column::Text(v) => v.len(),
            Column::Bool(v) => v.len(),
            Column::Int(d) => d.len(),
            Column::Float(d) => d.len(),
            Column::Categorical(c) => c.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn dtype(&self) -> Dtype {
        match self {
            Column::Text(_) => Dtype::Object,
            Column::Bool(_) => Dtype::Bool,
            Column::Int(d) => d.dtype(),
            Column::Float(d) => d.dtype(),
            Column::Categorical(_) => Dtype::Category,
        }
    }

    pub fn cell(&self, row: usize) -> Option<Cell<'_>> {
        let cell = match self {
            Column::Text(v) => match v.get(row)? {
                Some(s) => Cell::Text(s),
                None => Cell::Null,
            },
            Column::Bool(v) => Cell::Bool(*v.get(row)?),
            Column::Int(d) => Cell::Int(d.get(row)?),
            Column::Float(FloatData::F32(v)) => Cell::Float32(*v.get(row)?),
            Column::Float(FloatData::F64(v)) => Cell::Float(*v.get(row)?),
            Column::Categorical(c) => {
                if row >= c.len() {
                    return None;
                }
                c.get(row).map_or(Cell::Null, Cell::Text)
            }
        };
        Some(cell)
    }

    /// All cells in row order.
    pub fn cells(&self) -> impl Iterator<Item = Cell<'_>> + '_ {
        (0..self.len()).map_while(move |row| self.cell(row))
    }

    /// Deep memory footprint in bytes: fixed-width storage plus the heap
    /// payload of every string the column owns.
    pub fn deep_size(&self) -> usize {
        match self {
            Column::Text(values) => {
                values.len() * size_of::<Option<String>>()
                    + values.iter().flatten().map(String::len).sum::<usize>()
            }
            Column::Bool(v) => v.len() * size_of::<bool>(),
            Column::Int(d) => d.len() * d.width(),
            Column::Float(d) => d.len() * d.width(),
            Column::Categorical(c) => {
                c.codes.len() * c.codes.width()
                    + c.categories.len() * size_of::<String>()
                    + c.categories.iter().map(String::len).sum::<usize>()
            }
        }
    }

    /// Numeric columns as `f64`, NaN for missing. `None` for other variants.
    pub fn to_f64(&self) -> Option<Vec<f64>> {
        match self {
            Column::Int(d) => Some(d.to_i64().into_iter().map(|v| v as f64).collect()),
            Column::Float(d) => Some(d.to_f64()),
            _ => None,
        }
    }

    /// Render every value with its CSV spelling.
    pub fn to_text(&self) -> Vec<Option<String>> {
        self.cells()
            .map(|c| (!c.is_null()).then(|| c.to_string()))
            .collect()
    }

    /// Number of distinct non-missing values in a text column.
    pub fn n_unique(&self) -> usize {
        match self {
            Column::Text(values) => values
                .iter()
                .flatten()
                .map(String::as_str)
                .collect::<HashSet<&str>>()
                .len(),
            Column::Categorical(c) => c.categories.len(),
            other => other
                .cells()
                .filter(|c| !c.is_null())
                .map(|c| c.to_string())
                .collect::<HashSet<String>>()
                .len(),
        }
    }

    /// Append `other` below `self`, widening to a common variant.
    pub fn concat(self, other: Column) -> Column {
        match (self, other) {
            (Column::Text(mut a), Column::Text(b)) => {
                a.extend(b);
                Column::Text(a)
            }
            (Column::Bool(mut a), Column::Bool(b)) => {
                a.extend(b);
                Column::Bool(a)
            }
            (Column::Int(a), Column::Int(b)) => {
                let mut values = a.into_i64();
                values.extend(b.into_i64());
                Column::Int(IntData::I64(values))
            }
            (Column::Float(a), Column::Float(b)) => {
                let mut values = a.into_f64();
                values.extend(b.into_f64());
                Column::Float(FloatData::F64(values))
            }
            (Column::Float(a), Column::Int(b)) => {
                let mut values = a.into_f64();
                values.extend(b.into_i64().into_iter().map(|v| v as f64));
                Column::Float(FloatData::F64(values))
            }
            (Column::Int(a), Column::Float(b)) => {
                let mut values: Vec<f64> = a.into_i64().into_iter().map(|v| v as f64).collect();
                values.extend(b.into_f64());
                Column::Float(FloatData::F64(values))
            }
            (a, b) => {
                let mut values = match a {
                    Column::Text(v) => v,
                    other => other.to_text(),
                };
                values.extend(b.to_text());
                Column::Text(values)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Table – named, equal-length columns
// ---------------------------------------------------------------------------

/// An in-memory table with uniquely named columns in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    names: Vec<String>,
    columns: Vec<Column>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_columns<I, S>(columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, Column)>,
        S: Into<String>,
    {
        let mut table = Table::new();
        for (name, column) in columns {
            table.push_column(name, column)?;
        }
        Ok(table)
    }

    pub fn push_column(&mut self, name: impl Into<String>, column: Column) -> Result<()> {
        let name = name.into();
        if self.names.contains(&name) {
            return Err(FrameError::DuplicateColumn(name));
        }
        if let Some(first) = self.columns.first() {
            if first.len() != column.len() {
                return Err(FrameError::LengthMismatch {
                    column: name,
                    expected: first.len(),
                    found: column.len(),
                });
            }
        }
        self.names.push(name);
        self.columns.push(column);
        Ok(())
    }

    pub fn n_rows(&self) -> usize {
        self.columns.first().map_or(0, Column::len)
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn column_names(&self) -> &[String] {
        &self.names
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        let idx = self.names.iter().position(|n| n == name)?;
        self.columns.get(idx)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Column)> + '_ {
        self.names.iter().map(String::as_str).zip(&self.columns)
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut Column)> + '_ {
        self.names.iter().map(String::as_str).zip(self.columns.iter_mut())
    }

    /// Total deep footprint in bytes.
    pub fn deep_size(&self) -> usize {
        self.columns.iter().map(Column::deep_size).sum()
    }

    /// Append the rows of `other`, which must have the same column names in
    /// the same order.
    pub fn vstack(self, other: Table) -> Result<Table> {
        if let Some(name) = other.names.iter().find(|n| !self.names.contains(n)) {
            return Err(FrameError::ColumnNotFound(name.clone()));
        }
        if let Some(name) = self.names.iter().find(|n| !other.names.contains(n)) {
            return Err(FrameError::ColumnNotFound(name.clone()));
        }

        let mut other_columns: Vec<Option<Column>> = other.columns.into_iter().map(Some).collect();
        let mut columns = Vec::with_capacity(self.columns.len());
        for (name, column) in self.names.iter().zip(self.columns) {
            let idx = other
                .names
                .iter()
                .position(|n| n == name)
                .ok_or_else(|| FrameError::ColumnNotFound(name.clone()))?;
            let below = other_columns[idx]
                .take()
                .ok_or_else(|| FrameError::DuplicateColumn(name.clone()))?;
            columns.push(column.concat(below));
        }

        Ok(Table {
            names: self.names,
            columns,
        })
    }
}
