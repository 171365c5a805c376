use crate::data::memory::MemoryReport;
use crate::data::model::Table;
use crate::data::stats::{correlation_matrix, numeric_columns, value_counts, CorrelationMatrix};

// ---------------------------------------------------------------------------
// Panel configuration
// ---------------------------------------------------------------------------

/// Which subset columns feed the line, bar and pie panels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlotColumns {
    pub line: String,
    pub bar: String,
    pub pie: String,
}

impl Default for PlotColumns {
    fn default() -> Self {
        Self {
            line: "Vict Age".to_string(),
            bar: "Vict Sex".to_string(),
            pie: "Vict Descent".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Panel data
// ---------------------------------------------------------------------------

/// Values of one numeric column against row number.
#[derive(Debug, Clone, PartialEq)]
pub struct LineSeries {
    pub column: String,
    /// `[row, value]`; rows with a missing value are skipped.
    pub points: Vec<[f64; 2]>,
}

/// Value counts of one column.
#[derive(Debug, Clone, PartialEq)]
pub struct CountSeries {
    pub column: String,
    pub counts: Vec<(String, usize)>,
}

impl CountSeries {
    pub fn total(&self) -> usize {
        self.counts.iter().map(|(_, n)| n).sum()
    }
}

/// Memory before and after optimization, shown next to the plots.
#[derive(Debug, Clone, PartialEq)]
pub struct MemorySummary {
    pub initial: MemoryReport,
    pub optimized: MemoryReport,
}

// ---------------------------------------------------------------------------
// Figure state
// ---------------------------------------------------------------------------

/// Everything the viewer draws, computed up front and independent of rendering.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FigureState {
    pub rows: usize,
    pub line: Option<LineSeries>,
    pub bar: Option<CountSeries>,
    pub pie: Option<CountSeries>,
    pub heatmap: Option<CorrelationMatrix>,
    pub memory: Option<MemorySummary>,
}

impl FigureState {
    /// Build the four panels from `table`. A panel whose column is absent
    /// (or, for the line chart, not numeric) is left empty.
    pub fn from_table(table: &Table, columns: &PlotColumns) -> Self {
        let line = match table.column(&columns.line).map(|c| c.to_f64()) {
            Some(Some(values)) => Some(LineSeries {
                column: columns.line.clone(),
                points: values
                    .into_iter()
                    .enumerate()
                    .filter(|(_, v)| !v.is_nan())
                    .map(|(i, v)| [i as f64, v])
                    .collect(),
            }),
            Some(None) => {
                log::warn!("line panel skipped: column {:?} is not numeric", columns.line);
                None
            }
            None => {
                log::warn!("line panel skipped: no column {:?}", columns.line);
                None
            }
        };

        let bar = count_series(table, &columns.bar);
        let pie = count_series(table, &columns.pie);

        let heatmap = correlation_matrix(&numeric_columns(table));
        if heatmap.is_none() {
            log::warn!("heatmap panel skipped: no numeric columns");
        }

        FigureState {
            rows: table.n_rows(),
            line,
            bar,
            pie,
            heatmap,
            memory: None,
        }
    }

    pub fn with_memory(mut self, initial: MemoryReport, optimized: MemoryReport) -> Self {
        self.memory = Some(MemorySummary { initial, optimized });
        self
    }

    /// Number of panels with something to draw.
    pub fn panel_count(&self) -> usize {
        [
            self.line.is_some(),
            self.bar.is_some(),
            self.pie.is_some(),
            self.heatmap.is_some(),
        ]
        .into_iter()
        .filter(|present| *present)
        .count()
    }
}

fn count_series(table: &Table, column: &str) -> Option<CountSeries> {
    let Some(col) = table.column(column) else {
        log::warn!("count panel skipped: no column {column:?}");
        return None;
    };
    Some(CountSeries {
        column: column.to_string(),
        counts: value_counts(col),
    })
}
