use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::data::loader::{load_columns_chunked, load_csv, DEFAULT_CHUNK_SIZE};
use crate::data::memory::{analyze, save_report, MemoryReport};
use crate::data::model::Table;
use crate::data::optimize::{optimize, Conversion, OptimizeOptions};
use crate::data::writer::write_csv;
use crate::state::PlotColumns;

pub const INITIAL_REPORT_FILE: &str = "initial_column_memory_stats.json";
pub const OPTIMIZED_REPORT_FILE: &str = "optimized_column_memory_stats.json";
pub const SUBSET_FILE: &str = "subset_data.csv";

pub const DEFAULT_SOURCE: &str = "data/Crime_Data_from_2020_to_Present.csv";
pub const DEFAULT_COLUMNS: [&str; 7] = [
    "DR_NO",
    "Date Rptd",
    "Vict Age",
    "Vict Sex",
    "Vict Descent",
    "LAT",
    "LON",
];

// ---------------------------------------------------------------------------
// Run configuration
// ---------------------------------------------------------------------------

/// Inputs of one run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub source: PathBuf,
    pub output_dir: PathBuf,
    /// Columns of the chunked subset, in output order.
    pub columns: Vec<String>,
    pub chunk_size: usize,
    pub optimize: OptimizeOptions,
    pub plot_columns: PlotColumns,
    pub show_plots: bool,
}

impl RunConfig {
    /// Defaults for everything except the source file.
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            output_dir: PathBuf::from("."),
            columns: DEFAULT_COLUMNS.iter().map(|c| c.to_string()).collect(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            optimize: OptimizeOptions::default(),
            plot_columns: PlotColumns::default(),
            show_plots: true,
        }
    }

    pub fn output_path(&self, file_name: &str) -> PathBuf {
        self.output_dir.join(file_name)
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self::new(DEFAULT_SOURCE)
    }
}

// ---------------------------------------------------------------------------
// Stages
// ---------------------------------------------------------------------------

/// Memory reports from before and after optimization.
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    pub initial: MemoryReport,
    pub optimized: MemoryReport,
    pub conversions: Vec<Conversion>,
}

/// Load the whole source, report its memory, optimize it and report again.
/// Both reports are written to the output directory.
pub fn profile(config: &RunConfig) -> Result<Profile> {
    log::info!("loading {}", config.source.display());
    let mut table = load_csv(&config.source)
        .with_context(|| format!("loading {}", config.source.display()))?;
    log::info!(
        "loaded {} rows, {} columns",
        table.n_rows(),
        table.n_columns()
    );

    let initial = analyze(&table);
    persist_report(&initial, &config.output_path(INITIAL_REPORT_FILE))?;

    let conversions = optimize(&mut table, &config.optimize);
    log::info!("optimizer changed {} column(s)", conversions.len());

    let optimized = analyze(&table);
    persist_report(&optimized, &config.output_path(OPTIMIZED_REPORT_FILE))?;

    Ok(Profile {
        initial,
        optimized,
        conversions,
    })
}

/// Reload the configured columns in batches and write them to the subset CSV.
pub fn extract_subset(config: &RunConfig) -> Result<Table> {
    log::info!(
        "loading columns {:?} in chunks of {}",
        config.columns,
        config.chunk_size
    );
    let subset = load_columns_chunked(&config.source, &config.columns, config.chunk_size)
        .with_context(|| format!("loading column subset from {}", config.source.display()))?;

    let path = config.output_path(SUBSET_FILE);
    write_csv(&subset, &path).with_context(|| format!("writing {}", path.display()))?;
    log::info!("wrote {} rows to {}", subset.n_rows(), path.display());

    Ok(subset)
}

fn persist_report(report: &MemoryReport, path: &Path) -> Result<()> {
    save_report(report, path).with_context(|| format!("writing {}", path.display()))?;
    log::info!("wrote {}", path.display());
    Ok(())
}
