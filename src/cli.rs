use std::path::PathBuf;

use anyhow::{ensure, Result};
use clap::Parser;

use crate::data::loader::DEFAULT_CHUNK_SIZE;
use crate::data::optimize::OptimizeOptions;
use crate::pipeline::{RunConfig, DEFAULT_COLUMNS, DEFAULT_SOURCE};
use crate::state::PlotColumns;

/// Profile the memory use of a CSV file, shrink its column types, save a
/// column subset and plot it.
#[derive(Debug, Parser)]
#[command(name = "rusty-frame", version, about)]
pub struct Args {
    /// CSV file to analyse.
    #[arg(default_value = DEFAULT_SOURCE)]
    pub source: PathBuf,

    /// Directory for the memory reports and the subset CSV.
    #[arg(short, long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Column to keep in the subset (repeatable). Defaults to the crime
    /// dataset columns.
    #[arg(long = "column", value_name = "NAME")]
    pub columns: Vec<String>,

    /// Rows per batch when loading the subset.
    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
    pub chunk_size: usize,

    /// Convert text to categorical when distinct values < ratio * rows.
    #[arg(long, default_value_t = 0.5)]
    pub category_ratio: f64,

    /// Absolute error accepted when narrowing float64 to float32.
    #[arg(long, default_value_t = 0.0)]
    pub float_tolerance: f64,

    /// Numeric column for the line chart.
    #[arg(long, default_value = "Vict Age")]
    pub line_column: String,

    /// Column for the bar chart of value counts.
    #[arg(long, default_value = "Vict Sex")]
    pub bar_column: String,

    /// Column for the pie chart of value counts.
    #[arg(long, default_value = "Vict Descent")]
    pub pie_column: String,

    /// Do not open the plot window.
    #[arg(long)]
    pub no_plot: bool,
}

impl Args {
    /// Validate the arguments and turn them into a [`RunConfig`].
    pub fn into_config(self) -> Result<RunConfig> {
        ensure!(self.chunk_size > 0, "--chunk-size must be at least 1");
        ensure!(
            self.category_ratio.is_finite() && self.category_ratio >= 0.0,
            "--category-ratio must be a non-negative number, got {}",
            self.category_ratio
        );
        ensure!(
            self.float_tolerance.is_finite() && self.float_tolerance >= 0.0,
            "--float-tolerance must be a non-negative number, got {}",
            self.float_tolerance
        );

        let columns = if self.columns.is_empty() {
            DEFAULT_COLUMNS.iter().map(|c| c.to_string()).collect()
        } else {
            self.columns
        };

        Ok(RunConfig {
            source: self.source,
            output_dir: self.output_dir,
            columns,
            chunk_size: self.chunk_size,
            optimize: OptimizeOptions {
                category_ratio: self.category_ratio,
                float_tolerance: self.float_tolerance,
            },
            plot_columns: PlotColumns {
                line: self.line_column,
                bar: self.bar_column,
                pie: self.pie_column,
            },
            show_plots: !self.no_plot,
        })
    }
}
