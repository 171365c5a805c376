use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use rusty_frame::app::run_viewer;
use rusty_frame::cli::Args;
use rusty_frame::pipeline;
use rusty_frame::state::FigureState;

fn main() -> ExitCode {
    env_logger::init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let config = Args::parse().into_config()?;

    let profile = pipeline::profile(&config)?;
    println!("Initial memory usage: {} MB", profile.initial.total_mb);
    println!("Optimized memory usage: {} MB", profile.optimized.total_mb);

    let subset = pipeline::extract_subset(&config)?;

    if !config.show_plots {
        return Ok(());
    }
    let figure = FigureState::from_table(&subset, &config.plot_columns)
        .with_memory(profile.initial, profile.optimized);
    drop(subset);

    run_viewer(figure)
        .map_err(|e| anyhow::anyhow!("{e}"))
        .context("plot window failed")
}
