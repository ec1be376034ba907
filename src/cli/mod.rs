//! Command-line parsing for the dose-response fitter.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the modeling/math code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "dose", version, about = "4PL Dose-Response Curve Fitter")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fit a 4PL curve and print parameters, diagnostics and a plot.
    Fit(FitArgs),
    /// Plot a previously exported curve JSON.
    Plot(PlotArgs),
    /// Print a serial dilution series as a JSON array.
    Series(SeriesArgs),
    /// Generate a seeded synthetic dataset as JSON.
    Simulate(SimulateArgs),
}

/// Options for fitting.
#[derive(Debug, Args, Clone)]
pub struct FitArgs {
    /// Concentrations as a JSON array of numbers.
    #[arg(long, value_name = "JSON", requires = "resp", conflicts_with = "csv")]
    pub conc: Option<String>,

    /// Responses as a JSON array of numbers.
    #[arg(long, value_name = "JSON", requires = "conc", conflicts_with = "csv")]
    pub resp: Option<String>,

    /// CSV file with `concentration` and `response` columns.
    #[arg(long, value_name = "PATH")]
    pub csv: Option<PathBuf>,

    /// Treat responses as consecutive replicate blocks (one block per concentration) and average them.
    #[arg(long)]
    pub replicates: bool,

    /// Blank readout for percent normalization (requires --range).
    #[arg(long, requires = "range", allow_hyphen_values = true)]
    pub blank: Option<f64>,

    /// Control window for percent normalization (requires --blank).
    #[arg(long, requires = "blank", allow_hyphen_values = true)]
    pub range: Option<f64>,

    /// Cap on model evaluations during the solve.
    #[arg(long, env = "DOSE_MAX_EVALS", default_value_t = 10_000)]
    pub max_evals: usize,

    /// Print only the outcome JSON.
    #[arg(long)]
    pub json: bool,

    /// Disable the terminal plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 80)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,

    /// Number of log-spaced samples in the fitted curve grid.
    #[arg(long, default_value_t = crate::report::DEFAULT_GRID_POINTS)]
    pub grid_points: usize,

    /// Export the fitted curve grid to CSV.
    #[arg(long = "export-curve")]
    pub export_curve: Option<PathBuf>,

    /// Export the fit (parameters, observations, curve grid) to JSON.
    #[arg(long = "export-curve-json")]
    pub export_curve_json: Option<PathBuf>,

    /// Export per-point residuals to CSV.
    #[arg(long = "export-residuals")]
    pub export_residuals: Option<PathBuf>,

    /// Write the outcome JSON to a file.
    #[arg(long = "export-json")]
    pub export_json: Option<PathBuf>,
}

/// Options for plotting a saved curve.
#[derive(Debug, Args)]
pub struct PlotArgs {
    /// Curve JSON file produced by `dose fit --export-curve-json`.
    #[arg(long, value_name = "JSON")]
    pub curve: PathBuf,

    /// Plot width (columns).
    #[arg(long, default_value_t = 80)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,
}

/// Options for the dilution series generator.
#[derive(Debug, Args)]
pub struct SeriesArgs {
    /// Highest (first) concentration.
    #[arg(long)]
    pub start: f64,

    /// Dilution factor between consecutive points.
    #[arg(long)]
    pub factor: f64,

    /// Number of points.
    #[arg(long)]
    pub points: usize,

    /// Significant figures to round to (0 disables rounding).
    #[arg(long, default_value_t = 3)]
    pub sig: u32,
}

/// Options for synthetic data generation.
#[derive(Debug, Args)]
pub struct SimulateArgs {
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    pub bottom: f64,

    #[arg(long, default_value_t = 100.0, allow_hyphen_values = true)]
    pub top: f64,

    #[arg(long, default_value_t = 1.2, allow_hyphen_values = true)]
    pub hill_slope: f64,

    #[arg(long, default_value_t = 1.0)]
    pub ic50: f64,

    /// Highest concentration of the dilution series.
    #[arg(long, default_value_t = 100.0)]
    pub start: f64,

    #[arg(long, default_value_t = 3.0)]
    pub factor: f64,

    #[arg(long, default_value_t = 10)]
    pub points: usize,

    #[arg(long, default_value_t = 3)]
    pub replicates: usize,

    /// Standard deviation of the response noise.
    #[arg(long, default_value_t = 2.0)]
    pub noise: f64,
}
