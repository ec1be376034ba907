//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and sets up logging
//! - parses CLI arguments
//! - runs the fit pipeline
//! - prints reports/plots
//! - writes optional exports

use clap::Parser;

use crate::cli::{Command, FitArgs, PlotArgs, SeriesArgs, SimulateArgs};
use crate::data::{SampleSpec, dilution_series, generate_sample, round_sig};
use crate::domain::{FitConfig, FourPlParams};
use crate::error::AppError;
use crate::io::outcome_to_json;

pub mod pipeline;

/// Entry point for the `dose` binary.
pub fn run() -> Result<(), AppError> {
    // A missing .env file is fine.
    let _ = dotenvy::dotenv();
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).try_init();

    let cli = crate::cli::Cli::parse();

    match cli.command {
        Command::Fit(args) => handle_fit(args),
        Command::Plot(args) => handle_plot(args),
        Command::Series(args) => handle_series(args),
        Command::Simulate(args) => handle_simulate(args),
    }
}

pub fn fit_config_from_args(args: &FitArgs) -> FitConfig {
    FitConfig {
        max_evals: args.max_evals,
        ..FitConfig::default()
    }
}

fn handle_fit(args: FitArgs) -> Result<(), AppError> {
    let config = fit_config_from_args(&args);
    let (outcome, run) = pipeline::fit_outcome(&args, &config);

    if let Some(path) = &args.export_json {
        std::fs::write(path, outcome_to_json(&outcome))
            .map_err(|e| AppError::new(2, format!("Failed to write outcome JSON '{}': {e}", path.display())))?;
    }

    if args.json {
        println!("{}", outcome_to_json(&outcome));
        run?;
        return Ok(());
    }

    let run = run?;
    println!("{}", crate::report::format_fit_summary(&run.report));
    println!("{}", crate::report::format_residuals(&run.residuals));

    if !args.no_plot {
        let plot = crate::plot::render_ascii_plot(run.report.dataset.points(), &run.grid, args.width, args.height);
        println!("{plot}");
    }

    // Optional exports.
    if let Some(path) = &args.export_curve {
        crate::io::export::write_curve_csv(path, &run.grid)?;
    }
    if let Some(path) = &args.export_residuals {
        crate::io::export::write_residuals_csv(path, &run.residuals)?;
    }
    if let Some(path) = &args.export_curve_json {
        crate::io::curve::write_curve_json(path, &run.report, args.grid_points)?;
    }

    Ok(())
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    let curve = crate::io::curve::read_curve_json(&args.curve)?;
    let plot = crate::plot::render_ascii_plot_from_curve_file(&curve, args.width, args.height);
    println!("{plot}");
    Ok(())
}

fn handle_series(args: SeriesArgs) -> Result<(), AppError> {
    let series: Vec<f64> = dilution_series(args.start, args.factor, args.points)?
        .into_iter()
        .map(|c| round_sig(c, args.sig))
        .collect();
    let json = serde_json::to_string(&series)
        .map_err(|e| AppError::new(4, format!("Failed to serialize series: {e}")))?;
    println!("{json}");
    Ok(())
}

fn handle_simulate(args: SimulateArgs) -> Result<(), AppError> {
    let spec = SampleSpec {
        seed: args.seed,
        params: FourPlParams {
            bottom: args.bottom,
            top: args.top,
            hill_slope: args.hill_slope,
            ic50: args.ic50,
        },
        start: args.start,
        factor: args.factor,
        points: args.points,
        replicates: args.replicates,
        noise_sd: args.noise,
    };
    let sample = generate_sample(&spec)?;
    let json = serde_json::to_string_pretty(&sample)
        .map_err(|e| AppError::new(4, format!("Failed to serialize sample: {e}")))?;
    println!("{json}");
    Ok(())
}
