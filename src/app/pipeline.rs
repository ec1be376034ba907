//! Shared "fit pipeline" logic for the `fit` command.
//!
//! Keeping this in one place avoids mixing the workflow with presentation:
//! input assembly -> (normalize) -> (average replicates) -> fit -> residuals -> curve grid

use std::path::Path;

use log::warn;

use crate::cli::FitArgs;
use crate::data::{average_replicates, normalize_percent};
use crate::domain::{CurveGrid, FitConfig, FitReport, Outcome, PointResidual};
use crate::error::{AppError, FitError};
use crate::io::{load_measurements, parse_numeric_array};
use crate::report::{compute_residuals, curve_grid};

/// Paired inputs ready for the fitter.
#[derive(Debug, Clone, Default)]
pub struct FitInput {
    pub concentrations: Vec<f64>,
    pub responses: Vec<f64>,
}

/// All computed outputs of a single `dose fit` run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub report: FitReport,
    pub residuals: Vec<PointResidual>,
    pub grid: CurveGrid,
}

/// Build the fitter input from CLI arguments.
pub fn prepare_input(args: &FitArgs) -> Result<FitInput, AppError> {
    let (concentrations, mut responses) = match (&args.csv, &args.conc, &args.resp) {
        (Some(path), _, _) => read_csv_input(path)?,
        (None, Some(conc), Some(resp)) => (parse_arg(conc, "--conc")?, parse_arg(resp, "--resp")?),
        _ => {
            return Err(AppError::new(
                2,
                "Provide either --csv <PATH> or both --conc <JSON> and --resp <JSON>.",
            ));
        }
    };

    if let (Some(blank), Some(range)) = (args.blank, args.range) {
        responses = normalize_percent(&responses, blank, range);
    }

    if args.replicates {
        let averaged = average_replicates(&concentrations, &responses)?;
        return Ok(FitInput {
            concentrations: averaged.iter().map(|m| m.concentration).collect(),
            responses: averaged.iter().map(|m| m.response).collect(),
        });
    }

    Ok(FitInput {
        concentrations,
        responses,
    })
}

/// Execute the fit and derive residuals and the plotting grid.
pub fn run_fit(input: &FitInput, config: &FitConfig, grid_points: usize) -> Result<RunOutput, FitError> {
    let report = crate::fit::fit_dose_response(&input.concentrations, &input.responses, config)?;
    let residuals = compute_residuals(report.dataset.points(), &report.solved);
    let grid = curve_grid(&report.solved, &report.dataset.concentrations(), grid_points);

    Ok(RunOutput {
        report,
        residuals,
        grid,
    })
}

/// Run the whole `fit` workflow and pair the result with its wire outcome.
///
/// Input errors (bad JSON, unreadable CSV, replicate mismatch) also become an
/// `Outcome::Failure`, so JSON consumers always get an outcome object.
pub fn fit_outcome(args: &FitArgs, config: &FitConfig) -> (Outcome, Result<RunOutput, AppError>) {
    let input = match prepare_input(args) {
        Ok(input) => input,
        Err(err) => return (Outcome::Failure(err.to_string()), Err(err)),
    };
    match run_fit(&input, config, args.grid_points) {
        Ok(run) => (Outcome::Success(run.report.params), Ok(run)),
        Err(err) => (Outcome::Failure(err.to_string()), Err(err.into())),
    }
}

fn parse_arg(json: &str, flag: &str) -> Result<Vec<f64>, AppError> {
    parse_numeric_array(json).map_err(|e| AppError::new(2, format!("Invalid {flag}: {e}")))
}

fn read_csv_input(path: &Path) -> Result<(Vec<f64>, Vec<f64>), AppError> {
    let data = load_measurements(path)?;
    for err in &data.row_errors {
        warn!("{}: line {}: {}", path.display(), err.line, err.message);
    }
    if !data.row_errors.is_empty() {
        warn!(
            "skipped {} of {} CSV rows",
            data.row_errors.len(),
            data.rows_read
        );
    }
    Ok((data.concentrations, data.responses))
}
