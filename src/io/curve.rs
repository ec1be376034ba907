//! Read/write curve JSON files.
//!
//! Curve JSON is the "portable" representation of a fitted curve:
//! - 4PL parameters and fit quality
//! - the observations that were fitted
//! - a precomputed fitted grid for quick plotting
//!
//! The schema is defined by `domain::CurveFile`.

use std::fs::File;
use std::path::Path;

use crate::domain::{CurveFile, FitReport};
use crate::error::AppError;
use crate::report::curve_grid;

/// Build the curve file contents for a fit.
pub fn curve_file(report: &FitReport, grid_points: usize) -> CurveFile {
    let concentrations = report.dataset.concentrations();
    CurveFile {
        tool: "dose".to_string(),
        params: report.solved,
        sse: report.quality.sse,
        rmse: report.quality.rmse,
        observations: report.dataset.points().to_vec(),
        grid: curve_grid(&report.solved, &concentrations, grid_points),
    }
}

/// Write a curve JSON file.
pub fn write_curve_json(path: &Path, report: &FitReport, grid_points: usize) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create curve JSON '{}': {e}", path.display())))?;

    serde_json::to_writer_pretty(file, &curve_file(report, grid_points))
        .map_err(|e| AppError::new(2, format!("Failed to write curve JSON: {e}")))?;

    Ok(())
}

/// Read a curve JSON file.
pub fn read_curve_json(path: &Path) -> Result<CurveFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open curve JSON '{}': {e}", path.display())))?;
    let curve: CurveFile =
        serde_json::from_reader(file).map_err(|e| AppError::new(2, format!("Invalid curve JSON: {e}")))?;
    Ok(curve)
}
