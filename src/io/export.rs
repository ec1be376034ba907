//! Export fit results to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream scripts.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::{CurveGrid, PointResidual};
use crate::error::AppError;

/// Write the fitted curve grid (`concentration,fitted`).
pub fn write_curve_csv(path: &Path, grid: &CurveGrid) -> Result<(), AppError> {
    let mut file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create curve CSV '{}': {e}", path.display())))?;
    write_curve_rows(&mut file, grid)
}

/// Write per-point residuals (`concentration,response,fitted,residual`).
pub fn write_residuals_csv(path: &Path, residuals: &[PointResidual]) -> Result<(), AppError> {
    let mut file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create residual CSV '{}': {e}", path.display())))?;
    write_residual_rows(&mut file, residuals)
}

fn write_curve_rows<W: Write>(out: &mut W, grid: &CurveGrid) -> Result<(), AppError> {
    writeln!(out, "concentration,fitted")
        .map_err(|e| AppError::new(2, format!("Failed to write curve CSV header: {e}")))?;
    for (c, y) in grid.points() {
        writeln!(out, "{c:.10e},{y:.10}")
            .map_err(|e| AppError::new(2, format!("Failed to write curve CSV row: {e}")))?;
    }
    Ok(())
}

fn write_residual_rows<W: Write>(out: &mut W, residuals: &[PointResidual]) -> Result<(), AppError> {
    writeln!(out, "concentration,response,fitted,residual")
        .map_err(|e| AppError::new(2, format!("Failed to write residual CSV header: {e}")))?;
    for r in residuals {
        writeln!(
            out,
            "{:.10e},{:.10},{:.10},{:.10}",
            r.point.concentration, r.point.response, r.fitted, r.residual
        )
        .map_err(|e| AppError::new(2, format!("Failed to write residual CSV row: {e}")))?;
    }
    Ok(())
}
