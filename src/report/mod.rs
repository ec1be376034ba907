//! Reporting utilities: residuals, fitted curve grids and formatted output.

pub mod format;

pub use format::*;

use crate::domain::{CurveGrid, FourPlParams, Measurement, PointResidual};
use crate::models::predict;

/// Default number of samples in a fitted curve grid.
pub const DEFAULT_GRID_POINTS: usize = 50;

/// Compute fitted values and residuals (`observed - fitted`) for each point.
pub fn compute_residuals(points: &[Measurement], params: &FourPlParams) -> Vec<PointResidual> {
    points
        .iter()
        .map(|p| {
            let fitted = predict(p.concentration, params);
            PointResidual {
                point: *p,
                fitted,
                residual: p.response - fitted,
            }
        })
        .collect()
}

/// Sample the fitted curve at `n` log-spaced concentrations spanning the
/// positive concentrations of the data.
///
/// Empty when there is no positive concentration or the IC50 is NaN.
pub fn curve_grid(params: &FourPlParams, concentrations: &[f64], n: usize) -> CurveGrid {
    let positive: Vec<f64> = concentrations
        .iter()
        .copied()
        .filter(|c| *c > 0.0 && c.is_finite())
        .collect();
    let (Some(lo), Some(hi)) = (
        positive.iter().copied().reduce(f64::min),
        positive.iter().copied().reduce(f64::max),
    ) else {
        return CurveGrid::default();
    };
    if params.ic50.is_nan() {
        return CurveGrid::default();
    }

    let n = n.max(2);
    let (log_lo, log_hi) = (lo.log10(), hi.log10());
    let mut grid = CurveGrid {
        concentration: Vec::with_capacity(n),
        response: Vec::with_capacity(n),
    };
    for i in 0..n {
        let u = i as f64 / (n as f64 - 1.0);
        let x = 10f64.powf(log_lo + (log_hi - log_lo) * u);
        grid.concentration.push(x);
        grid.response.push(predict(x, params));
    }
    grid
}
