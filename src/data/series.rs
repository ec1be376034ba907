//! Serial dilution series.

use crate::error::AppError;

/// Build `[start, start/factor, start/factor², ...]` with `points` entries.
pub fn dilution_series(start: f64, factor: f64, points: usize) -> Result<Vec<f64>, AppError> {
    if !(start.is_finite() && start > 0.0) {
        return Err(AppError::new(2, "Dilution start concentration must be a positive number."));
    }
    if !(factor.is_finite() && factor > 0.0) {
        return Err(AppError::new(2, "Dilution factor must be a positive number."));
    }
    if points == 0 {
        return Err(AppError::new(2, "Dilution series needs at least one point."));
    }

    let mut out = Vec::with_capacity(points);
    let mut current = start;
    for _ in 0..points {
        out.push(current);
        current /= factor;
    }
    Ok(out)
}

/// Round to `digits` significant figures (for display).
pub fn round_sig(value: f64, digits: u32) -> f64 {
    if value == 0.0 || !value.is_finite() || digits == 0 {
        return value;
    }
    let magnitude = value.abs().log10().floor() as i32;
    let scale = 10f64.powi(digits as i32 - 1 - magnitude);
    (value * scale).round() / scale
}
