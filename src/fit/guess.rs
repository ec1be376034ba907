//! Starting point for the solver.
//!
//! - bottom: smallest observed response
//! - top: largest observed response
//! - hill slope: `1.0`
//! - IC50: median concentration
//!
//! Convergence on noisy plates depends on this exact seeding.

use crate::domain::{Dataset, FourPlParams};
use crate::error::FitError;
use crate::math::{max, median, min};

pub const HILL_SLOPE_GUESS: f64 = 1.0;

pub fn initial_guess(dataset: &Dataset) -> Result<FourPlParams, FitError> {
    let responses = dataset.responses();
    let concentrations = dataset.concentrations();

    let (Some(bottom), Some(top), Some(ic50)) = (
        min(&responses),
        max(&responses),
        median(&concentrations),
    ) else {
        return Err(FitError::InsufficientData);
    };

    Ok(FourPlParams {
        bottom,
        top,
        hill_slope: HILL_SLOPE_GUESS,
        ic50,
    })
}
