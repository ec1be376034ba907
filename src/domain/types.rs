//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during fitting
//! - exported to JSON/CSV
//! - handed back to an embedding host as a single outcome value

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::FitError;

/// Minimum number of valid pairs for a four-parameter fit.
pub const MIN_POINTS: usize = 4;

/// One (concentration, response) observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub concentration: f64,
    pub response: f64,
}

/// Measurements that survived filtering and are safe to fit.
///
/// Only constructed through [`Dataset::from_pairs`], so holding one means:
/// - every concentration is strictly positive
/// - there are at least [`MIN_POINTS`] pairs
/// - every value is finite
#[derive(Debug, Clone)]
pub struct Dataset {
    points: Vec<Measurement>,
    dropped: usize,
}

impl Dataset {
    /// Pair up and filter raw observations.
    ///
    /// Pairs whose concentration is not `> 0` are dropped silently before the
    /// count check (this also drops NaN concentrations).
    pub fn from_pairs(concentrations: &[f64], responses: &[f64]) -> Result<Self, FitError> {
        if concentrations.len() != responses.len() {
            return Err(FitError::failure(format!(
                "concentrations and responses must have the same length (got {} and {})",
                concentrations.len(),
                responses.len()
            )));
        }

        let points: Vec<Measurement> = concentrations
            .iter()
            .zip(responses.iter())
            .filter(|(c, _)| **c > 0.0)
            .map(|(&concentration, &response)| Measurement {
                concentration,
                response,
            })
            .collect();
        let dropped = concentrations.len() - points.len();

        if points.len() < MIN_POINTS {
            return Err(FitError::InsufficientData);
        }

        if points
            .iter()
            .any(|p| !p.concentration.is_finite() || !p.response.is_finite())
        {
            return Err(FitError::failure("array must not contain infs or NaNs"));
        }

        Ok(Self { points, dropped })
    }

    pub fn points(&self) -> &[Measurement] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of input pairs removed for a non-positive concentration.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn concentrations(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.concentration).collect()
    }

    pub fn responses(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.response).collect()
    }
}

/// Parameters of the four-parameter logistic curve.
///
/// Stored in solver order: `[bottom, top, hill_slope, ic50]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FourPlParams {
    pub bottom: f64,
    pub top: f64,
    pub hill_slope: f64,
    pub ic50: f64,
}

impl FourPlParams {
    pub fn to_array(self) -> [f64; 4] {
        [self.bottom, self.top, self.hill_slope, self.ic50]
    }

    pub fn from_array(v: [f64; 4]) -> Self {
        Self {
            bottom: v[0],
            top: v[1],
            hill_slope: v[2],
            ic50: v[3],
        }
    }

    /// Return a copy with `top >= bottom`, swapping the asymptotes if needed.
    ///
    /// The Hill slope is left untouched, so a swapped result no longer
    /// describes the same curve under the model equation.
    pub fn with_ordered_asymptotes(self) -> Self {
        if self.top < self.bottom {
            Self {
                bottom: self.top,
                top: self.bottom,
                ..self
            }
        } else {
            self
        }
    }
}

/// Box constraints on `[bottom, top, hill_slope, ic50]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamBounds {
    pub lower: [f64; 4],
    pub upper: [f64; 4],
}

impl ParamBounds {
    /// Bounds used for every dose-response fit.
    pub fn dose_response() -> Self {
        Self {
            lower: [f64::NEG_INFINITY, f64::NEG_INFINITY, -100.0, 0.0],
            upper: [f64::INFINITY, f64::INFINITY, 100.0, f64::INFINITY],
        }
    }

    /// Reject bounds where some lower limit is not strictly below its upper limit.
    pub fn validate(&self) -> Result<(), FitError> {
        for (lo, hi) in self.lower.iter().zip(self.upper.iter()) {
            if lo.is_nan() || hi.is_nan() || lo >= hi {
                return Err(FitError::failure(
                    "Each lower bound must be strictly less than each upper bound.",
                ));
            }
        }
        Ok(())
    }

    pub fn contains(&self, x: &[f64; 4]) -> bool {
        x.iter()
            .zip(self.lower.iter().zip(self.upper.iter()))
            .all(|(v, (lo, hi))| *v >= *lo && *v <= *hi)
    }

    /// Move from `from` toward `to` without touching the boundary.
    ///
    /// A coordinate of `to` that reaches or crosses a bound is replaced by a
    /// point `fraction` of the way from `from` to that bound, so an interior
    /// `from` always yields an interior result.
    pub fn step_toward(&self, from: &[f64; 4], to: [f64; 4], fraction: f64) -> [f64; 4] {
        let mut out = to;
        for i in 0..4 {
            if out[i] <= self.lower[i] {
                out[i] = from[i] + fraction * (self.lower[i] - from[i]);
            } else if out[i] >= self.upper[i] {
                out[i] = from[i] + fraction * (self.upper[i] - from[i]);
            }
        }
        out
    }
}

/// Solver settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitConfig {
    /// Cap on model evaluations over the whole dataset.
    pub max_evals: usize,
    /// Relative cost reduction below which the solve is converged.
    pub ftol: f64,
    /// Relative step size below which the solve is converged.
    pub xtol: f64,
    /// Gradient infinity norm below which the solve is converged.
    pub gtol: f64,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            max_evals: 10_000,
            ftol: 1e-10,
            xtol: 1e-10,
            gtol: 1e-12,
        }
    }
}

/// Diagnostics of a converged solve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FitQuality {
    pub sse: f64,
    pub rmse: f64,
    pub iterations: usize,
    pub evaluations: usize,
}

/// Everything a single fit produced.
#[derive(Debug, Clone)]
pub struct FitReport {
    pub initial: FourPlParams,
    /// Final parameters with the asymptotes already ordered.
    pub params: FourPlParams,
    /// Parameters of the curve the solver actually fitted. Equal to `params`
    /// unless the asymptotes were swapped; residuals and curve grids use these.
    pub solved: FourPlParams,
    /// True when the solver ended with `top < bottom` and the pair was swapped.
    pub swapped: bool,
    pub quality: FitQuality,
    pub dataset: Dataset,
}

/// Result of a fit as reported to a host.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Success(FourPlParams),
    Failure(String),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    pub fn params(&self) -> Option<&FourPlParams> {
        match self {
            Outcome::Success(p) => Some(p),
            Outcome::Failure(_) => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Outcome::Success(_) => None,
            Outcome::Failure(message) => Some(message),
        }
    }
}

impl From<Result<FourPlParams, FitError>> for Outcome {
    fn from(value: Result<FourPlParams, FitError>) -> Self {
        match value {
            Ok(params) => Outcome::Success(params),
            Err(err) => Outcome::Failure(err.to_string()),
        }
    }
}

impl Serialize for Outcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Outcome::Success(p) => {
                let mut map = serializer.serialize_map(Some(5))?;
                map.serialize_entry("success", &true)?;
                map.serialize_entry("ic50", &p.ic50)?;
                map.serialize_entry("hillSlope", &p.hill_slope)?;
                map.serialize_entry("top", &p.top)?;
                map.serialize_entry("bottom", &p.bottom)?;
                map.end()
            }
            Outcome::Failure(message) => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("success", &false)?;
                map.serialize_entry("error", message)?;
                map.end()
            }
        }
    }
}

/// Sampled fitted curve (for plots and exports).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CurveGrid {
    pub concentration: Vec<f64>,
    pub response: Vec<f64>,
}

impl CurveGrid {
    pub fn len(&self) -> usize {
        self.concentration.len()
    }

    pub fn is_empty(&self) -> bool {
        self.concentration.is_empty()
    }

    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.concentration
            .iter()
            .copied()
            .zip(self.response.iter().copied())
    }
}

/// Portable representation of a fitted curve (written by `dose fit --export-curve-json`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurveFile {
    pub tool: String,
    /// Parameters of the plotted curve, as solved (asymptotes not reordered).
    pub params: FourPlParams,
    pub sse: f64,
    pub rmse: f64,
    pub observations: Vec<Measurement>,
    pub grid: CurveGrid,
}

/// Fitted value and residual for one used observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PointResidual {
    pub point: Measurement,
    pub fitted: f64,
    pub residual: f64,
}
