//! Four-parameter logistic (Hill) model.
//!
//! ```text
//! f(x) = bottom + (top - bottom) / (1 + (x / ic50)^hill_slope)
//! ```
//!
//! The fitter relies on two primitive operations:
//! - predict `f(x)` for residuals and plots
//! - fill the partial derivatives of `f` for one `x` (a Jacobian row)
//!
//! Both are written in terms of `s = 1 / (1 + u)`, `u = (x / ic50)^hill_slope`.
//! That keeps the derivatives finite when `u` overflows to infinity (`s → 0`).
//! `ic50 == 0` is not special-cased; IEEE semantics apply.

use crate::domain::FourPlParams;

/// Evaluate the 4PL curve at `x`.
pub fn predict(x: f64, p: &FourPlParams) -> f64 {
    p.bottom + (p.top - p.bottom) / (1.0 + (x / p.ic50).powf(p.hill_slope))
}

/// Same as [`predict`] but on the solver's array layout.
pub fn predict_raw(x: f64, v: &[f64; 4]) -> f64 {
    predict(x, &FourPlParams::from_array(*v))
}

/// Fill `∂f/∂[bottom, top, hill_slope, ic50]` at `x`.
///
/// Entries that are not finite (e.g. `ln(x / 0)` at a zero IC50) are written
/// as `0.0`: the model is locally insensitive to that parameter there.
pub fn fill_gradient(x: f64, v: &[f64; 4], out: &mut [f64; 4]) {
    let [bottom, top, hill, ic50] = *v;
    let ratio = x / ic50;
    let u = ratio.powf(hill);
    let s = 1.0 / (1.0 + u);
    // u / (1 + u)^2 written without `u`.
    let w = s * (1.0 - s);
    let span = top - bottom;

    out[0] = 1.0 - s;
    out[1] = s;
    out[2] = -span * w * ratio.ln();
    out[3] = span * w * hill / ic50;

    for g in out.iter_mut() {
        if !g.is_finite() {
            *g = 0.0;
        }
    }
}
