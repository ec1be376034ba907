//! Bounded Levenberg–Marquardt for small curve fits.
//!
//! We minimize `Σ r_i(p)²` with `r_i = f(x_i; p) - y_i` over a 4-vector `p`
//! constrained to a box.
//!
//! Each iteration solves the damped Gauss–Newton system as a stacked linear
//! least-squares problem (see `math::ols`):
//!
//! ```text
//! [ J       ]       [ -r ]
//! [ √μ · D  ] δ  ≈  [  0 ]
//! ```
//!
//! with `D = diag(d_j)` the running maximum of the Jacobian column norms
//! (Marquardt scaling). Iterates stay strictly inside the bounds: a
//! coordinate of `p + δ` that would reach a bound stops short of it (see
//! `ParamBounds::step_toward`). At a bound the model can degenerate (for the
//! 4PL, `ic50 = 0` makes the curve flat), so the boundary itself is never
//! evaluated as a candidate. Accepted steps shrink `μ`, rejected steps grow
//! it; if `μ` outgrows its cap without an acceptable step, the solve fails.
//!
//! Convergence (any of):
//! - relative cost reduction of an accepted step `<= ftol`
//! - step length `<= xtol · (‖p‖ + xtol)`
//! - gradient infinity norm `‖Jᵀr‖∞ <= gtol`
//!
//! Every evaluation of the residual vector counts against `max_evals`.

use log::{debug, trace};
use nalgebra::{DMatrix, DVector};

use crate::domain::{FitConfig, ParamBounds};
use crate::error::FitError;
use crate::math::solve_least_squares;

const MU_INIT: f64 = 1e-3;
const MU_DOWN: f64 = 0.1;
const MU_UP: f64 = 10.0;
const MU_MIN: f64 = 1e-15;
const MU_MAX: f64 = 1e16;
const SCALE_FLOOR: f64 = 1e-12;
/// Share of the distance to a bound that a single step may cover.
const BOUND_STEP: f64 = 0.995;

/// Converged solver state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LmSolution {
    pub x: [f64; 4],
    /// Sum of squared residuals at `x`.
    pub cost: f64,
    pub iterations: usize,
    pub evaluations: usize,
}

/// Why the solver stopped successfully.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stop {
    CostReduction,
    StepSize,
    Gradient,
}

/// Fit `model` to `(xs, ys)` starting from `x0`.
///
/// `gradient` must fill `∂model/∂p` at one `x`.
pub fn minimize<F, G>(
    xs: &[f64],
    ys: &[f64],
    x0: [f64; 4],
    bounds: &ParamBounds,
    config: &FitConfig,
    model: F,
    gradient: G,
) -> Result<LmSolution, FitError>
where
    F: Fn(f64, &[f64; 4]) -> f64,
    G: Fn(f64, &[f64; 4], &mut [f64; 4]),
{
    if xs.len() != ys.len() {
        return Err(FitError::failure("x and y must have the same length."));
    }
    if xs.len() < 4 {
        return Err(FitError::failure(
            "Improper input: the number of observations must not be less than the number of parameters.",
        ));
    }
    bounds.validate()?;
    if !bounds.contains(&x0) {
        return Err(FitError::failure("Initial guess is outside of provided bounds."));
    }

    let n = xs.len();
    let eval = |p: &[f64; 4]| -> DVector<f64> {
        DVector::from_iterator(n, xs.iter().zip(ys.iter()).map(|(&x, &y)| model(x, p) - y))
    };

    let mut x = x0;
    let mut r = eval(&x);
    let mut evaluations = 1usize;
    let mut cost = r.norm_squared();
    if !cost.is_finite() {
        return Err(FitError::failure("Residuals are not finite in the initial point."));
    }

    let mut mu = MU_INIT;
    let mut scale = [0.0_f64; 4];
    let mut jac = DMatrix::<f64>::zeros(n, 4);
    let mut row = [0.0_f64; 4];
    let mut iterations = 0usize;

    let stop = 'outer: loop {
        iterations += 1;

        for (i, &xi) in xs.iter().enumerate() {
            gradient(xi, &x, &mut row);
            for j in 0..4 {
                jac[(i, j)] = row[j];
            }
        }

        let grad = jac.tr_mul(&r);
        if grad.amax() <= config.gtol {
            break Stop::Gradient;
        }

        for j in 0..4 {
            scale[j] = scale[j].max(jac.column(j).norm()).max(SCALE_FLOOR);
        }

        loop {
            if evaluations >= config.max_evals {
                return Err(FitError::failure(
                    "Optimal parameters not found: The maximum number of function evaluations is exceeded.",
                ));
            }

            let mut a = DMatrix::<f64>::zeros(n + 4, 4);
            a.view_mut((0, 0), (n, 4)).copy_from(&jac);
            let damping = mu.sqrt();
            for j in 0..4 {
                a[(n + j, j)] = damping * scale[j];
            }
            let mut b = DVector::<f64>::zeros(n + 4);
            for i in 0..n {
                b[i] = -r[i];
            }

            let Some(delta) = solve_least_squares(&a, &b) else {
                return Err(FitError::failure(
                    "Singular system while computing the Levenberg-Marquardt step.",
                ));
            };

            let mut trial = x;
            for j in 0..4 {
                trial[j] += delta[j];
            }
            let trial = bounds.step_toward(&x, trial, BOUND_STEP);

            let step_norm = trial
                .iter()
                .zip(x.iter())
                .map(|(a, b)| (a - b) * (a - b))
                .sum::<f64>()
                .sqrt();
            let x_norm = x.iter().map(|v| v * v).sum::<f64>().sqrt();
            let small_step = step_norm <= config.xtol * (x_norm + config.xtol);

            let r_trial = eval(&trial);
            evaluations += 1;
            let cost_trial = r_trial.norm_squared();

            if cost_trial.is_finite() && cost_trial < cost {
                let reduction = (cost - cost_trial) / cost;
                trace!(
                    "lm iter {iterations}: cost {cost:.6e} -> {cost_trial:.6e} (mu={mu:.3e})"
                );
                x = trial;
                r = r_trial;
                cost = cost_trial;
                mu = (mu * MU_DOWN).max(MU_MIN);

                if cost == 0.0 || reduction <= config.ftol {
                    break 'outer Stop::CostReduction;
                }
                if small_step {
                    break 'outer Stop::StepSize;
                }
                break;
            }

            mu *= MU_UP;
            if small_step {
                break 'outer Stop::StepSize;
            }
            if mu > MU_MAX {
                debug!("lm gave up after {iterations} iterations: damping {mu:.3e}, cost {cost:.6e}");
                return Err(FitError::failure(
                    "Optimal parameters not found: The damping parameter exceeded its limit without an acceptable step.",
                ));
            }
        }
    };

    debug!(
        "lm converged ({stop:?}) after {iterations} iterations, {evaluations} evaluations, cost {cost:.6e}"
    );

    Ok(LmSolution {
        x,
        cost,
        iterations,
        evaluations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    // Linear-in-parameters toy model: y = a + b x + c x^2 + d x^3.
    fn cubic(x: f64, p: &[f64; 4]) -> f64 {
        p[0] + p[1] * x + p[2] * x * x + p[3] * x * x * x
    }

    fn cubic_grad(x: f64, _p: &[f64; 4], out: &mut [f64; 4]) {
        *out = [1.0, x, x * x, x * x * x];
    }

    fn unbounded() -> ParamBounds {
        ParamBounds {
            lower: [f64::NEG_INFINITY; 4],
            upper: [f64::INFINITY; 4],
        }
    }

    #[test]
    fn recovers_polynomial_coefficients() {
        let truth = [1.0, -2.0, 0.5, 0.25];
        let xs: Vec<f64> = (0..12).map(|i| -2.0 + i as f64 * 0.4).collect();
        let ys: Vec<f64> = xs.iter().map(|&x| cubic(x, &truth)).collect();

        let sol = minimize(
            &xs,
            &ys,
            [0.0; 4],
            &unbounded(),
            &FitConfig::default(),
            cubic,
            cubic_grad,
        )
        .unwrap();

        for (a, b) in sol.x.iter().zip(truth.iter()) {
            assert!((a - b).abs() < 1e-6, "got {:?}", sol.x);
        }
        assert!(sol.cost < 1e-12);
    }

    // Each parameter drives its own subset of points (x mod 4).
    fn selector(x: f64, p: &[f64; 4]) -> f64 {
        p[x as usize % 4]
    }

    fn selector_grad(x: f64, _p: &[f64; 4], out: &mut [f64; 4]) {
        *out = [0.0; 4];
        out[x as usize % 4] = 1.0;
    }

    #[test]
    fn respects_bounds() {
        // Unconstrained optimum has p[0] = 5; cap it at 2.
        let truth = [5.0, 1.0, -1.0, 3.0];
        let xs: Vec<f64> = (0..8).map(|i| i as f64).collect();
        let ys: Vec<f64> = xs.iter().map(|&x| selector(x, &truth)).collect();
        let mut bounds = unbounded();
        bounds.upper[0] = 2.0;

        let sol = minimize(
            &xs,
            &ys,
            [0.0; 4],
            &bounds,
            &FitConfig::default(),
            selector,
            selector_grad,
        )
        .unwrap();
        assert!(bounds.contains(&sol.x));
        assert!(sol.x[0] < 2.0, "iterate reached the bound: {:?}", sol.x);
        assert!((sol.x[0] - 2.0).abs() < 1e-9, "got {:?}", sol.x);
        for j in 1..4 {
            assert!((sol.x[j] - truth[j]).abs() < 1e-6, "got {:?}", sol.x);
        }
    }

    #[test]
    fn evaluation_cap_is_enforced() {
        let truth = [1.0, -2.0, 0.5, 0.25];
        let xs: Vec<f64> = (0..12).map(|i| -2.0 + i as f64 * 0.4).collect();
        let ys: Vec<f64> = xs.iter().map(|&x| cubic(x, &truth)).collect();
        let config = FitConfig {
            max_evals: 1,
            ..FitConfig::default()
        };

        let err = minimize(&xs, &ys, [0.0; 4], &unbounded(), &config, cubic, cubic_grad).unwrap_err();
        assert!(matches!(err, FitError::FitFailure(ref m) if m.contains("maximum number of function evaluations")));
    }

    #[test]
    fn exhausted_damping_is_a_failure() {
        // An ascent "gradient": every proposed step moves away from the data.
        fn inverted_grad(x: f64, p: &[f64; 4], out: &mut [f64; 4]) {
            selector_grad(x, p, out);
            for v in out.iter_mut() {
                *v = -*v;
            }
        }
        let xs: Vec<f64> = (0..8).map(|i| i as f64).collect();
        let ys = vec![1.0; xs.len()];
        let config = FitConfig {
            xtol: 0.0,
            ..FitConfig::default()
        };

        let err = minimize(&xs, &ys, [0.0; 4], &unbounded(), &config, selector, inverted_grad).unwrap_err();
        assert!(matches!(err, FitError::FitFailure(ref m) if m.contains("damping")), "{err:?}");
    }

    #[test]
    fn rejects_infeasible_start_and_bad_bounds() {
        let xs = [0.0, 1.0, 2.0, 3.0];
        let ys = [0.0, 1.0, 2.0, 3.0];
        let mut bounds = unbounded();
        bounds.lower[1] = 1.0;
        let err = minimize(&xs, &ys, [0.0; 4], &bounds, &FitConfig::default(), cubic, cubic_grad)
            .unwrap_err();
        assert!(matches!(err, FitError::FitFailure(_)));

        bounds.upper[1] = 0.5;
        let err = minimize(&xs, &ys, [0.0, 1.0, 0.0, 0.0], &bounds, &FitConfig::default(), cubic, cubic_grad)
            .unwrap_err();
        assert!(matches!(err, FitError::FitFailure(ref m) if m.contains("lower bound")));
    }
}
