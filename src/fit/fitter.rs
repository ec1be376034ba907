//! Dose-response fitting.
//!
//! Given paired concentrations and responses we:
//! - drop pairs with a non-positive concentration
//! - require at least four remaining pairs
//! - seed the solver from min/max/median of the data
//! - run bounded Levenberg–Marquardt against the 4PL model
//! - order the asymptotes so that `top >= bottom`
//!
//! Every path ends in a value: `Result<FitReport, FitError>` for Rust callers,
//! `Outcome` for hosts that only want the wire result.

use log::{debug, info, warn};

use crate::domain::{Dataset, FitConfig, FitQuality, FitReport, FourPlParams, Outcome, ParamBounds};
use crate::error::FitError;
use crate::fit::guess::initial_guess;
use crate::math::lm::minimize;
use crate::models::{fill_gradient, predict_raw};

/// Fit with default solver settings and report the outcome.
pub fn fit(concentrations: &[f64], responses: &[f64]) -> Outcome {
    fit_with_config(concentrations, responses, &FitConfig::default())
}

/// Fit with explicit solver settings and report the outcome.
pub fn fit_with_config(concentrations: &[f64], responses: &[f64], config: &FitConfig) -> Outcome {
    fit_dose_response(concentrations, responses, config)
        .map(|report| report.params)
        .into()
}

/// Fit a 4PL curve and return the full report.
pub fn fit_dose_response(
    concentrations: &[f64],
    responses: &[f64],
    config: &FitConfig,
) -> Result<FitReport, FitError> {
    let dataset = Dataset::from_pairs(concentrations, responses)?;
    if dataset.dropped() > 0 {
        debug!(
            "dropped {} pair(s) with non-positive concentration, {} remain",
            dataset.dropped(),
            dataset.len()
        );
    }

    let initial = initial_guess(&dataset)?;
    debug!(
        "initial guess: bottom={} top={} hill_slope={} ic50={}",
        initial.bottom, initial.top, initial.hill_slope, initial.ic50
    );

    let xs = dataset.concentrations();
    let ys = dataset.responses();
    let solution = minimize(
        &xs,
        &ys,
        initial.to_array(),
        &ParamBounds::dose_response(),
        config,
        predict_raw,
        fill_gradient,
    )?;

    let solved = FourPlParams::from_array(solution.x);
    let params = solved.with_ordered_asymptotes();
    let swapped = solved.top < solved.bottom;
    if swapped {
        warn!(
            "solver returned top < bottom ({} < {}); swapping asymptotes",
            solved.top, solved.bottom
        );
    }

    let quality = FitQuality {
        sse: solution.cost,
        rmse: (solution.cost / dataset.len() as f64).sqrt(),
        iterations: solution.iterations,
        evaluations: solution.evaluations,
    };
    info!(
        "4PL fit on {} points: ic50={:.6} hill_slope={:.4} top={:.4} bottom={:.4} rmse={:.4e}",
        dataset.len(),
        params.ic50,
        params.hill_slope,
        params.top,
        params.bottom,
        quality.rmse
    );

    Ok(FitReport {
        initial,
        params,
        solved,
        swapped,
        quality,
        dataset,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::sample::{SampleSpec, generate_sample};
    use crate::error::INSUFFICIENT_DATA_MESSAGE;
    use crate::models::predict;

    const CONC: [f64; 8] = [0.1, 0.3, 1.0, 3.0, 10.0, 30.0, 100.0, 300.0];

    fn synth(p: &FourPlParams, xs: &[f64]) -> Vec<f64> {
        xs.iter().map(|&x| predict(x, p)).collect()
    }

    fn rel_close(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() <= tol * b.abs().max(1e-12)
    }

    #[test]
    fn recovers_noise_free_parameters() {
        let truth = FourPlParams {
            bottom: 10.0,
            top: 100.0,
            hill_slope: 1.5,
            ic50: 5.0,
        };
        let resp = synth(&truth, &CONC);

        let outcome = fit(&CONC, &resp);
        let p = outcome.params().copied().unwrap();
        assert!(rel_close(p.bottom, truth.bottom, 1e-3), "{p:?}");
        assert!(rel_close(p.top, truth.top, 1e-3), "{p:?}");
        assert!(rel_close(p.hill_slope, truth.hill_slope, 1e-3), "{p:?}");
        assert!(rel_close(p.ic50, truth.ic50, 1e-3), "{p:?}");
    }

    #[test]
    fn report_carries_guess_and_quality() {
        let truth = FourPlParams {
            bottom: 0.0,
            top: 1.0,
            hill_slope: 0.8,
            ic50: 20.0,
        };
        let resp = synth(&truth, &CONC);
        let report = fit_dose_response(&CONC, &resp, &FitConfig::default()).unwrap();

        assert_eq!(report.initial.hill_slope, 1.0);
        assert_eq!(report.initial.ic50, 6.5);
        assert_eq!(report.dataset.len(), CONC.len());
        assert!(report.quality.sse < 1e-10);
        assert!(report.quality.evaluations <= FitConfig::default().max_evals);
        assert!(!report.swapped);
    }

    #[test]
    fn too_few_points_is_insufficient_data() {
        let outcome = fit(&[1.0, 2.0], &[0.1, 0.2]);
        assert_eq!(outcome, Outcome::Failure(INSUFFICIENT_DATA_MESSAGE.to_string()));
    }

    #[test]
    fn non_positive_concentrations_are_dropped_before_counting() {
        let truth = FourPlParams {
            bottom: 10.0,
            top: 100.0,
            hill_slope: 1.5,
            ic50: 3.0,
        };
        let kept = [1.0, 2.0, 4.0, 8.0];
        let kept_resp = synth(&truth, &kept);
        let conc = [-1.0, 0.0, kept[0], kept[1], kept[2], kept[3]];
        let resp = [50.0, 50.0, kept_resp[0], kept_resp[1], kept_resp[2], kept_resp[3]];

        let report = fit_dose_response(&conc, &resp, &FitConfig::default()).unwrap();
        assert_eq!(report.dataset.len(), 4);
        assert_eq!(report.dataset.dropped(), 2);
        assert_eq!(report.initial.bottom, kept_resp[3]);
        assert_eq!(report.initial.top, kept_resp[0]);
        assert_eq!(report.initial.ic50, 3.0);
        assert!(report.quality.sse < 1e-8, "{:?}", report.quality);

        let conc = [-1.0, 0.0, 1.0, 2.0, 4.0];
        let resp = [0.5, 0.4, 0.3, 0.2, 0.1];
        assert_eq!(
            fit(&conc, &resp).error(),
            Some(INSUFFICIENT_DATA_MESSAGE)
        );
    }

    #[test]
    fn increasing_curve_still_reports_top_above_bottom() {
        // bottom > top with a positive slope gives a response that rises with dose.
        let truth = FourPlParams {
            bottom: 100.0,
            top: 0.0,
            hill_slope: 1.0,
            ic50: 2.0,
        };
        let resp = synth(&truth, &CONC);

        let report = fit_dose_response(&CONC, &resp, &FitConfig::default()).unwrap();
        let p = report.params;
        assert!(p.top >= p.bottom, "{p:?}");
        assert!(rel_close(p.top, 100.0, 1e-2), "{p:?}");
        assert!(p.bottom.abs() < 1.0, "{p:?}");
        assert!(rel_close(p.ic50, 2.0, 1e-2), "{p:?}");
    }

    #[test]
    fn swapped_report_keeps_the_solved_curve() {
        let truth = FourPlParams {
            bottom: 100.0,
            top: 0.0,
            hill_slope: 1.0,
            ic50: 2.0,
        };
        let resp = synth(&truth, &CONC);
        let report = fit_dose_response(&CONC, &resp, &FitConfig::default()).unwrap();

        if report.swapped {
            assert_eq!(report.params.top, report.solved.bottom);
            assert_eq!(report.params.bottom, report.solved.top);
        } else {
            assert_eq!(report.params, report.solved);
        }
        assert_eq!(report.params.hill_slope, report.solved.hill_slope);

        // Residuals against the solved curve reproduce the reported SSE.
        let sse: f64 = report
            .dataset
            .points()
            .iter()
            .map(|m| (m.response - predict(m.concentration, &report.solved)).powi(2))
            .sum();
        assert!((sse - report.quality.sse).abs() <= 1e-9 * (1.0 + report.quality.sse), "{sse} vs {:?}", report.quality);
    }

    #[test]
    fn recovers_ic50_near_the_lowest_concentration() {
        let truth = FourPlParams {
            bottom: 1000.0,
            top: 2000.0,
            hill_slope: 1.0,
            ic50: 1e-3,
        };
        let conc: Vec<f64> = (0..12).map(|i| 1e-4 * 10f64.powf(7.0 * i as f64 / 11.0)).collect();
        let resp = synth(&truth, &conc);

        let report = fit_dose_response(&conc, &resp, &FitConfig::default()).unwrap();
        let p = report.params;
        assert!(p.ic50 > 0.0, "{p:?}");
        assert!(rel_close(p.ic50, truth.ic50, 1e-3), "{p:?}");
        assert!(rel_close(p.hill_slope, truth.hill_slope, 1e-3), "{p:?}");
        assert!(rel_close(p.top, truth.top, 1e-3), "{p:?}");
        assert!(rel_close(p.bottom, truth.bottom, 1e-3), "{p:?}");
        assert!(report.quality.sse < 1e-6, "{:?}", report.quality);
    }

    #[test]
    fn step_response_drives_hill_slope_toward_its_bound() {
        let conc = [1.0, 2.0, 3.0, 4.0, 6.0, 7.0, 8.0, 9.0];
        let resp = [100.0, 100.0, 100.0, 100.0, 0.0, 0.0, 0.0, 0.0];

        let report = fit_dose_response(&conc, &resp, &FitConfig::default()).unwrap();
        let p = report.params;
        assert!(p.hill_slope > 10.0 && p.hill_slope < 100.0, "{p:?}");
        assert!(p.ic50 > 4.0 && p.ic50 < 6.0, "{p:?}");
        assert!(report.quality.sse < 1.0, "{:?}", report.quality);
    }

    #[test]
    fn flat_response_fits_without_error() {
        let resp = [5.0; 8];
        let p = fit(&CONC, &resp).params().copied().unwrap();
        assert_eq!(p.top, 5.0);
        assert_eq!(p.bottom, 5.0);
    }

    #[test]
    fn noisy_fits_stay_within_bounds() {
        for seed in 0..10 {
            let sample = generate_sample(&SampleSpec {
                seed,
                noise_sd: 8.0,
                ..SampleSpec::default()
            })
            .unwrap();
            let report = fit_dose_response(&sample.concentrations, &sample.responses, &FitConfig::default())
                .unwrap_or_else(|e| panic!("seed {seed}: {e}"));
            let p = report.params;
            assert!(p.top >= p.bottom, "seed {seed}: {p:?}");
            assert!(p.hill_slope > -100.0 && p.hill_slope < 100.0, "seed {seed}: {p:?}");
            assert!(p.ic50 > 0.0, "seed {seed}: {p:?}");
            assert!(rel_close(p.ic50, 1.0, 0.5), "seed {seed}: {p:?}");
        }
    }

    #[test]
    fn evaluation_cap_surfaces_as_failure() {
        let truth = FourPlParams {
            bottom: 10.0,
            top: 100.0,
            hill_slope: 1.5,
            ic50: 5.0,
        };
        let resp = synth(&truth, &CONC);
        let config = FitConfig {
            max_evals: 2,
            ..FitConfig::default()
        };
        let outcome = fit_with_config(&CONC, &resp, &config);
        assert!(!outcome.is_success());
        assert!(outcome.error().unwrap().contains("maximum number of function evaluations"));
    }

    #[test]
    fn repeated_fits_are_identical() {
        let sample = generate_sample(&SampleSpec::default()).unwrap();
        let a = fit(&sample.concentrations, &sample.responses);
        let b = fit(&sample.concentrations, &sample.responses);
        assert_eq!(a, b);
    }
}
