//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the math/fitting code stays clean and testable
//! - output changes are localized

use crate::domain::{FitReport, FourPlParams, PointResidual};

/// Format the fit summary (dataset, starting point, result, quality).
pub fn format_fit_summary(report: &FitReport) -> String {
    let mut out = String::new();

    out.push_str("=== dose - 4PL Dose-Response Fit ===\n");
    out.push_str(&format!(
        "Points: n={} (dropped {} with concentration <= 0)\n",
        report.dataset.len(),
        report.dataset.dropped()
    ));

    out.push_str("\nInitial guess:\n");
    out.push_str(&format_params(&report.initial));

    out.push_str("\nFitted parameters:\n");
    out.push_str(&format_params(&report.params));
    if report.swapped {
        out.push_str("  (top/bottom swapped so that top >= bottom)\n");
        out.push_str("\nSolved curve (used for residuals and plot):\n");
        out.push_str(&format_params(&report.solved));
    }

    out.push_str(&format!(
        "\nQuality: SSE={:.6e} RMSE={:.6e} | iterations={} evaluations={}\n",
        report.quality.sse,
        report.quality.rmse,
        report.quality.iterations,
        report.quality.evaluations
    ));

    out
}

fn format_params(p: &FourPlParams) -> String {
    format!(
        "- IC50/EC50: {}\n- HillSlope: {:.2}\n- Top     : {:.4}\n- Bottom  : {:.4}\n",
        fmt_sig(p.ic50, 3),
        p.hill_slope,
        p.top,
        p.bottom
    )
}

/// Format the per-point residual table.
pub fn format_residuals(rows: &[PointResidual]) -> String {
    let mut out = String::new();
    out.push_str(
        format!(
            "{:>14} {:>12} {:>12} {:>12}\n",
            "concentration", "response", "fitted", "residual"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(format!("{:-<14} {:-<12} {:-<12} {:-<12}", "", "", "", "").trim_end());
    out.push('\n');

    for r in rows {
        out.push_str(
            format!(
                "{:>14} {:>12.4} {:>12.4} {:>12.4}",
                fmt_sig(r.point.concentration, 4),
                r.point.response,
                r.fitted,
                r.residual
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out
}

/// Format with `digits` significant figures.
fn fmt_sig(v: f64, digits: usize) -> String {
    if v == 0.0 || !v.is_finite() {
        return format!("{v}");
    }
    let magnitude = v.abs().log10().floor() as i32;
    if !(-4..6).contains(&magnitude) {
        return format!("{v:.prec$e}", prec = digits.saturating_sub(1));
    }
    let decimals = (digits as i32 - 1 - magnitude).max(0) as usize;
    format!("{v:.decimals$}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FitConfig, Measurement};
    use crate::fit::fit_dose_response;

    #[test]
    fn sig_figs() {
        assert_eq!(fmt_sig(12.3456, 3), "12.3");
        assert_eq!(fmt_sig(0.012345, 3), "0.0123");
        assert_eq!(fmt_sig(1234.4, 3), "1234");
        assert_eq!(fmt_sig(0.0, 3), "0");
        assert_eq!(fmt_sig(1.5e-7, 3), "1.50e-7");
    }

    #[test]
    fn summary_mentions_parameters() {
        let conc = [0.0, 0.1, 0.3, 1.0, 3.0, 10.0, 30.0, 100.0, 300.0];
        let resp = [100.0, 99.0, 97.1, 90.9, 76.9, 50.0, 25.0, 9.1, 3.2];
        let report = fit_dose_response(&conc, &resp, &FitConfig::default()).unwrap();
        let txt = format_fit_summary(&report);
        assert!(txt.contains("Points: n=8 (dropped 1"));
        assert!(txt.contains("IC50/EC50"));
        assert!(txt.contains("HillSlope"));
    }

    #[test]
    fn residual_table_has_one_row_per_point() {
        let rows = [PointResidual {
            point: Measurement {
                concentration: 1.0,
                response: 2.0,
            },
            fitted: 1.5,
            residual: 0.5,
        }];
        let txt = format_residuals(&rows);
        assert_eq!(txt.lines().count(), 3);
        assert!(txt.lines().last().unwrap().ends_with("0.5000"));
    }
}
