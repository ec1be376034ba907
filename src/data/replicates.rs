//! Plate readout helpers: percent normalization and replicate averaging.
//!
//! Raw readouts are laid out in consecutive blocks, one block of `replicates`
//! wells per concentration, in the same order as the concentration list.

use crate::domain::Measurement;
use crate::error::AppError;

/// Scale raw values to percent of a control window: `(v - blank) / range * 100`.
///
/// A zero range maps every value to `0.0`.
pub fn normalize_percent(raw: &[f64], blank: f64, range: f64) -> Vec<f64> {
    raw.iter()
        .map(|&v| if range != 0.0 { (v - blank) / range * 100.0 } else { 0.0 })
        .collect()
}

/// Average each replicate block into one measurement per concentration.
pub fn average_replicates(concentrations: &[f64], raw: &[f64]) -> Result<Vec<Measurement>, AppError> {
    let mismatch = || {
        AppError::new(
            2,
            format!(
                "Data mismatch: The number of data points ({}) is not an even multiple of the number of concentrations ({}).",
                raw.len(),
                concentrations.len()
            ),
        )
    };

    if concentrations.is_empty() || raw.is_empty() {
        return Err(mismatch());
    }
    let replicates = raw.len() / concentrations.len();
    if replicates == 0 || concentrations.len() * replicates != raw.len() {
        return Err(mismatch());
    }

    Ok(concentrations
        .iter()
        .zip(raw.chunks(replicates))
        .map(|(&concentration, block)| Measurement {
            concentration,
            response: block.iter().sum::<f64>() / replicates as f64,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn averages_consecutive_blocks() {
        let conc = [10.0, 1.0, 0.1];
        let raw = [90.0, 92.0, 50.0, 54.0, 10.0, 12.0];
        let m = average_replicates(&conc, &raw).unwrap();
        assert_eq!(m.len(), 3);
        assert_eq!(m[0].concentration, 10.0);
        assert_eq!(m[0].response, 91.0);
        assert_eq!(m[1].response, 52.0);
        assert_eq!(m[2].response, 11.0);
    }

    #[test]
    fn rejects_uneven_layout() {
        let err = average_replicates(&[1.0, 2.0], &[1.0, 2.0, 3.0]).unwrap_err();
        assert!(err.to_string().contains("not an even multiple"));
        assert!(average_replicates(&[1.0, 2.0, 3.0], &[1.0]).is_err());
        assert!(average_replicates(&[], &[1.0]).is_err());
    }

    #[test]
    fn normalizes_against_blank_and_range() {
        let v = normalize_percent(&[5.0, 55.0, 105.0], 5.0, 100.0);
        assert_eq!(v, vec![0.0, 50.0, 100.0]);
        assert_eq!(normalize_percent(&[1.0, 2.0], 0.0, 0.0), vec![0.0, 0.0]);
    }
}
