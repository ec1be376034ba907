//! JSON payloads exchanged with an embedding host.
//!
//! Inputs are two JSON arrays of numbers; the output is a single JSON object
//! (see `domain::Outcome`). `analyze_dose_response` is the string-in,
//! string-out entry point: it never panics and never returns an error value,
//! failures are encoded in the returned object.

use crate::domain::{FitConfig, Outcome};
use crate::error::FitError;
use crate::fit::fit_with_config;

/// Parse a JSON array of numbers.
pub fn parse_numeric_array(json: &str) -> Result<Vec<f64>, FitError> {
    serde_json::from_str::<Vec<f64>>(json)
        .map_err(|e| FitError::failure(format!("could not parse numeric array: {e}")))
}

/// Serialize an outcome to its JSON wire form.
pub fn outcome_to_json(outcome: &Outcome) -> String {
    match serde_json::to_string(outcome) {
        Ok(s) => s,
        Err(e) => {
            let fallback = Outcome::Failure(format!("could not serialize outcome: {e}"));
            serde_json::to_value(&fallback)
                .map(|v| v.to_string())
                .unwrap_or_else(|_| String::from(r#"{"success":false,"error":"serialization failed"}"#))
        }
    }
}

/// Parse both arrays, fit, and serialize the outcome.
pub fn analyze_dose_response(concentrations_json: &str, responses_json: &str) -> String {
    analyze_dose_response_with_config(concentrations_json, responses_json, &FitConfig::default())
}

pub fn analyze_dose_response_with_config(
    concentrations_json: &str,
    responses_json: &str,
    config: &FitConfig,
) -> String {
    let outcome = match (
        parse_numeric_array(concentrations_json),
        parse_numeric_array(responses_json),
    ) {
        (Ok(c), Ok(r)) => fit_with_config(&c, &r, config),
        (Err(e), _) | (_, Err(e)) => Outcome::Failure(e.to_string()),
    };
    outcome_to_json(&outcome)
}
