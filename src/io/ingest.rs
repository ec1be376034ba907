//! CSV ingest.
//!
//! Turns a two-column CSV into `(concentration, response)` vectors.
//!
//! - **Strict schema** for the two required columns (clear errors + exit code 2)
//! - **Row-level validation** (skip bad rows, but report what happened)
//! - No filtering of non-positive concentrations here; the fitter owns that rule.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;

use crate::error::AppError;

const CONCENTRATION_COLUMNS: &[&str] = &["concentration", "conc", "dose", "x"];
const RESPONSE_COLUMNS: &[&str] = &["response", "resp", "y", "value"];

/// A row-level error encountered during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Ingest output: parsed pairs plus row errors.
#[derive(Debug, Clone, Default)]
pub struct IngestedData {
    pub concentrations: Vec<f64>,
    pub responses: Vec<f64>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

/// Load `(concentration, response)` pairs from a CSV file.
pub fn load_measurements(path: &Path) -> Result<IngestedData, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display())))?;
    read_measurements(file)
}

/// Load `(concentration, response)` pairs from any CSV reader.
pub fn read_measurements<R: Read>(reader: R) -> Result<IngestedData, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);

    let conc_idx = find_column(&header_map, CONCENTRATION_COLUMNS).ok_or_else(|| {
        AppError::new(2, "CSV is missing a concentration column (expected 'concentration').")
    })?;
    let resp_idx = find_column(&header_map, RESPONSE_COLUMNS)
        .ok_or_else(|| AppError::new(2, "CSV is missing a response column (expected 'response')."))?;

    let mut out = IngestedData::default();

    for (idx, result) in reader.records().enumerate() {
        // Header is line 1.
        let line = idx + 2;
        out.rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                out.row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match (
            parse_field(&record, conc_idx, "concentration"),
            parse_field(&record, resp_idx, "response"),
        ) {
            (Ok(c), Ok(r)) => {
                out.concentrations.push(c);
                out.responses.push(r);
            }
            (Err(message), _) | (_, Err(message)) => out.row_errors.push(RowError { line, message }),
        }
    }

    Ok(out)
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports sometimes prefix the first header with a UTF-8 BOM.
    name.trim().trim_start_matches('\u{feff}').to_ascii_lowercase()
}

fn find_column(header_map: &HashMap<String, usize>, names: &[&str]) -> Option<usize> {
    names.iter().find_map(|n| header_map.get(*n).copied())
}

fn parse_field(record: &StringRecord, idx: usize, name: &str) -> Result<f64, String> {
    let raw = record
        .get(idx)
        .ok_or_else(|| format!("missing {name} field"))?;
    raw.parse::<f64>()
        .map_err(|e| format!("invalid {name} '{raw}': {e}"))
}
