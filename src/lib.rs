//! `dose-curves` library crate.
//!
//! Fits a four-parameter logistic (4PL) dose-response curve to paired
//! concentration/response measurements.
//!
//! The binary (`dose`) is a thin wrapper around this library so that:
//!
//! - the fit is callable from any host (`fit`, `analyze_dose_response`)
//! - core logic is testable without spawning processes

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod models;
pub mod plot;
pub mod report;

pub use domain::{FitConfig, FourPlParams, Outcome};
pub use error::FitError;
pub use fit::{fit, fit_dose_response, fit_with_config};
pub use io::analyze_dose_response;
