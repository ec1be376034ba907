//! Domain types used throughout the fit.
//!
//! This module defines:
//!
//! - input observations (`Measurement`) and the filtered `Dataset`
//! - curve parameters, bounds and solver settings (`FourPlParams`, `ParamBounds`, `FitConfig`)
//! - fit outputs (`Outcome`, `FitReport`, `CurveGrid`, etc.)

pub mod types;

pub use types::*;
