//! Curve fitting orchestration.
//!
//! Responsibilities:
//!
//! - seed the solver from the data (`guess`)
//! - run the bounded solve and canonicalize the result (`fitter`)

pub mod fitter;
pub mod guess;

pub use fitter::*;
pub use guess::*;
