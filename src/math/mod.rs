//! Mathematical utilities: linear least squares, descriptive statistics and
//! the bounded Levenberg–Marquardt solver.

pub mod lm;
pub mod ols;
pub mod stats;

pub use lm::*;
pub use ols::*;
pub use stats::*;
