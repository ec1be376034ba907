//! 4PL model implementation.
//!
//! The model is implemented as small, pure functions so that the solver and
//! reporting code can stay generic.

pub mod model;

pub use model::*;
