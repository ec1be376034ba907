//! Input preparation: dilution series, replicate handling, synthetic samples.

pub mod replicates;
pub mod sample;
pub mod series;

pub use replicates::*;
pub use sample::*;
pub use series::*;
