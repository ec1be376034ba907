//! Input/output helpers.
//!
//! - JSON array payloads and the outcome wire format (`payload`)
//! - CSV ingest (`ingest`)
//! - result exports (CSV) (`export`)
//! - curve JSON read/write (`curve`)

pub mod curve;
pub mod export;
pub mod ingest;
pub mod payload;

pub use curve::*;
pub use export::*;
pub use ingest::*;
pub use payload::*;
