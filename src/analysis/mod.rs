//! Analysis modules.
//!
//! Statistics over single sample files, and the grouping that turns a
//! directory of them into plot-ready series.

pub mod aggregator;
pub mod stats;

pub use aggregator::*;
