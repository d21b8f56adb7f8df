//! Daily aggregation and pass-through regression.
//!
//! This module collapses station-level price observations into a daily
//! panel, fits OLS lines of retail price against the benchmark, and samples
//! those lines for charting. Nothing here touches the filesystem.

pub mod aggregate;
pub mod regression;
pub mod sampler;
pub mod types;
pub mod utility;
