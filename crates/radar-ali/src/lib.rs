//! Radar ALI 360 recommendation engine.
//!
//! Loads company diagnostics and solution catalogs from spreadsheet exports, ranks
//! candidate solutions per company and asks a hosted language model to pick and
//! justify the final recommendation.

pub mod config;
pub mod error;
pub mod radar;
pub mod recommendation;
pub mod telemetry;
