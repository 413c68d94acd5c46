//! sqlspot-core - query log and statement statistics analysis.
//!
//! Provides:
//! - `log`: application query log parsing (line envelope, fields, duration literals)
//! - `callsite`: per-call-site aggregation and hot/slow filtering
//! - `model`: pg_stat_statements record and optimization suggestion types
//! - `analysis`: heuristic rules over statement statistics
//! - `collector`: statement statistics sources (PostgreSQL, JSON file)
//! - `fmt`: plain-text report rendering
//!
//! The two pipelines share no state: log lines go through `log` and
//! `callsite`; statement statistics go through `analysis`.

pub mod analysis;
pub mod callsite;
pub mod collector;
pub mod fmt;
pub mod log;
pub mod model;

/// Short git SHA of the build, or `unknown`.
pub const GIT_SHA: &str = env!("GIT_SHA");
