//! Data models consumed and produced by the statement analyzer.

mod statements;

pub use statements::StatementStatistics;

use serde::Serialize;

/// Advice collected for one statement.
///
/// Only built when at least one rule fired, so `suggestions` is never empty.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OptimizationSuggestion {
    pub queryid: i64,
    pub query: String,
    /// Messages in rule evaluation order.
    pub suggestions: Vec<String>,
}
