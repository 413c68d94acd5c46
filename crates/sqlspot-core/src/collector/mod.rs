//! Statement statistics sources.
//!
//! The analyzer only consumes a slice of [`StatementStatistics`]; where the
//! records come from is decided here:
//!
//! - [`PostgresSource`]: live `pg_stat_statements` over a PostgreSQL connection
//!   (`postgres` feature)
//! - [`JsonFileSource`]: records previously serialized to a JSON array
//!
//! Every source returns records ordered by call count, descending.

mod json;
#[cfg(feature = "postgres")]
mod pg_collector;

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::model::StatementStatistics;

pub use json::JsonFileSource;
#[cfg(feature = "postgres")]
pub use pg_collector::{PostgresSource, build_connection_string};

/// Error type for statement sources.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Environment variable not set.
    #[error("PostgreSQL: {0} not set")]
    EnvNotSet(String),
    /// Connection failed.
    #[error("PostgreSQL: {0}")]
    Connection(String),
    /// Query execution failed.
    #[error("PostgreSQL query error: {0}")]
    Query(String),
    /// The server does not have pg_stat_statements installed.
    #[error("PostgreSQL: pg_stat_statements extension is not installed")]
    ExtensionMissing,
    #[error("cannot read {}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },
    #[error("cannot decode {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Anything that can produce a batch of statement statistics.
pub trait StatementSource {
    /// Short description for log messages.
    fn describe(&self) -> String;

    /// Fetches all records, most-called first.
    fn fetch(&mut self) -> Result<Vec<StatementStatistics>, SourceError>;
}

/// Orders records by call count, descending. Stable for equal counts.
pub(crate) fn sort_by_calls(records: &mut [StatementStatistics]) {
    records.sort_by(|a, b| b.calls.cmp(&a.calls));
}
