//! Statement statistics loaded from a JSON file.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::{SourceError, StatementSource, sort_by_calls};
use crate::model::StatementStatistics;

/// Reads a JSON array of [`StatementStatistics`] objects.
///
/// Missing fields default to zero, so a dump of a subset of
/// pg_stat_statements columns is accepted.
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StatementSource for JsonFileSource {
    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }

    fn fetch(&mut self) -> Result<Vec<StatementStatistics>, SourceError> {
        let file = File::open(&self.path).map_err(|source| SourceError::Io {
            path: self.path.clone(),
            source,
        })?;
        let mut records: Vec<StatementStatistics> =
            serde_json::from_reader(BufReader::new(file)).map_err(|source| {
                SourceError::Decode {
                    path: self.path.clone(),
                    source,
                }
            })?;
        sort_by_calls(&mut records);
        debug!(path = %self.path.display(), records = records.len(), "loaded statement statistics");
        Ok(records)
    }
}
