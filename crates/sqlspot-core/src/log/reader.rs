//! Drives the line parser over a text source.

use std::collections::BTreeMap;
use std::io::BufRead;

use tracing::{debug, trace, warn};

use super::entry::LogEntry;
use super::parser::parse_line;

/// Outcome of reading a whole log source.
#[derive(Debug, Default)]
pub struct ReadSummary {
    /// Accepted entries in input order.
    pub entries: Vec<LogEntry>,
    /// Total number of lines seen.
    pub lines_read: usize,
    /// Rejected line count per [`super::ParseError::kind`].
    pub rejected: BTreeMap<&'static str, usize>,
    /// Set when the source failed mid-way; `entries` holds what was read before.
    pub read_error: Option<String>,
}

impl ReadSummary {
    pub fn rejected_total(&self) -> usize {
        self.rejected.values().sum()
    }
}

/// Parses every line of `reader`, skipping lines the parser rejects.
///
/// Invalid UTF-8 is replaced rather than treated as a read failure. An I/O
/// error stops reading but keeps the entries collected so far.
pub fn read_entries<R: BufRead>(mut reader: R) -> ReadSummary {
    let mut summary = ReadSummary::default();
    let mut buf = Vec::new();

    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                warn!(error = %e, lines = summary.lines_read, "log read failed");
                summary.read_error = Some(e.to_string());
                break;
            }
        }
        summary.lines_read += 1;

        let raw = String::from_utf8_lossy(&buf);
        let line = raw.trim_end_matches(['\n', '\r']);
        match parse_line(line) {
            Ok(entry) => {
                trace!(location = entry.location(), "accepted line");
                summary.entries.push(entry);
            }
            Err(e) => {
                debug!(line = summary.lines_read, reason = %e, "skipping line");
                *summary.rejected.entry(e.kind()).or_insert(0) += 1;
            }
        }
    }

    summary
}
