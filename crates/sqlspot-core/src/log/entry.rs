//! Structured query log entry.

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::parser::{FIELD_COUNT, Field, ParseError};

/// Timestamp layout used inside the `[...]` envelope.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Two-part log level, e.g. `local.DEBUG`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LogLevel {
    /// Environment the framework was running in (`local`, `production`, ...).
    pub category: String,
    /// Severity name (`DEBUG`, `INFO`, ...).
    pub severity: String,
}

impl LogLevel {
    pub fn new(category: impl Into<String>, severity: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            severity: severity.into(),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.category, self.severity)
    }
}

/// One executed SQL statement as reported by the application log.
///
/// Every text field is trimmed and non-empty; [`LogEntry::new`] and
/// [`super::parse_line`] are the only ways to build one. The execution time
/// stays a raw literal (e.g. `0.7900ms`) until the call-site aggregator
/// interprets it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    timestamp: NaiveDateTime,
    level: LogLevel,
    query: String,
    bindings: String,
    exec_time: String,
    location: String,
    caller: String,
}

impl LogEntry {
    /// Builds an entry from the five message fields in line order:
    /// query, bindings, exec_time, location, caller.
    ///
    /// Fields are trimmed; a field that is blank afterwards is rejected.
    pub fn new(
        timestamp: NaiveDateTime,
        level: LogLevel,
        fields: [&str; FIELD_COUNT],
    ) -> Result<Self, ParseError> {
        let mut values: [String; FIELD_COUNT] = Default::default();
        for ((slot, raw), field) in values.iter_mut().zip(fields).zip(Field::ORDER) {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return Err(ParseError::EmptyField { field });
            }
            *slot = trimmed.to_string();
        }
        let [query, bindings, exec_time, location, caller] = values;

        Ok(Self {
            timestamp,
            level,
            query,
            bindings,
            exec_time,
            location,
            caller,
        })
    }

    /// Local (naive) time the statement was logged, second precision.
    pub fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }

    pub fn level(&self) -> &LogLevel {
        &self.level
    }

    /// SQL text with `?` placeholders.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Bound parameter values, kept verbatim.
    pub fn bindings(&self) -> &str {
        &self.bindings
    }

    /// Duration literal as written by the framework.
    pub fn exec_time(&self) -> &str {
        &self.exec_time
    }

    /// `path:line` of the call site; the aggregation key.
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Calling function signature, free text.
    pub fn caller(&self) -> &str {
        &self.caller
    }
}

/// Renders the entry in the log line format it was parsed from.
impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {} | {} | {} | {} | {}",
            self.timestamp.format(TIMESTAMP_FORMAT),
            self.level,
            self.query,
            self.bindings,
            self.exec_time,
            self.location,
            self.caller
        )
    }
}
