//! Application query log ingestion.
//!
//! - `parser`: one raw line to a [`LogEntry`] or a [`ParseError`]
//! - `reader`: drives the parser over a whole text source
//! - `duration`: interprets the execution-time literal carried by each entry

mod duration;
mod entry;
mod parser;
mod reader;

pub use duration::{DurationParseError, parse_duration};
pub use entry::{LogEntry, LogLevel, TIMESTAMP_FORMAT};
pub use parser::{FIELD_COUNT, FIELD_DELIMITER, Field, ParseError, parse_line};
pub use reader::{ReadSummary, read_entries};
