//! Query log line parser.
//!
//! Accepts lines of the form
//!
//! ```text
//! [2024-10-18 21:27:05] local.DEBUG: <query> | <bindings> | <exec_time> | <location> | <caller>
//! ```
//!
//! The envelope (`[timestamp] category.severity: message`) is matched with a
//! regex compiled once per process. The message is then split on `" | "` into
//! exactly five fields; anything past the fourth delimiter stays in the caller
//! field.

use std::fmt;
use std::sync::LazyLock;

use chrono::NaiveDateTime;
use regex::Regex;
use serde::Serialize;
use thiserror::Error;

use super::entry::{LogEntry, LogLevel, TIMESTAMP_FORMAT};

/// Delimiter between message fields.
pub const FIELD_DELIMITER: &str = " | ";

/// Number of `" | "`-separated fields in a message.
pub const FIELD_COUNT: usize = 5;

static ENVELOPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[(.*?)\]\s*([0-9A-Za-z_]+)\.([0-9A-Za-z_]+):\s*(.*)")
        .expect("envelope pattern is valid")
});

/// Exact timestamp shape: two-digit fields, one space, seconds 00-59.
/// Checked before chrono, which is more lenient.
static TIMESTAMP_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2} [0-9]{2}:[0-9]{2}:[0-5][0-9]$")
        .expect("timestamp pattern is valid")
});

/// Positional message field, used to report which one was empty.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Query,
    Bindings,
    ExecTime,
    Location,
    Caller,
}

impl Field {
    pub(super) const ORDER: [Field; FIELD_COUNT] = [
        Field::Query,
        Field::Bindings,
        Field::ExecTime,
        Field::Location,
        Field::Caller,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Field::Query => "query",
            Field::Bindings => "bindings",
            Field::ExecTime => "exec_time",
            Field::Location => "location",
            Field::Caller => "caller",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a line was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The line has no `[timestamp] category.severity: message` envelope.
    #[error("line does not match expected format")]
    MalformedEnvelope,
    /// The bracketed timestamp is not `YYYY-MM-DD hh:mm:ss`.
    #[error("invalid timestamp format: '{value}'")]
    InvalidTimestamp { value: String },
    /// Fewer than five `" | "`-separated fields.
    #[error("expected 5 fields, got {found}")]
    FieldCountMismatch { found: usize },
    /// A field is blank after trimming.
    #[error("field '{field}' is empty")]
    EmptyField { field: Field },
}

impl ParseError {
    /// Stable short name of the error kind, used for rejection counters.
    pub fn kind(&self) -> &'static str {
        match self {
            ParseError::MalformedEnvelope => "malformed_envelope",
            ParseError::InvalidTimestamp { .. } => "invalid_timestamp",
            ParseError::FieldCountMismatch { .. } => "field_count_mismatch",
            ParseError::EmptyField { .. } => "empty_field",
        }
    }
}

fn parse_timestamp(value: &str) -> Result<NaiveDateTime, ParseError> {
    let invalid = || ParseError::InvalidTimestamp {
        value: value.to_string(),
    };
    if !TIMESTAMP_SHAPE.is_match(value) {
        return Err(invalid());
    }
    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT).map_err(|_| invalid())
}

/// Parses one raw log line into a [`LogEntry`].
///
/// Pure: the same input always yields the same result.
pub fn parse_line(line: &str) -> Result<LogEntry, ParseError> {
    let caps = ENVELOPE
        .captures(line)
        .ok_or(ParseError::MalformedEnvelope)?;

    // All four groups are mandatory in the pattern.
    let (Some(ts), Some(category), Some(severity), Some(message)) =
        (caps.get(1), caps.get(2), caps.get(3), caps.get(4))
    else {
        return Err(ParseError::MalformedEnvelope);
    };

    let timestamp = parse_timestamp(ts.as_str())?;

    let fields: Vec<&str> = message
        .as_str()
        .splitn(FIELD_COUNT, FIELD_DELIMITER)
        .collect();
    let fields: [&str; FIELD_COUNT] = fields
        .try_into()
        .map_err(|fields: Vec<&str>| ParseError::FieldCountMismatch {
            found: fields.len(),
        })?;

    LogEntry::new(
        timestamp,
        LogLevel::new(category.as_str(), severity.as_str()),
        fields,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const SAMPLE: &str = r#"[2024-10-18 21:27:05] local.DEBUG: select * from "files" where "id" = ? limit 1 | 00b62c03-3827-4f49-a731-ed2494ede688 | 0.7900ms | app/Models/File.php:184 | Illuminate\Database\Eloquent\Model::fresh"#;

    #[test]
    fn test_parse_framework_line() {
        let entry = parse_line(SAMPLE).unwrap();
        assert_eq!(
            entry.timestamp(),
            NaiveDate::from_ymd_opt(2024, 10, 18)
                .unwrap()
                .and_hms_opt(21, 27, 5)
                .unwrap()
        );
        assert_eq!(entry.level().to_string(), "local.DEBUG");
        assert_eq!(entry.query(), r#"select * from "files" where "id" = ? limit 1"#);
        assert_eq!(entry.bindings(), "00b62c03-3827-4f49-a731-ed2494ede688");
        assert_eq!(entry.exec_time(), "0.7900ms");
        assert_eq!(entry.location(), "app/Models/File.php:184");
        assert_eq!(entry.caller(), r"Illuminate\Database\Eloquent\Model::fresh");
    }

    #[test]
    fn test_parse_short_line() {
        let entry =
            parse_line("[2024-10-18 21:27:05] local.DEBUG: select 1 | abc | 1.2300ms | f.php:10 | Foo::bar")
                .unwrap();
        assert_eq!(entry.level(), &LogLevel::new("local", "DEBUG"));
        assert_eq!(entry.query(), "select 1");
        assert_eq!(entry.exec_time(), "1.2300ms");
        assert_eq!(entry.location(), "f.php:10");
        assert_eq!(entry.caller(), "Foo::bar");
    }

    #[test]
    fn test_extra_delimiters_stay_in_caller() {
        let entry =
            parse_line("[2024-10-18 21:27:05] local.DEBUG: q | b | 1ms | f.php:1 | A::b | extra | more")
                .unwrap();
        assert_eq!(entry.caller(), "A::b | extra | more");
    }

    #[test]
    fn test_pipe_without_spaces_is_not_a_delimiter() {
        let entry =
            parse_line("[2024-10-18 21:27:05] local.DEBUG: select a||b | x | 1ms | f.php:1 | A::b")
                .unwrap();
        assert_eq!(entry.query(), "select a||b");
    }

    #[test]
    fn test_fields_are_trimmed() {
        let entry = parse_line(
            "[2024-10-18 21:27:05] production.INFO:   select 1   |  b  |  2ms  |  f.php:2  |  C::d  ",
        )
        .unwrap();
        assert_eq!(entry.query(), "select 1");
        assert_eq!(entry.bindings(), "b");
        assert_eq!(entry.exec_time(), "2ms");
        assert_eq!(entry.location(), "f.php:2");
        assert_eq!(entry.caller(), "C::d");
    }

    #[test]
    fn test_leading_text_before_envelope_is_ignored() {
        let entry =
            parse_line("noise [2024-10-18 21:27:05] local.DEBUG: q | b | 1ms | f.php:1 | A::b").unwrap();
        assert_eq!(entry.location(), "f.php:1");
    }

    #[test]
    fn test_malformed_envelope() {
        assert_eq!(parse_line(""), Err(ParseError::MalformedEnvelope));
        assert_eq!(
            parse_line("#0 /var/www/vendor/laravel/framework/src/Foo.php(12): bar()"),
            Err(ParseError::MalformedEnvelope)
        );
        // Level without the category part.
        assert_eq!(
            parse_line("[2024-10-18 21:27:05] DEBUG: q | b | 1ms | f.php:1 | A::b"),
            Err(ParseError::MalformedEnvelope)
        );
    }

    #[test]
    fn test_invalid_timestamp() {
        let err = parse_line("[18/10/2024 21:27] local.DEBUG: q | b | 1ms | f.php:1 | A::b").unwrap_err();
        assert_eq!(
            err,
            ParseError::InvalidTimestamp {
                value: "18/10/2024 21:27".to_string()
            }
        );
    }

    #[test]
    fn test_fractional_seconds_rejected() {
        let err =
            parse_line("[2024-10-18 21:27:05.123] local.DEBUG: q | b | 1ms | f.php:1 | A::b").unwrap_err();
        assert_eq!(err.kind(), "invalid_timestamp");
    }

    #[test]
    fn test_timezone_offset_rejected() {
        let err = parse_line("[2024-10-18 21:27:05+02:00] local.DEBUG: q | b | 1ms | f.php:1 | A::b")
            .unwrap_err();
        assert_eq!(err.kind(), "invalid_timestamp");
    }

    #[test]
    fn test_loose_timestamps_rejected() {
        for ts in [
            "2024-1-5 1:2:3",
            "2024-10-1821:27:05",
            "2024-10-18   21:27:05",
            " 2024-10-18 21:27:05",
            "+2024-10-18 21:27:05",
            "2024-10-18 21:27:60",
            "2024-10-18 21:27:05 ",
            "2024-10-18T21:27:05",
            "２０２４-10-18 21:27:05",
        ] {
            let line = format!("[{ts}] local.DEBUG: q | b | 1ms | f.php:1 | A::b");
            assert_eq!(
                parse_line(&line),
                Err(ParseError::InvalidTimestamp {
                    value: ts.to_string()
                }),
                "{ts:?}"
            );
        }
    }

    #[test]
    fn test_out_of_range_date_rejected() {
        for ts in ["2024-02-30 10:00:00", "2024-13-01 10:00:00", "2024-10-18 24:00:00"] {
            let line = format!("[{ts}] local.DEBUG: q | b | 1ms | f.php:1 | A::b");
            assert_eq!(parse_line(&line).unwrap_err().kind(), "invalid_timestamp", "{ts:?}");
        }
    }

    #[test]
    fn test_last_second_of_minute_accepted() {
        let entry = parse_line("[2024-12-31 23:59:59] local.DEBUG: q | b | 1ms | f.php:1 | A::b").unwrap();
        assert_eq!(entry.timestamp().format(TIMESTAMP_FORMAT).to_string(), "2024-12-31 23:59:59");
    }

    #[test]
    fn test_field_count_mismatch() {
        assert_eq!(
            parse_line("[2024-10-18 21:27:05] local.DEBUG: select 1 | b | 1ms | f.php:1"),
            Err(ParseError::FieldCountMismatch { found: 4 })
        );
        assert_eq!(
            parse_line("[2024-10-18 21:27:05] local.INFO: Cache warmed"),
            Err(ParseError::FieldCountMismatch { found: 1 })
        );
    }

    #[test]
    fn test_empty_field() {
        assert_eq!(
            parse_line("[2024-10-18 21:27:05] local.DEBUG: select 1 |   | 1ms | f.php:1 | A::b"),
            Err(ParseError::EmptyField {
                field: Field::Bindings
            })
        );
        assert_eq!(
            parse_line("[2024-10-18 21:27:05] local.DEBUG: select 1 | b | 1ms | f.php:1 | "),
            Err(ParseError::EmptyField {
                field: Field::Caller
            })
        );
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            ParseError::FieldCountMismatch { found: 3 }.to_string(),
            "expected 5 fields, got 3"
        );
        assert_eq!(
            ParseError::EmptyField {
                field: Field::ExecTime
            }
            .to_string(),
            "field 'exec_time' is empty"
        );
    }

    #[test]
    fn test_display_roundtrip() {
        let entry = parse_line(SAMPLE).unwrap();
        assert_eq!(parse_line(&entry.to_string()).unwrap(), entry);
    }
}
