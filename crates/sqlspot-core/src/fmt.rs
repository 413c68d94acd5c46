//! Plain-text rendering of both reports.
//!
//! Output is fully determined by the report values, so identical input logs
//! produce byte-identical text.

use std::io::{self, Write};

use crate::callsite::{CallSiteReport, CallSiteStats};
use crate::model::OptimizationSuggestion;

pub const CALLSITE_HEADER: &str = "SourceCodeLocation counts:";
pub const SUGGESTIONS_HEADER: &str = "Optimization suggestions:";

/// `    <location> (count: <n>, mean time: <m.mmmm> ms, total time: <t> ms)`
pub fn format_callsite(site: &CallSiteStats) -> String {
    format!(
        "    {} (count: {}, mean time: {:.4} ms, total time: {} ms)",
        site.location, site.count, site.mean_ms, site.total_ms
    )
}

pub fn write_callsite_report<W: Write>(out: &mut W, report: &CallSiteReport) -> io::Result<()> {
    writeln!(out, "{CALLSITE_HEADER}")?;
    for site in &report.sites {
        writeln!(out, "{}", format_callsite(site))?;
    }
    Ok(())
}

pub fn write_suggestions<W: Write>(
    out: &mut W,
    suggestions: &[OptimizationSuggestion],
) -> io::Result<()> {
    writeln!(out, "{SUGGESTIONS_HEADER}")?;
    for s in suggestions {
        writeln!(out, "    QueryID: {}", s.queryid)?;
        writeln!(out, "    Query: {}", s.query)?;
        writeln!(out, "    Suggestions:")?;
        for msg in &s.suggestions {
            writeln!(out, "      - {msg}")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render<F>(f: F) -> String
    where
        F: FnOnce(&mut Vec<u8>) -> io::Result<()>,
    {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_callsite_line() {
        let site = CallSiteStats {
            location: "app/Models/File.php:184".to_string(),
            count: 812,
            mean_ms: 2.0 / 3.0,
            total_ms: 541,
        };
        assert_eq!(
            format_callsite(&site),
            "    app/Models/File.php:184 (count: 812, mean time: 0.6667 ms, total time: 541 ms)"
        );
    }

    #[test]
    fn test_callsite_report() {
        let report = CallSiteReport {
            sites: vec![
                CallSiteStats {
                    location: "a.php:1".to_string(),
                    count: 3,
                    mean_ms: 20.0,
                    total_ms: 60,
                },
                CallSiteStats {
                    location: "b.php:2".to_string(),
                    count: 1,
                    mean_ms: 45.5,
                    total_ms: 45,
                },
            ],
            locations_seen: 5,
            unparseable_durations: 0,
        };
        assert_eq!(
            render(|out| write_callsite_report(out, &report)),
            "SourceCodeLocation counts:\n\
             \x20   a.php:1 (count: 3, mean time: 20.0000 ms, total time: 60 ms)\n\
             \x20   b.php:2 (count: 1, mean time: 45.5000 ms, total time: 45 ms)\n"
        );
    }

    #[test]
    fn test_empty_callsite_report() {
        assert_eq!(
            render(|out| write_callsite_report(out, &CallSiteReport::default())),
            "SourceCodeLocation counts:\n"
        );
    }

    #[test]
    fn test_suggestions() {
        let suggestions = vec![OptimizationSuggestion {
            queryid: -42,
            query: "select * from orders where id = $1".to_string(),
            suggestions: vec!["first".to_string(), "second".to_string()],
        }];
        assert_eq!(
            render(|out| write_suggestions(out, &suggestions)),
            "Optimization suggestions:\n\
             \x20   QueryID: -42\n\
             \x20   Query: select * from orders where id = $1\n\
             \x20   Suggestions:\n\
             \x20     - first\n\
             \x20     - second\n"
        );
    }
}
