//! Heuristic optimization advice over pg_stat_statements records.
//!
//! Each record is first checked against the exclusion markers (catalog
//! introspection and DDL). Surviving records go through every rule in order;
//! a record yields an [`OptimizationSuggestion`] only if some rule fired.
//! Output order follows input order.

pub mod rules;

use tracing::{debug, trace};

use crate::model::{OptimizationSuggestion, StatementStatistics};
use rules::StatementRule;

/// Query text fragments of engine-internal catalog queries.
pub const CATALOG_MARKERS: &[&str] = &[" pg_", " information_schema"];

/// Query text fragments of schema changes.
pub const DDL_MARKERS: &[&str] = &["alter table", "create index"];

/// True if the statement is never a candidate for advice.
pub fn is_excluded(query: &str) -> bool {
    CATALOG_MARKERS
        .iter()
        .chain(DDL_MARKERS)
        .any(|marker| query.contains(marker))
}

/// Ordered rule set applied to each statement.
pub struct Analyzer {
    rules: Vec<Box<dyn StatementRule>>,
}

impl Analyzer {
    pub fn new(rules: Vec<Box<dyn StatementRule>>) -> Self {
        Self { rules }
    }

    /// Analyzer running [`rules::extended_rules`].
    pub fn extended() -> Self {
        Self::new(rules::extended_rules())
    }

    pub fn rule_ids(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.id()).collect()
    }

    /// Evaluates one statement.
    pub fn suggest(&self, stmt: &StatementStatistics) -> Option<OptimizationSuggestion> {
        if is_excluded(&stmt.query) {
            debug!(queryid = stmt.queryid, "statement excluded");
            return None;
        }

        let suggestions: Vec<String> = self
            .rules
            .iter()
            .filter_map(|rule| {
                let message = rule.evaluate(stmt)?;
                trace!(queryid = stmt.queryid, rule = rule.id(), "rule fired");
                Some(message)
            })
            .collect();

        if suggestions.is_empty() {
            return None;
        }
        Some(OptimizationSuggestion {
            queryid: stmt.queryid,
            query: stmt.query.clone(),
            suggestions,
        })
    }

    pub fn analyze(&self, records: &[StatementStatistics]) -> Vec<OptimizationSuggestion> {
        let out: Vec<_> = records.iter().filter_map(|s| self.suggest(s)).collect();
        debug!(
            records = records.len(),
            flagged = out.len(),
            "statement analysis complete"
        );
        out
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new(rules::default_rules())
    }
}

/// Runs the default rule set over `records`.
pub fn analyze(records: &[StatementStatistics]) -> Vec<OptimizationSuggestion> {
    Analyzer::default().analyze(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stmt(queryid: i64, query: &str) -> StatementStatistics {
        StatementStatistics {
            queryid,
            query: query.to_string(),
            calls: 10,
            rows: 100,
            ..Default::default()
        }
    }

    #[test]
    fn test_variance_only() {
        let mut s = stmt(1, "select * from users where id = $1");
        s.stddev_exec_time = 75.0;
        let out = analyze(&[s]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].queryid, 1);
        assert_eq!(out[0].suggestions.len(), 1);
        assert!(out[0].suggestions[0].contains("75.00 ms"));
    }

    #[test]
    fn test_catalog_query_excluded() {
        let mut s = stmt(2, "select * from pg_stat_activity");
        s.mean_exec_time = 500.0;
        assert!(analyze(&[s]).is_empty());

        let mut s = stmt(3, "select * from information_schema.tables");
        s.temp_blks_written = 10;
        assert!(analyze(&[s]).is_empty());
    }

    #[test]
    fn test_ddl_excluded() {
        let mut s = stmt(4, "alter table users add column x int");
        s.wal_bytes = i64::MAX;
        assert!(analyze(&[s]).is_empty());

        let mut s = stmt(5, "create index concurrently idx on users (email)");
        s.mean_exec_time = 10_000.0;
        assert!(analyze(&[s]).is_empty());
    }

    #[test]
    fn test_markers_are_case_sensitive() {
        assert!(!is_excluded("ALTER TABLE users ADD COLUMN x int"));
        // Catalog markers need the leading space.
        assert!(!is_excluded("pg_sleep(1)"));
        assert!(is_excluded("select pg_sleep(1)"));
    }

    #[test]
    fn test_no_rule_fired_produces_nothing() {
        assert!(analyze(&[stmt(6, "select 1")]).is_empty());
        assert!(analyze(&[]).is_empty());
    }

    #[test]
    fn test_messages_follow_rule_order() {
        let mut s = stmt(7, "select * from orders");
        s.mean_exec_time = 250.0;
        s.stddev_exec_time = 120.0;
        s.temp_blks_read = 5;
        s.wal_bytes = 100 * 1024 * 1024;
        let out = analyze(&[s]);
        let msgs = &out[0].suggestions;
        assert_eq!(msgs.len(), 4);
        assert!(msgs[0].starts_with("Mean execution time"));
        assert!(msgs[1].starts_with("Execution time varies"));
        assert!(msgs[2].starts_with("Query uses temporary"));
        assert!(msgs[3].starts_with("High WAL usage (100.00 MB)"));
    }

    #[test]
    fn test_output_keeps_input_order() {
        let mut a = stmt(10, "select a");
        a.mean_exec_time = 200.0;
        let b = stmt(11, "select b");
        let mut c = stmt(12, "select c");
        c.temp_blks_written = 1;
        let out = analyze(&[a, b, c]);
        let ids: Vec<_> = out.iter().map(|s| s.queryid).collect();
        assert_eq!(ids, vec![10, 12]);
    }

    #[test]
    fn test_extended_analyzer() {
        let mut s = stmt(20, "select * from big");
        s.total_exec_time = 5000.0;
        s.rows = 10;
        let analyzer = Analyzer::extended();
        assert_eq!(analyzer.rule_ids().len(), 7);
        let out = analyzer.analyze(&[s.clone()]);
        assert_eq!(out[0].suggestions.len(), 2);
        assert!(out[0].suggestions[0].starts_with("Total execution time"));
        assert!(out[0].suggestions[1].starts_with("Low rows returned per call (1.00)"));

        // The default set ignores both.
        assert!(analyze(&[s]).is_empty());
    }

    #[test]
    fn test_extreme_counters_degrade_gracefully() {
        let s = StatementStatistics {
            queryid: 30,
            query: "select * from events".to_string(),
            shared_blks_hit: i64::MAX,
            shared_blks_read: 1,
            calls: 1,
            rows: i64::MAX,
            ..Default::default()
        };
        assert!(analyze(std::slice::from_ref(&s)).is_empty());
        assert!(Analyzer::extended().analyze(&[s]).is_empty());
    }
}
