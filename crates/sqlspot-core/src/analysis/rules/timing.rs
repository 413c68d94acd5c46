use crate::analysis::rules::StatementRule;
use crate::model::StatementStatistics;

// ============================================================
// HighTotalExecTimeRule (opt-in)
// ============================================================

pub struct HighTotalExecTimeRule;

impl HighTotalExecTimeRule {
    pub const THRESHOLD_MS: f64 = 1000.0;
}

impl StatementRule for HighTotalExecTimeRule {
    fn id(&self) -> &'static str {
        "high_total_exec_time"
    }

    fn evaluate(&self, stmt: &StatementStatistics) -> Option<String> {
        (stmt.total_exec_time > Self::THRESHOLD_MS).then(|| {
            format!(
                "Total execution time is high ({:.2} ms). Consider optimizing the query or adding indexes.",
                stmt.total_exec_time
            )
        })
    }
}

// ============================================================
// HighMeanExecTimeRule
// ============================================================

pub struct HighMeanExecTimeRule;

impl HighMeanExecTimeRule {
    pub const THRESHOLD_MS: f64 = 100.0;
}

impl StatementRule for HighMeanExecTimeRule {
    fn id(&self) -> &'static str {
        "high_mean_exec_time"
    }

    fn evaluate(&self, stmt: &StatementStatistics) -> Option<String> {
        (stmt.mean_exec_time > Self::THRESHOLD_MS).then(|| {
            format!(
                "Mean execution time per call is high ({:.2} ms). Consider optimizing the query.",
                stmt.mean_exec_time
            )
        })
    }
}

// ============================================================
// HighStddevExecTimeRule
// ============================================================

pub struct HighStddevExecTimeRule;

impl HighStddevExecTimeRule {
    pub const THRESHOLD_MS: f64 = 50.0;
}

impl StatementRule for HighStddevExecTimeRule {
    fn id(&self) -> &'static str {
        "high_stddev_exec_time"
    }

    fn evaluate(&self, stmt: &StatementStatistics) -> Option<String> {
        (stmt.stddev_exec_time > Self::THRESHOLD_MS).then(|| {
            format!(
                "Execution time varies widely (stddev {:.2} ms). Investigate possible causes for inconsistent performance.",
                stmt.stddev_exec_time
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_exec_time() {
        let mut stmt = StatementStatistics {
            total_exec_time: 1000.0,
            ..Default::default()
        };
        assert_eq!(HighTotalExecTimeRule.evaluate(&stmt), None);

        stmt.total_exec_time = 1234.5;
        assert_eq!(
            HighTotalExecTimeRule.evaluate(&stmt).as_deref(),
            Some("Total execution time is high (1234.50 ms). Consider optimizing the query or adding indexes.")
        );
    }

    #[test]
    fn test_mean_exec_time() {
        let mut stmt = StatementStatistics {
            mean_exec_time: 100.0,
            ..Default::default()
        };
        assert_eq!(HighMeanExecTimeRule.evaluate(&stmt), None);

        stmt.mean_exec_time = 500.0;
        assert_eq!(
            HighMeanExecTimeRule.evaluate(&stmt).as_deref(),
            Some("Mean execution time per call is high (500.00 ms). Consider optimizing the query.")
        );
    }

    #[test]
    fn test_stddev_exec_time() {
        let mut stmt = StatementStatistics {
            stddev_exec_time: 50.0,
            ..Default::default()
        };
        assert_eq!(HighStddevExecTimeRule.evaluate(&stmt), None);

        stmt.stddev_exec_time = 75.0;
        let msg = HighStddevExecTimeRule.evaluate(&stmt).unwrap();
        assert!(msg.contains("stddev 75.00 ms"), "{msg}");
    }
}
