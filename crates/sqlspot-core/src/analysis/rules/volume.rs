use crate::analysis::rules::StatementRule;
use crate::model::StatementStatistics;

const MIB: f64 = 1024.0 * 1024.0;

// ============================================================
// LowRowsPerCallRule (opt-in)
// ============================================================

pub struct LowRowsPerCallRule;

impl LowRowsPerCallRule {
    pub const THRESHOLD: f64 = 10.0;
}

impl StatementRule for LowRowsPerCallRule {
    fn id(&self) -> &'static str {
        "low_rows_per_call"
    }

    fn evaluate(&self, stmt: &StatementStatistics) -> Option<String> {
        if stmt.calls == 0 {
            return None;
        }
        let rows_per_call = stmt.rows as f64 / stmt.calls as f64;
        (rows_per_call < Self::THRESHOLD).then(|| {
            format!(
                "Low rows returned per call ({rows_per_call:.2}). Verify if the query returns the expected results."
            )
        })
    }
}

// ============================================================
// HighWalBytesRule
// ============================================================

pub struct HighWalBytesRule;

impl HighWalBytesRule {
    /// 50 MiB.
    pub const THRESHOLD_BYTES: i64 = 50 * 1024 * 1024;
}

impl StatementRule for HighWalBytesRule {
    fn id(&self) -> &'static str {
        "high_wal_bytes"
    }

    fn evaluate(&self, stmt: &StatementStatistics) -> Option<String> {
        (stmt.wal_bytes > Self::THRESHOLD_BYTES).then(|| {
            format!(
                "High WAL usage ({:.2} MB). Consider batching writes or optimizing the query.",
                stmt.wal_bytes as f64 / MIB
            )
        })
    }
}
