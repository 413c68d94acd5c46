//! Statement statistics as tracked by the `pg_stat_statements` extension.

use serde::{Deserialize, Serialize};

/// One normalized statement from pg_stat_statements.
///
/// Source: `SELECT * FROM pg_stat_statements ORDER BY calls DESC`
///
/// Columns missing on older servers are read as zero. All times are in
/// milliseconds, all block counters in 8 KiB blocks.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Default)]
#[serde(default)]
pub struct StatementStatistics {
    /// OID of the user who executed the statement.
    /// Source: `pg_stat_statements.userid`
    pub userid: u32,

    /// OID of the database in which the statement was executed.
    /// Source: `pg_stat_statements.dbid`
    pub dbid: u32,

    /// True if the query was executed as a top-level statement.
    /// Source: `pg_stat_statements.toplevel` (PG 14+)
    pub toplevel: bool,

    /// Internal hash code identifying the normalized query.
    /// Source: `pg_stat_statements.queryid`
    pub queryid: i64,

    /// Normalized query text, parameters replaced with `$1`, `$2`, ...
    /// Source: `pg_stat_statements.query`
    pub query: String,

    // --- Planning ---
    /// Number of times the statement was planned.
    /// Source: `pg_stat_statements.plans` (PG 13+)
    pub plans: i64,

    /// Source: `pg_stat_statements.total_plan_time` (PG 13+)
    pub total_plan_time: f64,

    /// Source: `pg_stat_statements.min_plan_time` (PG 13+)
    pub min_plan_time: f64,

    /// Source: `pg_stat_statements.max_plan_time` (PG 13+)
    pub max_plan_time: f64,

    /// Source: `pg_stat_statements.mean_plan_time` (PG 13+)
    pub mean_plan_time: f64,

    /// Source: `pg_stat_statements.stddev_plan_time` (PG 13+)
    pub stddev_plan_time: f64,

    // --- Execution ---
    /// Number of times the statement was executed.
    /// Source: `pg_stat_statements.calls`
    pub calls: i64,

    /// Source: `pg_stat_statements.total_exec_time` (PG 13+) or `total_time`
    pub total_exec_time: f64,

    /// Source: `pg_stat_statements.min_exec_time` (PG 13+) or `min_time`
    pub min_exec_time: f64,

    /// Source: `pg_stat_statements.max_exec_time` (PG 13+) or `max_time`
    pub max_exec_time: f64,

    /// Source: `pg_stat_statements.mean_exec_time` (PG 13+) or `mean_time`
    pub mean_exec_time: f64,

    /// Source: `pg_stat_statements.stddev_exec_time` (PG 13+) or `stddev_time`
    pub stddev_exec_time: f64,

    /// Total number of rows retrieved or affected.
    /// Source: `pg_stat_statements.rows`
    pub rows: i64,

    // --- Buffer I/O ---
    /// Source: `pg_stat_statements.shared_blks_hit`
    pub shared_blks_hit: i64,

    /// Source: `pg_stat_statements.shared_blks_read`
    pub shared_blks_read: i64,

    /// Source: `pg_stat_statements.shared_blks_dirtied`
    pub shared_blks_dirtied: i64,

    /// Source: `pg_stat_statements.shared_blks_written`
    pub shared_blks_written: i64,

    /// Source: `pg_stat_statements.local_blks_hit`
    pub local_blks_hit: i64,

    /// Source: `pg_stat_statements.local_blks_read`
    pub local_blks_read: i64,

    /// Source: `pg_stat_statements.local_blks_dirtied`
    pub local_blks_dirtied: i64,

    /// Source: `pg_stat_statements.local_blks_written`
    pub local_blks_written: i64,

    /// Temp blocks read; non-zero means the statement spilled to disk.
    /// Source: `pg_stat_statements.temp_blks_read`
    pub temp_blks_read: i64,

    /// Source: `pg_stat_statements.temp_blks_written`
    pub temp_blks_written: i64,

    /// Time spent reading shared/local blocks (requires `track_io_timing`).
    /// Source: `pg_stat_statements.blk_read_time` (PG 17: `shared_blk_read_time`)
    pub blk_read_time: f64,

    /// Source: `pg_stat_statements.blk_write_time` (PG 17: `shared_blk_write_time`)
    pub blk_write_time: f64,

    /// Source: `pg_stat_statements.temp_blk_read_time` (PG 15+)
    pub temp_blk_read_time: f64,

    /// Source: `pg_stat_statements.temp_blk_write_time` (PG 15+)
    pub temp_blk_write_time: f64,

    // --- WAL ---
    /// Source: `pg_stat_statements.wal_records` (PG 13+)
    pub wal_records: i64,

    /// WAL full page images.
    /// Source: `pg_stat_statements.wal_fpi` (PG 13+)
    pub wal_fpi: i64,

    /// Total amount of WAL generated (bytes).
    /// Source: `pg_stat_statements.wal_bytes` (PG 13+)
    pub wal_bytes: i64,

    // --- JIT (PG 15+) ---
    /// Source: `pg_stat_statements.jit_functions`
    pub jit_functions: i64,

    /// Source: `pg_stat_statements.jit_generation_time`
    pub jit_generation_time: f64,

    /// Source: `pg_stat_statements.jit_inlining_count`
    pub jit_inlining_count: i64,

    /// Source: `pg_stat_statements.jit_inlining_time`
    pub jit_inlining_time: f64,

    /// Source: `pg_stat_statements.jit_optimization_count`
    pub jit_optimization_count: i64,

    /// Source: `pg_stat_statements.jit_optimization_time`
    pub jit_optimization_time: f64,

    /// Source: `pg_stat_statements.jit_emission_count`
    pub jit_emission_count: i64,

    /// Source: `pg_stat_statements.jit_emission_time`
    pub jit_emission_time: f64,
}
