//! SQL query builder for pg_stat_statements.

/// Builds version-aware query for pg_stat_statements.
///
/// Every column is coalesced and cast so that rows decode into the same Rust
/// types on every server version; columns the server does not have yet are
/// selected as zero.
pub(super) fn build_stat_statements_query(server_version_num: Option<i32>) -> String {
    let v = server_version_num.unwrap_or(0);

    let (exec_prefix, plan_cols, wal_cols) = if v >= 130000 {
        (
            "exec_",
            [
                "s.plans",
                "s.total_plan_time",
                "s.min_plan_time",
                "s.max_plan_time",
                "s.mean_plan_time",
                "s.stddev_plan_time",
            ],
            ["s.wal_records", "s.wal_fpi", "s.wal_bytes"],
        )
    } else {
        ("", ["0"; 6], ["0"; 3])
    };

    let toplevel_expr = if v >= 140000 { "s.toplevel" } else { "true" };

    let (temp_io_cols, jit_cols) = if v >= 150000 {
        (
            ["s.temp_blk_read_time", "s.temp_blk_write_time"],
            [
                "s.jit_functions",
                "s.jit_generation_time",
                "s.jit_inlining_count",
                "s.jit_inlining_time",
                "s.jit_optimization_count",
                "s.jit_optimization_time",
                "s.jit_emission_count",
                "s.jit_emission_time",
            ],
        )
    } else {
        (["0"; 2], ["0"; 8])
    };

    let (blk_read_time_expr, blk_write_time_expr) = if v >= 170000 {
        ("s.shared_blk_read_time", "s.shared_blk_write_time")
    } else {
        ("s.blk_read_time", "s.blk_write_time")
    };

    let [plans, total_plan, min_plan, max_plan, mean_plan, stddev_plan] = plan_cols;
    let [wal_records, wal_fpi, wal_bytes] = wal_cols;
    let [temp_read_time, temp_write_time] = temp_io_cols;
    let [
        jit_functions,
        jit_generation_time,
        jit_inlining_count,
        jit_inlining_time,
        jit_optimization_count,
        jit_optimization_time,
        jit_emission_count,
        jit_emission_time,
    ] = jit_cols;

    format!(
        r#"
            SELECT
                s.userid,
                s.dbid,
                COALESCE({toplevel_expr}, true) as toplevel,
                COALESCE(s.queryid, 0)::bigint as queryid,
                COALESCE(s.query, '') as query,
                COALESCE({plans}, 0)::bigint as plans,
                COALESCE({total_plan}, 0)::double precision as total_plan_time,
                COALESCE({min_plan}, 0)::double precision as min_plan_time,
                COALESCE({max_plan}, 0)::double precision as max_plan_time,
                COALESCE({mean_plan}, 0)::double precision as mean_plan_time,
                COALESCE({stddev_plan}, 0)::double precision as stddev_plan_time,
                s.calls::bigint as calls,
                COALESCE(s.total_{exec_prefix}time, 0)::double precision as total_exec_time,
                COALESCE(s.min_{exec_prefix}time, 0)::double precision as min_exec_time,
                COALESCE(s.max_{exec_prefix}time, 0)::double precision as max_exec_time,
                COALESCE(s.mean_{exec_prefix}time, 0)::double precision as mean_exec_time,
                COALESCE(s.stddev_{exec_prefix}time, 0)::double precision as stddev_exec_time,
                s.rows::bigint as rows,
                s.shared_blks_hit::bigint as shared_blks_hit,
                s.shared_blks_read::bigint as shared_blks_read,
                s.shared_blks_dirtied::bigint as shared_blks_dirtied,
                s.shared_blks_written::bigint as shared_blks_written,
                s.local_blks_hit::bigint as local_blks_hit,
                s.local_blks_read::bigint as local_blks_read,
                s.local_blks_dirtied::bigint as local_blks_dirtied,
                s.local_blks_written::bigint as local_blks_written,
                s.temp_blks_read::bigint as temp_blks_read,
                s.temp_blks_written::bigint as temp_blks_written,
                COALESCE({blk_read_time_expr}, 0)::double precision as blk_read_time,
                COALESCE({blk_write_time_expr}, 0)::double precision as blk_write_time,
                COALESCE({temp_read_time}, 0)::double precision as temp_blk_read_time,
                COALESCE({temp_write_time}, 0)::double precision as temp_blk_write_time,
                COALESCE({wal_records}, 0)::bigint as wal_records,
                COALESCE({wal_fpi}, 0)::bigint as wal_fpi,
                COALESCE({wal_bytes}, 0)::bigint as wal_bytes,
                COALESCE({jit_functions}, 0)::bigint as jit_functions,
                COALESCE({jit_generation_time}, 0)::double precision as jit_generation_time,
                COALESCE({jit_inlining_count}, 0)::bigint as jit_inlining_count,
                COALESCE({jit_inlining_time}, 0)::double precision as jit_inlining_time,
                COALESCE({jit_optimization_count}, 0)::bigint as jit_optimization_count,
                COALESCE({jit_optimization_time}, 0)::double precision as jit_optimization_time,
                COALESCE({jit_emission_count}, 0)::bigint as jit_emission_count,
                COALESCE({jit_emission_time}, 0)::double precision as jit_emission_time
            FROM pg_stat_statements s
            ORDER BY s.calls DESC
        "#
    )
}
