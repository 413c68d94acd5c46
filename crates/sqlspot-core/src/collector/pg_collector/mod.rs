//! pg_stat_statements collection over a PostgreSQL connection.
//!
//! Connection settings come from the standard libpq environment variables:
//! - PGHOST (default: localhost)
//! - PGPORT (default: 5432)
//! - PGUSER (default: $USER)
//! - PGPASSWORD (default: empty)
//! - PGDATABASE (default: same as PGUSER)

mod queries;

use postgres::{Client, NoTls, Row};
use tracing::{debug, info};

use super::{SourceError, StatementSource};
use crate::model::StatementStatistics;
use queries::build_stat_statements_query;

/// Fetches statement statistics from a live server.
pub struct PostgresSource {
    connection_string: String,
    client: Option<Client>,
    server_version_num: Option<i32>,
}

/// Builds a libpq key=value connection string. The password is omitted when empty.
pub fn build_connection_string(
    host: &str,
    port: &str,
    user: &str,
    password: &str,
    dbname: &str,
) -> String {
    if password.is_empty() {
        format!("host={host} port={port} user={user} dbname={dbname}")
    } else {
        format!("host={host} port={port} user={user} password={password} dbname={dbname}")
    }
}

impl PostgresSource {
    /// Creates a source from environment variables.
    ///
    /// Uses $USER as default if PGUSER is not set.
    pub fn from_env() -> Result<Self, SourceError> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self, SourceError> {
        let user = var("PGUSER")
            .or_else(|| var("USER"))
            .ok_or_else(|| SourceError::EnvNotSet("PGUSER or USER".to_string()))?;

        let host = var("PGHOST").unwrap_or_else(|| "localhost".to_string());
        let port = var("PGPORT").unwrap_or_else(|| "5432".to_string());
        let password = var("PGPASSWORD").unwrap_or_default();
        let database = var("PGDATABASE").unwrap_or_else(|| user.clone());

        Ok(Self::with_connection_string(build_connection_string(
            &host, &port, &user, &password, &database,
        )))
    }

    /// Creates a source with an explicit connection string.
    pub fn with_connection_string(connection_string: String) -> Self {
        Self {
            connection_string,
            client: None,
            server_version_num: None,
        }
    }

    /// Attempts to connect to PostgreSQL.
    pub fn try_connect(&mut self) -> Result<(), SourceError> {
        self.ensure_connected().map(|_| ())
    }

    /// Server version as reported by `server_version_num`, once connected.
    pub fn server_version_num(&self) -> Option<i32> {
        self.server_version_num
    }

    fn ensure_connected(&mut self) -> Result<&mut Client, SourceError> {
        if self.client.is_none() {
            let mut client = Client::connect(&self.connection_string, NoTls)
                .map_err(|e| SourceError::Connection(format_postgres_error(&e)))?;

            self.server_version_num = client
                .query_one("SHOW server_version_num", &[])
                .ok()
                .and_then(|row| row.try_get::<_, String>(0).ok())
                .and_then(|v| v.parse::<i32>().ok());
            info!(server_version_num = ?self.server_version_num, "connected to PostgreSQL");

            self.client = Some(client);
        }
        self.client
            .as_mut()
            .ok_or_else(|| SourceError::Connection("not connected".to_string()))
    }

    fn statements_extension_version(&mut self) -> Result<Option<String>, SourceError> {
        let client = self.ensure_connected()?;
        let query = "SELECT extversion FROM pg_extension WHERE extname = 'pg_stat_statements'";
        let row = client
            .query_opt(query, &[])
            .map_err(|e| SourceError::Query(format_postgres_error(&e)))?;
        Ok(row.map(|r| r.get(0)))
    }
}

impl StatementSource for PostgresSource {
    fn describe(&self) -> String {
        // Never log the password.
        self.connection_string
            .split_whitespace()
            .filter(|token| !token.starts_with("password="))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn fetch(&mut self) -> Result<Vec<StatementStatistics>, SourceError> {
        let Some(ext_version) = self.statements_extension_version()? else {
            return Err(SourceError::ExtensionMissing);
        };
        debug!(version = %ext_version, "pg_stat_statements available");

        let query = build_stat_statements_query(self.server_version_num);
        let client = self.ensure_connected()?;
        let rows = match client.query(&query, &[]) {
            Ok(rows) => rows,
            Err(e) => {
                // Drop the connection so the next fetch reconnects.
                self.client = None;
                self.server_version_num = None;
                return Err(SourceError::Query(format_postgres_error(&e)));
            }
        };

        let records: Vec<StatementStatistics> = rows.iter().map(row_to_statistics).collect();
        debug!(records = records.len(), "fetched pg_stat_statements");
        Ok(records)
    }
}

fn row_to_statistics(row: &Row) -> StatementStatistics {
    StatementStatistics {
        userid: row.get("userid"),
        dbid: row.get("dbid"),
        toplevel: row.get("toplevel"),
        queryid: row.get("queryid"),
        query: row.get("query"),
        plans: row.get("plans"),
        total_plan_time: row.get("total_plan_time"),
        min_plan_time: row.get("min_plan_time"),
        max_plan_time: row.get("max_plan_time"),
        mean_plan_time: row.get("mean_plan_time"),
        stddev_plan_time: row.get("stddev_plan_time"),
        calls: row.get("calls"),
        total_exec_time: row.get("total_exec_time"),
        min_exec_time: row.get("min_exec_time"),
        max_exec_time: row.get("max_exec_time"),
        mean_exec_time: row.get("mean_exec_time"),
        stddev_exec_time: row.get("stddev_exec_time"),
        rows: row.get("rows"),
        shared_blks_hit: row.get("shared_blks_hit"),
        shared_blks_read: row.get("shared_blks_read"),
        shared_blks_dirtied: row.get("shared_blks_dirtied"),
        shared_blks_written: row.get("shared_blks_written"),
        local_blks_hit: row.get("local_blks_hit"),
        local_blks_read: row.get("local_blks_read"),
        local_blks_dirtied: row.get("local_blks_dirtied"),
        local_blks_written: row.get("local_blks_written"),
        temp_blks_read: row.get("temp_blks_read"),
        temp_blks_written: row.get("temp_blks_written"),
        blk_read_time: row.get("blk_read_time"),
        blk_write_time: row.get("blk_write_time"),
        temp_blk_read_time: row.get("temp_blk_read_time"),
        temp_blk_write_time: row.get("temp_blk_write_time"),
        wal_records: row.get("wal_records"),
        wal_fpi: row.get("wal_fpi"),
        wal_bytes: row.get("wal_bytes"),
        jit_functions: row.get("jit_functions"),
        jit_generation_time: row.get("jit_generation_time"),
        jit_inlining_count: row.get("jit_inlining_count"),
        jit_inlining_time: row.get("jit_inlining_time"),
        jit_optimization_count: row.get("jit_optimization_count"),
        jit_optimization_time: row.get("jit_optimization_time"),
        jit_emission_count: row.get("jit_emission_count"),
        jit_emission_time: row.get("jit_emission_time"),
    }
}

/// Formats PostgreSQL error message for display.
pub(crate) fn format_postgres_error(e: &postgres::Error) -> String {
    if let Some(db_error) = e.as_db_error() {
        format!("{}: {}", db_error.severity(), db_error.message())
    } else {
        let msg = e.to_string();
        if msg.contains("Connection refused") {
            "connection refused".to_string()
        } else if msg.contains("password authentication failed") {
            "password authentication failed".to_string()
        } else {
            msg
        }
    }
}
