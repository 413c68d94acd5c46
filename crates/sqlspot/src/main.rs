//! sqlspot - hot and slow SQL call sites from framework query logs.
//!
//! Reads a query log, groups executed statements by call site and prints the
//! locations that run often or slowly. Optionally analyzes pg_stat_statements
//! (live or from a JSON dump) and prints optimization suggestions.

use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, ValueEnum};
use serde::Serialize;
use tracing::{Level, debug, info, warn};
use tracing_subscriber::EnvFilter;

use sqlspot_core::analysis::Analyzer;
use sqlspot_core::callsite::{CallSiteReport, Preset, ReportConfig, UNKNOWN_LOCATION_PREFIX, aggregate};
use sqlspot_core::collector::{JsonFileSource, PostgresSource, StatementSource};
use sqlspot_core::fmt::{write_callsite_report, write_suggestions};
use sqlspot_core::log::read_entries;
use sqlspot_core::model::OptimizationSuggestion;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

/// Query log call-site analyzer.
#[derive(Parser)]
#[command(name = "sqlspot", about = "Hot and slow SQL call sites from query logs", version)]
struct Args {
    /// Query log file to analyze.
    logfile: Option<PathBuf>,

    /// Threshold preset: "default" (count >= 750 or mean >= 30 ms)
    /// or "sensitive" (count >= 200 or mean >= 10.5 ms).
    #[arg(long, env = "SQLSPOT_PRESET", default_value = "default")]
    preset: Preset,

    /// Report locations executed at least this many times (overrides the preset).
    #[arg(long, env = "SQLSPOT_MIN_COUNT")]
    min_count: Option<u64>,

    /// Report locations with at least this mean time in ms (overrides the preset).
    #[arg(long, env = "SQLSPOT_MIN_MEAN_MS")]
    min_mean_ms: Option<f64>,

    /// Never report locations starting with this prefix. Repeatable.
    /// Pass an empty string to report every location.
    #[arg(long = "ignore-prefix", value_name = "PREFIX", default_value = UNKNOWN_LOCATION_PREFIX)]
    ignore_prefixes: Vec<String>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Fetch pg_stat_statements (PGHOST, PGPORT, PGUSER, PGPASSWORD, PGDATABASE)
    /// and print optimization suggestions.
    #[arg(long)]
    suggest: bool,

    /// Analyze statement statistics from a JSON file instead of PostgreSQL.
    #[arg(long, value_name = "PATH")]
    stats_file: Option<PathBuf>,

    /// Also run the total execution time and rows-per-call rules.
    #[arg(long)]
    extended_rules: bool,

    /// Increase logging verbosity (-v for debug, -vv for trace). Default is info level.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode - only show errors.
    #[arg(short, long)]
    quiet: bool,
}

impl Args {
    fn analyze_statements(&self) -> bool {
        self.suggest || self.stats_file.is_some()
    }

    fn report_config(&self) -> ReportConfig {
        let mut thresholds = self.preset.thresholds();
        if let Some(min_count) = self.min_count {
            thresholds.min_count = min_count;
        }
        if let Some(min_mean_ms) = self.min_mean_ms {
            thresholds.min_mean_ms = min_mean_ms;
        }
        let prefixes = self
            .ignore_prefixes
            .iter()
            .filter(|p| !p.is_empty())
            .cloned()
            .collect();
        ReportConfig::new(thresholds).with_ignore_prefixes(prefixes)
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    call_sites: Option<&'a CallSiteReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    suggestions: Option<&'a [OptimizationSuggestion]>,
}

/// Initializes the tracing subscriber with the appropriate log level.
/// Default level is INFO. Use -q for quiet mode (errors only).
/// Logs go to stderr; stdout carries only the report.
fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let mut filter = EnvFilter::from_default_env();
    for target in ["sqlspot", "sqlspot_core"] {
        if let Ok(directive) = format!("{target}={level}").parse() {
            filter = filter.add_directive(directive);
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn call_site_report(args: &Args) -> Result<Option<CallSiteReport>> {
    let Some(path) = &args.logfile else {
        return Ok(None);
    };

    let file = File::open(path)
        .with_context(|| format!("Error opening file {}", path.display()))?;
    let summary = read_entries(BufReader::new(file));

    info!(
        "Read {} lines: {} entries, {} rejected",
        summary.lines_read,
        summary.entries.len(),
        summary.rejected_total()
    );
    for (kind, count) in &summary.rejected {
        debug!(kind, count, "rejected lines");
    }
    if let Some(err) = &summary.read_error {
        warn!("Error reading file: {}", err);
    }

    let config = args.report_config();
    debug!(
        min_count = config.thresholds.min_count,
        min_mean_ms = config.thresholds.min_mean_ms,
        ignore = ?config.ignore_prefixes,
        "report config"
    );
    let report = aggregate(&summary.entries, &config);
    if report.unparseable_durations > 0 {
        warn!(
            "{} entries had an unparseable execution time, counted as 0 ms",
            report.unparseable_durations
        );
    }
    info!(
        "{} of {} call sites reported",
        report.sites.len(),
        report.locations_seen
    );
    Ok(Some(report))
}

fn statement_suggestions(args: &Args) -> Result<Option<Vec<OptimizationSuggestion>>> {
    if !args.analyze_statements() {
        return Ok(None);
    }

    let mut source: Box<dyn StatementSource> = match &args.stats_file {
        Some(path) => Box::new(JsonFileSource::new(path)),
        None => Box::new(PostgresSource::from_env()?),
    };
    info!("Fetching statement statistics from {}", source.describe());
    let records = source
        .fetch()
        .context("Error fetching statement statistics")?;

    let analyzer = if args.extended_rules {
        Analyzer::extended()
    } else {
        Analyzer::default()
    };
    debug!(rules = ?analyzer.rule_ids(), "analyzing statements");
    let suggestions = analyzer.analyze(&records);
    info!(
        "{} of {} statements flagged",
        suggestions.len(),
        records.len()
    );
    Ok(Some(suggestions))
}

fn run(args: &Args) -> Result<()> {
    let report = call_site_report(args)?;
    let suggestions = statement_suggestions(args)?;

    let mut out = io::stdout().lock();
    match args.format {
        Format::Text => {
            if let Some(report) = &report {
                write_callsite_report(&mut out, report)?;
            }
            if let Some(suggestions) = &suggestions {
                if report.is_some() {
                    writeln!(out)?;
                }
                write_suggestions(&mut out, suggestions)?;
            }
        }
        Format::Json => {
            let json = JsonReport {
                call_sites: report.as_ref(),
                suggestions: suggestions.as_deref(),
            };
            serde_json::to_writer_pretty(&mut out, &json)?;
            writeln!(out)?;
        }
    }
    out.flush()?;
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();

    init_logging(args.verbose, args.quiet);
    debug!(
        "sqlspot {} ({}) starting",
        env!("CARGO_PKG_VERSION"),
        sqlspot_core::GIT_SHA
    );

    if args.logfile.is_none() && !args.analyze_statements() {
        let mut cmd = Args::command();
        if cmd.print_help().is_ok() {
            println!();
        }
        return ExitCode::SUCCESS;
    }

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
