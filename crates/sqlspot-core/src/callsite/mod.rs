//! Per-call-site aggregation of query log entries.
//!
//! Entries are grouped by their `path:line` location. Each group keeps an
//! occurrence count and the summed absolute execution time in whole
//! milliseconds. The report lists groups in byte-lexical location order and
//! keeps only "hot" (frequent) or "slow" (high mean) locations.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::Serialize;
use tracing::debug;

use crate::log::{LogEntry, parse_duration};

/// Location prefix emitted when the framework could not resolve a call site.
pub const UNKNOWN_LOCATION_PREFIX: &str = "unknown:";

/// Inclusion thresholds. A location is reported when either one is met.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Thresholds {
    /// Minimum number of executions.
    pub min_count: u64,
    /// Minimum mean execution time in milliseconds.
    pub min_mean_ms: f64,
}

impl Thresholds {
    /// Busy production logs: count >= 750 or mean >= 30 ms.
    pub const DEFAULT: Thresholds = Thresholds {
        min_count: 750,
        min_mean_ms: 30.0,
    };

    /// Smaller logs: count >= 200 or mean >= 10.5 ms.
    pub const SENSITIVE: Thresholds = Thresholds {
        min_count: 200,
        min_mean_ms: 10.5,
    };

    /// Reports everything.
    pub const ALL: Thresholds = Thresholds {
        min_count: 0,
        min_mean_ms: 0.0,
    };

    pub fn admits(&self, count: u64, mean_ms: f64) -> bool {
        count >= self.min_count || mean_ms >= self.min_mean_ms
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Named threshold presets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Preset {
    #[default]
    Default,
    Sensitive,
}

impl Preset {
    pub fn thresholds(self) -> Thresholds {
        match self {
            Preset::Default => Thresholds::DEFAULT,
            Preset::Sensitive => Thresholds::SENSITIVE,
        }
    }
}

impl FromStr for Preset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "default" => Ok(Preset::Default),
            "sensitive" => Ok(Preset::Sensitive),
            other => Err(format!(
                "unknown preset '{other}' (expected 'default' or 'sensitive')"
            )),
        }
    }
}

/// Filtering configuration for a call-site report.
#[derive(Clone, Debug, PartialEq)]
pub struct ReportConfig {
    pub thresholds: Thresholds,
    /// Locations starting with any of these prefixes are never reported.
    pub ignore_prefixes: Vec<String>,
}

impl ReportConfig {
    pub fn new(thresholds: Thresholds) -> Self {
        Self {
            thresholds,
            ..Self::default()
        }
    }

    pub fn with_ignore_prefixes(mut self, prefixes: Vec<String>) -> Self {
        self.ignore_prefixes = prefixes;
        self
    }

    pub fn is_ignored(&self, location: &str) -> bool {
        self.ignore_prefixes
            .iter()
            .any(|p| location.starts_with(p.as_str()))
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            thresholds: Thresholds::DEFAULT,
            ignore_prefixes: vec![UNKNOWN_LOCATION_PREFIX.to_string()],
        }
    }
}

/// Running totals for one location.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AggregateRecord {
    pub count: u64,
    pub total_ms: u64,
}

impl AggregateRecord {
    pub fn add(&mut self, elapsed_ms: u64) {
        self.count += 1;
        self.total_ms = self.total_ms.saturating_add(elapsed_ms);
    }

    pub fn merge(&mut self, other: AggregateRecord) {
        self.count += other.count;
        self.total_ms = self.total_ms.saturating_add(other.total_ms);
    }

    pub fn mean_ms(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        self.total_ms as f64 / self.count as f64
    }
}

/// One reported location.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CallSiteStats {
    pub location: String,
    pub count: u64,
    pub mean_ms: f64,
    pub total_ms: u64,
}

/// Filtered, location-ordered aggregation result.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct CallSiteReport {
    pub sites: Vec<CallSiteStats>,
    /// Distinct locations seen before filtering.
    pub locations_seen: usize,
    /// Entries whose execution time literal could not be interpreted.
    pub unparseable_durations: usize,
}

/// Absolute execution time of an entry in whole milliseconds.
///
/// Unparseable literals contribute nothing.
pub fn elapsed_ms(exec_time: &str) -> Option<u64> {
    match parse_duration(exec_time) {
        Ok(d) => Some(u64::try_from(d.as_millis()).unwrap_or(u64::MAX)),
        Err(e) => {
            debug!(literal = exec_time, error = %e, "unparseable execution time");
            None
        }
    }
}

/// Accumulates entries into per-location records.
///
/// Folding is commutative and associative per location, so partial
/// aggregators built over disjoint slices can be combined with [`merge`](Self::merge).
#[derive(Clone, Debug, Default)]
pub struct Aggregator {
    records: BTreeMap<String, AggregateRecord>,
    unparseable: usize,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, entry: &LogEntry) {
        let elapsed = elapsed_ms(entry.exec_time()).unwrap_or_else(|| {
            self.unparseable += 1;
            0
        });
        match self.records.get_mut(entry.location()) {
            Some(record) => record.add(elapsed),
            None => {
                let mut record = AggregateRecord::default();
                record.add(elapsed);
                self.records.insert(entry.location().to_string(), record);
            }
        }
    }

    pub fn merge(&mut self, other: Aggregator) {
        for (location, record) in other.records {
            self.records.entry(location).or_default().merge(record);
        }
        self.unparseable += other.unparseable;
    }

    pub fn record(&self, location: &str) -> Option<&AggregateRecord> {
        self.records.get(location)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Applies the report filter. Output is sorted by location.
    pub fn finish(self, config: &ReportConfig) -> CallSiteReport {
        let locations_seen = self.records.len();
        let sites = self
            .records
            .into_iter()
            .filter(|(location, _)| !config.is_ignored(location))
            .filter_map(|(location, record)| {
                let mean_ms = record.mean_ms();
                config
                    .thresholds
                    .admits(record.count, mean_ms)
                    .then_some(CallSiteStats {
                        location,
                        count: record.count,
                        mean_ms,
                        total_ms: record.total_ms,
                    })
            })
            .collect();

        CallSiteReport {
            sites,
            locations_seen,
            unparseable_durations: self.unparseable,
        }
    }
}

/// Aggregates `entries` and produces the filtered report.
pub fn aggregate<'a, I>(entries: I, config: &ReportConfig) -> CallSiteReport
where
    I: IntoIterator<Item = &'a LogEntry>,
{
    let mut aggregator = Aggregator::new();
    for entry in entries {
        aggregator.add(entry);
    }
    aggregator.finish(config)
}
