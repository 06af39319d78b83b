//! JSON output format for series, trial tables and experiment reports
//!
//! `--format json` wraps every report in a versioned envelope:
//!
//! ```json
//! { "version": "0.3.1", "format": "brokerbench-json-v1", "report": { "kind": "sweep", ... } }
//! ```

use crate::disk::{DiskRow, DiskTable};
use crate::experiment::ExperimentSummary;
use crate::parser::{format_timestamp, LogFormat, ParsedLog};
use crate::sample::Series;
use crate::stats::{Comparison, Summary};
use crate::trial::{TrialRow, TrialTable};
use serde::Serialize;
use std::path::Path;

/// One sample of a parsed log
#[derive(Debug, Clone, Serialize)]
pub struct JsonPoint {
    /// `%Y-%m-%d %H:%M:%S`
    pub timestamp: String,
    pub elapsed_secs: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub msgs_per_sec: Option<f64>,
    /// MB/s
    pub throughput: f64,
}

/// A parsed and windowed log
#[derive(Debug, Clone, Serialize)]
pub struct JsonSeries {
    pub file: String,
    pub log_format: LogFormat,
    /// Lines dropped as malformed or out of order
    pub skipped: usize,
    pub points: Vec<JsonPoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<Summary>,
}

impl JsonSeries {
    pub fn new(
        file: &Path,
        log_format: LogFormat,
        parsed: &ParsedLog,
        steady: &Series,
        summary: Option<Summary>,
    ) -> Self {
        let points = steady
            .iter()
            .zip(steady.elapsed_seconds())
            .map(|(sample, elapsed_secs)| JsonPoint {
                timestamp: format_timestamp(&sample.timestamp),
                elapsed_secs,
                msgs_per_sec: sample.msgs_per_sec,
                throughput: sample.throughput,
            })
            .collect();
        Self {
            file: file.display().to_string(),
            log_format,
            skipped: parsed.skipped,
            points,
            summary,
        }
    }
}

/// One trial directory and its joined table
#[derive(Debug, Clone, Serialize)]
pub struct JsonTrial {
    pub dir: String,
    pub rows: Vec<TrialRow>,
}

impl JsonTrial {
    pub fn new(dir: &Path, table: &TrialTable) -> Self {
        Self {
            dir: dir.display().to_string(),
            rows: table.rows().to_vec(),
        }
    }
}

/// Report payload, tagged by `kind`
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum JsonReport {
    Series(JsonSeries),
    Trials { trials: Vec<JsonTrial> },
    Sweep { experiments: Vec<ExperimentSummary> },
    Comparison(Comparison),
    Disk { rows: Vec<DiskRow> },
}

impl JsonReport {
    pub fn disk(table: &DiskTable) -> Self {
        JsonReport::Disk {
            rows: table.rows().to_vec(),
        }
    }
}

/// Root JSON output structure
#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput {
    /// Crate version that produced the report
    pub version: String,
    /// Format name
    pub format: String,
    pub report: JsonReport,
}

impl JsonOutput {
    pub fn new(report: JsonReport) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            format: "brokerbench-json-v1".to_string(),
            report,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
