//! Per-trial throughput tables
//!
//! A trial is one run of the benchmark with a fixed configuration. Its
//! producer and consumer logs are reduced to series, combined per role and
//! outer-joined on timestamp into a [`TrialTable`], which is stored next to
//! the logs as `throughputs.csv`.

use crate::error::TableError;
use crate::parser::{format_timestamp, parse_timestamp};
use crate::sample::{Sample, Series};
use anyhow::Context;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// File name of a stored trial table
pub const THROUGHPUTS_CSV: &str = "throughputs.csv";

pub const MSGS_PER_SEC_PRODUCER: &str = "msgs_per_sec_producer";
pub const THROUGHPUT_PRODUCER: &str = "throughput_producer";
pub const MSGS_PER_SEC_CONSUMER: &str = "msgs_per_sec_consumer";
pub const THROUGHPUT_CONSUMER: &str = "throughput_consumer";

/// Column order of the CSV form
pub const COLUMNS: [&str; 5] = [
    "timestamp",
    MSGS_PER_SEC_PRODUCER,
    THROUGHPUT_PRODUCER,
    MSGS_PER_SEC_CONSUMER,
    THROUGHPUT_CONSUMER,
];

pub type Result<T> = std::result::Result<T, TableError>;

/// How several logs of the same role are merged at a shared timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CombineMode {
    /// Total across clients
    #[default]
    Sum,
    /// Per-client average
    Mean,
}

/// Treatment of cells with no value when a column is extracted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FillPolicy {
    /// Missing values are left out, so each role is averaged over its own reports
    #[default]
    Skip,
    /// Missing values count as 0
    Zero,
}

/// One joined timestamp
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrialRow {
    pub timestamp: NaiveDateTime,
    pub msgs_per_sec_producer: Option<f64>,
    pub throughput_producer: Option<f64>,
    pub msgs_per_sec_consumer: Option<f64>,
    pub throughput_consumer: Option<f64>,
}

impl TrialRow {
    fn empty(timestamp: NaiveDateTime) -> Self {
        Self {
            timestamp,
            msgs_per_sec_producer: None,
            throughput_producer: None,
            msgs_per_sec_consumer: None,
            throughput_consumer: None,
        }
    }

    /// Value of a numeric column
    pub fn get(&self, column: &str) -> Result<Option<f64>> {
        match column {
            MSGS_PER_SEC_PRODUCER => Ok(self.msgs_per_sec_producer),
            THROUGHPUT_PRODUCER => Ok(self.throughput_producer),
            MSGS_PER_SEC_CONSUMER => Ok(self.msgs_per_sec_consumer),
            THROUGHPUT_CONSUMER => Ok(self.throughput_consumer),
            other => Err(TableError::UnknownColumn(other.to_string())),
        }
    }
}

/// Producer and consumer throughput of one or more trials
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TrialTable {
    rows: Vec<TrialRow>,
}

impl TrialTable {
    /// Outer join of a producer and a consumer series on timestamp
    ///
    /// Repeated timestamps within either series are averaged first.
    pub fn join(producer: &Series, consumer: &Series) -> Self {
        let mut rows: BTreeMap<NaiveDateTime, TrialRow> = BTreeMap::new();

        for sample in average_duplicates(producer).iter() {
            let row = rows
                .entry(sample.timestamp)
                .or_insert_with(|| TrialRow::empty(sample.timestamp));
            row.msgs_per_sec_producer = sample.msgs_per_sec;
            row.throughput_producer = Some(sample.throughput);
        }
        for sample in average_duplicates(consumer).iter() {
            let row = rows
                .entry(sample.timestamp)
                .or_insert_with(|| TrialRow::empty(sample.timestamp));
            row.msgs_per_sec_consumer = sample.msgs_per_sec;
            row.throughput_consumer = Some(sample.throughput);
        }

        Self {
            rows: rows.into_values().collect(),
        }
    }

    /// Combine every log of each role, then join the two roles
    pub fn from_logs(producers: &[Series], consumers: &[Series], mode: CombineMode) -> Self {
        Self::join(&combine(producers, mode), &combine(consumers, mode))
    }

    /// Stack tables in order, e.g. all trials of one experiment
    pub fn concat<I>(tables: I) -> Self
    where
        I: IntoIterator<Item = TrialTable>,
    {
        Self {
            rows: tables.into_iter().flat_map(|t| t.rows).collect(),
        }
    }

    pub fn rows(&self) -> &[TrialRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Extract a numeric column
    pub fn column(&self, name: &str, fill: FillPolicy) -> Result<Vec<f64>> {
        let mut values = Vec::with_capacity(self.rows.len());
        for row in &self.rows {
            match (row.get(name)?, fill) {
                (Some(v), _) => values.push(v),
                (None, FillPolicy::Zero) => values.push(0.0),
                (None, FillPolicy::Skip) => {}
            }
        }
        Ok(values)
    }

    pub fn to_csv(&self) -> String {
        let mut output = COLUMNS.join(",");
        output.push('\n');
        for row in &self.rows {
            let cells = [
                row.msgs_per_sec_producer,
                row.throughput_producer,
                row.msgs_per_sec_consumer,
                row.throughput_consumer,
            ];
            output.push_str(&format_timestamp(&row.timestamp));
            for cell in cells {
                output.push(',');
                if let Some(v) = cell {
                    output.push_str(&v.to_string());
                }
            }
            output.push('\n');
        }
        output
    }

    /// Parse the CSV written by [`TrialTable::to_csv`]
    pub fn from_csv_str(content: &str) -> Result<Self> {
        let mut lines = content.lines().enumerate();

        match lines.next() {
            Some((_, header)) if header.trim() == COLUMNS.join(",") => {}
            Some((_, header)) => {
                return Err(TableError::Csv {
                    line: 1,
                    message: format!("unexpected header '{}'", header.trim()),
                })
            }
            None => {
                return Err(TableError::Csv {
                    line: 1,
                    message: "missing header".to_string(),
                })
            }
        }

        let mut rows = Vec::new();
        for (index, line) in lines {
            let line_no = index + 1;
            if line.trim().is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.split(',').collect();
            if fields.len() != COLUMNS.len() {
                return Err(TableError::Csv {
                    line: line_no,
                    message: format!("expected {} fields, got {}", COLUMNS.len(), fields.len()),
                });
            }
            let timestamp = parse_timestamp(fields[0]).ok_or_else(|| TableError::Csv {
                line: line_no,
                message: format!("invalid timestamp '{}'", fields[0]),
            })?;
            let cell = |i: usize| -> Result<Option<f64>> {
                let text = fields[i].trim();
                if text.is_empty() {
                    return Ok(None);
                }
                text.parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .map(Some)
                    .ok_or_else(|| TableError::Csv {
                        line: line_no,
                        message: format!("invalid number '{}' in {}", text, COLUMNS[i]),
                    })
            };
            rows.push(TrialRow {
                timestamp,
                msgs_per_sec_producer: cell(1)?,
                throughput_producer: cell(2)?,
                msgs_per_sec_consumer: cell(3)?,
                throughput_consumer: cell(4)?,
            });
        }

        Ok(Self { rows })
    }

    pub fn write_csv<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let path = path.as_ref();
        fs::write(path, self.to_csv())
            .with_context(|| format!("Failed to write {}", path.display()))
    }

    pub fn read_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_csv_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }
}

/// Collapse samples sharing a timestamp into their mean
pub(crate) fn average_duplicates(series: &Series) -> Series {
    let mut merged: Vec<Sample> = Vec::with_capacity(series.len());
    let mut run = Accumulator::default();

    for sample in series {
        if run.timestamp.is_some_and(|ts| ts != sample.timestamp) {
            merged.extend(run.finish(CombineMode::Mean));
            run = Accumulator::default();
        }
        run.add(sample);
    }
    merged.extend(run.finish(CombineMode::Mean));
    Series::from_samples(merged)
}

/// Merge several series of one role into one, timestamp by timestamp
pub fn combine(series: &[Series], mode: CombineMode) -> Series {
    let mut by_ts: BTreeMap<NaiveDateTime, Accumulator> = BTreeMap::new();
    for s in series {
        for sample in average_duplicates(s).iter() {
            by_ts.entry(sample.timestamp).or_default().add(sample);
        }
    }
    Series::from_samples(by_ts.into_values().filter_map(|acc| acc.finish(mode)).collect())
}

#[derive(Default)]
struct Accumulator {
    timestamp: Option<NaiveDateTime>,
    count: usize,
    throughput: f64,
    msgs_count: usize,
    msgs: f64,
}

impl Accumulator {
    fn add(&mut self, sample: &Sample) {
        self.timestamp = Some(sample.timestamp);
        self.count += 1;
        self.throughput += sample.throughput;
        if let Some(m) = sample.msgs_per_sec {
            self.msgs_count += 1;
            self.msgs += m;
        }
    }

    fn finish(&self, mode: CombineMode) -> Option<Sample> {
        let timestamp = self.timestamp?;
        let (throughput, msgs) = match mode {
            CombineMode::Sum => (self.throughput, self.msgs),
            CombineMode::Mean => (
                self.throughput / self.count as f64,
                self.msgs / self.msgs_count.max(1) as f64,
            ),
        };
        let msgs = (self.msgs_count > 0).then_some(msgs);
        Some(Sample::new(timestamp, msgs, throughput))
    }
}
