//! Broker disk writes next to producer throughput
//!
//! `vmstat` on a broker reports the blocks written per interval. Left-joining
//! the producer series onto the vmstat timestamps shows whether the broker's
//! disk keeps pace with what clients send. Each side keeps its own
//! elapsed-seconds clock, measured from its own first sample.

use crate::parser::format_timestamp;
use crate::sample::Series;
use crate::trial::{average_duplicates, FillPolicy};
use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::BTreeMap;

/// Column order of the CSV form
pub const DISK_COLUMNS: [&str; 5] = [
    "timestamp",
    "seconds_vmstat",
    "throughput_vmstat",
    "seconds_producer",
    "throughput_producer",
];

/// One vmstat interval with the producer report at the same second, if any
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DiskRow {
    pub timestamp: NaiveDateTime,
    pub seconds_vmstat: i64,
    /// Disk writes in MB/s
    pub throughput_vmstat: f64,
    pub seconds_producer: Option<i64>,
    pub throughput_producer: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DiskTable {
    rows: Vec<DiskRow>,
}

impl DiskTable {
    /// Left join of a producer series onto vmstat samples
    ///
    /// Producer samples sharing a timestamp are averaged first; producer
    /// samples at seconds vmstat never reported are dropped.
    pub fn join(vmstat: &Series, producer: &Series) -> Self {
        let producer = average_duplicates(producer);
        let producer_start = producer.first().map(|s| s.timestamp);
        let sent: BTreeMap<NaiveDateTime, f64> = producer
            .iter()
            .map(|s| (s.timestamp, s.throughput))
            .collect();

        let rows = vmstat
            .iter()
            .zip(vmstat.elapsed_seconds())
            .map(|(sample, seconds_vmstat)| {
                let throughput_producer = sent.get(&sample.timestamp).copied();
                let seconds_producer = throughput_producer
                    .and(producer_start)
                    .map(|start| (sample.timestamp - start).num_seconds());
                DiskRow {
                    timestamp: sample.timestamp,
                    seconds_vmstat,
                    throughput_vmstat: sample.throughput,
                    seconds_producer,
                    throughput_producer,
                }
            })
            .collect();

        Self { rows }
    }

    pub fn rows(&self) -> &[DiskRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows where the producer reported at the same second
    pub fn matched(&self) -> usize {
        self.rows
            .iter()
            .filter(|r| r.throughput_producer.is_some())
            .count()
    }

    /// CSV with producer gaps left empty or written as 0
    pub fn to_csv(&self, fill: FillPolicy) -> String {
        let gap = match fill {
            FillPolicy::Skip => "",
            FillPolicy::Zero => "0",
        };
        let mut output = DISK_COLUMNS.join(",");
        output.push('\n');
        for row in &self.rows {
            output.push_str(&format!(
                "{},{},{},{},{}\n",
                format_timestamp(&row.timestamp),
                row.seconds_vmstat,
                row.throughput_vmstat,
                row.seconds_producer
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| gap.to_string()),
                row.throughput_producer
                    .map(|t| t.to_string())
                    .unwrap_or_else(|| gap.to_string()),
            ));
        }
        output
    }
}
