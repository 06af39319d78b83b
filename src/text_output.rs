//! Plain-text reports for the terminal

use crate::disk::DiskTable;
use crate::experiment::ExperimentSummary;
use crate::parser::{format_timestamp, ParsedLog};
use crate::sample::Series;
use crate::stats::{ColumnSummary, Summary};
use crate::trial::{FillPolicy, TrialTable, THROUGHPUT_CONSUMER, THROUGHPUT_PRODUCER};
use std::fmt::Write;
use std::path::{Path, PathBuf};

fn optional(value: Option<f64>) -> String {
    value.map(|v| format!("{:.1}", v)).unwrap_or_else(|| "-".to_string())
}

/// Sample table of one parsed log with its summary line
pub fn format_series(
    file: &Path,
    parsed: &ParsedLog,
    steady: &Series,
    summary: Option<&Summary>,
) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{}: {} samples parsed, {} skipped, {} in steady state",
        file.display(),
        parsed.series.len(),
        parsed.skipped,
        steady.len()
    );
    let _ = writeln!(out, "{:<19} {:>8} {:>14} {:>10}", "timestamp", "elapsed", "msgs/sec", "MB/sec");
    for (sample, elapsed) in steady.iter().zip(steady.elapsed_seconds()) {
        let _ = writeln!(
            out,
            "{:<19} {:>8} {:>14} {:>10.3}",
            format_timestamp(&sample.timestamp),
            elapsed,
            optional(sample.msgs_per_sec),
            sample.throughput
        );
    }
    if let Some(s) = summary {
        let _ = writeln!(
            out,
            "\nmean {:.3} MB/s, stddev {:.3}, median {:.3}, min {:.3}, max {:.3} (n={})",
            s.mean, s.stddev, s.median, s.min, s.max, s.n
        );
    }
    out
}

fn column_mean(table: &TrialTable, column: &str, fill: FillPolicy) -> String {
    match table.column(column, fill) {
        Ok(values) if !values.is_empty() => {
            format!("{:.3}", values.iter().sum::<f64>() / values.len() as f64)
        }
        _ => "-".to_string(),
    }
}

/// One line per trial: row count and mean producer/consumer throughput
///
/// Means use the same fill policy as `summarize`, so both commands agree.
pub fn format_trials(trials: &[(PathBuf, TrialTable)], fill: FillPolicy) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{:>6} {:>14} {:>14}  trial", "rows", "producer MB/s", "consumer MB/s");
    for (dir, table) in trials {
        let _ = writeln!(
            out,
            "{:>6} {:>14} {:>14}  {}",
            table.len(),
            column_mean(table, THROUGHPUT_PRODUCER, fill),
            column_mean(table, THROUGHPUT_CONSUMER, fill),
            dir.display()
        );
    }
    let _ = writeln!(out, "\n{} trial(s)", trials.len());
    out
}

/// Broker disk writes beside producer throughput, one line per vmstat sample
pub fn format_disk(table: &DiskTable, fill: FillPolicy) -> String {
    let gap = |value: Option<f64>| match (value, fill) {
        (Some(v), _) => format!("{:.3}", v),
        (None, FillPolicy::Zero) => format!("{:.3}", 0.0),
        (None, FillPolicy::Skip) => "-".to_string(),
    };
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<19} {:>8} {:>10} {:>14}",
        "timestamp", "elapsed", "disk MB/s", "producer MB/s"
    );
    for row in table.rows() {
        let _ = writeln!(
            out,
            "{:<19} {:>8} {:>10.3} {:>14}",
            format_timestamp(&row.timestamp),
            row.seconds_vmstat,
            row.throughput_vmstat,
            gap(row.throughput_producer)
        );
    }
    let _ = writeln!(
        out,
        "\n{} vmstat sample(s), {} with a producer report",
        table.len(),
        table.matched()
    );
    out
}

fn format_column(out: &mut String, role: &str, column: Option<&ColumnSummary>) {
    let Some(c) = column else {
        let _ = writeln!(out, "  {:<9} no data", role);
        return;
    };
    let (below, above) = c.error_bars();
    let _ = writeln!(
        out,
        "  {:<9} mean {:.3} MB/s  {:.0}% CI [{:.3}, {:.3}] (-{:.3}/+{:.3})  stddev {:.3}  n={}",
        role,
        c.summary.mean,
        c.ci.interval.level * 100.0,
        c.ci.interval.lower,
        c.ci.interval.upper,
        below,
        above,
        c.summary.stddev,
        c.summary.n
    );
}

/// Experiments in sweep order with their throughput intervals
pub fn format_sweep(summaries: &[ExperimentSummary]) -> String {
    let mut out = String::new();
    for summary in summaries {
        let _ = writeln!(
            out,
            "{} ({} trial(s), {} rows)",
            summary.label, summary.trials, summary.rows
        );
        format_column(&mut out, "producer", summary.producer.as_ref());
        format_column(&mut out, "consumer", summary.consumer.as_ref());
    }
    out
}
