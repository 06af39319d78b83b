//! CSV output format for series, experiment summaries and comparisons
//!
//! Trial tables have their own CSV form (`TrialTable::to_csv`) because it is
//! read back by `summarize --from-csv`; the formatters here are report-only.

use crate::experiment::ExperimentSummary;
use crate::parser::format_timestamp;
use crate::sample::Series;
use crate::stats::{BootstrapMethod, ColumnSummary, CompareVerdict, Comparison};

/// Escape CSV field (handle commas, quotes, newlines)
pub fn escape_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn optional(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// One row per sample
pub fn series_to_csv(series: &Series) -> String {
    let mut output = String::from("timestamp,elapsed_secs,msgs_per_sec,throughput\n");
    for (sample, elapsed) in series.iter().zip(series.elapsed_seconds()) {
        output.push_str(&format!(
            "{},{},{},{}\n",
            format_timestamp(&sample.timestamp),
            elapsed,
            optional(sample.msgs_per_sec),
            sample.throughput
        ));
    }
    output
}

const SUMMARY_HEADER: &str =
    "experiment,trials,column,n,mean,stddev,min,max,median,ci_lower,ci_upper,confidence,method\n";

fn method_name(method: BootstrapMethod) -> &'static str {
    match method {
        BootstrapMethod::Percentile => "percentile",
        BootstrapMethod::Bca => "bca",
    }
}

fn push_summary_row(output: &mut String, experiment: &ExperimentSummary, column: &ColumnSummary) {
    let s = &column.summary;
    let ci = &column.ci;
    output.push_str(&format!(
        "{},{},{},{},{},{},{},{},{},{},{},{},{}\n",
        escape_field(&experiment.label),
        experiment.trials,
        column.column,
        s.n,
        s.mean,
        s.stddev,
        s.min,
        s.max,
        s.median,
        ci.interval.lower,
        ci.interval.upper,
        ci.interval.level,
        method_name(ci.method)
    ));
}

/// One row per experiment and throughput column
pub fn summaries_to_csv(summaries: &[ExperimentSummary]) -> String {
    let mut output = String::from(SUMMARY_HEADER);
    for experiment in summaries {
        for column in [&experiment.producer, &experiment.consumer].into_iter().flatten() {
            push_summary_row(&mut output, experiment, column);
        }
    }
    output
}

pub fn comparison_to_csv(comparison: &Comparison) -> String {
    let verdict = match comparison.verdict {
        CompareVerdict::Different => "different",
        CompareVerdict::NotSignificant => "not_significant",
        CompareVerdict::InsufficientData { .. } => "insufficient_data",
    };
    let cells: Vec<String> = match &comparison.test {
        Some(t) => [
            t.statistic,
            t.df,
            t.pvalue,
            t.baseline_median,
            t.current_median,
        ]
        .iter()
        .map(|v| v.to_string())
        .collect(),
        None => vec![String::new(); 5],
    };
    format!(
        "column,baseline_n,current_n,statistic,df,pvalue,baseline_median,current_median,verdict\n\
         {},{},{},{},{}\n",
        escape_field(&comparison.column),
        comparison.baseline_n,
        comparison.current_n,
        cells.join(","),
        verdict
    )
}
