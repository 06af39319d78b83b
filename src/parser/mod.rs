//! Benchmark log parsing
//!
//! Each supported tool writes one report line per interval. A parser turns
//! a whole log into a [`Series`], skipping the preamble and trailing summary
//! lines the tool prints around its periodic reports.
//!
//! Supports:
//! - `kafka-producer-perf-test.sh` output, stamped line by line
//! - `kafka-consumer-perf-test.sh --show-detailed-stat` output
//! - RabbitMQ PerfTest output, stamped line by line
//! - `vmstat -n -t` output (broker disk writes)

pub mod kafka;
pub mod rabbitmq;
pub mod timestamp;
pub mod vmstat;

use crate::error::ParseError;
use crate::sample::{Sample, Series};
use anyhow::Context;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

pub use timestamp::{format_timestamp, parse_timestamp, TIMESTAMP_FORMAT};

/// Default message size in bytes for rate-to-throughput conversion
pub const DEFAULT_RECORD_SIZE: u64 = 512;

/// Supported log formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum LogFormat {
    /// kafka-producer-perf-test.sh, stamped
    KafkaProducer,
    /// kafka-consumer-perf-test.sh --show-detailed-stat
    KafkaConsumer,
    /// RabbitMQ PerfTest, stamped
    Rabbitmq,
    /// vmstat -n -t
    Vmstat,
}

impl LogFormat {
    /// Lines dropped before and after the periodic reports
    ///
    /// Producer logs end with a totals line, consumer logs start with a column
    /// header, PerfTest adds two lines at either end and vmstat has a two line
    /// banner.
    pub fn framing(self) -> (usize, usize) {
        match self {
            LogFormat::KafkaProducer => (0, 1),
            LogFormat::KafkaConsumer => (1, 1),
            LogFormat::Rabbitmq => (2, 2),
            LogFormat::Vmstat => (2, 0),
        }
    }
}

/// Options shared by all formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Fail on the first malformed line instead of skipping it
    pub strict: bool,
    /// Message size in bytes (RabbitMQ only)
    pub record_size: u64,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            strict: false,
            record_size: DEFAULT_RECORD_SIZE,
        }
    }
}

/// A parsed log plus how many report lines were dropped
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedLog {
    pub series: Series,
    pub skipped: usize,
}

enum LineParser {
    KafkaProducer(kafka::ProducerLineParser),
    KafkaConsumer,
    Rabbitmq(rabbitmq::PerfTestLineParser),
    Vmstat(vmstat::VmstatLineParser),
}

impl LineParser {
    fn parse_line(&self, line_no: usize, line: &str) -> Result<Sample, ParseError> {
        match self {
            LineParser::KafkaProducer(p) => p.parse_line(line_no, line),
            LineParser::KafkaConsumer => kafka::parse_consumer_line(line_no, line),
            LineParser::Rabbitmq(p) => p.parse_line(line_no, line),
            LineParser::Vmstat(p) => p.parse_line(line_no, line),
        }
    }
}

/// Parser for one log format
pub struct LogParser {
    format: LogFormat,
    options: ParseOptions,
    lines: LineParser,
}

impl LogParser {
    pub fn new(format: LogFormat, options: ParseOptions) -> Result<Self, regex::Error> {
        let lines = match format {
            LogFormat::KafkaProducer => {
                LineParser::KafkaProducer(kafka::ProducerLineParser::new()?)
            }
            LogFormat::KafkaConsumer => LineParser::KafkaConsumer,
            LogFormat::Rabbitmq => {
                LineParser::Rabbitmq(rabbitmq::PerfTestLineParser::new(options.record_size)?)
            }
            LogFormat::Vmstat => LineParser::Vmstat(vmstat::VmstatLineParser::from_header(None)),
        };
        Ok(Self {
            format,
            options,
            lines,
        })
    }

    pub fn format(&self) -> LogFormat {
        self.format
    }

    /// Parse a whole log held in memory
    pub fn parse_str(&self, content: &str) -> Result<ParsedLog, ParseError> {
        let lines: Vec<&str> = content.lines().collect();
        let (head, tail) = self.format.framing();
        let end = lines.len().saturating_sub(tail);

        // vmstat column positions come from this log's own header line
        let with_header;
        let parser = match &self.lines {
            LineParser::Vmstat(_) => {
                with_header = LineParser::Vmstat(vmstat::VmstatLineParser::from_header(
                    lines.get(1).copied(),
                ));
                &with_header
            }
            other => other,
        };

        let mut parsed = ParsedLog::default();
        for (index, line) in lines.iter().enumerate().take(end).skip(head) {
            let line_no = index + 1;
            if line.trim().is_empty() {
                continue;
            }

            let outcome = parser.parse_line(line_no, line).and_then(|sample| {
                parsed.series.push(sample).map_err(|rejected| ParseError::OutOfOrder {
                    line: line_no,
                    timestamp: format_timestamp(&rejected.timestamp),
                })
            });

            if let Err(err) = outcome {
                if self.options.strict {
                    return Err(err);
                }
                warn!(format = ?self.format, "skipping line: {}", err);
                parsed.skipped += 1;
            }
        }

        debug!(
            format = ?self.format,
            samples = parsed.series.len(),
            skipped = parsed.skipped,
            "parsed log"
        );
        Ok(parsed)
    }

    /// Parse a log file
    pub fn parse_file<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<ParsedLog> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        self.parse_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }
}

/// Split the leading stamped timestamp off a comma-separated line
pub(crate) fn timestamp_field(
    line_no: usize,
    line: &str,
) -> Result<(NaiveDateTime, &str), ParseError> {
    let (stamp, rest) = line.split_once(',').unwrap_or((line, ""));
    let timestamp = parse_timestamp(stamp).ok_or_else(|| ParseError::InvalidTimestamp {
        line: line_no,
        value: stamp.trim().to_string(),
    })?;
    Ok((timestamp, rest))
}

pub(crate) fn field<'a>(
    fields: &[&'a str],
    index: usize,
    line_no: usize,
) -> Result<&'a str, ParseError> {
    fields.get(index).copied().ok_or(ParseError::MissingField {
        line: line_no,
        field: index,
    })
}

pub(crate) fn parse_number(line_no: usize, text: &str) -> Result<f64, ParseError> {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ParseError::InvalidNumber {
            line: line_no,
            value: text.trim().to_string(),
        })
}

/// Parse a single report line with no framing, e.g. from a fuzzer or a tail
pub fn parse_line(
    format: LogFormat,
    options: ParseOptions,
    line_no: usize,
    line: &str,
) -> anyhow::Result<Sample> {
    let parser = LogParser::new(format, options)?;
    Ok(parser.lines.parse_line(line_no, line)?)
}
