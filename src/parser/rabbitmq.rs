//! RabbitMQ PerfTest output, stamped by the recorder
//!
//! ```text
//! 2019-03-01 12:00:01, id: test-120001-537, time: 1.000s, sent: 19486 msg/s, received: 19329 msg/s, min/median/75th/95th/99th consumer latency: 155/2510/3190/4018/4466 µs
//! ```
//!
//! The rate is read from the fourth comma-separated field (`sent:` for a
//! producer-only run, `received:` for a consumer-only run).

use super::{field, parse_number, timestamp_field};
use crate::error::ParseError;
use crate::sample::Sample;
use regex::Regex;

const RATE_PATTERN: &str = r"(\d+(?:\.\d+)?) msg/s";

/// Field index of the message rate, counting the stamped timestamp as field 0
const RATE_FIELD: usize = 3;

/// Bytes per MB when converting message rates to throughput
const BYTES_PER_MB: f64 = 1_000_000.0;

/// Line parser for PerfTest periodic reports
#[derive(Debug, Clone)]
pub struct PerfTestLineParser {
    rate: Regex,
    record_size: u64,
}

impl PerfTestLineParser {
    /// `record_size` is the message body size in bytes used to derive MB/s
    pub fn new(record_size: u64) -> Result<Self, regex::Error> {
        Ok(Self {
            rate: Regex::new(RATE_PATTERN)?,
            record_size,
        })
    }

    pub fn parse_line(&self, line_no: usize, line: &str) -> Result<Sample, ParseError> {
        let (timestamp, _) = timestamp_field(line_no, line)?;
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        let rate_field = field(&fields, RATE_FIELD, line_no)?;

        let caps = self
            .rate
            .captures(rate_field)
            .ok_or_else(|| ParseError::MissingThroughput {
                line: line_no,
                text: rate_field.to_string(),
            })?;
        let msgs_per_sec = parse_number(line_no, &caps[1])?;

        Ok(Sample::new(
            timestamp,
            Some(msgs_per_sec),
            msgs_to_mb(msgs_per_sec, self.record_size),
        ))
    }
}

/// Convert a message rate to MB/s for the given message size
pub fn msgs_to_mb(msgs_per_sec: f64, record_size: u64) -> f64 {
    msgs_per_sec * record_size as f64 / BYTES_PER_MB
}
