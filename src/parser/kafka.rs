//! Kafka perf-test output
//!
//! Producer (`kafka-producer-perf-test.sh`, stamped by the recorder):
//!
//! ```text
//! 2019-03-01 12:00:05, 24996 records sent, 4998.2 records/sec (2.44 MB/sec), 3.1 ms avg latency, 98.0 ms max latency.
//! ```
//!
//! Consumer (`kafka-consumer-perf-test.sh --show-detailed-stat`):
//!
//! ```text
//! time, threadId, data.consumed.in.MB, MB.sec, data.consumed.in.nMsg, nMsg.sec
//! 2019-03-01 12:00:05:123, 0, 12.2070, 2.4414, 25000, 5000.0000
//! ```

use super::{field, parse_number, timestamp_field};
use crate::error::ParseError;
use crate::sample::Sample;
use regex::Regex;

const THROUGHPUT_PATTERN: &str = r"\((\d+(?:\.\d+)?) (\w{2})/sec\)";
const RECORDS_PATTERN: &str = r"(\d+(?:\.\d+)?) records/sec";

/// Column holding MB/s in consumer detailed stats
const CONSUMER_MB_SEC_FIELD: usize = 3;
/// Column holding messages/s in consumer detailed stats
const CONSUMER_MSG_SEC_FIELD: usize = 5;

/// Line parser for producer perf-test output
#[derive(Debug, Clone)]
pub struct ProducerLineParser {
    throughput: Regex,
    records: Regex,
}

impl ProducerLineParser {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            throughput: Regex::new(THROUGHPUT_PATTERN)?,
            records: Regex::new(RECORDS_PATTERN)?,
        })
    }

    pub fn parse_line(&self, line_no: usize, line: &str) -> Result<Sample, ParseError> {
        let (timestamp, rest) = timestamp_field(line_no, line)?;

        let caps = self
            .throughput
            .captures(rest)
            .ok_or_else(|| ParseError::MissingThroughput {
                line: line_no,
                text: rest.trim().to_string(),
            })?;
        let value = parse_number(line_no, &caps[1])?;
        let throughput = value * unit_to_mb(line_no, &caps[2])?;

        let msgs_per_sec = match self.records.captures(rest) {
            Some(caps) => Some(parse_number(line_no, &caps[1])?),
            None => None,
        };

        Ok(Sample::new(timestamp, msgs_per_sec, throughput))
    }
}

/// Parse one consumer detailed-stat row
pub fn parse_consumer_line(line_no: usize, line: &str) -> Result<Sample, ParseError> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    let (timestamp, _) = timestamp_field(line_no, line)?;

    let throughput = parse_number(line_no, field(&fields, CONSUMER_MB_SEC_FIELD, line_no)?)?;
    let msgs_per_sec = match fields.get(CONSUMER_MSG_SEC_FIELD) {
        Some(text) => Some(parse_number(line_no, text)?),
        None => None,
    };

    Ok(Sample::new(timestamp, msgs_per_sec, throughput))
}

/// Kafka reports sizes in binary units
fn unit_to_mb(line_no: usize, unit: &str) -> Result<f64, ParseError> {
    match unit {
        "KB" => Ok(1.0 / 1024.0),
        "MB" => Ok(1.0),
        "GB" => Ok(1024.0),
        other => Err(ParseError::UnknownUnit {
            line: line_no,
            unit: other.to_string(),
        }),
    }
}
