//! Time-indexed throughput samples
//!
//! A `Series` is what one benchmark log turns into: one sample per reporting
//! interval, ordered by wall-clock timestamp.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A single throughput observation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Wall-clock time the line was reported (whole seconds)
    pub timestamp: NaiveDateTime,
    /// Messages (records) per second, when the tool reports it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub msgs_per_sec: Option<f64>,
    /// Throughput in MB/s
    pub throughput: f64,
}

impl Sample {
    pub fn new(timestamp: NaiveDateTime, msgs_per_sec: Option<f64>, throughput: f64) -> Self {
        Self {
            timestamp,
            msgs_per_sec,
            throughput,
        }
    }
}

/// Samples with non-decreasing timestamps
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Series {
    samples: Vec<Sample>,
}

impl Series {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a series from arbitrary samples, ordering them by timestamp
    ///
    /// The sort is stable so samples sharing a timestamp keep their input order.
    pub fn from_samples(mut samples: Vec<Sample>) -> Self {
        samples.sort_by_key(|s| s.timestamp);
        Self { samples }
    }

    /// Append a sample, handing it back if it would break timestamp order
    pub fn push(&mut self, sample: Sample) -> Result<(), Sample> {
        match self.samples.last() {
            Some(last) if sample.timestamp < last.timestamp => Err(sample),
            _ => {
                self.samples.push(sample);
                Ok(())
            }
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn first(&self) -> Option<&Sample> {
        self.samples.first()
    }

    pub fn last(&self) -> Option<&Sample> {
        self.samples.last()
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Sample> {
        self.samples.iter()
    }

    /// Keep the samples matching `keep`; order is preserved so the result is still sorted
    pub fn filter<F>(&self, mut keep: F) -> Series
    where
        F: FnMut(&Sample) -> bool,
    {
        Series {
            samples: self.samples.iter().copied().filter(|s| keep(s)).collect(),
        }
    }

    /// Suffix of the series starting at `index`
    pub fn skip(&self, index: usize) -> Series {
        Series {
            samples: self.samples.get(index..).unwrap_or_default().to_vec(),
        }
    }

    pub fn throughputs(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.throughput).collect()
    }

    pub fn msgs_per_sec(&self) -> Vec<Option<f64>> {
        self.samples.iter().map(|s| s.msgs_per_sec).collect()
    }

    /// Seconds elapsed since the first sample, one entry per sample
    pub fn elapsed_seconds(&self) -> Vec<i64> {
        let Some(first) = self.samples.first() else {
            return Vec::new();
        };
        self.samples
            .iter()
            .map(|s| (s.timestamp - first.timestamp).num_seconds())
            .collect()
    }
}

impl<'a> IntoIterator for &'a Series {
    type Item = &'a Sample;
    type IntoIter = std::slice::Iter<'a, Sample>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}
