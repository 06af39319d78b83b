// Descriptive statistics for throughput columns
//
// trueno::Vector provides the SIMD reductions (population stddev, min, max),
// aprender's DescriptiveStats the median. The mean is accumulated in f64 so
// long columns do not lose precision before the bootstrap sees them.

use super::bootstrap::mean;
use crate::error::StatsError;
use aprender::stats::DescriptiveStats;
use serde::{Deserialize, Serialize};
use trueno::Vector;

/// Summary of one column of values
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub n: usize,
    pub mean: f64,
    /// Population standard deviation
    pub stddev: f64,
    pub min: f64,
    pub max: f64,
    pub median: f64,
}

pub fn summarize(values: &[f64]) -> Result<Summary, StatsError> {
    if values.is_empty() {
        return Err(StatsError::InsufficientData {
            required: 1,
            actual: 0,
        });
    }

    let narrowed: Vec<f32> = values.iter().map(|&v| v as f32).collect();
    let v = Vector::from_slice(&narrowed);
    let stddev = v
        .stddev()
        .map_err(|e| StatsError::Backend(format!("stddev: {}", e)))?;
    let min = v
        .min()
        .map_err(|e| StatsError::Backend(format!("min: {}", e)))?;
    let max = v
        .max()
        .map_err(|e| StatsError::Backend(format!("max: {}", e)))?;
    let median = median(&v)?;

    Ok(Summary {
        n: values.len(),
        mean: mean(values),
        // rounding can leave a tiny negative variance for constant input
        stddev: (stddev as f64).max(0.0),
        min: min as f64,
        max: max as f64,
        median: median as f64,
    })
}

/// Median via aprender's quantile(0.5)
pub fn median(vector: &Vector<f32>) -> Result<f32, StatsError> {
    DescriptiveStats::new(vector)
        .quantile(0.5)
        .map_err(|e| StatsError::Backend(format!("median: {}", e)))
}
