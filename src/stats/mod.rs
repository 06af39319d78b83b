// Throughput statistics
//
// - summary: n, mean, stddev, min, max, median (trueno + aprender)
// - bootstrap: percentile and BCa confidence intervals for the mean
// - compare: Welch's t-test between two experiments
// - normal: standard normal cdf / quantile used by BCa

pub mod bootstrap;
pub mod compare;
pub mod normal;
pub mod summary;

pub use bootstrap::{
    bootstrap_ci, BootstrapConfig, BootstrapMethod, BootstrapResult, ConfidenceInterval,
};
pub use compare::{compare_samples, CompareConfig, CompareVerdict, Comparison, StatisticalTest};
pub use summary::{summarize, Summary};

use crate::error::StatsError;
use serde::Serialize;

/// Descriptive statistics and bootstrap interval for one named column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSummary {
    pub column: String,
    #[serde(flatten)]
    pub summary: Summary,
    pub ci: BootstrapResult,
}

impl ColumnSummary {
    pub fn error_bars(&self) -> (f64, f64) {
        self.ci.error_bars()
    }
}

/// Summarize `values` and attach a bootstrap interval for the mean
pub fn describe(
    column: &str,
    values: &[f64],
    config: &BootstrapConfig,
) -> Result<ColumnSummary, StatsError> {
    Ok(ColumnSummary {
        column: column.to_string(),
        summary: summarize(values)?,
        ci: bootstrap_ci(values, config)?,
    })
}
