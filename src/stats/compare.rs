// Baseline vs current throughput comparison
//
// Welch's independent t-test from aprender (unequal variances, since two
// broker configurations rarely share a variance), with medians and population
// variances from trueno for the report.

use super::summary::median;
use crate::error::StatsError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;
use trueno::Vector;

/// Thresholds for deciding whether two experiments differ
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompareConfig {
    /// Alpha for the two-tailed test
    pub significance_level: f64,
    /// Samples required on each side before a test is attempted
    pub min_sample_size: usize,
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            significance_level: 0.05,
            min_sample_size: 5,
        }
    }
}

impl CompareConfig {
    /// 99% confidence, more samples
    pub fn strict() -> Self {
        Self {
            significance_level: 0.01,
            min_sample_size: 10,
        }
    }

    /// 90% confidence, accepts short runs
    pub fn permissive() -> Self {
        Self {
            significance_level: 0.10,
            min_sample_size: 3,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.significance_level) {
            return Err(format!(
                "significance_level must be in [0, 1], got {}",
                self.significance_level
            ));
        }
        if self.min_sample_size < 2 {
            return Err(format!(
                "min_sample_size must be >= 2 for t-test, got {}",
                self.min_sample_size
            ));
        }
        Ok(())
    }
}

/// Raw test output plus descriptive statistics of both sides
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatisticalTest {
    pub statistic: f32,
    /// Two-tailed p-value
    pub pvalue: f32,
    pub df: f32,
    pub baseline_median: f32,
    pub current_median: f32,
    pub baseline_variance: f32,
    pub current_variance: f32,
}

/// Welch's t-test between two samples
pub fn compare_distributions(baseline: &[f32], current: &[f32]) -> Result<StatisticalTest> {
    if baseline.len() < 2 || current.len() < 2 {
        return Err(StatsError::InsufficientData {
            required: 2,
            actual: baseline.len().min(current.len()),
        }
        .into());
    }

    let ttest = aprender::stats::hypothesis::ttest_ind(baseline, current, false)
        .context("Failed to compute t-test")?;

    let baseline_vec = Vector::from_slice(baseline);
    let current_vec = Vector::from_slice(current);

    Ok(StatisticalTest {
        statistic: ttest.statistic,
        pvalue: ttest.pvalue,
        df: ttest.df,
        baseline_median: median(&baseline_vec)?,
        current_median: median(&current_vec)?,
        baseline_variance: baseline_vec
            .variance()
            .context("Failed to compute baseline variance")?,
        current_variance: current_vec
            .variance()
            .context("Failed to compute current variance")?,
    })
}

/// Outcome of a comparison
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum CompareVerdict {
    /// p < significance level
    Different,
    NotSignificant,
    InsufficientData { reason: String },
}

/// A finished comparison of one column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparison {
    pub column: String,
    pub baseline_n: usize,
    pub current_n: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test: Option<StatisticalTest>,
    #[serde(flatten)]
    pub verdict: CompareVerdict,
    pub significance_level: f64,
}

impl Comparison {
    pub fn to_report_string(&self) -> String {
        let mut report = String::new();

        match &self.verdict {
            CompareVerdict::Different => {
                report.push_str(&format!("DIFFERENT: {}\n\n", self.column));
            }
            CompareVerdict::NotSignificant => {
                report.push_str(&format!("NO SIGNIFICANT DIFFERENCE: {}\n\n", self.column));
            }
            CompareVerdict::InsufficientData { reason } => {
                report.push_str(&format!("INSUFFICIENT DATA: {}\n\n", self.column));
                report.push_str(&format!("Reason: {}\n", reason));
            }
        }

        report.push_str(&format!(
            "Samples: baseline={}, current={}\n",
            self.baseline_n, self.current_n
        ));
        report.push_str(&format!(
            "Significance level: {} ({}% confidence)\n",
            self.significance_level,
            (1.0 - self.significance_level) * 100.0
        ));

        if let Some(test) = &self.test {
            report.push_str(&format!(
                "Welch t={:.4} df={:.1} p={:.4}\n",
                test.statistic, test.df, test.pvalue
            ));
            report.push_str(&format!(
                "Median: baseline={:.3} current={:.3}\n",
                test.baseline_median, test.current_median
            ));
            report.push_str(&format!(
                "Variance: baseline={:.3} current={:.3}\n",
                test.baseline_variance, test.current_variance
            ));
        }

        report
    }
}

/// Compare two samples of one column and produce a verdict
pub fn compare_samples(
    column: &str,
    baseline: &[f64],
    current: &[f64],
    config: &CompareConfig,
) -> Result<Comparison> {
    config.validate().map_err(|e| anyhow::anyhow!(e))?;

    let mut comparison = Comparison {
        column: column.to_string(),
        baseline_n: baseline.len(),
        current_n: current.len(),
        test: None,
        verdict: CompareVerdict::NotSignificant,
        significance_level: config.significance_level,
    };

    if baseline.len() < config.min_sample_size || current.len() < config.min_sample_size {
        comparison.verdict = CompareVerdict::InsufficientData {
            reason: format!(
                "need at least {} samples per side (min_sample_size)",
                config.min_sample_size
            ),
        };
        return Ok(comparison);
    }

    let baseline: Vec<f32> = baseline.iter().map(|&v| v as f32).collect();
    let current: Vec<f32> = current.iter().map(|&v| v as f32).collect();

    match compare_distributions(&baseline, &current) {
        Ok(test) => {
            comparison.verdict = if test.pvalue < config.significance_level as f32 {
                CompareVerdict::Different
            } else {
                CompareVerdict::NotSignificant
            };
            comparison.test = Some(test);
        }
        Err(e) => {
            warn!("Failed to compare distributions for {}: {}", column, e);
            comparison.verdict = CompareVerdict::InsufficientData {
                reason: e.to_string(),
            };
        }
    }

    Ok(comparison)
}
