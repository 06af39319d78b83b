//! Bootstrap confidence intervals for the mean
//!
//! Resamples the observed throughputs with replacement and reads the interval
//! off the distribution of resampled means. Two methods are available:
//!
//! - `Percentile`: the plain alpha/2 and 1-alpha/2 quantiles
//! - `Bca`: bias-corrected and accelerated, with the acceleration estimated by
//!   jackknife. This is the default.
//!
//! Resampling uses a seeded `StdRng` so repeated runs give identical intervals.

use super::normal;
use crate::error::StatsError;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Default number of resamples
pub const DEFAULT_ITERATIONS: usize = 10_000;

/// Default confidence level (95%)
pub const DEFAULT_CONFIDENCE_LEVEL: f64 = 0.95;

/// Default RNG seed
pub const DEFAULT_SEED: u64 = 0x5eed;

/// Interval construction method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BootstrapMethod {
    Percentile,
    #[default]
    Bca,
}

/// Bootstrap settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BootstrapConfig {
    pub iterations: usize,
    pub confidence_level: f64,
    pub method: BootstrapMethod,
    pub seed: u64,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
            confidence_level: DEFAULT_CONFIDENCE_LEVEL,
            method: BootstrapMethod::Bca,
            seed: DEFAULT_SEED,
        }
    }
}

impl BootstrapConfig {
    pub fn validate(&self) -> Result<(), StatsError> {
        if self.iterations == 0 {
            return Err(StatsError::NoIterations);
        }
        if !(self.confidence_level > 0.0 && self.confidence_level < 1.0) {
            return Err(StatsError::InvalidConfidence(self.confidence_level));
        }
        Ok(())
    }
}

/// Two-sided confidence interval
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    pub lower: f64,
    pub upper: f64,
    pub level: f64,
}

impl ConfidenceInterval {
    pub fn contains(&self, value: f64) -> bool {
        self.lower <= value && value <= self.upper
    }

    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }
}

/// Point estimate plus interval
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BootstrapResult {
    /// Mean of the observed values
    pub estimate: f64,
    pub interval: ConfidenceInterval,
    /// Method that produced the interval (BCa can fall back to percentile)
    pub method: BootstrapMethod,
}

impl BootstrapResult {
    /// Asymmetric error bars `(estimate - lower, upper - estimate)`
    pub fn error_bars(&self) -> (f64, f64) {
        (
            self.estimate - self.interval.lower,
            self.interval.upper - self.estimate,
        )
    }
}

/// Arithmetic mean; 0 for an empty slice
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Bootstrap confidence interval for the mean of `values`
///
/// A single value, or values that are all equal, give a zero-width interval at
/// the mean.
pub fn bootstrap_ci(
    values: &[f64],
    config: &BootstrapConfig,
) -> Result<BootstrapResult, StatsError> {
    config.validate()?;
    if values.is_empty() {
        return Err(StatsError::InsufficientData {
            required: 1,
            actual: 0,
        });
    }

    let estimate = mean(values);
    let degenerate = values.iter().all(|&v| v == values[0]);
    if degenerate {
        return Ok(BootstrapResult {
            estimate,
            interval: ConfidenceInterval {
                lower: estimate,
                upper: estimate,
                level: config.confidence_level,
            },
            method: config.method,
        });
    }

    let resampled = resample_means(values, config.iterations, config.seed);
    let alpha = 1.0 - config.confidence_level;

    let (lower_q, upper_q, method) = match config.method {
        BootstrapMethod::Percentile => {
            (alpha / 2.0, 1.0 - alpha / 2.0, BootstrapMethod::Percentile)
        }
        BootstrapMethod::Bca => match bca_quantiles(values, &resampled, estimate, alpha) {
            Some((lo, hi)) => (lo, hi, BootstrapMethod::Bca),
            None => {
                warn!(
                    samples = values.len(),
                    "BCa bias correction undefined, using percentile interval"
                );
                (alpha / 2.0, 1.0 - alpha / 2.0, BootstrapMethod::Percentile)
            }
        },
    };

    Ok(BootstrapResult {
        estimate,
        interval: ConfidenceInterval {
            lower: quantile_sorted(&resampled, lower_q),
            upper: quantile_sorted(&resampled, upper_q),
            level: config.confidence_level,
        },
        method,
    })
}

/// Sorted means of `iterations` resamples drawn with replacement
fn resample_means(values: &[f64], iterations: usize, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let n = values.len();
    let mut means: Vec<f64> = (0..iterations)
        .map(|_| {
            let sum: f64 = (0..n).map(|_| values[rng.gen_range(0..n)]).sum();
            sum / n as f64
        })
        .collect();
    means.sort_by(f64::total_cmp);
    means
}

/// Adjusted quantile levels for BCa, `None` when the bias term is infinite
fn bca_quantiles(
    values: &[f64],
    resampled: &[f64],
    estimate: f64,
    alpha: f64,
) -> Option<(f64, f64)> {
    let below = resampled.iter().filter(|&&m| m < estimate).count();
    let proportion = below as f64 / resampled.len() as f64;
    if proportion <= 0.0 || proportion >= 1.0 {
        return None;
    }
    let z0 = normal::inverse_cdf(proportion);
    let accel = jackknife_acceleration(values);

    let adjust = |z: f64| {
        let shifted = z0 + z;
        normal::cdf(z0 + shifted / (1.0 - accel * shifted))
    };
    Some((
        adjust(normal::inverse_cdf(alpha / 2.0)),
        adjust(normal::inverse_cdf(1.0 - alpha / 2.0)),
    ))
}

/// Acceleration from leave-one-out means
fn jackknife_acceleration(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let total: f64 = values.iter().sum();
    let loo: Vec<f64> = values
        .iter()
        .map(|v| (total - v) / (n - 1) as f64)
        .collect();
    let loo_mean = mean(&loo);

    let (num, den) = loo.iter().fold((0.0, 0.0), |(num, den), theta| {
        let d = loo_mean - theta;
        (num + d * d * d, den + d * d)
    });
    if den == 0.0 {
        return 0.0;
    }
    num / (6.0 * den.powf(1.5))
}

/// Linear-interpolated quantile of sorted data, `q` in [0, 1]
pub fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    match sorted.len() {
        0 => 0.0,
        1 => sorted[0],
        len => {
            let index = q.clamp(0.0, 1.0) * (len - 1) as f64;
            let lower = index.floor() as usize;
            let upper = index.ceil() as usize;
            if lower == upper {
                sorted[lower]
            } else {
                let weight = index - lower as f64;
                sorted[lower] * (1.0 - weight) + sorted[upper] * weight
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn steady_values() -> Vec<f64> {
        // Deterministic spread around 50 MB/s
        (0..200).map(|i| 50.0 + ((i * 37) % 21) as f64 - 10.0).collect()
    }

    #[test]
    fn test_default_config() {
        let config = BootstrapConfig::default();
        assert_eq!(config.iterations, 10_000);
        assert_eq!(config.confidence_level, 0.95);
        assert_eq!(config.method, BootstrapMethod::Bca);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_config() {
        let config = BootstrapConfig {
            confidence_level: 1.0,
            ..BootstrapConfig::default()
        };
        assert_eq!(config.validate(), Err(StatsError::InvalidConfidence(1.0)));
        let config = BootstrapConfig {
            iterations: 0,
            ..BootstrapConfig::default()
        };
        assert_eq!(config.validate(), Err(StatsError::NoIterations));
    }

    #[test]
    fn test_empty_input() {
        assert!(matches!(
            bootstrap_ci(&[], &BootstrapConfig::default()),
            Err(StatsError::InsufficientData { .. })
        ));
    }

    #[test]
    fn test_constant_input_has_zero_width() {
        let result = bootstrap_ci(&[4.0, 4.0, 4.0], &BootstrapConfig::default()).unwrap();
        assert_eq!(result.estimate, 4.0);
        assert_eq!(result.interval.width(), 0.0);
        assert_eq!(result.error_bars(), (0.0, 0.0));
    }

    #[test]
    fn test_single_value() {
        let result = bootstrap_ci(&[7.5], &BootstrapConfig::default()).unwrap();
        assert_eq!(result.interval.lower, 7.5);
        assert_eq!(result.interval.upper, 7.5);
    }

    #[test]
    fn test_interval_contains_mean() {
        let values = steady_values();
        for method in [BootstrapMethod::Percentile, BootstrapMethod::Bca] {
            let config = BootstrapConfig {
                iterations: 2_000,
                method,
                ..BootstrapConfig::default()
            };
            let result = bootstrap_ci(&values, &config).unwrap();
            assert!(result.interval.contains(result.estimate), "{:?}", method);
            assert!(result.interval.width() > 0.0);
            // Standard error is about 6/sqrt(200) ~= 0.43, so the 95% interval is narrow
            assert!(result.interval.width() < 3.0);
            let (lo, hi) = result.error_bars();
            assert!(lo >= 0.0 && hi >= 0.0);
        }
    }

    #[test]
    fn test_seed_reproducible() {
        let values = steady_values();
        let config = BootstrapConfig {
            iterations: 500,
            ..BootstrapConfig::default()
        };
        let a = bootstrap_ci(&values, &config).unwrap();
        let b = bootstrap_ci(&values, &config).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_higher_confidence_is_wider() {
        let values = steady_values();
        let narrow = BootstrapConfig {
            iterations: 2_000,
            confidence_level: 0.80,
            method: BootstrapMethod::Percentile,
            ..BootstrapConfig::default()
        };
        let wide = BootstrapConfig {
            confidence_level: 0.99,
            ..narrow
        };
        let narrow = bootstrap_ci(&values, &narrow).unwrap();
        let wide = bootstrap_ci(&values, &wide).unwrap();
        assert!(wide.interval.width() > narrow.interval.width());
    }

    #[test]
    fn test_jackknife_acceleration_symmetric_is_zero() {
        assert!(jackknife_acceleration(&[1.0, 2.0, 3.0, 4.0, 5.0]).abs() < 1e-12);
        assert_eq!(jackknife_acceleration(&[1.0]), 0.0);
    }

    #[test]
    fn test_jackknife_acceleration_skewed() {
        // Right-skewed data has positive acceleration for the mean
        assert!(jackknife_acceleration(&[1.0, 1.0, 1.0, 1.0, 20.0]) > 0.0);
    }

    #[test]
    fn test_quantile_sorted() {
        let data = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(quantile_sorted(&data, 0.0), 1.0);
        assert_eq!(quantile_sorted(&data, 1.0), 4.0);
        assert_eq!(quantile_sorted(&data, 0.5), 2.5);
        assert_eq!(quantile_sorted(&[], 0.5), 0.0);
        assert_eq!(quantile_sorted(&[9.0], 0.1), 9.0);
    }
}
