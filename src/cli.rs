//! CLI argument parsing for brokerbench

use crate::config::AnalysisConfig;
use crate::parser::LogFormat;
use crate::stats::BootstrapMethod;
use crate::trial::{CombineMode, FillPolicy, THROUGHPUT_PRODUCER};
use crate::window::WarmupPolicy;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format (default)
    Text,
    /// JSON format for machine parsing
    Json,
    /// CSV format for spreadsheet analysis
    Csv,
}

#[derive(Parser, Debug)]
#[command(name = "brokerbench")]
#[command(version)]
#[command(about = "Throughput analysis for Kafka and RabbitMQ benchmark logs", long_about = None)]
pub struct Cli {
    /// TOML configuration file (defaults are built in)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long = "format", value_enum, default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Enable debug tracing to stderr
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Parse one benchmark log and print its steady-state samples
    Parse {
        /// Log file
        file: PathBuf,

        /// Tool that wrote the log
        #[arg(short = 'l', long = "log-format", value_enum)]
        log_format: LogFormat,

        #[command(flatten)]
        analysis: AnalysisArgs,
    },

    /// Join producer and consumer logs of every trial under DIR
    Trial {
        dir: PathBuf,

        /// Store each table as throughputs.csv in its trial directory
        #[arg(long)]
        write: bool,

        #[command(flatten)]
        analysis: AnalysisArgs,
    },

    /// Mean and bootstrap confidence interval per experiment, sorted by producer throughput
    Summarize {
        /// Experiment directories
        #[arg(required = true)]
        dirs: Vec<PathBuf>,

        /// Read stored throughputs.csv files instead of raw logs
        #[arg(long)]
        from_csv: bool,

        #[command(flatten)]
        analysis: AnalysisArgs,

        #[command(flatten)]
        bootstrap: BootstrapArgs,
    },

    /// Welch's t-test between two experiments
    Compare {
        baseline: PathBuf,
        current: PathBuf,

        /// Trial table column to compare
        #[arg(long, default_value = THROUGHPUT_PRODUCER)]
        column: String,

        /// Read stored throughputs.csv files instead of raw logs
        #[arg(long)]
        from_csv: bool,

        /// Significance level (alpha)
        #[arg(long, value_name = "ALPHA")]
        significance: Option<f64>,

        #[command(flatten)]
        analysis: AnalysisArgs,
    },

    /// Broker disk writes from vmstat beside producer throughput over a whole run
    Disk {
        /// `vmstat -n -t` log from a broker
        vmstat: PathBuf,

        /// Producer log from the same run
        producer: PathBuf,

        /// Tool that wrote the producer log
        #[arg(
            short = 'l',
            long = "log-format",
            value_enum,
            default_value = "kafka-producer"
        )]
        log_format: LogFormat,

        /// Fail on the first malformed line
        #[arg(long)]
        strict: bool,

        /// Seconds with no producer report are shown as zero or left empty
        #[arg(long, value_enum)]
        fill: Option<FillPolicy>,
    },

    /// Prefix every stdin line with the current time
    Stamp {
        /// Write to FILE instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
}

/// Overrides for the `[analysis]` section
#[derive(Args, Debug, Clone, Default)]
pub struct AnalysisArgs {
    /// Warm-up to discard, in seconds from the first sample
    #[arg(long, value_name = "SECS", conflicts_with = "warmup_messages")]
    pub warmup_secs: Option<u64>,

    /// Warm-up to discard, in cumulative messages
    #[arg(long, value_name = "COUNT")]
    pub warmup_messages: Option<u64>,

    /// Steady-state window after warm-up (0 keeps everything)
    #[arg(long, value_name = "SECS")]
    pub window_secs: Option<u64>,

    /// Message size in bytes for RabbitMQ logs
    #[arg(long, value_name = "BYTES")]
    pub record_size: Option<u64>,

    /// Fail on the first malformed line
    #[arg(long)]
    pub strict: bool,

    /// Merge several logs of one role by sum or mean
    #[arg(long, value_enum)]
    pub combine: Option<CombineMode>,

    /// Missing producer/consumer values count as zero or are skipped
    #[arg(long, value_enum)]
    pub fill: Option<FillPolicy>,
}

impl AnalysisArgs {
    pub fn apply(&self, config: &mut AnalysisConfig) {
        if let Some(secs) = self.warmup_secs {
            config.warmup = if secs == 0 {
                WarmupPolicy::None
            } else {
                WarmupPolicy::Seconds(secs)
            };
        }
        if let Some(messages) = self.warmup_messages {
            config.warmup = WarmupPolicy::Messages(messages);
        }
        if let Some(secs) = self.window_secs {
            config.window_secs = secs;
        }
        if let Some(size) = self.record_size {
            config.record_size = size;
        }
        if self.strict {
            config.strict = true;
        }
        if let Some(combine) = self.combine {
            config.combine = combine;
        }
        if let Some(fill) = self.fill {
            config.fill = fill;
        }
    }
}

/// Overrides for the `[bootstrap]` section
#[derive(Args, Debug, Clone, Default)]
pub struct BootstrapArgs {
    /// Bootstrap resamples
    #[arg(long, value_name = "N")]
    pub iterations: Option<usize>,

    /// Confidence level, e.g. 0.95
    #[arg(long, value_name = "LEVEL")]
    pub confidence: Option<f64>,

    /// Interval method
    #[arg(long, value_enum)]
    pub method: Option<BootstrapMethod>,

    /// RNG seed
    #[arg(long)]
    pub seed: Option<u64>,
}

impl BootstrapArgs {
    pub fn apply(&self, config: &mut crate::stats::BootstrapConfig) {
        if let Some(iterations) = self.iterations {
            config.iterations = iterations;
        }
        if let Some(level) = self.confidence {
            config.confidence_level = level;
        }
        if let Some(method) = self.method {
            config.method = method;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::BootstrapConfig;

    #[test]
    fn test_cli_parse_command() {
        let cli = Cli::parse_from([
            "brokerbench",
            "parse",
            "producer.txt",
            "--log-format",
            "kafka-producer",
            "--warmup-secs",
            "10",
        ]);
        let Command::Parse {
            file,
            log_format,
            analysis,
        } = cli.command
        else {
            panic!("expected parse");
        };
        assert_eq!(file, PathBuf::from("producer.txt"));
        assert_eq!(log_format, LogFormat::KafkaProducer);
        assert_eq!(analysis.warmup_secs, Some(10));
        assert_eq!(cli.format, OutputFormat::Text);
    }

    #[test]
    fn test_cli_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["brokerbench", "trial", "exp", "--format", "json", "--debug"]);
        assert_eq!(cli.format, OutputFormat::Json);
        assert!(cli.debug);
        assert!(matches!(cli.command, Command::Trial { write: false, .. }));
    }

    #[test]
    fn test_cli_summarize_requires_dirs() {
        assert!(Cli::try_parse_from(["brokerbench", "summarize"]).is_err());
        let cli = Cli::parse_from(["brokerbench", "summarize", "a", "b", "--from-csv"]);
        let Command::Summarize { dirs, from_csv, .. } = cli.command else {
            panic!("expected summarize");
        };
        assert_eq!(dirs.len(), 2);
        assert!(from_csv);
    }

    #[test]
    fn test_cli_warmup_flags_conflict() {
        assert!(Cli::try_parse_from([
            "brokerbench",
            "trial",
            "exp",
            "--warmup-secs",
            "5",
            "--warmup-messages",
            "100"
        ])
        .is_err());
    }

    #[test]
    fn test_cli_disk_command() {
        let cli = Cli::parse_from([
            "brokerbench",
            "disk",
            "vmstat.txt",
            "producer.txt",
            "--fill",
            "zero",
        ]);
        let Command::Disk {
            vmstat,
            producer,
            log_format,
            strict,
            fill,
        } = cli.command
        else {
            panic!("expected disk");
        };
        assert_eq!(vmstat, PathBuf::from("vmstat.txt"));
        assert_eq!(producer, PathBuf::from("producer.txt"));
        assert_eq!(log_format, LogFormat::KafkaProducer);
        assert!(!strict);
        assert_eq!(fill, Some(FillPolicy::Zero));
    }

    #[test]
    fn test_cli_compare_default_column() {
        let cli = Cli::parse_from(["brokerbench", "compare", "base", "cur"]);
        let Command::Compare { column, .. } = cli.command else {
            panic!("expected compare");
        };
        assert_eq!(column, THROUGHPUT_PRODUCER);
    }

    #[test]
    fn test_analysis_args_apply() {
        let mut config = AnalysisConfig::default();
        AnalysisArgs {
            warmup_messages: Some(500),
            window_secs: Some(0),
            record_size: Some(1024),
            strict: true,
            combine: Some(CombineMode::Mean),
            ..AnalysisArgs::default()
        }
        .apply(&mut config);
        assert_eq!(config.warmup, WarmupPolicy::Messages(500));
        assert_eq!(config.window(), None);
        assert_eq!(config.record_size, 1024);
        assert!(config.strict);
        assert_eq!(config.combine, CombineMode::Mean);
        assert_eq!(config.fill, FillPolicy::Skip);

        let mut config = AnalysisConfig::default();
        AnalysisArgs {
            warmup_secs: Some(0),
            ..AnalysisArgs::default()
        }
        .apply(&mut config);
        assert_eq!(config.warmup, WarmupPolicy::None);
    }

    #[test]
    fn test_bootstrap_args_apply() {
        let mut config = BootstrapConfig::default();
        BootstrapArgs {
            iterations: Some(500),
            method: Some(BootstrapMethod::Percentile),
            ..BootstrapArgs::default()
        }
        .apply(&mut config);
        assert_eq!(config.iterations, 500);
        assert_eq!(config.method, BootstrapMethod::Percentile);
        assert_eq!(config.confidence_level, 0.95);
    }

    #[test]
    fn test_cli_stamp_output() {
        let cli = Cli::parse_from(["brokerbench", "stamp", "-o", "producer.txt"]);
        assert!(matches!(
            cli.command,
            Command::Stamp { output: Some(_) }
        ));
    }
}
