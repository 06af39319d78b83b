//! TOML configuration
//!
//! ```toml
//! [analysis]
//! warmup = { seconds = 30 }
//! window_secs = 300
//!
//! [bootstrap]
//! iterations = 10000
//! method = "bca"
//!
//! [files.producer]
//! pattern = '^producer(-[A-Za-z0-9]+)*\.txt$'
//! format = "kafka-producer"
//! ```
//!
//! Every section and key is optional; anything left out takes the value from
//! the embedded `brokerbench-default.toml`.

use crate::parser::{LogFormat, ParseOptions, DEFAULT_RECORD_SIZE};
use crate::stats::{BootstrapConfig, CompareConfig};
use crate::trial::{CombineMode, FillPolicy};
use crate::window::{WarmupPolicy, DEFAULT_WINDOW_SECS};
use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const DEFAULT_TOML: &str = include_str!("../brokerbench-default.toml");

/// Root of a brokerbench TOML file
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub analysis: AnalysisConfig,
    pub bootstrap: BootstrapConfig,
    pub compare: CompareConfig,
    pub files: FilesConfig,
}

/// How each log is reduced to a steady-state series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub warmup: WarmupPolicy,
    /// 0 disables the window
    pub window_secs: u64,
    pub record_size: u64,
    pub fill: FillPolicy,
    pub combine: CombineMode,
    pub strict: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            warmup: WarmupPolicy::default(),
            window_secs: DEFAULT_WINDOW_SECS,
            record_size: DEFAULT_RECORD_SIZE,
            fill: FillPolicy::Skip,
            combine: CombineMode::Sum,
            strict: false,
        }
    }
}

impl AnalysisConfig {
    pub fn window(&self) -> Option<u64> {
        (self.window_secs > 0).then_some(self.window_secs)
    }

    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            strict: self.strict,
            record_size: self.record_size,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.record_size == 0 {
            return Err("record_size must be positive".to_string());
        }
        Ok(())
    }
}

/// Which files in a trial directory hold a role's logs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleFiles {
    /// Regex matched against the file name (not the path)
    pub pattern: String,
    pub format: LogFormat,
}

impl RoleFiles {
    pub fn regex(&self) -> Result<Regex, regex::Error> {
        Regex::new(&self.pattern)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilesConfig {
    pub producer: RoleFiles,
    pub consumer: RoleFiles,
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            producer: RoleFiles {
                pattern: r"^producer(-[A-Za-z0-9]+)*\.txt$".to_string(),
                format: LogFormat::KafkaProducer,
            },
            consumer: RoleFiles {
                pattern: r"^consumer(-[A-Za-z0-9]+)*\.txt$".to_string(),
                format: LogFormat::KafkaConsumer,
            },
        }
    }
}

impl Config {
    /// Load a configuration file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    /// Parse and validate TOML
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).context("Failed to parse TOML")?;
        config.validate().map_err(|e| anyhow::anyhow!(e))?;
        Ok(config)
    }

    /// The configuration compiled into the binary
    pub fn embedded() -> Result<Self> {
        Self::from_toml_str(DEFAULT_TOML).context("Failed to parse embedded brokerbench-default.toml")
    }

    /// `path` if given, otherwise the embedded defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Self::embedded(),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        self.analysis.validate()?;
        self.bootstrap.validate().map_err(|e| e.to_string())?;
        self.compare.validate()?;
        for (role, files) in [("producer", &self.files.producer), ("consumer", &self.files.consumer)] {
            files
                .regex()
                .map_err(|e| format!("invalid {} file pattern: {}", role, e))?;
        }
        Ok(())
    }
}
