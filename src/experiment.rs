//! Experiment discovery and aggregation
//!
//! An experiment is a directory tree holding one or more trials. A trial
//! directory is any directory containing producer or consumer logs, as
//! recognised by the `[files]` patterns. Trials are reduced to
//! [`TrialTable`]s, stacked, and the throughput columns summarised.

use crate::config::{Config, FilesConfig};
use crate::parser::{LogFormat, LogParser};
use crate::sample::Series;
use crate::stats::{describe, ColumnSummary};
use crate::trial::{TrialTable, THROUGHPUTS_CSV, THROUGHPUT_CONSUMER, THROUGHPUT_PRODUCER};
use crate::window::steady_state;
use anyhow::{bail, Context, Result};
use regex::Regex;
use serde::Serialize;
use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Logs found in one trial directory, sorted by file name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrialLogs {
    pub dir: PathBuf,
    pub producers: Vec<PathBuf>,
    pub consumers: Vec<PathBuf>,
}

/// Where trial tables come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrialSource {
    /// Parse the raw producer/consumer logs
    #[default]
    Logs,
    /// Read `throughputs.csv` written by an earlier run
    Csv,
}

struct FileMatcher {
    producer: Regex,
    consumer: Regex,
}

impl FileMatcher {
    fn new(files: &FilesConfig) -> Result<Self> {
        Ok(Self {
            producer: files.producer.regex().context("Invalid producer file pattern")?,
            consumer: files.consumer.regex().context("Invalid consumer file pattern")?,
        })
    }
}

/// Every directory under `root` (including `root`) to which `visit` gives a value
///
/// `visit` receives the directory, its files and whether it has subdirectories.
fn walk_dirs<T, F>(root: &Path, mut visit: F) -> Result<Vec<T>>
where
    F: FnMut(&Path, &[PathBuf], bool) -> Option<T>,
{
    if !root.is_dir() {
        bail!("Not a directory: {}", root.display());
    }

    let mut found = Vec::new();
    let mut pending = vec![root.to_path_buf()];
    while let Some(dir) = pending.pop() {
        let mut files = Vec::new();
        let mut subdirs = Vec::new();
        for entry in fs::read_dir(&dir)
            .with_context(|| format!("Failed to read directory {}", dir.display()))?
        {
            let entry = entry.with_context(|| format!("Failed to read entry in {}", dir.display()))?;
            // file_type does not follow symlinks, so linked directories are not revisited
            let file_type = entry.file_type()?;
            if file_type.is_dir() {
                subdirs.push(entry.path());
            } else if file_type.is_file() {
                files.push(entry.path());
            }
        }
        files.sort();
        if let Some(item) = visit(&dir, &files, !subdirs.is_empty()) {
            found.push(item);
        }
        subdirs.sort();
        pending.extend(subdirs.into_iter().rev());
    }
    Ok(found)
}

fn file_name(path: &Path) -> &str {
    path.file_name().and_then(|n| n.to_str()).unwrap_or_default()
}

/// Find trial directories under `root`, in depth-first path order
pub fn discover_trials(root: &Path, files: &FilesConfig) -> Result<Vec<TrialLogs>> {
    let matcher = FileMatcher::new(files)?;
    let trials = walk_dirs(root, |dir, entries, _| {
        let pick = |re: &Regex| -> Vec<PathBuf> {
            entries
                .iter()
                .filter(|p| re.is_match(file_name(p)))
                .cloned()
                .collect()
        };
        let producers = pick(&matcher.producer);
        let consumers = pick(&matcher.consumer);
        (!producers.is_empty() || !consumers.is_empty()).then(|| TrialLogs {
            dir: dir.to_path_buf(),
            producers,
            consumers,
        })
    })?;
    debug!(root = %root.display(), trials = trials.len(), "discovered trials");
    Ok(trials)
}

/// Leaf directories under `root` holding a stored `throughputs.csv`
///
/// Directories with subdirectories are skipped, so the combined table that
/// `process_trials` writes at the experiment root is not counted twice.
pub fn discover_tables(root: &Path) -> Result<Vec<PathBuf>> {
    walk_dirs(root, |dir, entries, has_subdirs| {
        (!has_subdirs && entries.iter().any(|p| file_name(p) == THROUGHPUTS_CSV))
            .then(|| dir.to_path_buf())
    })
}

fn load_role(paths: &[PathBuf], format: LogFormat, config: &Config) -> Result<Vec<Series>> {
    let parser = LogParser::new(format, config.analysis.parse_options())
        .context("Failed to build log parser")?;
    paths
        .iter()
        .map(|path| {
            let parsed = parser.parse_file(path)?;
            if parsed.skipped > 0 {
                warn!(
                    file = %path.display(),
                    skipped = parsed.skipped,
                    "skipped malformed lines"
                );
            }
            let steady = steady_state(
                &parsed.series,
                config.analysis.warmup,
                config.analysis.window(),
            );
            if steady.is_empty() {
                warn!(file = %path.display(), "no samples left after warm-up");
            }
            Ok(steady)
        })
        .collect()
}

/// Parse, window and join the logs of one trial
pub fn load_trial(trial: &TrialLogs, config: &Config) -> Result<TrialTable> {
    let producers = load_role(&trial.producers, config.files.producer.format, config)?;
    let consumers = load_role(&trial.consumers, config.files.consumer.format, config)?;
    let table = TrialTable::from_logs(&producers, &consumers, config.analysis.combine);
    debug!(trial = %trial.dir.display(), rows = table.len(), "loaded trial");
    Ok(table)
}

/// Build the table of every trial under `root`, optionally storing each as `throughputs.csv`
///
/// When writing, the stacked table of all trials is also stored at `root`,
/// unless `root` is itself a trial directory.
pub fn process_trials(
    root: &Path,
    config: &Config,
    write: bool,
) -> Result<Vec<(PathBuf, TrialTable)>> {
    let trials = discover_trials(root, &config.files)?;
    let mut tables = Vec::with_capacity(trials.len());
    for trial in &trials {
        let table = load_trial(trial, config)?;
        if write {
            table.write_csv(trial.dir.join(THROUGHPUTS_CSV))?;
        }
        tables.push((trial.dir.clone(), table));
    }

    if write && !tables.is_empty() && trials.iter().all(|t| t.dir != root) {
        let combined = TrialTable::concat(tables.iter().map(|(_, t)| t.clone()));
        let path = root.join(THROUGHPUTS_CSV);
        combined.write_csv(&path)?;
        debug!(path = %path.display(), rows = combined.len(), "wrote experiment table");
    }
    Ok(tables)
}

/// All trials of one experiment stacked into one table, with the trial count
pub fn load_experiment(
    root: &Path,
    config: &Config,
    source: TrialSource,
) -> Result<(usize, TrialTable)> {
    let tables: Vec<TrialTable> = match source {
        TrialSource::Logs => discover_trials(root, &config.files)?
            .iter()
            .map(|trial| load_trial(trial, config))
            .collect::<Result<_>>()?,
        TrialSource::Csv => discover_tables(root)?
            .iter()
            .map(|dir| TrialTable::read_csv(dir.join(THROUGHPUTS_CSV)))
            .collect::<Result<_>>()?,
    };
    if tables.is_empty() {
        bail!("No trials found under {}", root.display());
    }
    Ok((tables.len(), TrialTable::concat(tables)))
}

/// Throughput statistics of one experiment
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExperimentSummary {
    pub label: String,
    pub trials: usize,
    pub rows: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub producer: Option<ColumnSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consumer: Option<ColumnSummary>,
}

impl ExperimentSummary {
    pub fn producer_mean(&self) -> Option<f64> {
        self.producer.as_ref().map(|c| c.summary.mean)
    }
}

fn describe_column(
    table: &TrialTable,
    column: &str,
    config: &Config,
) -> Result<Option<ColumnSummary>> {
    let values = table.column(column, config.analysis.fill)?;
    if values.is_empty() {
        warn!(column, "no values to summarise");
        return Ok(None);
    }
    Ok(Some(describe(column, &values, &config.bootstrap)?))
}

/// Mean, spread and bootstrap interval of producer and consumer throughput
pub fn summarize_experiment(
    root: &Path,
    config: &Config,
    source: TrialSource,
) -> Result<ExperimentSummary> {
    let (trials, table) = load_experiment(root, config, source)?;
    Ok(ExperimentSummary {
        label: root.display().to_string(),
        trials,
        rows: table.len(),
        producer: describe_column(&table, THROUGHPUT_PRODUCER, config)?,
        consumer: describe_column(&table, THROUGHPUT_CONSUMER, config)?,
    })
}

/// Summaries of several experiments, ordered by mean producer throughput
///
/// Experiments without producer data sort last.
pub fn sweep<P: AsRef<Path>>(
    roots: &[P],
    config: &Config,
    source: TrialSource,
) -> Result<Vec<ExperimentSummary>> {
    let mut summaries = roots
        .iter()
        .map(|root| summarize_experiment(root.as_ref(), config, source))
        .collect::<Result<Vec<_>>>()?;
    summaries.sort_by(|a, b| match (a.producer_mean(), b.producer_mean()) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
    Ok(summaries)
}
