use anyhow::{Context, Result};
use brokerbench::cli::{AnalysisArgs, Cli, Command, OutputFormat};
use brokerbench::config::Config;
use brokerbench::disk::DiskTable;
use brokerbench::experiment::{self, TrialSource};
use brokerbench::json_output::{JsonOutput, JsonReport, JsonSeries, JsonTrial};
use brokerbench::parser::{LogFormat, LogParser};
use brokerbench::stats::compare_samples;
use brokerbench::{csv_output, recorder, stats, text_output, window};
use clap::Parser;
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber for debug output
fn init_tracing(debug: bool) {
    if debug {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::TRACE.into()),
            )
            .with_writer(std::io::stderr)
            .init();
    }
}

fn source(from_csv: bool) -> TrialSource {
    if from_csv {
        TrialSource::Csv
    } else {
        TrialSource::Logs
    }
}

fn print_json(report: JsonReport) -> Result<()> {
    let json = JsonOutput::new(report)
        .to_json()
        .context("Failed to serialize JSON report")?;
    println!("{}", json);
    Ok(())
}

fn load_config(path: Option<&Path>, analysis: &AnalysisArgs) -> Result<Config> {
    let mut config = Config::load(path)?;
    analysis.apply(&mut config.analysis);
    config.validate().map_err(anyhow::Error::msg)?;
    Ok(config)
}

fn run_parse(
    file: &Path,
    log_format: LogFormat,
    config: &Config,
    format: OutputFormat,
) -> Result<()> {
    let parser = LogParser::new(log_format, config.analysis.parse_options())
        .context("Failed to build log parser")?;
    let parsed = parser.parse_file(file)?;
    let steady = window::steady_state(
        &parsed.series,
        config.analysis.warmup,
        config.analysis.window(),
    );
    let summary = stats::summarize(&steady.throughputs()).ok();

    match format {
        OutputFormat::Text => print!(
            "{}",
            text_output::format_series(file, &parsed, &steady, summary.as_ref())
        ),
        OutputFormat::Csv => print!("{}", csv_output::series_to_csv(&steady)),
        OutputFormat::Json => print_json(JsonReport::Series(JsonSeries::new(
            file, log_format, &parsed, &steady, summary,
        )))?,
    }
    Ok(())
}

fn run_trial(dir: &Path, write: bool, config: &Config, format: OutputFormat) -> Result<()> {
    let tables = experiment::process_trials(dir, config, write)?;
    if tables.is_empty() {
        anyhow::bail!("No trials found under {}", dir.display());
    }

    match format {
        OutputFormat::Text => {
            print!("{}", text_output::format_trials(&tables, config.analysis.fill))
        }
        OutputFormat::Csv => {
            for (trial_dir, table) in &tables {
                println!("# {}", trial_dir.display());
                print!("{}", table.to_csv());
            }
        }
        OutputFormat::Json => print_json(JsonReport::Trials {
            trials: tables
                .iter()
                .map(|(trial_dir, table)| JsonTrial::new(trial_dir, table))
                .collect(),
        })?,
    }
    Ok(())
}

fn run_summarize(
    dirs: &[PathBuf],
    from_csv: bool,
    config: &Config,
    format: OutputFormat,
) -> Result<()> {
    let summaries = experiment::sweep(dirs, config, source(from_csv))?;
    match format {
        OutputFormat::Text => print!("{}", text_output::format_sweep(&summaries)),
        OutputFormat::Csv => print!("{}", csv_output::summaries_to_csv(&summaries)),
        OutputFormat::Json => print_json(JsonReport::Sweep {
            experiments: summaries,
        })?,
    }
    Ok(())
}

fn run_compare(
    baseline: &Path,
    current: &Path,
    column: &str,
    from_csv: bool,
    config: &Config,
    format: OutputFormat,
) -> Result<()> {
    let fill = config.analysis.fill;
    let (_, baseline_table) = experiment::load_experiment(baseline, config, source(from_csv))?;
    let (_, current_table) = experiment::load_experiment(current, config, source(from_csv))?;
    let comparison = compare_samples(
        column,
        &baseline_table.column(column, fill)?,
        &current_table.column(column, fill)?,
        &config.compare,
    )?;

    match format {
        OutputFormat::Text => print!("{}", comparison.to_report_string()),
        OutputFormat::Csv => print!("{}", csv_output::comparison_to_csv(&comparison)),
        OutputFormat::Json => print_json(JsonReport::Comparison(comparison))?,
    }
    Ok(())
}

fn run_disk(
    vmstat: &Path,
    producer: &Path,
    log_format: LogFormat,
    config: &Config,
    format: OutputFormat,
) -> Result<()> {
    let options = config.analysis.parse_options();
    let disk = LogParser::new(LogFormat::Vmstat, options)
        .context("Failed to build log parser")?
        .parse_file(vmstat)?;
    let sent = LogParser::new(log_format, options)
        .context("Failed to build log parser")?
        .parse_file(producer)?;
    let table = DiskTable::join(&disk.series, &sent.series);
    debug!(rows = table.len(), matched = table.matched(), "joined disk and producer");

    let fill = config.analysis.fill;
    match format {
        OutputFormat::Text => print!("{}", text_output::format_disk(&table, fill)),
        OutputFormat::Csv => print!("{}", table.to_csv(fill)),
        OutputFormat::Json => print_json(JsonReport::disk(&table))?,
    }
    Ok(())
}

fn run_stamp(output: Option<&Path>) -> Result<()> {
    let stdin = io::stdin().lock();
    let lines = match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            recorder::stamp_lines(stdin, BufWriter::new(file), recorder::local_now)?
        }
        None => recorder::stamp_lines(stdin, io::stdout().lock(), recorder::local_now)?,
    };
    debug!(lines, "stamped");
    Ok(())
}

fn main() -> Result<()> {
    let args = Cli::parse();

    // Initialize tracing if --debug flag is set
    init_tracing(args.debug);

    let config_path = args.config.as_deref();
    match args.command {
        Command::Parse {
            file,
            log_format,
            analysis,
        } => {
            let config = load_config(config_path, &analysis)?;
            run_parse(&file, log_format, &config, args.format)
        }
        Command::Trial {
            dir,
            write,
            analysis,
        } => {
            let config = load_config(config_path, &analysis)?;
            run_trial(&dir, write, &config, args.format)
        }
        Command::Summarize {
            dirs,
            from_csv,
            analysis,
            bootstrap,
        } => {
            let mut config = load_config(config_path, &analysis)?;
            bootstrap.apply(&mut config.bootstrap);
            config.bootstrap.validate()?;
            run_summarize(&dirs, from_csv, &config, args.format)
        }
        Command::Compare {
            baseline,
            current,
            column,
            from_csv,
            significance,
            analysis,
        } => {
            let mut config = load_config(config_path, &analysis)?;
            if let Some(alpha) = significance {
                config.compare.significance_level = alpha;
                config.compare.validate().map_err(anyhow::Error::msg)?;
            }
            run_compare(&baseline, &current, &column, from_csv, &config, args.format)
        }
        Command::Disk {
            vmstat,
            producer,
            log_format,
            strict,
            fill,
        } => {
            let analysis = AnalysisArgs {
                strict,
                fill,
                ..AnalysisArgs::default()
            };
            let config = load_config(config_path, &analysis)?;
            run_disk(&vmstat, &producer, log_format, &config, args.format)
        }
        Command::Stamp { output } => run_stamp(output.as_deref()),
    }
}
