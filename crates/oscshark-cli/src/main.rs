use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use glob::glob;
use oscshark_core::{AddressFilter, FilterConfig, Report};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "oscshark")]
#[command(version)]
#[command(
    about = "Extract OSC messages from pcapng network captures.",
    long_about = None,
    after_help = "Examples:\n  oscshark show.pcapng\n  oscshark 'captures/*.pcapng' --allow '^/ch/' --deny '/meter'\n  oscshark show.pcapng --format json --pretty\n  oscshark show.pcapng --output-dir out/"
)]
struct Cli {
    /// Capture files (.pcapng) or glob patterns
    #[arg(value_name = "INPUT", required = true, num_args = 1..)]
    inputs: Vec<PathBuf>,

    /// Keep only addresses matching this regex (repeatable)
    #[arg(long, value_name = "REGEX")]
    allow: Vec<String>,

    /// Drop addresses matching this regex (repeatable)
    #[arg(long, value_name = "REGEX")]
    deny: Vec<String>,

    /// JSON file with "allow" and "deny" pattern lists, merged with the flags
    #[arg(long, value_name = "FILE")]
    filters: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
    format: OutputFormat,

    /// Write one file per capture (JSON) or per capture and source (CSV)
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,

    /// Suppress non-error output
    #[arg(long, conflicts_with = "verbose")]
    quiet: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    Csv,
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.quiet, cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report_error(&err);
            ExitCode::from(2)
        }
    }
}

fn init_tracing(quiet: bool, verbose: u8) {
    let level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        (false, _) => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| level.into()))
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

#[derive(Debug)]
struct CliError {
    message: String,
    hint: Option<String>,
}

impl CliError {
    fn new(message: impl Into<String>, hint: Option<String>) -> Self {
        Self {
            message: message.into(),
            hint,
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        CliError::new(format!("{err:#}"), None)
    }
}

fn report_error(err: &CliError) {
    eprintln!("error: {}", err.message);
    if let Some(hint) = &err.hint {
        eprintln!("hint: {}", hint);
    }
}

fn run(cli: &Cli) -> Result<(), CliError> {
    let filter = build_filter(cli)?;
    if let Some(dir) = &cli.output_dir {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;
    }

    let mut failures = 0usize;
    for input in &cli.inputs {
        let paths = match resolve_input_paths(input) {
            Ok(paths) => paths,
            Err(err) => {
                report_error(&err);
                failures += 1;
                continue;
            }
        };
        for path in paths {
            if let Err(err) = process_file(cli, &filter, &path) {
                report_error(&err);
                failures += 1;
            }
        }
    }

    if failures > 0 {
        return Err(CliError::new(
            format!("{failures} input(s) could not be processed"),
            Some("the remaining inputs were processed; see the errors above".to_string()),
        ));
    }
    Ok(())
}

fn build_filter(cli: &Cli) -> Result<AddressFilter, CliError> {
    let mut config = FilterConfig {
        allow: cli.allow.clone(),
        deny: cli.deny.clone(),
    };
    if let Some(path) = &cli.filters {
        config.merge(load_filter_file(path)?);
    }
    config.compile().map_err(|err| {
        CliError::new(
            err.to_string(),
            Some("patterns use Rust regex syntax; quote them in the shell".to_string()),
        )
    })
}

fn load_filter_file(path: &Path) -> Result<FilterConfig, CliError> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read filter file: {}", path.display()))
        .map_err(|err| {
            CliError::new(
                format!("{err:#}"),
                Some("--filters expects a readable JSON file".to_string()),
            )
        })?;
    serde_json::from_str(&text).map_err(|err| {
        CliError::new(
            format!("invalid filter file {}: {}", path.display(), err),
            Some(r#"expected {"allow": ["regex", ...], "deny": ["regex", ...]}"#.to_string()),
        )
    })
}

fn process_file(cli: &Cli, filter: &AddressFilter, path: &Path) -> Result<(), CliError> {
    validate_input_file(path)?;
    debug!(path = %path.display(), "analysing capture");
    let report = oscshark_core::analyze_capture_file(path, filter)
        .with_context(|| format!("Failed to analyse {}", path.display()))?;

    match (&cli.output_dir, cli.format) {
        (None, OutputFormat::Csv) => {
            let stdout = io::stdout();
            write_csv(&report, stdout.lock(), None)?;
        }
        (None, OutputFormat::Json) => {
            let json = serialize_report(&report, cli.pretty)?;
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{json}").context("Failed to write to stdout")?;
        }
        (Some(dir), OutputFormat::Csv) => {
            let stem = file_stem(path);
            for source in &report.sources {
                let target = dir.join(format!("{stem}-{}.csv", source.source_ip));
                let file = fs::File::create(&target)
                    .with_context(|| format!("Failed to create {}", target.display()))?;
                write_csv(&report, file, Some(&source.source_ip))?;
                announce(cli.quiet, &target);
            }
        }
        (Some(dir), OutputFormat::Json) => {
            let target = dir.join(format!("{}.json", file_stem(path)));
            let json = serialize_report(&report, cli.pretty)?;
            fs::write(&target, json)
                .with_context(|| format!("Failed to write report: {}", target.display()))?;
            announce(cli.quiet, &target);
        }
    }
    Ok(())
}

fn announce(quiet: bool, target: &Path) {
    if !quiet {
        eprintln!("OK: written -> {}", target.display());
    }
}

/// Write the rows of `report` (optionally only one source) without a header.
fn write_csv<W: Write>(report: &Report, out: W, only_source: Option<&str>) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_writer(out);
    let sources = report
        .sources
        .iter()
        .filter(|source| only_source.is_none_or(|only| only == source.source_ip));
    for source in sources {
        for message in &source.messages {
            writer
                .write_record(message.csv_fields())
                .context("Failed to write CSV record")?;
        }
    }
    writer.flush().context("Failed to flush CSV output")?;
    Ok(())
}

fn serialize_report(report: &Report, pretty: bool) -> Result<String, CliError> {
    if pretty {
        serde_json::to_string_pretty(report)
            .context("JSON serialization failed")
            .map_err(Into::into)
    } else {
        serde_json::to_string(report)
            .context("JSON serialization failed")
            .map_err(Into::into)
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "capture".to_string())
}

fn validate_input_file(input: &Path) -> Result<(), CliError> {
    if !input.exists() {
        return Err(CliError::new(
            format!("input file not found: {}", input.display()),
            Some("use a .pcapng file".to_string()),
        ));
    }
    if !input.is_file() {
        return Err(CliError::new(
            format!("input is not a file: {}", input.display()),
            Some("use a .pcapng file".to_string()),
        ));
    }
    Ok(())
}

fn resolve_input_paths(input: &Path) -> Result<Vec<PathBuf>, CliError> {
    let pattern = input.to_string_lossy();
    if !is_glob_pattern(&pattern) {
        return Ok(vec![input.to_path_buf()]);
    }

    let paths = glob(&pattern).map_err(|err| {
        CliError::new(
            format!("invalid input pattern '{}'", pattern),
            Some(format!("pattern error: {}", err.msg)),
        )
    })?;
    let mut matches = Vec::new();
    for entry in paths {
        let path = entry.map_err(|err| {
            CliError::new(
                format!("invalid input pattern '{}'", pattern),
                Some(format!("pattern error: {}", err)),
            )
        })?;
        if path.is_file() {
            matches.push(path);
        }
    }

    if matches.is_empty() {
        return Err(CliError::new(
            format!("no files match pattern '{}'", pattern),
            Some("check the path or quote the pattern; expected .pcapng files".to_string()),
        ));
    }
    Ok(matches)
}

fn is_glob_pattern(input: &str) -> bool {
    input.contains('*') || input.contains('?') || input.contains('[')
}
