//! Bitewatch CLI
//!
//! Commands:
//! - replay: run recorded landmark frames through the detection pipeline
//! - report: summarize a persisted event log for a look-back window

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use chrono::{Local, Offset, Utc};

use bitewatch::classifier::ClassifierConfig;
use bitewatch::dashboard::{self, LookBack};
use bitewatch::event_log::{EventLog, JsonFileStore, DEFAULT_RETENTION_MS};
use bitewatch::smoother::SmootherConfig;
use bitewatch::source::ReplaySource;
use bitewatch::types::DetectionEvent;
use bitewatch::{DetectorError, DetectorSession, BITEWATCH_VERSION};

/// Bitewatch - temporal-smoothing detector for nail-biting gestures
#[derive(Parser)]
#[command(name = "bitewatch")]
#[command(version = BITEWATCH_VERSION)]
#[command(about = "Detect nail-biting gestures from landmark frame streams", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run recorded landmark frames through the detection pipeline
    Replay {
        /// Input NDJSON frame records (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output path for emitted events (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Output format
        #[arg(long, default_value = "ndjson")]
        output_format: OutputFormat,

        /// Persist the event log to this JSON file
        #[arg(long)]
        log: Option<PathBuf>,

        /// Fingertip-to-mouth proximity threshold (normalized units)
        #[arg(long, default_value_t = bitewatch::classifier::DEFAULT_PROXIMITY_THRESHOLD)]
        threshold: f64,

        /// Depth-axis weight applied before the distance is taken
        #[arg(long, default_value_t = bitewatch::classifier::DEFAULT_DEPTH_WEIGHT)]
        depth_weight: f64,

        /// Rolling window size in frames
        #[arg(long, default_value_t = bitewatch::smoother::DEFAULT_WINDOW_SIZE)]
        window: usize,

        /// Positive fraction that must be exceeded to assert biting
        #[arg(long, default_value_t = bitewatch::smoother::DEFAULT_CONFIDENCE_THRESHOLD)]
        confidence: f64,

        /// Event log retention horizon in minutes
        #[arg(long, default_value = "60")]
        retention_minutes: i64,
    },

    /// Summarize a persisted event log for a look-back window
    Report {
        /// Persisted event log JSON file
        #[arg(short, long)]
        log: PathBuf,

        /// Look-back interval in minutes
        #[arg(long, value_enum, default_value = "5")]
        minutes: LookBackArg,

        /// Force JSON output even on a TTY
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Newline-delimited JSON (one event per line)
    Ndjson,
    /// JSON array of events
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

#[derive(Clone, Copy, ValueEnum)]
enum LookBackArg {
    #[value(name = "5")]
    Min5,
    #[value(name = "30")]
    Min30,
    #[value(name = "60")]
    Min60,
}

impl From<LookBackArg> for LookBack {
    fn from(arg: LookBackArg) -> Self {
        match arg {
            LookBackArg::Min5 => LookBack::Min5,
            LookBackArg::Min30 => LookBack::Min30,
            LookBackArg::Min60 => LookBack::Min60,
        }
    }
}

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Replay {
            input,
            output,
            output_format,
            log,
            threshold,
            depth_weight,
            window,
            confidence,
            retention_minutes,
        } => cmd_replay(
            &input,
            &output,
            output_format,
            log.as_deref(),
            ClassifierConfig {
                proximity_threshold: threshold,
                depth_weight,
            },
            SmootherConfig {
                window_size: window,
                confidence_threshold: confidence,
            },
            retention_minutes * 60_000,
        ),

        Commands::Report { log, minutes, json } => cmd_report(&log, minutes.into(), json),
    }
}

fn cmd_replay(
    input: &Path,
    output: &Path,
    output_format: OutputFormat,
    log_path: Option<&Path>,
    classifier_config: ClassifierConfig,
    smoother_config: SmootherConfig,
    retention_ms: i64,
) -> Result<(), CliError> {
    let input_data = if input.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        fs::read_to_string(input)?
    };

    let frames = ReplaySource::parse_ndjson(&input_data)?;
    if frames.is_empty() {
        return Err(CliError::NoFrames);
    }

    let log = match log_path {
        Some(path) => {
            EventLog::load_or_default(Box::new(JsonFileStore::new(path)), retention_ms)
        }
        None => EventLog::in_memory(retention_ms),
    };

    let mut source = ReplaySource::new(frames);
    let mut session = DetectorSession::new(classifier_config, smoother_config, log);

    let mut events: Vec<DetectionEvent> = Vec::new();
    for timestamp_ms in source.timestamps() {
        if let Some(outcome) = session.tick(&mut source, timestamp_ms) {
            if let Some(event) = outcome.event {
                events.push(event);
            }
        }
    }

    let output_data = format_events(&events, &output_format)?;
    if output.to_string_lossy() == "-" {
        print!("{}", output_data);
    } else {
        fs::write(output, output_data)?;
    }

    Ok(())
}

fn cmd_report(log_path: &Path, look_back: LookBack, force_json: bool) -> Result<(), CliError> {
    let log = EventLog::load_or_default(
        Box::new(JsonFileStore::new(log_path)),
        DEFAULT_RETENTION_MS,
    );

    let now_ms = Utc::now().timestamp_millis();
    let tz = Local::now().offset().fix();

    // No live session during offline reporting, so the window slice is empty
    let summary = dashboard::summarize(log.events(), &[], look_back, now_ms, &tz);

    if force_json || !atty::is(atty::Stream::Stdout) {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("Bitewatch Report ({} min look-back)", look_back.minutes());
    println!("===================================");
    println!("Attempts: {}", summary.attempts);
    println!(
        "By hand:  left {} / right {} / unknown {}",
        summary.by_hand.left, summary.by_hand.right, summary.by_hand.unknown
    );

    if summary.timeline.is_empty() {
        println!("No events in this window.");
    } else {
        println!("\nTimeline:");
        for bucket in &summary.timeline {
            println!("  {:>6}  {}", bucket.label, "#".repeat(bucket.count));
        }
    }

    Ok(())
}

fn format_events(
    events: &[DetectionEvent],
    format: &OutputFormat,
) -> Result<String, CliError> {
    match format {
        OutputFormat::Ndjson => {
            let mut lines = Vec::new();
            for event in events {
                lines.push(serde_json::to_string(event)?);
            }
            if lines.is_empty() {
                Ok(String::new())
            } else {
                Ok(lines.join("\n") + "\n")
            }
        }
        OutputFormat::Json => Ok(serde_json::to_string(events)?),
        OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(events)?),
    }
}

// Error types

#[derive(Debug)]
enum CliError {
    Io(io::Error),
    Detector(DetectorError),
    Json(serde_json::Error),
    NoFrames,
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Io(err) => write!(f, "{}", err),
            CliError::Detector(err) => write!(f, "{}", err),
            CliError::Json(err) => write!(f, "{}", err),
            CliError::NoFrames => write!(f, "no frame records found in input"),
        }
    }
}

impl From<io::Error> for CliError {
    fn from(err: io::Error) -> Self {
        CliError::Io(err)
    }
}

impl From<DetectorError> for CliError {
    fn from(err: DetectorError) -> Self {
        CliError::Detector(err)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        CliError::Json(err)
    }
}
