//! upcat-sim: replay an upload session on a virtual clock.
//!
//! Feeds real image files through the same session logic the web app
//! uses, stepping simulated time in fixed increments, and prints the
//! resulting timeline. Useful for:
//!
//! - Checking which files a batch would accept or reject
//! - Watching the first-batch upload/enhance phases and later processing
//! - Trying latency settings before changing the app defaults
//!
//! # Usage
//!
//! ```text
//! cargo run --bin upcat-sim -- [OPTIONS] <IMAGES>...
//! ```
//!
//! Set `RUST_LOG=upcat_session=debug` to see the session's own logging.

#![allow(clippy::print_stdout, clippy::print_stderr)]

mod replay;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use upcat_session::{Candidate, Latencies, StudioConfig};

use crate::replay::{Script, replay};

/// Replay an upcat upload session on a virtual clock.
///
/// Uploads the given images as the first batch, then optionally adds
/// more, selects an entry, replaces it, and downloads it, printing each
/// observable change.
#[derive(Parser)]
#[command(name = "upcat-sim", version)]
struct Cli {
    /// Images for the first batch, in selection order.
    #[arg(required = true)]
    images: Vec<PathBuf>,

    /// Image for a further batch, submitted after the previous one
    /// settles. Repeat to submit several single-image batches.
    #[arg(long)]
    add: Vec<PathBuf>,

    /// 1-based position of the entry to select after uploading.
    #[arg(long, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
    select: Option<usize>,

    /// Replace the active entry with this image.
    #[arg(long)]
    replace: Option<PathBuf>,

    /// Download the active entry at the end.
    #[arg(long)]
    download: bool,

    /// Write downloaded files into this directory.
    #[arg(long, requires = "download")]
    out_dir: Option<PathBuf>,

    /// Seconds for every simulated latency.
    #[arg(long, default_value_t = Latencies::DEFAULT_PHASE.as_secs_f64())]
    phase: f64,

    /// Clock step in milliseconds.
    #[arg(long, default_value_t = 100, value_parser = clap::builder::RangedU64ValueParser::<u64>::new().range(1..))]
    step_ms: u64,

    /// Output the report as JSON instead of a human-readable timeline.
    #[arg(long)]
    json: bool,

    /// Full studio config as a JSON string.
    ///
    /// When provided, `--phase` is ignored.
    #[arg(long)]
    config_json: Option<String>,
}

/// Build a [`StudioConfig`] from CLI arguments.
fn config_from_cli(cli: &Cli) -> Result<StudioConfig, String> {
    if let Some(ref json) = cli.config_json {
        return serde_json::from_str(json).map_err(|e| format!("Error parsing --config-json: {e}"));
    }
    let phase = Duration::try_from_secs_f64(cli.phase)
        .map_err(|e| format!("Invalid --phase {}: {e}", cli.phase))?;
    Ok(StudioConfig {
        latencies: Latencies::uniform(phase),
    })
}

/// Read a file into a candidate, naming it after the file.
fn read_candidate(path: &Path) -> Result<Candidate, String> {
    let bytes =
        std::fs::read(path).map_err(|e| format!("Error reading {}: {e}", path.display()))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(Candidate::from_file_name(name, bytes))
}

fn read_all(paths: &[PathBuf]) -> Result<Vec<Candidate>, String> {
    paths.iter().map(|p| read_candidate(p)).collect()
}

fn script_from_cli(cli: &Cli) -> Result<Script, String> {
    Ok(Script {
        upload: read_all(&cli.images)?,
        add: read_all(&cli.add)?.into_iter().map(|c| vec![c]).collect(),
        select: cli.select,
        replace: cli.replace.as_deref().map(read_candidate).transpose()?,
        download: cli.download,
    })
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match config_from_cli(&cli) {
        Ok(c) => c,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };

    let script = match script_from_cli(&cli) {
        Ok(s) => s,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };

    eprintln!("Images: {}", cli.images.len());
    eprintln!("Config: {config:#?}");
    eprintln!();

    let report = replay(script, config, Duration::from_millis(cli.step_ms));

    if cli.json {
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Error serializing report: {e}");
                return ExitCode::FAILURE;
            }
        }
    } else {
        print!("{}", report.render());
    }

    if let Some(ref dir) = cli.out_dir {
        for export in &report.exports {
            let path = dir.join(&export.file_name);
            match std::fs::write(&path, &export.bytes) {
                Ok(()) => eprintln!("Wrote {} ({} bytes)", path.display(), export.bytes.len()),
                Err(e) => {
                    eprintln!("Error writing {}: {e}", path.display());
                    return ExitCode::FAILURE;
                }
            }
        }
    }

    ExitCode::SUCCESS
}
