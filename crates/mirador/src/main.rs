//! Mirador: visual automation runner for the Hive settings panel.
//!
//! Drives a running Hive instance through the settings-panel test sequence
//! using coordinate-based mouse/keyboard automation with screenshot
//! comparison. Hive renders everything via GPU, so there are no standard
//! UI-automation elements to query.
//!
//! ## Usage
//!
//! ```bash
//! mirador                          # run the full suite (Hive must be running)
//! mirador --screenshot-dir shots   # keep artifacts elsewhere
//! mirador --settle 2.0             # double every settle wait on slow machines
//! ```
//!
//! Exit code 0 when every check passed, 1 otherwise.

mod platform;
mod suite;

use clap::Parser;
use console::style;
use mirada::{HarnessResult, Settle};
use std::path::PathBuf;
use std::process::ExitCode;
use suite::SuiteConfig;

#[derive(Debug, Parser)]
#[command(name = "mirador", version, about = "Visual automation suite for the Hive settings panel")]
struct Cli {
    /// Directory for screenshot artifacts
    #[arg(long, default_value = "test_screenshots")]
    screenshot_dir: PathBuf,

    /// Dissimilarity threshold for region comparisons (0-255 scale)
    #[arg(long, default_value_t = mirada::DEFAULT_DIFF_THRESHOLD)]
    threshold: f64,

    /// Multiplier applied to every settle wait
    #[arg(long, default_value_t = 1.0)]
    settle: f64,

    /// Only print the final summary
    #[arg(short, long)]
    quiet: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("{} {e}", style("ERROR:").red().bold());
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> HarnessResult<bool> {
    let config = SuiteConfig {
        screenshot_dir: cli.screenshot_dir.clone(),
        threshold: cli.threshold,
        settle: Settle::new(cli.settle),
        quiet: cli.quiet,
    };

    let desktop = platform::desktop();
    let mut capture = platform::capture();
    let mut input = platform::input();

    let summary = suite::run(&desktop, &mut capture, &mut input, &desktop, &config)?;
    Ok(summary.all_passed())
}

fn init_tracing(verbose: u8) {
    use tracing_subscriber::EnvFilter;

    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
