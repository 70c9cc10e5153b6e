//! The `pipeline` binary: compose transform stages over stdin/stdout.
//!
//! # Usage
//!
//! ```bash
//! # Uppercase every line until <END> or EOF
//! pipeline upper
//!
//! # Chain stages left to right; '=' passes a per-stage config
//! pipeline trim upper "prefix=>> "
//! pipeline --capacity 16 reverse lower
//! ```

use anyhow::Result;
use clap::error::ErrorKind;
use clap::Parser;
use line_pipeline::PipelineBuilder;
use std::io;
use std::process::ExitCode;
use tracing::{debug, error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Compose transform stages over stdin/stdout
#[derive(Parser, Debug)]
#[command(name = "pipeline")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Transform stages in pipeline order, each NAME or NAME=CONFIG
    #[arg(required = true, value_name = "STAGE")]
    stages: Vec<String>,

    /// Capacity of each inter-stage buffer
    #[arg(short = 'b', long, default_value_t = line_pipeline::DEFAULT_CAPACITY)]
    capacity: usize,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

fn main() -> ExitCode {
    // Missing stages must exit 1 with usage on stderr; clap's default
    // error code is 2, so parse by hand
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::FAILURE,
            };
        }
    };

    init_logging(&cli.log_level);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    anyhow::ensure!(cli.capacity > 0, "buffer capacity must be nonzero");

    let mut builder = PipelineBuilder::new().capacity(cli.capacity);
    for stage in &cli.stages {
        let (name, config) = match stage.split_once('=') {
            Some((name, config)) => (name, Some(config)),
            None => (stage.as_str(), None),
        };
        builder = builder.transform(name, config);
    }

    let pipeline = builder.build()?;
    for name in pipeline.stage_names() {
        info!("Loaded stage: {name}");
    }

    let running = pipeline.start(io::BufReader::new(io::stdin()), io::stdout())?;
    let report = running.wait()?;
    debug!("Pipeline finished ({})", report.summary());
    Ok(())
}

/// Initialize the tracing subscriber, writing to the diagnostic stream
fn init_logging(level: &str) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr).with_target(false))
        .with(filter)
        .init();
}
