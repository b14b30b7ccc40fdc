//! COG Validator - checks the layout of a TIFF file from the command line.

use clap::Parser;
use std::process::ExitCode;
use tracing::{debug, error};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cog_validator::{
    config::{Config, OutputFormat},
    validate_cog, FileSource, Report, TiffFile,
};

/// Exit code for invalid command-line configuration (sysexits EX_USAGE).
const EXIT_USAGE: u8 = 64;

fn main() -> ExitCode {
    let config = Config::parse();

    init_logging(&config);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::from(EXIT_USAGE);
    }

    let report = run_check(&config);

    if let Err(e) = print_report(&config, &report) {
        error!("Failed to render report: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::from(report.status.exit_code())
}

/// Load, parse and validate the configured file.
fn run_check(config: &Config) -> Report {
    let file_name = config.path.display().to_string();

    let source = if config.mmap {
        FileSource::map(&config.path)
    } else {
        FileSource::open(&config.path)
    };
    let source = match source {
        Ok(source) => source,
        Err(e) => {
            error!("Could not read {}: {}", file_name, e);
            return Report::read_failure(file_name, &e);
        }
    };

    let file = match TiffFile::parse_with_limit(&source, config.max_ifds) {
        Ok(file) => file,
        Err(e) => {
            debug!("Could not parse {}: {}", file_name, e);
            return Report::parse_failure(file_name, &e);
        }
    };

    let result = validate_cog(&file);
    Report::checked(file_name, &file, &result)
}

fn print_report(config: &Config, report: &Report) -> Result<(), serde_json::Error> {
    if config.quiet {
        return Ok(());
    }

    match config.format {
        OutputFormat::Text => println!("{}", report.to_text()),
        OutputFormat::Json => println!("{}", report.to_json()?),
    }

    Ok(())
}

/// Initialize the tracing/logging subsystem.
///
/// Logs go to stderr so JSON on stdout stays parseable.
fn init_logging(config: &Config) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_filter().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
