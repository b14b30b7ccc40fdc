//! Configuration for the `cog-validator` command.
//!
//! Options come from command-line arguments via clap, with environment
//! variables under the `COG_` prefix as fallback:
//!
//! - `COG_FORMAT` - Output format, `text` or `json` (default: text)
//! - `COG_MAX_IFDS` - Maximum IFDs to walk before giving up (default: 1000)
//! - `COG_MMAP` - Memory-map the file instead of reading it (default: false)
//!
//! Log verbosity follows `RUST_LOG` when set, otherwise `--verbose`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::tiff::DEFAULT_MAX_IFDS;

/// Output format for the validation report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable lines
    Text,
    /// A single JSON document on stdout
    Json,
}

/// Check whether a TIFF or BigTIFF file has a cloud-optimized layout.
///
/// Verifies that every image directory is tiled and that directory metadata
/// sits before the tile data.
#[derive(Parser, Debug, Clone)]
#[command(name = "cog-validator")]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Path of the TIFF file to check.
    pub path: PathBuf,

    /// Report format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, env = "COG_FORMAT")]
    pub format: OutputFormat,

    /// Maximum number of IFDs to walk before the file is rejected.
    #[arg(long, default_value_t = DEFAULT_MAX_IFDS, env = "COG_MAX_IFDS")]
    pub max_ifds: usize,

    /// Memory-map the file instead of reading it into memory.
    #[arg(long, default_value_t = false, env = "COG_MMAP")]
    pub mmap: bool,

    /// Print nothing; report through the exit code only.
    #[arg(short, long, default_value_t = false)]
    pub quiet: bool,

    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl Config {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_ifds == 0 {
            return Err("max_ifds must be greater than 0".to_string());
        }

        if self.quiet && self.format == OutputFormat::Json {
            return Err("--quiet cannot be combined with --format json".to_string());
        }

        Ok(())
    }

    /// Default tracing filter for the chosen verbosity.
    pub fn log_filter(&self) -> &'static str {
        if self.verbose {
            "cog_validator=debug"
        } else {
            "cog_validator=warn"
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
