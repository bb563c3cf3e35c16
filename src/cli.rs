//! Command-line interface for voxlpc
//!
//! Provides argument parsing using clap derive macros.

use crate::config::Config;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Real-time LPC speech analysis and resynthesis
#[derive(Parser, Debug)]
#[command(name = "voxlpc", version, about = "Real-time LPC speech front end")]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Verbose output (-v: debug, -vv: trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print voicing, pitch and leading coefficients for every frame of a WAV file
    Analyze {
        /// Mono WAV file
        input: PathBuf,

        /// Number of coefficients to print per frame
        #[arg(long, short = 'n', value_name = "COUNT", default_value = "4")]
        coefficients: usize,

        /// Also write the encoded signal as TOML
        #[arg(long, value_name = "PATH")]
        save: Option<PathBuf>,
    },

    /// Encode a WAV file, decode it again and write the resynthesis
    Roundtrip {
        /// Mono WAV file
        input: PathBuf,

        /// Destination WAV file (16-bit)
        output: PathBuf,
    },

    /// Run the threaded capture/analysis front end over a WAV file
    ///
    /// The file is played at its own sample rate, as a live input would be.
    /// With `--fast` it is read as quickly as possible, and blocks the
    /// analysis cannot keep up with are overwritten.
    Stream {
        /// Mono WAV file
        input: PathBuf,

        /// Read the file without real-time pacing
        #[arg(long)]
        fast: bool,

        /// Resynthesize blocks and write them to this WAV file
        #[arg(long, value_name = "PATH")]
        output: Option<PathBuf>,
    },

    /// Show the effective configuration
    Config,
}

/// Effective configuration as TOML, headed by the build version.
pub fn render_config(config: &Config) -> Result<String, toml::ser::Error> {
    let body = toml::to_string(config)?;
    Ok(format!("# voxlpc {}\n{}", crate::version_string(), body))
}
