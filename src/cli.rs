//! CLI definitions for the retrace harness.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Retrace CLI.
#[derive(Parser)]
#[command(name = "retrace")]
#[command(about = "Session-replay telemetry engine")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Drive a synthetic session and write its batches to disk
    Demo {
        /// Directory for the emitted batch files
        #[arg(long, default_value = "batches")]
        out_dir: PathBuf,

        /// Post batches to a collector instead of writing files
        #[arg(long)]
        upload_url: Option<String>,

        /// Foreground pump iterations to drive
        #[arg(long, default_value_t = 24)]
        pumps: u32,
    },

    /// Decompress and pretty-print a batch file
    Decode {
        /// A batch file produced by `demo`
        file: PathBuf,
    },
}
