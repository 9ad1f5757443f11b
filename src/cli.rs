// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

use crate::types::ExecutionMode;

/// Command-line arguments for `flowrun`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "flowrun",
    version,
    about = "Run a flow pipeline document headlessly.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the pipeline document (JSON).
    #[arg(long, value_name = "PATH", default_value = "pipeline.json")]
    pub pipeline: String,

    /// Run exactly one cycle, then exit.
    #[arg(long)]
    pub once: bool,

    /// Stop after this many cycles (default: run until Ctrl-C).
    #[arg(long, value_name = "N")]
    pub cycles: Option<u64>,

    /// Execution mode (sequential, adaptive, pipeline).
    #[arg(long, value_name = "MODE", default_value = "sequential")]
    pub mode: ExecutionMode,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `FLOWRUN_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Validate the document and print the layer plan, but execute nothing.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
