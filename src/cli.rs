// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `pollwatch`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "pollwatch",
    version,
    about = "Watch directory trees for changes by periodic re-scanning.",
    long_about = None
)]
pub struct CliArgs {
    /// Directories to watch.
    ///
    /// When given, the config file is ignored and one recursive watch is
    /// registered per directory.
    #[arg(value_name = "DIR")]
    pub paths: Vec<String>,

    /// Path to the config file (TOML).
    ///
    /// Default: `Pollwatch.toml` in the current working directory.
    #[arg(long, value_name = "PATH", default_value = "Pollwatch.toml")]
    pub config: String,

    /// Milliseconds between poll cycles (overrides the config file).
    #[arg(long, value_name = "MS")]
    pub interval_ms: Option<u64>,

    /// Poll every watch once, print the resulting events, then exit.
    #[arg(long)]
    pub once: bool,

    /// Follow directory symlinks into new watch nodes (positional-path mode).
    #[arg(long)]
    pub follow_symlinks: bool,

    /// Confirm modifications with a content hash (positional-path mode).
    #[arg(long)]
    pub content_hash: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `POLLWATCH_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
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
