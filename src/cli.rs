//! Command-line interface, built on clap.
//!
//! One positional argument — the source file to upload — plus flags that
//! override the `swcc.toml` settings for this invocation.

use std::path::PathBuf;

use clap::Parser;

/// Upload a JavaScript source file to the compiler service and wait for the
/// compiled artifact.
#[derive(Debug, Parser)]
#[command(name = "swcc", version, about)]
pub struct Cli {
    /// Path to the source file to compile.
    pub file: PathBuf,

    /// Base URL of the compiler service.
    #[arg(long)]
    pub base_url: Option<String>,

    /// Transport attempts per request on transient failure.
    #[arg(long)]
    pub max_attempts: Option<u32>,

    /// Per-attempt response timeout in seconds.
    #[arg(long)]
    pub response_timeout_secs: Option<u64>,

    /// Overall deadline in seconds for one request's attempt sequence.
    #[arg(long)]
    pub deadline_secs: Option<u64>,

    /// Delay between "still compiling" polls, in milliseconds.
    #[arg(long)]
    pub poll_interval_ms: Option<u64>,

    /// Stop with a timeout after this many polls (default: poll forever).
    #[arg(long)]
    pub max_polls: Option<u64>,

    /// Stop with a timeout after this many seconds of polling
    /// (default: poll forever).
    #[arg(long)]
    pub max_duration_secs: Option<u64>,

    /// Print each poll transition.
    #[arg(long, short, default_value_t = false)]
    pub verbose: bool,

    /// Print a JSON run report when the run ends.
    #[arg(long, default_value_t = false)]
    pub report: bool,
}
