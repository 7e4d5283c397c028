pub mod commands;

use std::path::PathBuf;

use clap::Parser;

use crate::logging::LogFormat;

/// Run a serverless function handler locally.
///
/// Resolves HANDLER, invokes it with the JSON event read from EVENT under a
/// hard timeout, and prints the result. Verbose mode adds timing and peak
/// memory estimates.
#[derive(Parser, Debug, Clone)]
#[command(name = "lambda-emu", author, version, about, long_about = None)]
pub struct Cli {
    /// Import path to your function, as you would give it to the platform: `module.function`
    #[arg(value_name = "HANDLER")]
    pub handler: String,

    /// JSON file to give as the `event` argument to the function, or `-` for stdin
    #[arg(value_name = "EVENT")]
    pub event: String,

    /// Treat EVENT as a line-delimited JSON stream and invoke once per line
    #[arg(short, long)]
    pub stream: bool,

    /// Execution timeout in seconds (1-300). Defaults to 300, the platform maximum
    #[arg(
        long,
        value_name = "SECONDS",
        env = "LAMBDA_EMU_TIMEOUT",
        value_parser = clap::value_parser!(u64).range(1..=300)
    )]
    pub timeout: Option<u64>,

    /// Print the handler run, timing and memory estimates before each result
    #[arg(short, long)]
    pub verbose: bool,

    /// Directory to search for handler libraries (repeatable)
    #[arg(long = "handler-path", value_name = "DIR")]
    pub handler_paths: Vec<PathBuf>,

    /// Configuration file (defaults to ./lambda-emu.toml when present)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log filter, e.g. `debug` or `lambda_emu=trace` (RUST_LOG takes precedence)
    #[arg(long, value_name = "FILTER")]
    pub log_level: Option<String>,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}
