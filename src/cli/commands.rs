use std::env;
use std::ffi::OsString;
use std::io;
use std::path::PathBuf;

use is_terminal::IsTerminal;
use tracing::info;

use super::Cli;
use crate::config::{Config, TimeoutBudget};
use crate::handler::{HandlerReference, HandlerRegistry};
use crate::logging;
use crate::runtime::{
    ConsoleReporter, DispatchMode, EventDispatcher, EventSource, HandlerResolver, TimeoutInvoker,
};
use crate::Result;

/// Environment variable listing extra handler library directories.
pub const HANDLER_PATH_ENV: &str = "LAMBDA_EMU_PATH";

/// Effective options after merging flags, environment and configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub timeout: TimeoutBudget,
    pub verbose: bool,
    pub search_paths: Vec<PathBuf>,
}

impl Settings {
    /// Flags win over the environment, which wins over the file.
    pub fn resolve(cli: &Cli, config: &Config, env_paths: Option<OsString>) -> Result<Self> {
        let timeout = match cli.timeout {
            Some(secs) => TimeoutBudget::new(secs)?,
            None => config.timeout.unwrap_or_default(),
        };

        let mut search_paths = cli.handler_paths.clone();
        if let Some(raw) = env_paths {
            search_paths.extend(env::split_paths(&raw).filter(|p| !p.as_os_str().is_empty()));
        }
        search_paths.extend(config.handler_paths.iter().cloned());
        search_paths.push(PathBuf::from("."));

        Ok(Self {
            timeout,
            verbose: cli.verbose || config.verbose,
            search_paths,
        })
    }
}

/// Resolve the handler and dispatch every event, reporting to stdout.
///
/// Returns the number of invocations made.
pub fn run(cli: Cli, config: Config, registry: HandlerRegistry) -> Result<usize> {
    let settings = Settings::resolve(&cli, &config, env::var_os(HANDLER_PATH_ENV))?;
    let reference = HandlerReference::parse(&cli.handler)?;
    info!(handler = %reference, timeout = %settings.timeout, "Starting");

    let resolver = HandlerResolver::new(registry).with_search_paths(settings.search_paths);
    let handler = resolver.resolve(&reference)?;

    let dispatcher =
        EventDispatcher::new(handler, TimeoutInvoker::new(settings.timeout.as_duration()));
    // Unlocked: handlers on the worker thread may print to stdout too.
    let stdout = io::stdout();
    let color = logging::use_color(stdout.is_terminal());
    let mut reporter =
        ConsoleReporter::new(stdout, reference.to_string(), settings.verbose).with_color(color);

    let source = EventSource::from(cli.event.as_str());
    dispatcher.dispatch(DispatchMode::from_stream_flag(cli.stream), &source, &mut reporter)
}
