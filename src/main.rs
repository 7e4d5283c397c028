use clap::Parser;
use lambda_emu::cli::{commands, Cli};
use lambda_emu::config::Config;
use lambda_emu::handler::builtin;

fn main() -> miette::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    // Initialize logging; RUST_LOG wins over flags and config
    let level = cli.log_level.as_deref().or(config.log_level.as_deref());
    lambda_emu::logging::init(level, cli.log_format)?;

    // Any failure from here on is fatal and exits with status 1
    commands::run(cli, config, builtin::registry()?)?;

    Ok(())
}
