mod cli;
mod commands;

use cli::{Cli, Commands};
use commands::{chart, inspect, replay};
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).try_init();
}

pub fn run() -> anyhow::Result<()> {
    use clap::Parser;

    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match &cli.command {
        Commands::Chart(args) => chart::run(&cli, args),
        Commands::Inspect(args) => inspect::run(&cli, args),
        Commands::Replay(args) => replay::run(&cli, args),
    }
}

fn main() -> anyhow::Result<()> { run() }
