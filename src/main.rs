use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

mod bundle;
mod cli;
mod config;
mod enforcement;
mod error;
mod output;
mod reasoner;
mod rules;
mod runner;
mod specialist;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing - only show logs with --verbose
    let filter = if cli.verbose {
        EnvFilter::new("spendshield=debug")
    } else {
        EnvFilter::new("spendshield=warn")
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Run(args) => cli::run::execute(args).await,
        Commands::Assemble(args) => cli::assemble::execute(args).await,
        Commands::Schema(args) => cli::schema::execute(args),
    }
}
