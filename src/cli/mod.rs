pub mod assemble;
pub mod run;
pub mod schema;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "spendshield")]
#[command(
    author,
    version,
    about = "Parallel financial specialists that turn analysis into card spending controls"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose/debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze a user's finances and enforce the resulting controls
    Run(RunArgs),

    /// Assemble a rule payload from a saved analysis without submitting it
    Assemble(AssembleArgs),

    /// Print JSON Schema for the config, the analysis, or the rule payload
    Schema(SchemaArgs),
}

#[derive(Parser, Clone)]
pub struct RunArgs {
    /// Path to config file
    #[arg(short, long, default_value = "spendshield.yaml")]
    pub config: PathBuf,

    /// User whose financial data is analyzed
    #[arg(short, long)]
    pub user: String,

    /// Assemble rules but do not submit them
    #[arg(long)]
    pub dry_run: bool,

    /// Override output directory
    #[arg(long)]
    pub report_dir: Option<PathBuf>,

    /// Override max parallel specialists
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Override the overall run deadline in seconds
    #[arg(long)]
    pub deadline_sec: Option<u64>,
}

#[derive(Parser, Clone)]
pub struct AssembleArgs {
    /// Saved combined analysis (analysis.json from a run)
    #[arg(short, long)]
    pub analysis: PathBuf,

    /// Config file supplying user preferences; defaults apply if absent
    #[arg(short, long, default_value = "spendshield.yaml")]
    pub config: PathBuf,
}

#[derive(Parser, Clone)]
pub struct SchemaArgs {
    #[arg(value_enum, default_value = "config")]
    pub target: SchemaTarget,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SchemaTarget {
    Config,
    Analysis,
    Payload,
}
