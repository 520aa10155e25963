//! CLI Argument Structures
//!
//! All argument definitions, command structures, and output format enums used
//! by the jtbd CLI binary.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Theme extraction and clustering for Jobs-to-be-Done interviews
#[derive(Parser)]
#[command(name = "jtbd")]
#[command(version = VERSION)]
#[command(about = "Extract JTBD pain themes from interview notes and cluster them")]
#[command(long_about = "
Map free-text interview notes onto 13 core pain themes, then group interviews
with cosine k-means and silhouette-based model selection.

Common Usage:

  # Extract the interview matrix from notes (blank line between interviews)
  jtbd extract notes.txt

  # Cluster a matrix or a full request {matrix, reference, k_range, facets}
  jtbd cluster matrix.json --format table

  # Extract and cluster in one go, scoring clusters against a problem statement
  jtbd run notes.txt --reference cost,time

  # Read from stdin
  cat notes.txt | jtbd run -
")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file (YAML or JSON)
    #[arg(short, long, global = true, env = "JTBD_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract the interview matrix from raw notes
    Extract(ExtractArgs),

    /// Cluster an interview matrix
    Cluster(ClusterArgs),

    /// Extract and cluster in one step
    Run(RunArgs),

    /// Print default configuration in YAML format
    #[command(name = "print-default-config")]
    PrintDefaultConfig,

    /// Initialize a configuration file with defaults
    #[command(name = "init-config")]
    InitConfig(InitConfigArgs),

    /// Validate a jtbd configuration file
    #[command(name = "validate-config")]
    ValidateConfig(ValidateConfigArgs),
}

#[derive(Args)]
pub struct ExtractArgs {
    /// Notes file; `-` or omitted reads stdin
    pub input: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    pub format: OutputFormat,
}

#[derive(Args)]
pub struct ClusterArgs {
    /// JSON matrix or request file; `-` or omitted reads stdin
    pub input: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    pub format: OutputFormat,

    #[command(flatten)]
    pub clustering: ClusteringArgs,
}

#[derive(Args)]
pub struct RunArgs {
    /// Notes file; `-` or omitted reads stdin
    pub input: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    pub format: OutputFormat,

    #[command(flatten)]
    pub clustering: ClusteringArgs,
}

/// Clustering overrides shared by `cluster` and `run`
#[derive(Args, Default)]
pub struct ClusteringArgs {
    /// Smallest k to try
    #[arg(long)]
    pub k_min: Option<usize>,

    /// Largest k to try (inclusive)
    #[arg(long)]
    pub k_max: Option<usize>,

    /// Problem-statement themes for ps_match (comma separated)
    #[arg(short, long, value_delimiter = ',')]
    pub reference: Vec<String>,
}

#[derive(Args)]
pub struct InitConfigArgs {
    /// Output configuration file name
    #[arg(short, long, default_value = ".jtbd.yml")]
    pub output: PathBuf,

    /// Overwrite existing configuration file
    #[arg(short, long)]
    pub force: bool,
}

#[derive(Args)]
pub struct ValidateConfigArgs {
    /// Path to configuration file to validate
    pub file: PathBuf,

    /// Show detailed configuration breakdown
    #[arg(long)]
    pub details: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// JSON format output
    Json,
    /// Human-readable tables
    Table,
}
