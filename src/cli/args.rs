//! CLI argument definitions using clap derive

use crate::version::VersionOptions;
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// buildmemo - build-scoped memoization for version calculation
///
/// Runs an external version tool at most once per distinct set of options
/// within a build, and caches key/value pairs for the rest of the build.
#[derive(Parser, Debug)]
#[command(name = "buildmemo")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "BUILDMEMO_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Calculate the version once and print it
    Version(VersionArgs),

    /// Run a build plan inside a single cache scope
    Build(BuildArgs),

    /// Show or initialize configuration
    Config(ConfigArgs),
}

/// Arguments for the version command
#[derive(Parser, Debug)]
pub struct VersionArgs {
    /// Options forwarded to the version tool
    #[command(flatten)]
    pub options: VersionOptions,

    /// Version tool executable (overrides tool.program)
    #[arg(long)]
    pub program: Option<String>,

    /// Output format
    #[arg(short, long, default_value = "plain")]
    pub format: OutputFormat,
}

/// Arguments for the build command
#[derive(Parser, Debug)]
pub struct BuildArgs {
    /// Build plan file
    #[arg(default_value = "buildmemo.toml")]
    pub plan: PathBuf,

    /// Version tool executable (overrides tool.program)
    #[arg(long)]
    pub program: Option<String>,

    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Subcommand for config
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init {
        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// JSON output
    Json,
    /// Simple text (one per line)
    Plain,
}
