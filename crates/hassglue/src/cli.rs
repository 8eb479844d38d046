//! Clap derive structures for the `hassglue` CLI.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// hassglue -- RDW vehicle sensors and Z-Wave JS unique ID migration
#[derive(Debug, Parser)]
#[command(
    name = "hassglue",
    version,
    about = "Home automation integration glue from the command line",
    long_about = "Projects RDW vehicle registration data into date sensors and\n\
        migrates Z-Wave JS entity unique IDs from legacy formats.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Output format [default: from config, else table]
    #[arg(long, short = 'o', env = "HASSGLUE_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output [default: from config, else auto]
    #[arg(long, global = true)]
    pub color: Option<ColorMode>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Request timeout in seconds
    #[arg(long, env = "HASSGLUE_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Directory holding persisted storage files
    #[arg(long, env = "HASSGLUE_STORAGE_DIR", global = true)]
    pub storage_dir: Option<PathBuf>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one record per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch a vehicle and show its sensor states
    #[command(alias = "v")]
    Vehicle(VehicleArgs),

    /// Migrate Z-Wave JS unique IDs in a registry snapshot
    Migrate(MigrateArgs),

    /// Show persisted Z-Wave JS migration data
    MigrationData(MigrationDataArgs),

    /// Inspect CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Vehicle ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct VehicleArgs {
    /// License plate (dashes and spaces are ignored)
    pub plate: Option<String>,

    /// Vehicle profile from the config file
    #[arg(long, conflicts_with = "plate")]
    pub vehicle: Option<String>,
}

// ── Migration ────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct MigrateArgs {
    /// Registry snapshot (JSON with entities, devices, states)
    #[arg(long, short = 'r')]
    pub registry: PathBuf,

    /// Discovered values (JSON array)
    #[arg(long, short = 'd')]
    pub discovery: PathBuf,

    /// Config entry to snapshot migration data for
    /// [default: every config entry of the matched devices]
    #[arg(long)]
    pub config_entry: Option<String>,

    /// Write the migrated snapshot back to the registry file
    #[arg(long, short = 'w')]
    pub write: bool,
}

#[derive(Debug, Args)]
pub struct MigrationDataArgs {
    /// Config entry whose records to show
    #[arg(long)]
    pub config_entry: String,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the config file location
    Path,
    /// Show the effective configuration (secrets masked)
    Show,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
