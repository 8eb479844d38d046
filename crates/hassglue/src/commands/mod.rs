//! Command dispatch: bridges CLI args -> core operations -> output formatting.

pub mod config_cmd;
pub mod migrate;
pub mod migration_data;
pub mod vehicle;

use std::path::PathBuf;

use clap::ValueEnum;

use hassglue_config::Config;
use hassglue_core::MigrationConfig;

use crate::cli::{ColorMode, Command, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

/// Effective settings for one invocation: config file values with the
/// global flags layered on top.
pub struct Ctx {
    pub config: Config,
    pub format: OutputFormat,
    pub color: bool,
    pub quiet: bool,
    pub storage_dir: Option<PathBuf>,
}

impl Ctx {
    pub fn new(global: &GlobalOpts, mut config: Config) -> Self {
        let format = global
            .output
            .or_else(|| OutputFormat::from_str(&config.defaults.output, true).ok())
            .unwrap_or(OutputFormat::Table);
        let color = global
            .color
            .or_else(|| ColorMode::from_str(&config.defaults.color, true).ok())
            .unwrap_or(ColorMode::Auto);
        if let Some(timeout) = global.timeout {
            config.defaults.timeout = timeout;
        }

        Self {
            config,
            format,
            color: output::should_color(color),
            quiet: global.quiet,
            storage_dir: global.storage_dir.clone(),
        }
    }

    pub fn migration_config(&self) -> MigrationConfig {
        hassglue_config::migration_config(&self.config, self.storage_dir.as_deref())
    }

    pub fn print(&self, rendered: &str) {
        output::print_output(rendered, self.quiet);
    }
}

/// Dispatch a command to its handler.
pub async fn dispatch(cmd: Command, ctx: &Ctx) -> Result<(), CliError> {
    match cmd {
        Command::Vehicle(args) => vehicle::handle(args, ctx).await,
        Command::Migrate(args) => migrate::handle(args, ctx).await,
        Command::MigrationData(args) => migration_data::handle(args, ctx).await,
        Command::Config(args) => config_cmd::handle(&args, ctx),
        // Completions are handled before dispatch
        Command::Completions(_) => Ok(()),
    }
}
