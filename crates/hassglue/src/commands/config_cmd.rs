//! Config subcommand handlers.

use std::fmt::Write;

use hassglue_config::Config;

use super::Ctx;
use crate::cli::{ConfigArgs, ConfigCommand};
use crate::error::CliError;
use crate::output;

const MASK: &str = "****";

/// Copy of the config with plaintext app tokens masked.
fn redacted(cfg: &Config) -> Config {
    let mut cfg = cfg.clone();
    for profile in cfg.vehicles.values_mut() {
        if profile.app_token.is_some() {
            profile.app_token = Some(MASK.into());
        }
    }
    cfg
}

/// Format config as TOML-ish text. Expects an already redacted config.
fn format_config(cfg: &Config, storage_dir: &str) -> String {
    let mut out = String::new();

    if let Some(ref default) = cfg.default_vehicle {
        let _ = writeln!(out, "default_vehicle = \"{default}\"");
    }
    let _ = writeln!(out, "storage_dir = \"{storage_dir}\"");
    let _ = writeln!(out);
    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "output = \"{}\"", cfg.defaults.output);
    let _ = writeln!(out, "color = \"{}\"", cfg.defaults.color);
    let _ = writeln!(out, "timeout = {}", cfg.defaults.timeout);
    let _ = writeln!(out);
    let _ = writeln!(out, "[migration]");
    let _ = writeln!(out, "write_delay_secs = {}", cfg.migration.write_delay_secs);
    let _ = writeln!(out);
    let _ = writeln!(out, "[rdw]");
    let _ = writeln!(out, "base_url = \"{}\"", cfg.rdw.base_url);
    let _ = writeln!(out, "scan_interval_secs = {}", cfg.rdw.scan_interval_secs);

    for (name, vehicle) in &cfg.vehicles {
        let _ = writeln!(out);
        let _ = writeln!(out, "[vehicles.{name}]");
        let _ = writeln!(out, "license_plate = \"{}\"", vehicle.license_plate);
        if let Some(ref token) = vehicle.app_token {
            let _ = writeln!(out, "app_token = \"{token}\"");
        }
        if let Some(ref env) = vehicle.app_token_env {
            let _ = writeln!(out, "app_token_env = \"{env}\"");
        }
    }

    out.trim_end().to_owned()
}

pub fn handle(args: &ConfigArgs, ctx: &Ctx) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Path => {
            ctx.print(&hassglue_config::config_path().display().to_string());
            Ok(())
        }
        ConfigCommand::Show => {
            let mut cfg = redacted(&ctx.config);
            let migration = ctx.migration_config();
            cfg.storage_dir = Some(migration.storage_dir.clone());
            let storage_dir = migration.storage_dir.display().to_string();

            let rendered = output::render_single(ctx.format, &cfg, |c| format_config(c, &storage_dir))?;
            ctx.print(&rendered);
            Ok(())
        }
    }
}
