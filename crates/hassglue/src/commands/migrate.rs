//! `hassglue migrate`: run the unique ID migration over a registry snapshot.

use std::collections::{BTreeSet, HashSet};
use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tabled::Tabled;
use tracing::{debug, info};

use hassglue_core::zwave::node_device_identifier;
use hassglue_core::{
    CoreError, DataStore, DiscoveryInfo, LegacyMigration, MigrationAction, RegistrySnapshot,
    migrate_discovered_value,
};

use super::Ctx;
use crate::cli::{MigrateArgs, OutputFormat};
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct ActionRow {
    #[tabled(rename = "Action")]
    action: String,
    #[tabled(rename = "Entity ID")]
    entity_id: String,
    #[tabled(rename = "Old unique ID")]
    old_unique_id: String,
    #[tabled(rename = "New unique ID")]
    new_unique_id: String,
}

fn columns(action: &MigrationAction) -> (&'static str, &str, &str, &str) {
    match action {
        MigrationAction::Renamed {
            entity_id,
            old_unique_id,
            new_unique_id,
        } => (
            "renamed",
            entity_id.as_str(),
            old_unique_id.as_str(),
            new_unique_id.as_str(),
        ),
        MigrationAction::Removed {
            entity_id,
            unique_id,
        } => ("removed", entity_id.as_str(), unique_id.as_str(), ""),
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, CliError> {
    let bytes = std::fs::read(path)?;
    serde_json::from_slice(&bytes).map_err(|source| CliError::InvalidInput {
        path: path.to_path_buf(),
        source: source.into(),
    })
}

fn write_json<T: Serialize>(path: &Path, data: &T) -> Result<(), CliError> {
    let mut bytes = serde_json::to_vec_pretty(data).map_err(|e| CliError::Render(e.to_string()))?;
    bytes.push(b'\n');
    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, bytes)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

pub async fn handle(args: MigrateArgs, ctx: &Ctx) -> Result<(), CliError> {
    let snapshot: RegistrySnapshot = read_json(&args.registry)?;
    let discovered: Vec<DiscoveryInfo> = read_json(&args.discovery)?;
    let store = DataStore::from_snapshot(snapshot).map_err(|source| CliError::InvalidInput {
        path: args.registry.clone(),
        source: source.into(),
    })?;

    let mut registered = HashSet::new();
    let mut actions = Vec::new();
    let mut config_entries = BTreeSet::new();
    for info in &discovered {
        let identifier = node_device_identifier(&info.node);
        let Some(device) = store.devices.get_device(std::slice::from_ref(&identifier)) else {
            debug!(identifier = %identifier, "no device for discovered value, skipping");
            continue;
        };
        config_entries.extend(device.config_entries.iter().cloned());
        let migrated = migrate_discovered_value(&store, &mut registered, &device, info)
            .map_err(CoreError::from)?;
        actions.extend(migrated);
    }
    info!(
        values = discovered.len(),
        actions = actions.len(),
        "migration pass finished"
    );

    let entries: Vec<String> = match args.config_entry {
        Some(id) => vec![id],
        None => config_entries.into_iter().collect(),
    };
    let migration = LegacyMigration::new(&ctx.migration_config());
    for entry in &entries {
        migration.generate_data(&store, entry, &discovered);
    }
    migration.close().await?;

    if args.write {
        write_json(&args.registry, &store.snapshot())?;
        info!(path = %args.registry.display(), "wrote migrated registry snapshot");
    }

    if actions.is_empty() && ctx.format == OutputFormat::Table {
        ctx.print("No entities needed migration.");
        return Ok(());
    }

    let rendered = output::render_list(
        ctx.format,
        &actions,
        |a| {
            let (action, entity_id, old, new) = columns(a);
            ActionRow {
                action: output::highlight(action, ctx.color),
                entity_id: entity_id.to_owned(),
                old_unique_id: old.to_owned(),
                new_unique_id: new.to_owned(),
            }
        },
        |a| {
            let (action, entity_id, old, new) = columns(a);
            format!("{action}\t{entity_id}\t{old}\t{new}")
        },
    )?;
    ctx.print(&rendered);
    Ok(())
}
