//! `hassglue migration-data`: show the persisted migration snapshot.

use tabled::Tabled;

use hassglue_core::{LegacyMigration, MigrationRecord};

use super::Ctx;
use crate::cli::MigrationDataArgs;
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct RecordRow {
    #[tabled(rename = "Unique ID")]
    unique_id: String,
    #[tabled(rename = "Entity ID")]
    entity_id: String,
    #[tabled(rename = "Value ID")]
    value_id: String,
    #[tabled(rename = "Device")]
    device_id: String,
    #[tabled(rename = "Unit")]
    unit: String,
}

pub async fn handle(args: MigrationDataArgs, ctx: &Ctx) -> Result<(), CliError> {
    let migration = LegacyMigration::new(&ctx.migration_config());
    let records: Vec<MigrationRecord> = migration
        .get_data(&args.config_entry)
        .await?
        .into_values()
        .collect();

    let rendered = output::render_list(
        ctx.format,
        &records,
        |r| RecordRow {
            unique_id: r.unique_id.clone(),
            entity_id: r.entity_id.clone(),
            value_id: r.value_id.clone(),
            device_id: r.device_id.clone(),
            unit: r.unit_of_measurement.clone().unwrap_or_default(),
        },
        |r| format!("{}\t{}", r.unique_id, r.entity_id),
    )?;
    ctx.print(&rendered);
    Ok(())
}
