//! `hassglue vehicle`: one fetch, projected into the date sensors.

use serde::Serialize;
use tabled::Tabled;

use hassglue_core::rdw::setup_entry;
use hassglue_core::{DataStore, VehicleCoordinator};

use super::Ctx;
use crate::cli::VehicleArgs;
use crate::error::CliError;
use crate::output;

#[derive(Serialize)]
struct SensorReport {
    unique_id: String,
    entity_id: String,
    name: &'static str,
    device_class: Option<String>,
    state: String,
}

#[derive(Tabled)]
struct SensorRow {
    #[tabled(rename = "Sensor")]
    name: &'static str,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Entity ID")]
    entity_id: String,
    #[tabled(rename = "Unique ID")]
    unique_id: String,
}

pub async fn handle(args: VehicleArgs, ctx: &Ctx) -> Result<(), CliError> {
    let rdw = match args.plate {
        Some(ref plate) => hassglue_config::rdw_config(&ctx.config, plate, None)?,
        None => {
            let (name, profile) = hassglue_config::find_vehicle(&ctx.config, args.vehicle.as_deref())?;
            hassglue_config::vehicle_to_rdw_config(&ctx.config, profile, name)?
        }
    };

    let coordinator = VehicleCoordinator::from_config(&rdw)?;
    coordinator.first_refresh().await?;

    let store = DataStore::new();
    let entities = setup_entry(&store, &rdw.license_plate, &coordinator)?;
    coordinator.shutdown().await;

    let reports: Vec<SensorReport> = entities
        .iter()
        .map(|entity| SensorReport {
            unique_id: entity.unique_id().to_owned(),
            entity_id: entity.entity_id().to_owned(),
            name: entity.name(),
            device_class: entity.descriptor().device_class.map(|c| c.to_string()),
            state: entity.state(),
        })
        .collect();

    let rendered = output::render_list(
        ctx.format,
        &reports,
        |r| SensorRow {
            name: r.name,
            state: output::highlight(&r.state, ctx.color),
            entity_id: r.entity_id.clone(),
            unique_id: r.unique_id.clone(),
        },
        |r| format!("{}\t{}", r.unique_id, r.state),
    )?;
    ctx.print(&rendered);
    Ok(())
}
