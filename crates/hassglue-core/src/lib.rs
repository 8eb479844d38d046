//! Integration glue between a home-automation host and two integrations.
//!
//! This crate owns the domain model, the in-memory registries the host would
//! normally provide, and the logic of both integrations:
//!
//! - **[`rdw`]**: Read-only sensor entities backed by the RDW vehicle
//!   registration service. A fixed table of [`SensorDescriptor`]s is projected
//!   into one [`RdwSensorEntity`] per descriptor for each configured license
//!   plate; a [`VehicleCoordinator`] polls the service and pushes fresh
//!   records to the entities through a `watch` channel.
//!
//! - **[`zwave`]**: Unique ID migration for Z-Wave JS entities whose
//!   identifier format changed across releases. [`ValueId`] parsing and
//!   endpoint-change matching, legacy-format candidate generation, and
//!   [`migrate_discovered_value`] orchestration, plus the
//!   [`LegacyMigration`] handler that snapshots migration data into a
//!   debounced, versioned JSON store.
//!
//! - **[`DataStore`]**: Entity registry, device registry, and state machine
//!   bundled together. Lock-free (`DashMap`) and serializable as a
//!   [`RegistrySnapshot`].

pub mod config;
pub mod error;
pub mod model;
pub mod rdw;
pub mod store;
pub mod zwave;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{MigrationConfig, RdwConfig};
pub use error::CoreError;
pub use store::{DataStore, DeviceRegistry, EntityRegistry, RegistrySnapshot, StateMachine, Store};

pub use rdw::{RdwSensorEntity, SENSORS, SensorDescriptor, SensorValue, VehicleCoordinator, VehicleSource};
pub use zwave::{
    LegacyMigration, MigrationAction, MigrationRecord, ValueId, ValueIdError,
    migrate_discovered_value, migrate_old_entity, migrate_unique_id,
};

// Re-export model types at the crate root for ergonomics.
pub use model::{
    DeviceEntry, DeviceEntryType, DeviceIdentifier, DeviceInfo, DiscoveryInfo, EntityEntry,
    NewEntity, Property, ValueMetadata, ZwaveNode, ZwaveValue,
};

pub use hassglue_api::Vehicle;
