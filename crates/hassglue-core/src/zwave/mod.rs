// ── Z-Wave JS unique ID migration ──
//
// Value ID parsing, legacy identifier candidates, registry migration, and
// the persisted migration data snapshot.

pub mod helpers;
mod migrate;
mod migration_data;
mod value_id;

pub use helpers::{DOMAIN, device_identifier, node_device_identifier, old_value_ids, unique_id};
pub use migrate::{MigrationAction, migrate_discovered_value, migrate_old_entity, migrate_unique_id};
pub use migration_data::{
    EntryMigrationData, LegacyMigration, MigrationData, MigrationRecord, STORAGE_KEY,
    STORAGE_VERSION,
};
pub use value_id::{ValueId, ValueIdError};
