// ── Domain model ──
//
// Registry records shared by both integrations, plus the Z-Wave JS
// discovery types the migration consumes.

pub mod registry;
pub mod zwave;

pub use registry::{
    DeviceEntry, DeviceEntryType, DeviceIdentifier, DeviceInfo, EntityEntry, NewEntity,
};
pub use zwave::{DiscoveryInfo, Property, ValueMetadata, ZwaveNode, ZwaveValue};
