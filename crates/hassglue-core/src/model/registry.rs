// ── Registry records ──
//
// Entity and device entries as the host registries persist them. The
// migration only ever reads or rewrites `unique_id`; everything else is
// carried along so snapshots round-trip.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

// ── DeviceIdentifier ────────────────────────────────────────────────

/// A `(domain, id)` pair that identifies a physical or service device.
///
/// Serialized as a two-element array, the same way the host stores it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DeviceIdentifier(pub String, pub String);

impl DeviceIdentifier {
    pub fn new(domain: impl Into<String>, id: impl Into<String>) -> Self {
        Self(domain.into(), id.into())
    }

    pub fn domain(&self) -> &str {
        &self.0
    }

    pub fn id(&self) -> &str {
        &self.1
    }
}

impl fmt::Display for DeviceIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.0, self.1)
    }
}

// ── Devices ─────────────────────────────────────────────────────────

/// Kind of device entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceEntryType {
    /// Virtual device backed by an online service rather than hardware.
    Service,
}

/// Device metadata an integration supplies when registering entities.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub identifiers: BTreeSet<DeviceIdentifier>,
    #[serde(default)]
    pub entry_type: Option<DeviceEntryType>,
    #[serde(default)]
    pub manufacturer: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub configuration_url: Option<String>,
}

/// A registered device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceEntry {
    /// Registry-assigned ID.
    pub id: String,
    #[serde(default)]
    pub config_entries: BTreeSet<String>,
    pub identifiers: BTreeSet<DeviceIdentifier>,
    #[serde(default)]
    pub entry_type: Option<DeviceEntryType>,
    #[serde(default)]
    pub manufacturer: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub configuration_url: Option<String>,
}

// ── Entities ────────────────────────────────────────────────────────

/// A registered entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityEntry {
    /// Registry-assigned ID.
    pub id: String,
    /// Full entity ID (`domain.object_id`).
    pub entity_id: String,
    /// Integration-provided identifier, stable across restarts.
    pub unique_id: String,
    /// Integration that provides this entity (e.g. `zwave_js`).
    pub platform: String,
    #[serde(default)]
    pub device_id: Option<String>,
    #[serde(default)]
    pub config_entry_id: Option<String>,
    #[serde(default)]
    pub original_name: Option<String>,
    #[serde(default)]
    pub device_class: Option<String>,
    #[serde(default)]
    pub unit_of_measurement: Option<String>,
    /// Unique ID before the last migration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_unique_id: Option<String>,
}

impl EntityEntry {
    /// Entity domain (`sensor`, `binary_sensor`, ...), the part of
    /// `entity_id` before the dot.
    pub fn domain(&self) -> &str {
        self.entity_id
            .split_once('.')
            .map_or(self.entity_id.as_str(), |(domain, _)| domain)
    }
}

/// Registration request for a new entity.
#[derive(Debug, Clone, Default)]
pub struct NewEntity {
    pub domain: String,
    pub platform: String,
    pub unique_id: String,
    /// Preferred object ID; falls back to `original_name`, then `unique_id`.
    pub suggested_object_id: Option<String>,
    pub config_entry_id: Option<String>,
    pub device_id: Option<String>,
    pub original_name: Option<String>,
    pub device_class: Option<String>,
    pub unit_of_measurement: Option<String>,
}
