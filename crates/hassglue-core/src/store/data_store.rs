// ── Registry bundle ──
//
// The three registries an integration talks to during setup, plus a
// serializable snapshot so a whole registry state can be loaded from or
// written to a single JSON document.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{DeviceRegistry, EntityRegistry, StateMachine};
use crate::error::CoreError;
use crate::model::{DeviceEntry, EntityEntry};

/// Serializable view of a [`DataStore`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrySnapshot {
    #[serde(default)]
    pub entities: Vec<EntityEntry>,
    #[serde(default)]
    pub devices: Vec<DeviceEntry>,
    /// Last known state string per entity ID.
    #[serde(default)]
    pub states: BTreeMap<String, String>,
}

#[derive(Default)]
pub struct DataStore {
    pub entities: EntityRegistry,
    pub devices: DeviceRegistry,
    pub states: StateMachine,
}

impl DataStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a store from a snapshot.
    ///
    /// Rejects snapshots where two devices share an identifier or two
    /// entities share a unique ID within one domain and platform.
    pub fn from_snapshot(snapshot: RegistrySnapshot) -> Result<Self, CoreError> {
        let store = Self::new();
        for device in snapshot.devices {
            store.devices.insert(device)?;
        }
        for entity in snapshot.entities {
            store.entities.insert(entity)?;
        }
        for (entity_id, state) in snapshot.states {
            store.states.set(&entity_id, state);
        }
        Ok(store)
    }

    pub fn snapshot(&self) -> RegistrySnapshot {
        RegistrySnapshot {
            entities: self
                .entities
                .entries()
                .iter()
                .map(|e| (**e).clone())
                .collect(),
            devices: self
                .devices
                .devices()
                .iter()
                .map(|d| (**d).clone())
                .collect(),
            states: self.states.all(),
        }
    }
}
