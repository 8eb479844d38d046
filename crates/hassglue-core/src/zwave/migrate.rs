// ── Unique ID migration ──
//
// Renames registry entries whose unique ID was produced by an older value
// ID format, or whose value moved to a different endpoint. Every function
// here is synchronous: it only touches the in-memory registries.

use std::collections::HashSet;

use serde::Serialize;
use tracing::debug;

use super::helpers::{DOMAIN, old_value_ids, unique_id};
use super::value_id::{ValueId, ValueIdError};
use crate::error::CoreError;
use crate::model::{DeviceEntry, DiscoveryInfo};
use crate::store::{DataStore, EntityRegistry, STATE_UNAVAILABLE};

/// A registry change made by the migration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum MigrationAction {
    Renamed {
        entity_id: String,
        old_unique_id: String,
        new_unique_id: String,
    },
    /// The old entry was dropped because the new unique ID already
    /// belongs to another entity.
    Removed { entity_id: String, unique_id: String },
}

impl MigrationAction {
    pub fn entity_id(&self) -> &str {
        match self {
            Self::Renamed { entity_id, .. } | Self::Removed { entity_id, .. } => entity_id,
        }
    }
}

/// Move the entity registered under `old_unique_id` to `new_unique_id`.
///
/// If the new ID is already taken, the old entry is removed instead. No-op
/// when nothing is registered under the old ID.
pub fn migrate_unique_id(
    registry: &EntityRegistry,
    domain: &str,
    old_unique_id: &str,
    new_unique_id: &str,
) -> Option<MigrationAction> {
    let entity_id = registry.get_entity_id(domain, DOMAIN, old_unique_id)?;
    debug!(
        entity_id = %entity_id,
        old_unique_id,
        new_unique_id,
        "migrating entity to new unique ID"
    );

    match registry.update_unique_id(&entity_id, new_unique_id) {
        Ok(_) => Some(MigrationAction::Renamed {
            entity_id,
            old_unique_id: old_unique_id.to_owned(),
            new_unique_id: new_unique_id.to_owned(),
        }),
        Err(CoreError::UniqueIdTaken { .. }) => {
            debug!(
                entity_id = %entity_id,
                "unique ID is taken, removing entity since it is likely no longer valid"
            );
            registry.remove(&entity_id);
            Some(MigrationAction::Removed {
                entity_id,
                unique_id: old_unique_id.to_owned(),
            })
        }
        Err(e) => {
            debug!(entity_id = %entity_id, error = %e, "entity vanished during migration");
            None
        }
    }
}

/// Adopt an entity registered for the same value on another endpoint.
///
/// Does nothing if `unique_id` is already registered, if no candidate or
/// more than one candidate exists, or if the candidate is still reporting
/// a live state.
pub fn migrate_old_entity(
    store: &DataStore,
    registered_unique_ids: &HashSet<String>,
    domain: &str,
    device: &DeviceEntry,
    unique_id: &str,
) -> Result<Option<MigrationAction>, ValueIdError> {
    if store
        .entities
        .get_entity_id(domain, DOMAIN, unique_id)
        .is_some()
    {
        return Ok(None);
    }

    let value_id = ValueId::from_unique_id(unique_id)?;

    let mut candidates = Vec::new();
    for entry in store.entities.entries_for_device(&device.id) {
        if entry.domain() != domain || registered_unique_ids.contains(&entry.unique_id) {
            continue;
        }

        // Not every entity is value based (node status sensors, ...).
        let Ok(old_value_id) = ValueId::from_unique_id(&entry.unique_id) else {
            continue;
        };

        if value_id.is_same_value_different_endpoint(&old_value_id) {
            candidates.push(entry);
            if candidates.len() > 1 {
                debug!(unique_id, "several entities match on other endpoints, skipping");
                return Ok(None);
            }
        }
    }

    let Some(entry) = candidates.pop() else {
        return Ok(None);
    };

    let live = store
        .states
        .get(&entry.entity_id)
        .is_some_and(|state| state.state != STATE_UNAVAILABLE);
    if live {
        debug!(entity_id = %entry.entity_id, "candidate is still reporting, skipping");
        return Ok(None);
    }

    Ok(migrate_unique_id(
        &store.entities,
        domain,
        &entry.unique_id,
        unique_id,
    ))
}

/// Migrate the entity (or entities) backed by one discovered value.
///
/// `registered_unique_ids` is shared across a discovery pass: IDs already
/// in it are skipped and every processed ID is added to it.
pub fn migrate_discovered_value(
    store: &DataStore,
    registered_unique_ids: &mut HashSet<String>,
    device: &DeviceEntry,
    info: &DiscoveryInfo,
) -> Result<Vec<MigrationAction>, ValueIdError> {
    let home_id = info.node.home_id;
    let new_unique_id = unique_id(home_id, &info.primary_value.value_id());

    if registered_unique_ids.contains(&new_unique_id) {
        return Ok(Vec::new());
    }

    let old_unique_ids: Vec<String> = old_value_ids(&info.primary_value)
        .iter()
        .map(|value_id| unique_id(home_id, value_id))
        .collect();

    let domain = info.platform.as_str();
    let mut actions = Vec::new();

    if info.is_notification_binary_sensor() {
        for state_key in info.primary_value.metadata.states.keys() {
            // "0" is the idle state and never has its own entity.
            if state_key == "0" {
                continue;
            }

            let new_state_unique_id = format!("{new_unique_id}.{state_key}");
            if registered_unique_ids.contains(&new_state_unique_id) {
                continue;
            }

            actions.extend(old_unique_ids.iter().filter_map(|old| {
                migrate_unique_id(
                    &store.entities,
                    domain,
                    &format!("{old}.{state_key}"),
                    &new_state_unique_id,
                )
            }));
            actions.extend(migrate_old_entity(
                store,
                registered_unique_ids,
                domain,
                device,
                &new_state_unique_id,
            )?);
            registered_unique_ids.insert(new_state_unique_id);
        }
        return Ok(actions);
    }

    actions.extend(
        old_unique_ids
            .iter()
            .filter_map(|old| migrate_unique_id(&store.entities, domain, old, &new_unique_id)),
    );
    actions.extend(migrate_old_entity(
        store,
        registered_unique_ids,
        domain,
        device,
        &new_unique_id,
    )?);
    registered_unique_ids.insert(new_unique_id);

    Ok(actions)
}
