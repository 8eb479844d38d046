// ── Entity registry ──
//
// Entries keyed by `entity_id`, with a secondary index on
// `(domain, platform, unique_id)`. A unique ID can only belong to one
// entity per domain and platform.

use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use super::collection::Collection;
use crate::error::CoreError;
use crate::model::{EntityEntry, NewEntity};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct UniqueIdKey {
    domain: String,
    platform: String,
    unique_id: String,
}

impl UniqueIdKey {
    fn new(domain: &str, platform: &str, unique_id: &str) -> Self {
        Self {
            domain: domain.to_owned(),
            platform: platform.to_owned(),
            unique_id: unique_id.to_owned(),
        }
    }

    fn of(entry: &EntityEntry) -> Self {
        Self::new(entry.domain(), &entry.platform, &entry.unique_id)
    }
}

pub struct EntityRegistry {
    entries: Collection<UniqueIdKey, EntityEntry>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self {
            entries: Collection::new(),
        }
    }

    /// Entity ID registered for `unique_id` under the given entity domain
    /// and integration.
    pub fn get_entity_id(&self, domain: &str, platform: &str, unique_id: &str) -> Option<String> {
        self.entries
            .key_for(&UniqueIdKey::new(domain, platform, unique_id))
    }

    pub fn get(&self, entity_id: &str) -> Option<Arc<EntityEntry>> {
        self.entries.get_by_key(entity_id)
    }

    /// Return the entry for `new.unique_id`, registering it first if needed.
    ///
    /// New entity IDs are derived from the suggested object ID, the
    /// original name, or the unique ID (in that order), slugified and
    /// suffixed with `_2`, `_3`, ... until free.
    pub fn get_or_create(&self, new: NewEntity) -> Arc<EntityEntry> {
        if let Some(existing) = self
            .get_entity_id(&new.domain, &new.platform, &new.unique_id)
            .and_then(|entity_id| self.get(&entity_id))
        {
            return existing;
        }

        let object_id = new
            .suggested_object_id
            .as_deref()
            .or(new.original_name.as_deref())
            .unwrap_or(&new.unique_id);
        let entity_id = self.free_entity_id(&new.domain, object_id);

        let entry = EntityEntry {
            id: Uuid::new_v4().simple().to_string(),
            entity_id: entity_id.clone(),
            unique_id: new.unique_id,
            platform: new.platform,
            device_id: new.device_id,
            config_entry_id: new.config_entry_id,
            original_name: new.original_name,
            device_class: new.device_class,
            unit_of_measurement: new.unit_of_measurement,
            previous_unique_id: None,
        };
        debug!(entity_id = %entity_id, unique_id = %entry.unique_id, "registered entity");
        let index = UniqueIdKey::of(&entry);
        self.entries.upsert(entity_id, index, entry.clone());
        Arc::new(entry)
    }

    /// Insert a fully formed entry, replacing any entry with the same
    /// entity ID. Used when restoring a snapshot.
    ///
    /// Fails with [`CoreError::UniqueIdTaken`] if a different entity already
    /// owns the entry's unique ID in its domain and platform.
    pub fn insert(&self, entry: EntityEntry) -> Result<(), CoreError> {
        let index = UniqueIdKey::of(&entry);
        if let Some(existing_entity_id) = self
            .entries
            .key_for(&index)
            .filter(|owner| *owner != entry.entity_id)
        {
            return Err(CoreError::UniqueIdTaken {
                entity_id: entry.entity_id,
                unique_id: entry.unique_id,
                existing_entity_id,
            });
        }
        self.entries.upsert(entry.entity_id.clone(), index, entry);
        Ok(())
    }

    /// All entries attached to a device, sorted by entity ID.
    pub fn entries_for_device(&self, device_id: &str) -> Vec<Arc<EntityEntry>> {
        self.filtered(|e| e.device_id.as_deref() == Some(device_id))
    }

    /// All entries created by a config entry, sorted by entity ID.
    pub fn entries_for_config_entry(&self, config_entry_id: &str) -> Vec<Arc<EntityEntry>> {
        self.filtered(|e| e.config_entry_id.as_deref() == Some(config_entry_id))
    }

    /// Every entry, sorted by entity ID.
    pub fn entries(&self) -> Vec<Arc<EntityEntry>> {
        self.filtered(|_| true)
    }

    /// Change the unique ID of an entity.
    ///
    /// Fails with [`CoreError::UniqueIdTaken`] if another entity in the same
    /// domain and platform already owns `new_unique_id`.
    pub fn update_unique_id(
        &self,
        entity_id: &str,
        new_unique_id: &str,
    ) -> Result<Arc<EntityEntry>, CoreError> {
        let current = self.get(entity_id).ok_or_else(|| CoreError::EntityNotFound {
            entity_id: entity_id.to_owned(),
        })?;

        if current.unique_id == new_unique_id {
            return Ok(current);
        }

        let target = UniqueIdKey::new(current.domain(), &current.platform, new_unique_id);
        if let Some(existing_entity_id) = self.entries.key_for(&target) {
            return Err(CoreError::UniqueIdTaken {
                entity_id: entity_id.to_owned(),
                unique_id: new_unique_id.to_owned(),
                existing_entity_id,
            });
        }

        let mut updated = (*current).clone();
        updated.previous_unique_id = Some(std::mem::replace(
            &mut updated.unique_id,
            new_unique_id.to_owned(),
        ));
        self.entries
            .upsert(entity_id.to_owned(), target, updated.clone());
        Ok(Arc::new(updated))
    }

    pub fn remove(&self, entity_id: &str) -> Option<Arc<EntityEntry>> {
        self.entries.remove(entity_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // ── Private helpers ──────────────────────────────────────────────

    fn filtered(&self, keep: impl Fn(&EntityEntry) -> bool) -> Vec<Arc<EntityEntry>> {
        let mut entries: Vec<_> = self
            .entries
            .values()
            .into_iter()
            .filter(|e| keep(e))
            .collect();
        entries.sort_by(|a, b| a.entity_id.cmp(&b.entity_id));
        entries
    }

    fn free_entity_id(&self, domain: &str, object_id: &str) -> String {
        let base = format!("{domain}.{}", slugify(object_id));
        if !self.entries.contains_key(&base) {
            return base;
        }
        (2..)
            .map(|n| format!("{base}_{n}"))
            .find(|candidate| !self.entries.contains_key(candidate))
            .unwrap_or(base)
    }
}

impl Default for EntityRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Lowercase ASCII slug: runs of anything non-alphanumeric become one `_`.
fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('_') {
            slug.push('_');
        }
    }
    let slug = slug.trim_matches('_');
    if slug.is_empty() {
        "unnamed".to_owned()
    } else {
        slug.to_owned()
    }
}
