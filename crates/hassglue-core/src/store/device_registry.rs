// ── Device registry ──
//
// Devices keyed by registry ID. Every identifier maps to exactly one
// device; registering a `DeviceInfo` that shares any identifier with an
// existing device updates that device instead of creating a new one.

use std::collections::BTreeSet;
use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;
use uuid::Uuid;

use crate::error::CoreError;
use crate::model::{DeviceEntry, DeviceIdentifier, DeviceInfo};

pub struct DeviceRegistry {
    by_id: DashMap<String, Arc<DeviceEntry>>,
    by_identifier: DashMap<DeviceIdentifier, String>,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self {
            by_id: DashMap::new(),
            by_identifier: DashMap::new(),
        }
    }

    pub fn get(&self, device_id: &str) -> Option<Arc<DeviceEntry>> {
        self.by_id.get(device_id).map(|r| Arc::clone(r.value()))
    }

    /// First device matching any of `identifiers`.
    pub fn get_device(&self, identifiers: &[DeviceIdentifier]) -> Option<Arc<DeviceEntry>> {
        identifiers
            .iter()
            .find_map(|ident| self.by_identifier.get(ident).map(|r| r.value().clone()))
            .and_then(|device_id| self.get(&device_id))
    }

    /// Register or update the device described by `info`.
    ///
    /// Identifiers and config entries accumulate; metadata fields present
    /// in `info` replace the stored ones.
    pub fn get_or_create(&self, config_entry_id: Option<&str>, info: &DeviceInfo) -> Arc<DeviceEntry> {
        let identifiers: Vec<_> = info.identifiers.iter().cloned().collect();
        let mut entry = match self.get_device(&identifiers) {
            Some(existing) => (*existing).clone(),
            None => {
                let entry = DeviceEntry {
                    id: Uuid::new_v4().simple().to_string(),
                    config_entries: BTreeSet::new(),
                    identifiers: info.identifiers.clone(),
                    entry_type: None,
                    manufacturer: None,
                    model: None,
                    name: None,
                    configuration_url: None,
                };
                debug!(device_id = %entry.id, "registered device");
                entry
            }
        };

        entry.identifiers.extend(info.identifiers.iter().cloned());
        if let Some(config_entry_id) = config_entry_id {
            entry.config_entries.insert(config_entry_id.to_owned());
        }
        merge(&mut entry.entry_type, info.entry_type);
        merge(&mut entry.manufacturer, info.manufacturer.clone());
        merge(&mut entry.model, info.model.clone());
        merge(&mut entry.name, info.name.clone());
        merge(&mut entry.configuration_url, info.configuration_url.clone());

        self.store(entry)
    }

    /// Insert a fully formed entry, replacing any device with the same ID.
    /// Used when restoring a snapshot.
    ///
    /// Fails with [`CoreError::DeviceIdentifierTaken`] if one of the
    /// entry's identifiers already belongs to a different device.
    pub fn insert(&self, entry: DeviceEntry) -> Result<Arc<DeviceEntry>, CoreError> {
        for ident in &entry.identifiers {
            let owner = self.by_identifier.get(ident).map(|r| r.value().clone());
            if let Some(existing_device_id) = owner.filter(|owner| *owner != entry.id) {
                return Err(CoreError::DeviceIdentifierTaken {
                    device_id: entry.id,
                    identifier: ident.to_string(),
                    existing_device_id,
                });
            }
        }
        Ok(self.store(entry))
    }

    /// Every device, sorted by ID.
    pub fn devices(&self) -> Vec<Arc<DeviceEntry>> {
        let mut devices: Vec<_> = self.by_id.iter().map(|r| Arc::clone(r.value())).collect();
        devices.sort_by(|a, b| a.id.cmp(&b.id));
        devices
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    // ── Private helpers ──────────────────────────────────────────────

    fn store(&self, entry: DeviceEntry) -> Arc<DeviceEntry> {
        let entry = Arc::new(entry);
        if let Some(previous) = self.by_id.insert(entry.id.clone(), Arc::clone(&entry)) {
            for ident in previous.identifiers.difference(&entry.identifiers) {
                self.by_identifier.remove_if(ident, |_, owner| *owner == entry.id);
            }
        }
        for ident in &entry.identifiers {
            self.by_identifier.insert(ident.clone(), entry.id.clone());
        }
        entry
    }
}

impl Default for DeviceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn merge<T>(slot: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *slot = value;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::DeviceEntryType;

    fn info(id: &str, name: Option<&str>) -> DeviceInfo {
        DeviceInfo {
            identifiers: [DeviceIdentifier::new("rdw", id)].into(),
            entry_type: Some(DeviceEntryType::Service),
            name: name.map(str::to_owned),
            ..DeviceInfo::default()
        }
    }

    #[test]
    fn same_identifier_updates_existing_device() {
        let reg = DeviceRegistry::new();
        let first = reg.get_or_create(Some("entry-1"), &info("11ZKZ3", Some("Skoda: 11ZKZ3")));
        let second = reg.get_or_create(Some("entry-2"), &info("11ZKZ3", None));

        assert_eq!(first.id, second.id);
        assert_eq!(reg.len(), 1);
        assert_eq!(second.name.as_deref(), Some("Skoda: 11ZKZ3"));
        assert_eq!(second.config_entries.len(), 2);
    }

    #[test]
    fn get_device_by_any_identifier() {
        let reg = DeviceRegistry::new();
        let dev = reg.get_or_create(None, &info("11ZKZ3", None));

        let found = reg
            .get_device(&[
                DeviceIdentifier::new("rdw", "unknown"),
                DeviceIdentifier::new("rdw", "11ZKZ3"),
            ])
            .unwrap();
        assert_eq!(found.id, dev.id);
        assert!(reg.get_device(&[DeviceIdentifier::new("zwave_js", "1-2")]).is_none());
    }

    fn restored(id: &str, identifiers: &[(&str, &str)]) -> DeviceEntry {
        DeviceEntry {
            id: id.into(),
            config_entries: BTreeSet::new(),
            identifiers: identifiers
                .iter()
                .map(|(domain, ident)| DeviceIdentifier::new(*domain, *ident))
                .collect(),
            entry_type: None,
            manufacturer: None,
            model: None,
            name: None,
            configuration_url: None,
        }
    }

    #[test]
    fn insert_rejects_identifier_of_other_device() {
        let reg = DeviceRegistry::new();
        reg.insert(restored("dev-a", &[("zwave_js", "1-5")])).unwrap();

        let err = reg
            .insert(restored("dev-b", &[("zwave_js", "1-6"), ("zwave_js", "1-5")]))
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::DeviceIdentifierTaken { ref device_id, ref existing_device_id, .. }
                if device_id == "dev-b" && existing_device_id == "dev-a"
        ));
        assert_eq!(reg.len(), 1);
        assert!(reg.get_device(&[DeviceIdentifier::new("zwave_js", "1-6")]).is_none());
        assert_eq!(
            reg.get_device(&[DeviceIdentifier::new("zwave_js", "1-5")]).unwrap().id,
            "dev-a"
        );
    }

    #[test]
    fn reinsert_drops_identifiers_no_longer_listed() {
        let reg = DeviceRegistry::new();
        reg.insert(restored("dev-a", &[("zwave_js", "1-5"), ("zwave_js", "1-5-134")]))
            .unwrap();
        reg.insert(restored("dev-a", &[("zwave_js", "1-5")])).unwrap();

        assert!(reg.get_device(&[DeviceIdentifier::new("zwave_js", "1-5-134")]).is_none());
        reg.insert(restored("dev-b", &[("zwave_js", "1-5-134")])).unwrap();
        assert_eq!(reg.len(), 2);
    }
}
