//! End-to-end unique ID migration scenarios against in-memory registries.
#![allow(clippy::unwrap_used)]

use std::collections::HashSet;
use std::sync::Arc;

use hassglue_core::zwave::{device_identifier, unique_id};
use hassglue_core::{
    DataStore, DeviceEntry, DeviceInfo, DiscoveryInfo, LegacyMigration, MigrationAction,
    MigrationConfig, NewEntity, Property, ValueIdError, ValueMetadata, ZwaveNode, ZwaveValue,
    migrate_discovered_value, migrate_old_entity,
};
use pretty_assertions::assert_eq;

const HOME_ID: u32 = 3_245_146_787;
const NODE_ID: u32 = 5;
const CONFIG_ENTRY: &str = "zwave-entry";

// ── Helpers ─────────────────────────────────────────────────────────

fn setup() -> (DataStore, Arc<DeviceEntry>) {
    let store = DataStore::new();
    let device = store.devices.get_or_create(
        Some(CONFIG_ENTRY),
        &DeviceInfo {
            identifiers: [device_identifier(HOME_ID, NODE_ID)].into(),
            name: Some("Multisensor".into()),
            ..DeviceInfo::default()
        },
    );
    (store, device)
}

fn register(store: &DataStore, device: &DeviceEntry, domain: &str, unique_id: &str) -> String {
    store
        .entities
        .get_or_create(NewEntity {
            domain: domain.into(),
            platform: "zwave_js".into(),
            unique_id: unique_id.into(),
            config_entry_id: Some(CONFIG_ENTRY.into()),
            device_id: Some(device.id.clone()),
            ..NewEntity::default()
        })
        .entity_id
        .clone()
}

fn temperature(endpoint: Option<u32>) -> DiscoveryInfo {
    DiscoveryInfo {
        node: ZwaveNode {
            node_id: NODE_ID,
            index: 0,
            home_id: HOME_ID,
        },
        primary_value: ZwaveValue {
            node_id: NODE_ID,
            command_class: 49,
            endpoint,
            property: "Air temperature".into(),
            property_key: None,
            property_name: Some("Air temperature".into()),
            property_key_name: None,
            metadata: ValueMetadata {
                unit: Some("°C".into()),
                ..ValueMetadata::default()
            },
        },
        platform: "sensor".into(),
        platform_hint: None,
    }
}

fn smoke_alarm() -> DiscoveryInfo {
    DiscoveryInfo {
        node: ZwaveNode {
            node_id: NODE_ID,
            index: 0,
            home_id: HOME_ID,
        },
        primary_value: ZwaveValue {
            node_id: NODE_ID,
            command_class: 113,
            endpoint: None,
            property: "Smoke Alarm".into(),
            property_key: Some(Property::Name("Sensor status".into())),
            property_name: Some("Smoke Alarm".into()),
            property_key_name: Some("Sensor status".into()),
            metadata: ValueMetadata {
                states: [("0", "idle"), ("2", "Smoke")]
                    .into_iter()
                    .map(|(k, v)| (k.to_owned(), v.to_owned()))
                    .collect(),
                ..ValueMetadata::default()
            },
        },
        platform: "binary_sensor".into(),
        platform_hint: Some("notification".into()),
    }
}

fn new_temperature_id() -> String {
    unique_id(HOME_ID, "5-49-0-Air temperature")
}

// ── Legacy formats ──────────────────────────────────────────────────

#[test]
fn pre_2021_3_unique_id_is_renamed() {
    let (store, device) = setup();
    let legacy = unique_id(HOME_ID, "5.5-49-00-Air temperature-00");
    let entity_id = register(&store, &device, "sensor", &legacy);

    let mut registered = HashSet::new();
    let actions = migrate_discovered_value(&store, &mut registered, &device, &temperature(None)).unwrap();

    assert_eq!(
        actions,
        [MigrationAction::Renamed {
            entity_id: entity_id.clone(),
            old_unique_id: legacy,
            new_unique_id: new_temperature_id(),
        }]
    );
    assert_eq!(store.entities.get(&entity_id).unwrap().unique_id, new_temperature_id());
    assert!(registered.contains(&new_temperature_id()));
}

#[test]
fn release_2021_3_unique_id_is_renamed() {
    let (store, device) = setup();
    let legacy = unique_id(HOME_ID, "5-49-00-Air temperature-00-00");
    let entity_id = register(&store, &device, "sensor", &legacy);

    let actions =
        migrate_discovered_value(&store, &mut HashSet::new(), &device, &temperature(None)).unwrap();

    assert_eq!(actions.len(), 1);
    assert_eq!(store.entities.get(&entity_id).unwrap().unique_id, new_temperature_id());
}

#[test]
fn legacy_entity_in_other_domain_is_left_alone() {
    let (store, device) = setup();
    let legacy = unique_id(HOME_ID, "5-49-00-Air temperature-00-00");
    let entity_id = register(&store, &device, "binary_sensor", &legacy);

    let actions =
        migrate_discovered_value(&store, &mut HashSet::new(), &device, &temperature(None)).unwrap();

    assert!(actions.is_empty());
    assert_eq!(store.entities.get(&entity_id).unwrap().unique_id, legacy);
}

#[test]
fn rename_collision_removes_legacy_entity() {
    let (store, device) = setup();
    let legacy = register(
        &store,
        &device,
        "sensor",
        &unique_id(HOME_ID, "5-49-00-Air temperature-00-00"),
    );
    let current = register(&store, &device, "sensor", &new_temperature_id());

    let actions =
        migrate_discovered_value(&store, &mut HashSet::new(), &device, &temperature(None)).unwrap();

    assert!(matches!(
        actions.as_slice(),
        [MigrationAction::Removed { entity_id, .. }] if *entity_id == legacy
    ));
    assert!(store.entities.get(&legacy).is_none());
    assert!(store.entities.get(&current).is_some());
}

// ── Endpoint changes ────────────────────────────────────────────────

#[test]
fn unavailable_entity_on_other_endpoint_is_adopted() {
    let (store, device) = setup();
    let old = unique_id(HOME_ID, "5-49-1-Air temperature");
    let entity_id = register(&store, &device, "sensor", &old);
    store.states.set(&entity_id, "unavailable");

    let actions =
        migrate_discovered_value(&store, &mut HashSet::new(), &device, &temperature(Some(0))).unwrap();

    assert_eq!(
        actions,
        [MigrationAction::Renamed {
            entity_id: entity_id.clone(),
            old_unique_id: old,
            new_unique_id: new_temperature_id(),
        }]
    );
}

#[test]
fn entity_without_state_is_adopted() {
    let (store, device) = setup();
    let entity_id = register(&store, &device, "sensor", &unique_id(HOME_ID, "5-49-1-Air temperature"));

    migrate_discovered_value(&store, &mut HashSet::new(), &device, &temperature(Some(0))).unwrap();

    assert_eq!(store.entities.get(&entity_id).unwrap().unique_id, new_temperature_id());
}

#[test]
fn live_entity_on_other_endpoint_is_not_adopted() {
    let (store, device) = setup();
    let old = unique_id(HOME_ID, "5-49-1-Air temperature");
    let entity_id = register(&store, &device, "sensor", &old);
    store.states.set(&entity_id, "21.5");

    let actions =
        migrate_discovered_value(&store, &mut HashSet::new(), &device, &temperature(Some(0))).unwrap();

    assert!(actions.is_empty());
    assert_eq!(store.entities.get(&entity_id).unwrap().unique_id, old);
}

#[test]
fn ambiguous_candidates_are_not_adopted() {
    let (store, device) = setup();
    let one = register(&store, &device, "sensor", &unique_id(HOME_ID, "5-49-1-Air temperature"));
    let two = register(&store, &device, "sensor", &unique_id(HOME_ID, "5-49-2-Air temperature"));

    let actions =
        migrate_discovered_value(&store, &mut HashSet::new(), &device, &temperature(Some(0))).unwrap();

    assert!(actions.is_empty());
    assert!(store.entities.get(&one).unwrap().previous_unique_id.is_none());
    assert!(store.entities.get(&two).unwrap().previous_unique_id.is_none());
}

#[test]
fn already_registered_candidates_are_ignored() {
    let (store, device) = setup();
    let old = unique_id(HOME_ID, "5-49-1-Air temperature");
    let entity_id = register(&store, &device, "sensor", &old);
    let mut registered = HashSet::from([old.clone()]);

    let actions = migrate_discovered_value(&store, &mut registered, &device, &temperature(Some(0))).unwrap();

    assert!(actions.is_empty());
    assert_eq!(store.entities.get(&entity_id).unwrap().unique_id, old);
}

#[test]
fn non_value_entities_on_device_are_skipped() {
    let (store, device) = setup();
    register(&store, &device, "sensor", &format!("{HOME_ID}.{NODE_ID}.node_status"));
    let entity_id = register(&store, &device, "sensor", &unique_id(HOME_ID, "5-49-1-Air temperature"));

    migrate_discovered_value(&store, &mut HashSet::new(), &device, &temperature(Some(0))).unwrap();

    assert_eq!(store.entities.get(&entity_id).unwrap().unique_id, new_temperature_id());
}

#[test]
fn malformed_target_unique_id_is_an_error() {
    let (store, device) = setup();
    let err = migrate_old_entity(&store, &HashSet::new(), "sensor", &device, "not-a-value-id").unwrap_err();
    assert_eq!(err, ValueIdError::MissingValueIdSegment("not-a-value-id".into()));
}

// ── Notification binary sensors ─────────────────────────────────────

#[test]
fn notification_fan_out_skips_idle_state() {
    let (store, device) = setup();
    let base_old = unique_id(HOME_ID, "5-113-00-Smoke Alarm-Sensor status-Sensor status");
    let idle = register(&store, &device, "binary_sensor", &format!("{base_old}.0"));
    let smoke = register(&store, &device, "binary_sensor", &format!("{base_old}.2"));

    let mut registered = HashSet::new();
    let actions = migrate_discovered_value(&store, &mut registered, &device, &smoke_alarm()).unwrap();

    let new_smoke = format!("{}.2", unique_id(HOME_ID, "5-113-0-Smoke Alarm-Sensor status"));
    assert_eq!(
        actions,
        [MigrationAction::Renamed {
            entity_id: smoke.clone(),
            old_unique_id: format!("{base_old}.2"),
            new_unique_id: new_smoke.clone(),
        }]
    );
    assert_eq!(store.entities.get(&idle).unwrap().unique_id, format!("{base_old}.0"));
    assert_eq!(registered, HashSet::from([new_smoke]));
}

#[test]
fn notification_fan_out_with_nothing_to_migrate() {
    let (store, device) = setup();
    let mut registered = HashSet::new();

    let actions = migrate_discovered_value(&store, &mut registered, &device, &smoke_alarm()).unwrap();

    assert!(actions.is_empty());
    assert_eq!(registered.len(), 1);
    assert!(!registered.contains(&unique_id(HOME_ID, "5-113-0-Smoke Alarm-Sensor status")));
}

// ── Idempotence ─────────────────────────────────────────────────────

#[test]
fn second_pass_is_a_noop() {
    let (store, device) = setup();
    register(
        &store,
        &device,
        "sensor",
        &unique_id(HOME_ID, "5.5-49-00-Air temperature-00"),
    );

    let dir = tempfile::tempdir().unwrap();
    let migration = LegacyMigration::new(&MigrationConfig::new(dir.path()));
    let discovered = [temperature(None)];

    let mut registered = HashSet::new();
    let first = migrate_discovered_value(&store, &mut registered, &device, &discovered[0]).unwrap();
    let snapshot = store.snapshot();
    let first_records = migration.generate_data(&store, CONFIG_ENTRY, &discovered);
    let first_data = migration.data();

    let second = migrate_discovered_value(&store, &mut registered, &device, &discovered[0]).unwrap();
    let second_records = migration.generate_data(&store, CONFIG_ENTRY, &discovered);

    assert_eq!(first.len(), 1);
    assert!(second.is_empty());
    assert_eq!(store.snapshot(), snapshot);
    assert_eq!(first_records.len(), 1);
    assert_eq!(second_records, first_records);
    assert_eq!(migration.data(), first_data);
    assert_eq!(migration.data()[CONFIG_ENTRY].len(), 1);
}

#[test]
fn fresh_pass_after_migration_changes_nothing() {
    let (store, device) = setup();
    register(
        &store,
        &device,
        "sensor",
        &unique_id(HOME_ID, "5.5-49-00-Air temperature-00"),
    );
    migrate_discovered_value(&store, &mut HashSet::new(), &device, &temperature(None)).unwrap();

    let again =
        migrate_discovered_value(&store, &mut HashSet::new(), &device, &temperature(None)).unwrap();
    assert!(again.is_empty());
}
