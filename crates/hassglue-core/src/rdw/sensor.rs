// ── RDW sensors ──
//
// A fixed table of descriptors projected into one entity per descriptor
// for every configured license plate. All entities of a plate share one
// service device.

use std::fmt;

use chrono::NaiveDate;
use hassglue_api::{Vehicle, normalize_license_plate};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use tokio::sync::watch;

use super::coordinator::{VehicleCoordinator, VehicleSource};
use crate::error::CoreError;
use crate::model::{DeviceEntryType, DeviceIdentifier, DeviceInfo, NewEntity};
use crate::store::{DataStore, STATE_UNAVAILABLE, STATE_UNKNOWN, StateMachine};

/// Integration domain for RDW entities and devices.
pub const DOMAIN: &str = "rdw";

const CONFIGURATION_URL: &str = "https://ovi.rdw.nl/default.aspx?kenteken=";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum SensorDeviceClass {
    Date,
}

/// A sensor reading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SensorValue {
    Date(NaiveDate),
    Text(String),
}

impl fmt::Display for SensorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Date(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            Self::Text(text) => f.write_str(text),
        }
    }
}

/// Maps one vehicle field onto a sensor.
pub struct SensorDescriptor {
    pub key: &'static str,
    pub name: &'static str,
    pub device_class: Option<SensorDeviceClass>,
    /// `None` means the vehicle has no value for this field.
    pub value_fn: fn(&Vehicle) -> Option<SensorValue>,
}

impl fmt::Debug for SensorDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SensorDescriptor")
            .field("key", &self.key)
            .field("name", &self.name)
            .field("device_class", &self.device_class)
            .finish_non_exhaustive()
    }
}

fn apk_expiration(vehicle: &Vehicle) -> Option<SensorValue> {
    vehicle.apk_expiration.map(SensorValue::Date)
}

fn ascription_date(vehicle: &Vehicle) -> Option<SensorValue> {
    vehicle.ascription_date.map(SensorValue::Date)
}

pub static SENSORS: [SensorDescriptor; 2] = [
    SensorDescriptor {
        key: "apk_expiration",
        name: "APK Expiration",
        device_class: Some(SensorDeviceClass::Date),
        value_fn: apk_expiration,
    },
    SensorDescriptor {
        key: "ascription_date",
        name: "Ascription Date",
        device_class: Some(SensorDeviceClass::Date),
        value_fn: ascription_date,
    },
];

/// Service device shared by all sensors of one plate.
///
/// The device is identified by the configured plate; its name and link
/// use the plate as returned by the service.
pub fn device_info(vehicle: &Vehicle, license_plate: &str) -> DeviceInfo {
    DeviceInfo {
        identifiers: [DeviceIdentifier::new(DOMAIN, license_plate)].into(),
        entry_type: Some(DeviceEntryType::Service),
        manufacturer: Some(vehicle.brand.clone()),
        model: Some(vehicle.model.clone()),
        name: Some(format!("{}: {}", vehicle.brand, vehicle.license_plate)),
        configuration_url: Some(format!("{CONFIGURATION_URL}{}", vehicle.license_plate)),
    }
}

/// One sensor of one vehicle.
pub struct RdwSensorEntity<S: VehicleSource> {
    descriptor: &'static SensorDescriptor,
    unique_id: String,
    entity_id: String,
    device_info: DeviceInfo,
    coordinator: VehicleCoordinator<S>,
    updates: watch::Receiver<Option<std::sync::Arc<Vehicle>>>,
}

impl<S: VehicleSource> RdwSensorEntity<S> {
    /// Build the entity for `descriptor`. Requires the coordinator to
    /// have fetched the vehicle at least once.
    pub fn new(
        descriptor: &'static SensorDescriptor,
        coordinator: &VehicleCoordinator<S>,
        entity_id: impl Into<String>,
    ) -> Result<Self, CoreError> {
        let license_plate = normalize_license_plate(coordinator.license_plate());
        let vehicle = coordinator
            .data()
            .ok_or_else(|| CoreError::CoordinatorNotReady {
                license_plate: license_plate.clone(),
            })?;

        Ok(Self {
            descriptor,
            unique_id: format!("{license_plate}_{}", descriptor.key),
            entity_id: entity_id.into(),
            device_info: device_info(&vehicle, &license_plate),
            coordinator: coordinator.clone(),
            updates: coordinator.subscribe(),
        })
    }

    pub fn descriptor(&self) -> &'static SensorDescriptor {
        self.descriptor
    }

    pub fn unique_id(&self) -> &str {
        &self.unique_id
    }

    pub fn entity_id(&self) -> &str {
        &self.entity_id
    }

    pub fn name(&self) -> &'static str {
        self.descriptor.name
    }

    pub fn device_info(&self) -> &DeviceInfo {
        &self.device_info
    }

    /// Current value, computed from the coordinator's latest record.
    pub fn native_value(&self) -> Option<SensorValue> {
        self.coordinator
            .data()
            .and_then(|vehicle| (self.descriptor.value_fn)(&vehicle))
    }

    pub fn available(&self) -> bool {
        self.coordinator.last_update_success()
    }

    /// State string as the host would store it.
    pub fn state(&self) -> String {
        if !self.available() {
            return STATE_UNAVAILABLE.to_owned();
        }
        self.native_value()
            .map_or_else(|| STATE_UNKNOWN.to_owned(), |value| value.to_string())
    }

    pub fn write_state(&self, states: &StateMachine) {
        states.set(&self.entity_id, self.state());
    }

    /// Wait until the coordinator publishes a new record.
    pub async fn changed(&mut self) -> Result<(), CoreError> {
        self.updates
            .changed()
            .await
            .map_err(|_| CoreError::Internal("vehicle coordinator dropped".into()))
    }
}

/// Register the device and one entity per descriptor for a config entry,
/// and write their initial states.
pub fn setup_entry<S: VehicleSource>(
    store: &DataStore,
    config_entry_id: &str,
    coordinator: &VehicleCoordinator<S>,
) -> Result<Vec<RdwSensorEntity<S>>, CoreError> {
    let license_plate = normalize_license_plate(coordinator.license_plate());
    let vehicle = coordinator
        .data()
        .ok_or_else(|| CoreError::CoordinatorNotReady {
            license_plate: license_plate.clone(),
        })?;

    let info = device_info(&vehicle, &license_plate);
    let device_name = info.name.clone().unwrap_or_else(|| license_plate.clone());
    let device = store.devices.get_or_create(Some(config_entry_id), &info);

    SENSORS
        .iter()
        .map(|descriptor| {
            let entry = store.entities.get_or_create(NewEntity {
                domain: "sensor".into(),
                platform: DOMAIN.into(),
                unique_id: format!("{license_plate}_{}", descriptor.key),
                suggested_object_id: Some(format!("{device_name} {}", descriptor.name)),
                config_entry_id: Some(config_entry_id.to_owned()),
                device_id: Some(device.id.clone()),
                original_name: Some(descriptor.name.to_owned()),
                device_class: descriptor.device_class.map(|class| class.to_string()),
                unit_of_measurement: None,
            });
            let entity = RdwSensorEntity::new(descriptor, coordinator, entry.entity_id.clone())?;
            entity.write_state(&store.states);
            Ok(entity)
        })
        .collect()
}
