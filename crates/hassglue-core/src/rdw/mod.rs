// ── RDW vehicle sensors ──

mod coordinator;
mod sensor;

pub use coordinator::{VehicleCoordinator, VehicleSource};
pub use sensor::{
    DOMAIN, RdwSensorEntity, SENSORS, SensorDescriptor, SensorDeviceClass, SensorValue,
    device_info, setup_entry,
};
