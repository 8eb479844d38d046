// RDW open-data API surface

pub mod client;
pub mod models;

pub use client::{DEFAULT_BASE_URL, RdwClient, normalize_license_plate};
pub use models::{RawVehicle, Vehicle};
