// hassglue-api: Async Rust client for the RDW open-data vehicle registration service

pub mod error;
pub mod rdw;
pub mod transport;

pub use error::Error;
pub use rdw::{DEFAULT_BASE_URL, RdwClient, Vehicle, normalize_license_plate};
pub use transport::TransportConfig;
