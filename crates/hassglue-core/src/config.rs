// ── Runtime configuration ──
//
// These types describe how each integration runs: where the vehicle
// service lives, how often to poll it, and where migration data is
// persisted. They never touch disk themselves. The config crate or the
// CLI constructs them and hands them in.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use url::Url;

pub use hassglue_api::DEFAULT_BASE_URL as DEFAULT_RDW_BASE_URL;

/// Debounce window for migration data writes.
pub const DEFAULT_MIGRATION_WRITE_DELAY: Duration = Duration::from_secs(30);

/// How often the RDW coordinator refreshes a vehicle.
pub const DEFAULT_RDW_SCAN_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Configuration for one RDW config entry (one license plate).
#[derive(Debug, Clone)]
pub struct RdwConfig {
    /// Open-data portal base URL.
    pub base_url: Url,
    /// License plate, as entered by the user.
    pub license_plate: String,
    /// Optional Socrata application token.
    pub app_token: Option<SecretString>,
    /// Request timeout.
    pub timeout: Duration,
    /// Polling interval. Zero disables background refresh.
    pub scan_interval: Duration,
}

impl RdwConfig {
    pub fn new(base_url: Url, license_plate: impl Into<String>) -> Self {
        Self {
            base_url,
            license_plate: license_plate.into(),
            app_token: None,
            timeout: Duration::from_secs(30),
            scan_interval: DEFAULT_RDW_SCAN_INTERVAL,
        }
    }

    /// Build the transport settings for `hassglue_api::RdwClient`.
    pub fn transport(&self) -> hassglue_api::TransportConfig {
        hassglue_api::TransportConfig {
            timeout: self.timeout,
            app_token: self.app_token.clone(),
        }
    }
}

/// Configuration for the Z-Wave JS migration data store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationConfig {
    /// Directory holding versioned storage files.
    pub storage_dir: PathBuf,
    /// Writes requested within this window are coalesced into one.
    pub write_delay: Duration,
}

impl MigrationConfig {
    pub fn new(storage_dir: impl Into<PathBuf>) -> Self {
        Self {
            storage_dir: storage_dir.into(),
            write_delay: DEFAULT_MIGRATION_WRITE_DELAY,
        }
    }
}
