//! Shared configuration for the hassglue binary.
//!
//! TOML vehicle profiles, app token resolution (env + keyring + plaintext),
//! and translation to the core runtime configs (`RdwConfig`,
//! `MigrationConfig`). The CLI layers its global flags on top.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use hassglue_core::config::{
    DEFAULT_MIGRATION_WRITE_DELAY, DEFAULT_RDW_BASE_URL, DEFAULT_RDW_SCAN_INTERVAL,
};
use hassglue_core::{MigrationConfig, RdwConfig};

const KEYRING_SERVICE: &str = "hassglue";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no vehicle profile named '{name}'")]
    UnknownVehicle { name: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    /// Vehicle profile used when no plate or `--vehicle` is given.
    pub default_vehicle: Option<String>,

    /// Where versioned storage files live. Defaults to the platform data dir.
    pub storage_dir: Option<PathBuf>,

    #[serde(default)]
    pub defaults: Defaults,

    #[serde(default)]
    pub migration: MigrationSection,

    #[serde(default)]
    pub rdw: RdwSection,

    /// Named vehicle profiles.
    #[serde(default)]
    pub vehicles: BTreeMap<String, VehicleProfile>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MigrationSection {
    /// Debounce window for migration data writes.
    #[serde(default = "default_write_delay_secs")]
    pub write_delay_secs: u64,
}

impl Default for MigrationSection {
    fn default() -> Self {
        Self {
            write_delay_secs: default_write_delay_secs(),
        }
    }
}

fn default_write_delay_secs() -> u64 {
    DEFAULT_MIGRATION_WRITE_DELAY.as_secs()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RdwSection {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Polling interval; 0 disables background refresh.
    #[serde(default = "default_scan_interval_secs")]
    pub scan_interval_secs: u64,
}

impl Default for RdwSection {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            scan_interval_secs: default_scan_interval_secs(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_RDW_BASE_URL.into()
}
fn default_scan_interval_secs() -> u64 {
    DEFAULT_RDW_SCAN_INTERVAL.as_secs()
}

/// A named vehicle.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VehicleProfile {
    pub license_plate: String,

    /// Socrata app token (plaintext, prefer keyring or env var).
    pub app_token: Option<String>,

    /// Environment variable name containing the app token.
    pub app_token_env: Option<String>,
}

// ── Paths ───────────────────────────────────────────────────────────

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "hassglue", "hassglue")
}

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    project_dirs().map_or_else(
        || dirs_fallback(".config").join("config.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// Storage directory: the configured one, else `<data dir>/storage`.
pub fn storage_dir(cfg: &Config) -> PathBuf {
    if let Some(ref dir) = cfg.storage_dir {
        return dir.clone();
    }
    project_dirs().map_or_else(
        || dirs_fallback(".local/share").join("storage"),
        |dirs| dirs.data_dir().join("storage"),
    )
}

fn dirs_fallback(base: &str) -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(base);
    p.push("hassglue");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load the full Config from `path` + environment.
///
/// Environment variables use `HASSGLUE_` and `__` for nesting, e.g.
/// `HASSGLUE_RDW__SCAN_INTERVAL_SECS=600`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("HASSGLUE_").split("__"));

    let config: Config = figment.extract()?;
    debug!(path = %path.display(), vehicles = config.vehicles.len(), "loaded config");
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Vehicle lookup ──────────────────────────────────────────────────

/// Pick a vehicle profile by name, falling back to `default_vehicle`.
pub fn find_vehicle<'a>(
    cfg: &'a Config,
    name: Option<&str>,
) -> Result<(&'a str, &'a VehicleProfile), ConfigError> {
    let name = name
        .or(cfg.default_vehicle.as_deref())
        .ok_or_else(|| ConfigError::Validation {
            field: "vehicle".into(),
            reason: "no license plate given and no default_vehicle configured".into(),
        })?;
    cfg.vehicles
        .get_key_value(name)
        .map(|(k, v)| (k.as_str(), v))
        .ok_or_else(|| ConfigError::UnknownVehicle { name: name.into() })
}

// ── App token resolution ────────────────────────────────────────────

/// Resolve the optional app token for a vehicle profile.
///
/// Order: `app_token_env` env var, system keyring
/// (`hassglue` / `<vehicle>/app-token`), plaintext `app_token`.
pub fn resolve_app_token(profile: &VehicleProfile, vehicle_name: &str) -> Option<SecretString> {
    // 1. Profile's app_token_env → env var lookup
    if let Some(ref env_name) = profile.app_token_env {
        if let Ok(val) = std::env::var(env_name) {
            return Some(SecretString::from(val));
        }
    }

    // 2. System keyring
    if let Ok(entry) = keyring::Entry::new(KEYRING_SERVICE, &format!("{vehicle_name}/app-token")) {
        if let Ok(secret) = entry.get_password() {
            return Some(SecretString::from(secret));
        }
    }

    // 3. Plaintext in config
    profile
        .app_token
        .as_ref()
        .map(|token| SecretString::from(token.clone()))
}

// ── Translation to core configs ─────────────────────────────────────

/// Build an `RdwConfig` for a license plate, no CLI flag overrides.
pub fn rdw_config(
    cfg: &Config,
    license_plate: &str,
    app_token: Option<SecretString>,
) -> Result<RdwConfig, ConfigError> {
    if license_plate.trim().is_empty() {
        return Err(ConfigError::Validation {
            field: "license_plate".into(),
            reason: "must not be empty".into(),
        });
    }
    let base_url: url::Url = cfg
        .rdw
        .base_url
        .parse()
        .map_err(|_| ConfigError::Validation {
            field: "rdw.base_url".into(),
            reason: format!("invalid URL: {}", cfg.rdw.base_url),
        })?;

    let mut rdw = RdwConfig::new(base_url, license_plate);
    rdw.app_token = app_token;
    rdw.timeout = Duration::from_secs(cfg.defaults.timeout);
    rdw.scan_interval = Duration::from_secs(cfg.rdw.scan_interval_secs);
    Ok(rdw)
}

/// Build an `RdwConfig` for a named vehicle profile.
pub fn vehicle_to_rdw_config(
    cfg: &Config,
    profile: &VehicleProfile,
    vehicle_name: &str,
) -> Result<RdwConfig, ConfigError> {
    rdw_config(
        cfg,
        &profile.license_plate,
        resolve_app_token(profile, vehicle_name),
    )
}

/// Build a `MigrationConfig`, honoring an explicit storage dir override.
pub fn migration_config(cfg: &Config, storage_override: Option<&Path>) -> MigrationConfig {
    let dir = storage_override.map_or_else(|| storage_dir(cfg), Path::to_path_buf);
    let mut migration = MigrationConfig::new(dir);
    migration.write_delay = Duration::from_secs(cfg.migration.write_delay_secs);
    migration
}
