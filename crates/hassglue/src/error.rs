//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors with
//! actionable help text.

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

use hassglue_config::ConfigError;
use hassglue_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const STORAGE: i32 = 9;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Vehicle service ──────────────────────────────────────────────
    #[error("No vehicle registered with license plate {license_plate}")]
    #[diagnostic(
        code(hassglue::vehicle_not_found),
        help("Check the plate for typos. Dashes and spaces are ignored.")
    )]
    VehicleNotFound { license_plate: String },

    #[error("Vehicle service request failed: {message}")]
    #[diagnostic(
        code(hassglue::service_unreachable),
        help("Check network access to the service or set rdw.base_url in the config file.")
    )]
    ServiceUnreachable { message: String },

    #[error("Vehicle service error ({code}): {message}")]
    #[diagnostic(code(hassglue::api_error))]
    ApiError { code: String, message: String },

    // ── Registry ─────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(code(hassglue::not_found))]
    NotFound {
        resource_type: String,
        identifier: String,
    },

    #[error("{resource_type} '{identifier}' already exists")]
    #[diagnostic(code(hassglue::conflict))]
    Conflict {
        resource_type: String,
        identifier: String,
    },

    // ── Storage ──────────────────────────────────────────────────────
    #[error("Storage error at {path}")]
    #[diagnostic(
        code(hassglue::storage),
        help("Check permissions on the storage directory, or pass --storage-dir.")
    )]
    Storage {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Storage '{key}' was written by a newer version ({found} > {supported})")]
    #[diagnostic(
        code(hassglue::storage_version),
        help("Upgrade hassglue, or point --storage-dir at a different directory.")
    )]
    StorageVersion {
        key: String,
        found: u32,
        supported: u32,
    },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(hassglue::validation))]
    Validation { field: String, reason: String },

    #[error("Could not read {path}: {source}")]
    #[diagnostic(
        code(hassglue::invalid_input),
        help("The file must be JSON in the layout `hassglue migrate --help` describes.")
    )]
    InvalidInput {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    // ── Configuration ────────────────────────────────────────────────
    #[error("No license plate given")]
    #[diagnostic(
        code(hassglue::no_vehicle),
        help(
            "Pass a plate: hassglue vehicle 11-ZKZ-3\n\
             Or set default_vehicle in {path}"
        )
    )]
    NoVehicle { path: String },

    #[error("Vehicle profile '{name}' not found in configuration")]
    #[diagnostic(
        code(hassglue::vehicle_profile_not_found),
        help("Add a [vehicles.{name}] table to {path}")
    )]
    VehicleProfileNotFound { name: String, path: String },

    #[error(transparent)]
    #[diagnostic(code(hassglue::config))]
    Config(Box<figment::Error>),

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Could not render output: {0}")]
    #[diagnostic(code(hassglue::render))]
    Render(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::VehicleNotFound { .. }
            | Self::NotFound { .. }
            | Self::VehicleProfileNotFound { .. } => exit_code::NOT_FOUND,
            Self::Conflict { .. } => exit_code::CONFLICT,
            Self::ServiceUnreachable { .. } => exit_code::CONNECTION,
            Self::Storage { .. } | Self::StorageVersion { .. } => exit_code::STORAGE,
            Self::Validation { .. } | Self::InvalidInput { .. } | Self::NoVehicle { .. } => {
                exit_code::USAGE
            }
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::UniqueIdTaken { unique_id, .. } => CliError::Conflict {
                resource_type: "unique ID".into(),
                identifier: unique_id,
            },

            CoreError::EntityNotFound { entity_id } => CliError::NotFound {
                resource_type: "entity".into(),
                identifier: entity_id,
            },

            CoreError::DeviceNotFound { identifier } => CliError::NotFound {
                resource_type: "device".into(),
                identifier,
            },

            CoreError::DeviceIdentifierTaken { identifier, .. } => CliError::Conflict {
                resource_type: "device identifier".into(),
                identifier,
            },

            CoreError::InvalidValueId(e) => CliError::Validation {
                field: "unique_id".into(),
                reason: e.to_string(),
            },

            CoreError::StorageIo { path, source } => CliError::Storage {
                path,
                source: source.into(),
            },

            CoreError::StorageFormat { path, source } => CliError::Storage {
                path,
                source: source.into(),
            },

            CoreError::UnsupportedStorageVersion {
                key,
                found,
                supported,
            } => CliError::StorageVersion {
                key,
                found,
                supported,
            },

            CoreError::VehicleNotFound { license_plate } => {
                CliError::VehicleNotFound { license_plate }
            }

            CoreError::CoordinatorNotReady { license_plate } => CliError::ApiError {
                code: "not_ready".into(),
                message: format!("no data for {license_plate}"),
            },

            CoreError::Api {
                message,
                status: None,
            } => CliError::ServiceUnreachable { message },

            CoreError::Api {
                message,
                status: Some(status),
            } => CliError::ApiError {
                code: status.to_string(),
                message,
            },

            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },

            CoreError::Internal(message) => CliError::ApiError {
                code: "internal".into(),
                message,
            },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        let path = hassglue_config::config_path().display().to_string();
        match err {
            ConfigError::Validation { field, .. } if field == "vehicle" => {
                CliError::NoVehicle { path }
            }
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::UnknownVehicle { name } => CliError::VehicleProfileNotFound { name, path },
            ConfigError::Serialization(e) => CliError::Render(e.to_string()),
            ConfigError::Figment(e) => CliError::Config(e),
            ConfigError::Io(e) => CliError::Io(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_errors_get_distinct_exit_codes() {
        let not_found = CliError::from(CoreError::VehicleNotFound {
            license_plate: "00XX00".into(),
        });
        assert_eq!(not_found.exit_code(), exit_code::NOT_FOUND);

        let offline = CliError::from(CoreError::Api {
            message: "connection refused".into(),
            status: None,
        });
        assert_eq!(offline.exit_code(), exit_code::CONNECTION);

        let server = CliError::from(CoreError::Api {
            message: "bad gateway".into(),
            status: Some(502),
        });
        assert_eq!(server.exit_code(), exit_code::GENERAL);

        let taken = CliError::from(CoreError::UniqueIdTaken {
            entity_id: "sensor.a".into(),
            unique_id: "1.5-49-0-x".into(),
            existing_entity_id: "sensor.b".into(),
        });
        assert_eq!(taken.exit_code(), exit_code::CONFLICT);

        let shared = CliError::from(CoreError::DeviceIdentifierTaken {
            device_id: "dev-b".into(),
            identifier: "zwave_js, 1-5".into(),
            existing_device_id: "dev-a".into(),
        });
        assert_eq!(shared.exit_code(), exit_code::CONFLICT);
    }

    #[test]
    fn missing_vehicle_is_a_usage_error() {
        let err = CliError::from(ConfigError::Validation {
            field: "vehicle".into(),
            reason: "no license plate given".into(),
        });
        assert!(matches!(err, CliError::NoVehicle { .. }));
        assert_eq!(err.exit_code(), exit_code::USAGE);
    }
}
