// ── Core error types ──
//
// Domain errors from hassglue-core. Consumers never see HTTP status codes
// or JSON parse failures of the vehicle service directly: the
// `From<hassglue_api::Error>` impl translates transport-layer errors.

use std::path::PathBuf;

use thiserror::Error;

use crate::zwave::ValueIdError;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Registry errors ──────────────────────────────────────────────
    #[error("Unique ID '{unique_id}' is already in use by {existing_entity_id}")]
    UniqueIdTaken {
        entity_id: String,
        unique_id: String,
        existing_entity_id: String,
    },

    #[error("Entity not found: {entity_id}")]
    EntityNotFound { entity_id: String },

    #[error("Device not found: {identifier}")]
    DeviceNotFound { identifier: String },

    #[error("Device identifier ({identifier}) is already in use by device {existing_device_id}")]
    DeviceIdentifierTaken {
        device_id: String,
        identifier: String,
        existing_device_id: String,
    },

    // ── Migration errors ─────────────────────────────────────────────
    #[error(transparent)]
    InvalidValueId(#[from] ValueIdError),

    // ── Storage errors ───────────────────────────────────────────────
    #[error("Storage I/O error at {path}: {source}")]
    StorageIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Corrupt storage file {path}: {source}")]
    StorageFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Storage '{key}' has version {found}, newest supported is {supported}")]
    UnsupportedStorageVersion {
        key: String,
        found: u32,
        supported: u32,
    },

    // ── Vehicle service errors ───────────────────────────────────────
    #[error("No vehicle registered with license plate {license_plate}")]
    VehicleNotFound { license_plate: String },

    #[error("Vehicle data not available yet for {license_plate}")]
    CoordinatorNotReady { license_plate: String },

    #[error("Vehicle service error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<hassglue_api::Error> for CoreError {
    fn from(err: hassglue_api::Error) -> Self {
        match err {
            hassglue_api::Error::VehicleNotFound { license_plate } => {
                CoreError::VehicleNotFound { license_plate }
            }
            hassglue_api::Error::InvalidLicensePlate(plate) => CoreError::Config {
                message: format!("invalid license plate: {plate:?}"),
            },
            hassglue_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            hassglue_api::Error::ClientBuild(message) => CoreError::Config { message },
            hassglue_api::Error::Api { status, message } => CoreError::Api {
                message,
                status: Some(status),
            },
            hassglue_api::Error::Transport(ref e) => CoreError::Api {
                message: e.to_string(),
                status: e.status().map(|s| s.as_u16()),
            },
            hassglue_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}
