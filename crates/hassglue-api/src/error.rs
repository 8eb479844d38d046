use thiserror::Error;

/// Top-level error type for the `hassglue-api` crate.
///
/// Covers every failure mode of the RDW open-data client: transport,
/// HTTP status, payload decoding, and lookups that come back empty.
/// `hassglue-core` maps these into domain errors.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Failed to build the HTTP client (TLS backend, invalid header, ...).
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),

    // ── Service ─────────────────────────────────────────────────────
    /// Non-success HTTP status from the open-data service.
    #[error("RDW API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// The service was reachable but knows no vehicle with this plate.
    #[error("No vehicle registered with license plate {license_plate}")]
    VehicleNotFound { license_plate: String },

    /// The license plate is empty after normalization.
    #[error("Invalid license plate: {0:?}")]
    InvalidLicensePlate(String),

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Api { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// Returns `true` if the lookup found nothing.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::VehicleNotFound { .. } => true,
            Self::Api { status: 404, .. } => true,
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_errors_are_transient() {
        let err = Error::Api {
            status: 503,
            message: "unavailable".into(),
        };
        assert!(err.is_transient());
        assert!(!err.is_not_found());
    }

    #[test]
    fn missing_vehicle_is_not_found() {
        let err = Error::VehicleNotFound {
            license_plate: "11ZKZ3".into(),
        };
        assert!(err.is_not_found());
        assert!(!err.is_transient());
    }
}
