// RDW open-data HTTP client
//
// Wraps `reqwest::Client` with dataset URL construction, license plate
// normalization, and decoding of the Socrata JSON array into `Vehicle`.

use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::rdw::models::{RawVehicle, Vehicle};
use crate::transport::TransportConfig;

/// Dataset with one row per registered vehicle.
const VEHICLES_DATASET: &str = "m9d7-ebf2";

/// Default public endpoint of the open-data portal.
pub const DEFAULT_BASE_URL: &str = "https://opendata.rdw.nl";

/// Normalize a license plate the way the registry stores it:
/// uppercase, without dashes or whitespace.
pub fn normalize_license_plate(raw: &str) -> String {
    raw.chars()
        .filter(|c| *c != '-' && !c.is_whitespace())
        .flat_map(char::to_uppercase)
        .collect()
}

/// Raw HTTP client for the RDW open-data portal.
#[derive(Debug, Clone)]
pub struct RdwClient {
    http: reqwest::Client,
    base_url: Url,
}

impl RdwClient {
    /// Create a client from a `TransportConfig`.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self { http, base_url })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    /// The portal base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build `{base}/resource/{dataset}.json`.
    fn dataset_url(&self, dataset: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}/resource/{dataset}.json"))?)
    }

    /// Look up a single vehicle by license plate.
    ///
    /// `GET /resource/m9d7-ebf2.json?kenteken={PLATE}`
    pub async fn vehicle(&self, license_plate: &str) -> Result<Vehicle, Error> {
        let plate = normalize_license_plate(license_plate);
        if plate.is_empty() {
            return Err(Error::InvalidLicensePlate(license_plate.to_owned()));
        }

        let mut url = self.dataset_url(VEHICLES_DATASET)?;
        url.query_pairs_mut().append_pair("kenteken", &plate);
        debug!(license_plate = %plate, "GET {}", url);

        let resp = self.http.get(url).send().await.map_err(Error::Transport)?;

        let status = resp.status();
        let body = resp.text().await.map_err(Error::Transport)?;

        if !status.is_success() {
            return Err(Error::Api {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        trace!(bytes = body.len(), "vehicle payload received");

        let rows: Vec<RawVehicle> = serde_json::from_str(&body).map_err(|e| {
            let preview: String = body.chars().take(200).collect();
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body: body.clone(),
            }
        })?;

        rows.into_iter()
            .next()
            .map(Vehicle::from)
            .ok_or(Error::VehicleNotFound {
                license_plate: plate,
            })
    }
}
