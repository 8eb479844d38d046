// Shared transport configuration for building reqwest::Client instances.
//
// Keeps timeout, user agent, and the optional Socrata app token in one
// place so every client is built the same way.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};

use crate::error::Error;

const USER_AGENT: &str = concat!("hassglue/", env!("CARGO_PKG_VERSION"));

/// Header the open-data portal reads its application token from.
const APP_TOKEN_HEADER: &str = "X-App-Token";

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub timeout: Duration,
    /// Optional Socrata application token. Anonymous requests work but are
    /// throttled more aggressively.
    pub app_token: Option<SecretString>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            app_token: None,
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        let mut headers = HeaderMap::new();
        if let Some(ref token) = self.app_token {
            let mut value = HeaderValue::from_str(token.expose_secret())
                .map_err(|e| Error::ClientBuild(format!("invalid app token: {e}")))?;
            value.set_sensitive(true);
            headers.insert(APP_TOKEN_HEADER, value);
        }

        reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()
            .map_err(|e| Error::ClientBuild(e.to_string()))
    }
}
