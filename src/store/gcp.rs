//! Google Cloud Secret Manager client
//!
//! There is no official Rust SDK for Secret Manager, so this adapter speaks
//! the v1 REST surface directly: `GET /v1/{resource}:access` with a bearer
//! token from ambient credentials. The payload arrives base64-encoded.
//!
//! Credential discovery order:
//! 1. A token passed to [`GcpSecretStore::with_endpoint`]
//! 2. The `GOOGLE_OAUTH_ACCESS_TOKEN` environment variable
//! 3. The GCE metadata server token endpoint

use crate::domain::StoreError;

use super::{secret_string, SecretLookup, SecretStore, SecretString};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use secrecy::ExposeSecret;
use serde::Deserialize;
use std::time::Duration;

const DEFAULT_ENDPOINT: &str = "https://secretmanager.googleapis.com";
const METADATA_TOKEN_URL: &str =
    "http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/token";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// `secrets.versions.access` response body
#[derive(Debug, Deserialize)]
struct AccessSecretVersionResponse {
    payload: SecretPayload,
}

#[derive(Debug, Deserialize)]
struct SecretPayload {
    /// Base64-encoded secret bytes
    data: String,
}

/// Metadata server token response
#[derive(Debug, Deserialize)]
struct MetadataToken {
    access_token: String,
}

/// Secret Manager client over REST with ambient credentials
pub struct GcpSecretStore {
    client: reqwest::blocking::Client,
    endpoint: String,
    metadata_url: String,
    token: Option<SecretString>,
}

impl GcpSecretStore {
    /// Creates a client against the public Secret Manager endpoint
    ///
    /// Credentials are discovered per lookup, so construction succeeds even
    /// without any; lookups then resolve to
    /// [`SecretLookup::Failed`] with authentication detail.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new() -> Result<Self, StoreError> {
        Self::with_endpoint_and_token(DEFAULT_ENDPOINT, None)
    }

    /// Creates a client against a fixed endpoint with a fixed bearer token
    ///
    /// Intended for tests and non-default API endpoints.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn with_endpoint(
        endpoint: impl Into<String>,
        token: impl Into<String>,
    ) -> Result<Self, StoreError> {
        Self::with_endpoint_and_token(endpoint, Some(secret_string(token.into())))
    }

    fn with_endpoint_and_token(
        endpoint: impl Into<String>,
        token: Option<SecretString>,
    ) -> Result<Self, StoreError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| StoreError::Connection(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            metadata_url: METADATA_TOKEN_URL.to_string(),
            token,
        })
    }

    /// Resolves a bearer token from ambient credentials
    fn bearer_token(&self) -> Result<SecretString, StoreError> {
        if let Some(token) = &self.token {
            return Ok(token.clone());
        }

        if let Ok(token) = std::env::var("GOOGLE_OAUTH_ACCESS_TOKEN") {
            if !token.is_empty() {
                return Ok(secret_string(token));
            }
        }

        let response = self
            .client
            .get(&self.metadata_url)
            .header("Metadata-Flavor", "Google")
            .send()
            .map_err(|e| StoreError::Authentication(format!("metadata server unreachable: {e}")))?;

        if !response.status().is_success() {
            return Err(StoreError::Authentication(format!(
                "metadata server returned {}",
                response.status()
            )));
        }

        let token: MetadataToken = response.json().map_err(|e| {
            StoreError::Authentication(format!("malformed metadata token response: {e}"))
        })?;

        Ok(secret_string(token.access_token))
    }
}

impl SecretStore for GcpSecretStore {
    fn name(&self) -> &str {
        "gcp-secret-manager"
    }

    fn access(&self, resource: &str) -> SecretLookup {
        let token = match self.bearer_token() {
            Ok(token) => token,
            Err(e) => return SecretLookup::Failed(e),
        };

        let url = format!("{}/v1/{}:access", self.endpoint, resource);
        let response = match self
            .client
            .get(&url)
            .bearer_auth(token.expose_secret().as_ref())
            .send()
        {
            Ok(response) => response,
            Err(e) => return SecretLookup::Failed(StoreError::Connection(e.to_string())),
        };

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return SecretLookup::Absent;
        }
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return SecretLookup::Failed(StoreError::Authentication(format!(
                "{status} accessing {resource}"
            )));
        }
        if !status.is_success() {
            let message = response.text().unwrap_or_default();
            return SecretLookup::Failed(StoreError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: AccessSecretVersionResponse = match response.json() {
            Ok(body) => body,
            Err(e) => {
                return SecretLookup::Failed(StoreError::InvalidPayload(format!(
                    "malformed access response: {e}"
                )))
            }
        };

        match BASE64.decode(body.payload.data.as_bytes()) {
            Ok(bytes) => SecretLookup::Payload(bytes),
            Err(e) => SecretLookup::Failed(StoreError::InvalidPayload(format!(
                "payload is not valid base64: {e}"
            ))),
        }
    }
}
