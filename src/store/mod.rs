//! Secret-store capability
//!
//! This module defines the interface the cloud layers consume: a
//! [`SecretStore`] answers one lookup at a time with an explicit
//! [`SecretLookup`] outcome, and [`decode_payload`] turns raw payload bytes
//! into text.
//!
//! The outcome type makes the fail-silently policy a visible branch: the
//! caller sees value, absence, or failure detail, and decides to log and
//! treat non-values as absent. Store implementations never panic and never
//! raise through the resolver.

pub mod gcp;
pub mod memory;
pub mod secret;

use crate::domain::StoreError;

// Re-export commonly used types
pub use gcp::GcpSecretStore;
pub use memory::MemorySecretStore;
pub use secret::{secret_string, SecretString, SecretValue};

/// Outcome of one secret lookup
#[derive(Debug)]
pub enum SecretLookup {
    /// The secret exists; raw payload bytes
    Payload(Vec<u8>),

    /// The store has no secret under the requested resource name
    Absent,

    /// The store could not answer
    Failed(StoreError),
}

/// Capability: fetch secret payload bytes by resource name
///
/// Implementations:
/// - [`GcpSecretStore`]: Google Cloud Secret Manager over REST
/// - [`MemorySecretStore`]: in-memory, for tests and ephemeral wiring
pub trait SecretStore: Send + Sync {
    /// Human-readable store name, used in log events
    fn name(&self) -> &str;

    /// Fetch the payload for a secret resource name
    fn access(&self, resource: &str) -> SecretLookup;
}

/// Decodes payload bytes to text
///
/// UTF-8 when `encoding` is `None`, otherwise any WHATWG encoding label
/// (`latin1`, `utf-16le`, ...).
///
/// # Errors
///
/// Returns [`StoreError::InvalidPayload`] for an unknown label or bytes that
/// are malformed under the chosen encoding.
pub fn decode_payload(bytes: &[u8], encoding: Option<&str>) -> Result<String, StoreError> {
    match encoding {
        None => std::str::from_utf8(bytes)
            .map(str::to_owned)
            .map_err(|e| StoreError::InvalidPayload(format!("payload is not valid UTF-8: {e}"))),
        Some(label) => {
            let encoding = encoding_rs::Encoding::for_label(label.as_bytes()).ok_or_else(|| {
                StoreError::InvalidPayload(format!("unknown encoding label '{label}'"))
            })?;
            let (text, _, had_errors) = encoding.decode(bytes);
            if had_errors {
                Err(StoreError::InvalidPayload(format!(
                    "payload is not valid {}",
                    encoding.name()
                )))
            } else {
                Ok(text.into_owned())
            }
        }
    }
}
