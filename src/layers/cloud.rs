//! Cloud-backed overlay layers
//!
//! Two layers source values from the secret store. The per-field layer
//! resolves each field carrying a `cloud_key`: the named environment
//! variable holds the resource name of the secret to fetch. The env-file
//! layer resolves an indirection where one variable names a secret whose
//! payload is an entire env-file blob.
//!
//! Both layers fail silently: a secret that cannot be fetched is logged and
//! contributes nothing, so a later layer or the field's default can supply
//! the value. Cloud access must never be required for local development.

use crate::domain::Result;
use crate::schema::SettingsSchema;
use crate::store::{decode_payload, SecretLookup, SecretStore};

use super::environment::{field_values, parse_env_blob, RawEnvironment};
use super::OverlayLayer;

use serde_json::Value;

/// Fetches a secret and decodes it to text, converting every failure into
/// absence
///
/// This is the explicit fail-silently branch: `Failed` outcomes and
/// undecodable payloads are logged as warnings, plain absence at debug.
fn fetch_secret_text(
    store: &dyn SecretStore,
    resource: &str,
    encoding: Option<&str>,
) -> Option<String> {
    match store.access(resource) {
        SecretLookup::Payload(bytes) => match decode_payload(&bytes, encoding) {
            Ok(text) => Some(text),
            Err(e) => {
                tracing::warn!(
                    store = store.name(),
                    resource = resource,
                    error = %e,
                    "could not decode secret payload"
                );
                None
            }
        },
        SecretLookup::Absent => {
            tracing::debug!(
                store = store.name(),
                resource = resource,
                "secret not present in store"
            );
            None
        }
        SecretLookup::Failed(e) => {
            tracing::warn!(
                store = store.name(),
                resource = resource,
                error = %e,
                "could not fetch secret"
            );
            None
        }
    }
}

/// Builds the per-field cloud secret overlay
///
/// Every declared field is evaluated exactly once. A field without a
/// `cloud_key`, or whose key variable is absent or empty, contributes
/// nothing.
pub fn cloud_secret_layer(
    schema: &SettingsSchema,
    env: &RawEnvironment,
    store: &dyn SecretStore,
) -> OverlayLayer {
    let mut layer = OverlayLayer::new();
    for field in schema.fields() {
        let Some(cloud_key) = field.cloud_key() else {
            continue;
        };
        let cloud_key = schema.normalize(cloud_key);
        let resource = match env.get(&cloud_key) {
            Some(resource) if !resource.is_empty() => resource,
            _ => continue,
        };

        if let Some(text) = fetch_secret_text(store, resource, None) {
            layer.insert(field.name().to_string(), Value::String(text));
        }
    }
    layer
}

/// Builds the cloud env-file overlay
///
/// The schema names an environment variable whose value is the resource
/// name of a secret holding an env-file blob. Variables parsed from the
/// blob sit beneath the process environment, then fields match exactly as
/// in the environment layer (complex decoding included).
pub fn cloud_env_file_layer(
    schema: &SettingsSchema,
    env: &RawEnvironment,
    store: &dyn SecretStore,
) -> Result<OverlayLayer> {
    let Some(variable) = schema.cloud_env_file() else {
        return Ok(OverlayLayer::new());
    };

    let variable = schema.normalize(variable);
    let Some(resource) = env.get(&variable) else {
        tracing::warn!(variable = %variable, "cloud env file variable not found in environment");
        return Ok(OverlayLayer::new());
    };

    let encoding = schema.cloud_env_file_encoding();
    let Some(blob) = fetch_secret_text(store, resource, encoding) else {
        return Ok(OverlayLayer::new());
    };

    let blob_vars = parse_env_blob(&blob, schema.case_sensitive())?;
    let vars = env.overlaid_on(blob_vars);
    field_values(schema, &vars)
}
