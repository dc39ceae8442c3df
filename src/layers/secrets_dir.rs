//! Secrets-directory layer
//!
//! Reads one file per field from a mounted directory, the convention used
//! by Docker and Kubernetes secret mounts: the file is named after the
//! field's source variable and its contents are the value.

use crate::domain::{Result, StrataError};
use crate::schema::SettingsSchema;

use super::OverlayLayer;

use serde_json::Value;
use std::fs;
use std::path::Path;

/// Builds the secrets-directory overlay
///
/// For each field, the directory is probed for a file named after each
/// source variable (case-normalized); the first hit wins. Contents are
/// trimmed. Complex fields JSON-decode with the same loud-failure policy as
/// the environment layer. An unreadable file is logged and skipped.
pub fn secrets_dir_layer(schema: &SettingsSchema, dir: &Path) -> Result<OverlayLayer> {
    if !dir.is_dir() {
        tracing::warn!(path = %dir.display(), "secrets directory does not exist");
        return Ok(OverlayLayer::new());
    }

    let mut layer = OverlayLayer::new();
    for field in schema.fields() {
        for source in field.env_names() {
            let variable = schema.normalize(source);
            let path = dir.join(&variable);
            if !path.is_file() {
                continue;
            }

            let contents = match fs::read_to_string(&path) {
                Ok(contents) => contents,
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "skipping unreadable secret file"
                    );
                    continue;
                }
            };

            let raw = contents.trim();
            let value = if field.is_complex() {
                serde_json::from_str(raw).map_err(|e| StrataError::JsonParse {
                    variable: variable.clone(),
                    detail: e.to_string(),
                })?
            } else {
                Value::String(raw.to_string())
            };
            layer.insert(field.name().to_string(), value);
            break;
        }
    }
    Ok(layer)
}
