//! Process environment and `.env` file layer
//!
//! Builds the highest-priority automatic layer: variables from a local
//! `.env` file with the process environment overlaid on top, matched
//! against the declared fields. This module also owns the field-matching
//! semantics the cloud env-file layer reuses.

use crate::domain::{Result, StrataError};
use crate::schema::SettingsSchema;

use super::OverlayLayer;

use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

/// Snapshot of environment-style variables
///
/// Keys are lower-cased at construction unless the schema is
/// case-sensitive. One snapshot backs a whole resolution pass, so a lookup
/// during resolution never sees a half-updated process environment.
#[derive(Debug, Clone, Default)]
pub struct RawEnvironment {
    vars: BTreeMap<String, String>,
}

impl RawEnvironment {
    /// Snapshots the process environment
    pub fn from_process(case_sensitive: bool) -> Self {
        Self::from_vars(std::env::vars(), case_sensitive)
    }

    /// Builds a snapshot from explicit variables
    ///
    /// Useful in tests, where mutating the process environment would race
    /// with other tests.
    pub fn from_vars<I, K, V>(vars: I, case_sensitive: bool) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let vars = vars
            .into_iter()
            .map(|(key, value)| {
                let key = key.into();
                let key = if case_sensitive { key } else { key.to_lowercase() };
                (key, value.into())
            })
            .collect();
        Self { vars }
    }

    /// Looks up a variable by normalized name
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    /// The underlying variable map
    pub fn vars(&self) -> &BTreeMap<String, String> {
        &self.vars
    }

    /// Overlays these variables on top of `base`; the snapshot wins on
    /// collision
    pub(crate) fn overlaid_on(&self, base: BTreeMap<String, String>) -> BTreeMap<String, String> {
        let mut merged = base;
        merged.extend(self.vars.clone());
        merged
    }
}

/// Parses env-file syntax into a variable map
#[cfg(feature = "dotenv")]
pub(crate) fn parse_env_blob(text: &str, case_sensitive: bool) -> Result<BTreeMap<String, String>> {
    let mut vars = BTreeMap::new();
    for entry in dotenvy::from_read_iter(std::io::Cursor::new(text)) {
        let (key, value) = entry.map_err(|e| StrataError::EnvFile(e.to_string()))?;
        let key = if case_sensitive { key } else { key.to_lowercase() };
        vars.insert(key, value);
    }
    Ok(vars)
}

#[cfg(not(feature = "dotenv"))]
pub(crate) fn parse_env_blob(
    _text: &str,
    _case_sensitive: bool,
) -> Result<BTreeMap<String, String>> {
    Err(StrataError::Configuration(
        "env-file support requires the `dotenv` feature; enable it with \
         `strata = { version = \"0.3\", features = [\"dotenv\"] }`"
            .to_string(),
    ))
}

/// Reads and parses a local env file
fn read_env_file(
    path: &Path,
    encoding: Option<&str>,
    case_sensitive: bool,
) -> Result<BTreeMap<String, String>> {
    let bytes = std::fs::read(path)
        .map_err(|e| StrataError::EnvFile(format!("failed to read {}: {e}", path.display())))?;
    let text = crate::store::decode_payload(&bytes, encoding)
        .map_err(|e| StrataError::EnvFile(format!("{}: {e}", path.display())))?;
    parse_env_blob(&text, case_sensitive)
}

/// Resolves each declared field against an environment-style variable map
///
/// The first source name present wins. Fields marked complex JSON-decode
/// their raw text; a decode failure names the offending variable.
pub(crate) fn field_values(
    schema: &SettingsSchema,
    vars: &BTreeMap<String, String>,
) -> Result<OverlayLayer> {
    let mut layer = OverlayLayer::new();
    for field in schema.fields() {
        let mut found: Option<(String, &str)> = None;
        for source in field.env_names() {
            let variable = schema.normalize(source);
            if let Some(raw) = vars.get(&variable) {
                found = Some((variable, raw.as_str()));
                break;
            }
        }
        let Some((variable, raw)) = found else {
            continue;
        };

        let value = if field.is_complex() {
            serde_json::from_str(raw).map_err(|e| StrataError::JsonParse {
                variable,
                detail: e.to_string(),
            })?
        } else {
            Value::String(raw.to_string())
        };
        layer.insert(field.name().to_string(), value);
    }
    Ok(layer)
}

/// Builds the process-environment / local `.env` overlay
///
/// A configured env file that does not exist is skipped; the layer then
/// draws from the process environment alone.
pub fn environment_layer(
    schema: &SettingsSchema,
    env: &RawEnvironment,
    env_file: Option<&Path>,
    env_file_encoding: Option<&str>,
) -> Result<OverlayLayer> {
    let vars = match env_file {
        Some(path) if path.is_file() => {
            let file_vars = read_env_file(path, env_file_encoding, schema.case_sensitive())?;
            env.overlaid_on(file_vars)
        }
        Some(path) => {
            tracing::debug!(
                path = %path.display(),
                "env file not found, using process environment only"
            );
            env.vars().clone()
        }
        None => env.vars().clone(),
    };
    field_values(schema, &vars)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldSpec, SettingsSchema};
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn schema() -> SettingsSchema {
        SettingsSchema::builder()
            .field(FieldSpec::new("token"))
            .field(FieldSpec::new("opts").complex())
            .build()
    }

    #[test]
    fn test_raw_environment_normalizes_keys() {
        let env = RawEnvironment::from_vars([("MY_KEY", "1")], false);
        assert_eq!(env.get("my_key"), Some("1"));
        assert_eq!(env.get("MY_KEY"), None);

        let env = RawEnvironment::from_vars([("MY_KEY", "1")], true);
        assert_eq!(env.get("MY_KEY"), Some("1"));
    }

    #[test]
    fn test_field_values_first_source_wins() {
        let schema = SettingsSchema::builder()
            .field(FieldSpec::new("token").with_env_names(["primary", "fallback"]))
            .build();
        let vars = BTreeMap::from([
            ("primary".to_string(), "a".to_string()),
            ("fallback".to_string(), "b".to_string()),
        ]);

        let layer = field_values(&schema, &vars).unwrap();
        assert_eq!(layer["token"], Value::String("a".to_string()));
    }

    #[test]
    fn test_field_values_decodes_complex_fields() {
        let vars = BTreeMap::from([("opts".to_string(), r#"{"a": 1}"#.to_string())]);
        let layer = field_values(&schema(), &vars).unwrap();
        assert_eq!(layer["opts"], serde_json::json!({"a": 1}));
    }

    #[test]
    fn test_field_values_malformed_complex_value_names_variable() {
        let vars = BTreeMap::from([("opts".to_string(), "{a:1}".to_string())]);
        let err = field_values(&schema(), &vars).unwrap_err();
        match err {
            StrataError::JsonParse { variable, .. } => assert_eq!(variable, "opts"),
            other => panic!("expected JsonParse, got {other:?}"),
        }
    }

    #[test]
    #[cfg(feature = "dotenv")]
    fn test_parse_env_blob() {
        let vars = parse_env_blob("TOKEN=abc\nOPTS='{\"a\": 1}'\n", false).unwrap();
        assert_eq!(vars.get("token"), Some(&"abc".to_string()));
        assert_eq!(vars.get("opts"), Some(&"{\"a\": 1}".to_string()));
    }

    #[test]
    #[cfg(feature = "dotenv")]
    fn test_environment_layer_env_file_under_process_env() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "TOKEN=from-file").unwrap();
        writeln!(file, "OPTS='{{\"a\": 1}}'").unwrap();
        file.flush().unwrap();

        // Process env supplies token too, and must win within the layer
        let env = RawEnvironment::from_vars([("TOKEN", "from-env")], false);
        let layer = environment_layer(&schema(), &env, Some(file.path()), None).unwrap();

        assert_eq!(layer["token"], Value::String("from-env".to_string()));
        assert_eq!(layer["opts"], serde_json::json!({"a": 1}));
    }

    #[test]
    fn test_environment_layer_missing_env_file_is_skipped() {
        let env = RawEnvironment::from_vars([("TOKEN", "from-env")], false);
        let layer = environment_layer(
            &schema(),
            &env,
            Some(Path::new("/nonexistent/.env")),
            None,
        )
        .unwrap();
        assert_eq!(layer["token"], Value::String("from-env".to_string()));
    }

    #[test]
    fn test_environment_layer_unmatched_fields_absent() {
        let env = RawEnvironment::from_vars(Vec::<(String, String)>::new(), false);
        let layer = environment_layer(&schema(), &env, None, None).unwrap();
        assert!(layer.is_empty());
    }
}
