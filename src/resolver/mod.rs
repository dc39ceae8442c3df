//! Settings resolution orchestration
//!
//! [`SettingsResolver`] runs one resolution pass: it builds every overlay
//! layer, merges them in precedence order, and returns the merged raw-value
//! mapping as a [`ResolvedConfig`]. Typed construction is a thin `serde`
//! step on top.
//!
//! A pass is ephemeral: nothing is cached between calls, and every call
//! re-fetches its secrets.

pub mod merge;

use crate::domain::{Result, StrataError};
use crate::layers::{
    cloud_env_file_layer, cloud_secret_layer, environment_layer, secrets_dir_layer, OverlayLayer,
    RawEnvironment,
};
use crate::schema::SettingsSchema;
use crate::store::SecretStore;

use merge::merge_layers;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::path::PathBuf;
use std::sync::Arc;

/// The final merged mapping from field name to raw value
#[derive(Debug, Clone, Default)]
pub struct ResolvedConfig {
    values: Map<String, Value>,
}

impl ResolvedConfig {
    /// Looks up a resolved value by field name
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// The underlying mapping
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.values
    }

    /// Whether no field resolved a value
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of resolved fields
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Deserializes the mapping into a typed settings value
    ///
    /// # Errors
    ///
    /// Returns [`StrataError::Deserialize`] when the merged values do not
    /// satisfy the target type (missing required field, wrong shape).
    pub fn into_typed<T: DeserializeOwned>(self) -> Result<T> {
        serde_json::from_value(Value::Object(self.values))
            .map_err(|e| StrataError::Deserialize(e.to_string()))
    }
}

/// One-shot settings resolver
///
/// Configure the local sources with the builder-style methods, then call
/// [`resolve`](Self::resolve). The resolver holds no mutable state; calling
/// `resolve` twice performs two independent passes.
pub struct SettingsResolver {
    schema: SettingsSchema,
    store: Arc<dyn SecretStore>,
    environment: Option<RawEnvironment>,
    env_file: Option<PathBuf>,
    env_file_encoding: Option<String>,
    secrets_dir: Option<PathBuf>,
    overrides: Map<String, Value>,
}

impl SettingsResolver {
    /// Creates a resolver for a schema backed by a secret store
    pub fn new(schema: SettingsSchema, store: Arc<dyn SecretStore>) -> Self {
        Self {
            schema,
            store,
            environment: None,
            env_file: None,
            env_file_encoding: None,
            secrets_dir: None,
            overrides: Map::new(),
        }
    }

    /// Replaces the environment snapshot
    ///
    /// By default the process environment is snapshotted at the start of
    /// each pass. Tests inject explicit variables here instead of mutating
    /// the process environment.
    pub fn environment(mut self, environment: RawEnvironment) -> Self {
        self.environment = Some(environment);
        self
    }

    /// Reads a local env file into the environment layer
    pub fn env_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.env_file = Some(path.into());
        self
    }

    /// Encoding label for the local env file (UTF-8 when unset)
    pub fn env_file_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.env_file_encoding = Some(encoding.into());
        self
    }

    /// Reads one file per field from a secrets directory
    pub fn secrets_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.secrets_dir = Some(path.into());
        self
    }

    /// Sets one explicit override; overrides always win
    pub fn override_value(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.overrides.insert(name.into(), value.into());
        self
    }

    /// Extends the explicit overrides from a mapping
    pub fn overrides(mut self, overrides: Map<String, Value>) -> Self {
        self.overrides.extend(overrides);
        self
    }

    /// Runs one resolution pass
    ///
    /// Layers are built and merged lowest to highest priority: cloud
    /// env-file, per-field cloud secrets, secrets directory, process
    /// environment / local env file, explicit overrides.
    ///
    /// # Errors
    ///
    /// Returns an error for an invalid schema, an unreadable or unparsable
    /// env file, or a malformed JSON value on a field declared complex.
    /// Secret-store failures never surface here; the affected fields simply
    /// resolve to absent.
    pub fn resolve(&self) -> Result<ResolvedConfig> {
        self.schema
            .validate()
            .map_err(StrataError::Configuration)?;

        let environment = match &self.environment {
            Some(environment) => environment.clone(),
            None => RawEnvironment::from_process(self.schema.case_sensitive()),
        };

        tracing::debug!(
            fields = self.schema.fields().len(),
            store = self.store.name(),
            "resolving settings"
        );

        let cloud_env_file = cloud_env_file_layer(&self.schema, &environment, self.store.as_ref())?;
        let cloud_secrets = cloud_secret_layer(&self.schema, &environment, self.store.as_ref());
        let secrets_dir = match &self.secrets_dir {
            Some(dir) => secrets_dir_layer(&self.schema, dir)?,
            None => OverlayLayer::new(),
        };
        let local_env = environment_layer(
            &self.schema,
            &environment,
            self.env_file.as_deref(),
            self.env_file_encoding.as_deref(),
        )?;

        let values = merge_layers([
            cloud_env_file,
            cloud_secrets,
            secrets_dir,
            local_env,
            self.overrides.clone(),
        ]);

        tracing::debug!(resolved = values.len(), "settings resolved");
        Ok(ResolvedConfig { values })
    }

    /// Resolves and deserializes in one step
    ///
    /// # Errors
    ///
    /// Propagates [`resolve`](Self::resolve) errors plus
    /// [`StrataError::Deserialize`] from typed construction.
    pub fn resolve_into<T: DeserializeOwned>(&self) -> Result<T> {
        self.resolve()?.into_typed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldSpec;
    use crate::store::MemorySecretStore;
    use serde_json::json;

    fn store_with(resource: &str, payload: &str) -> Arc<MemorySecretStore> {
        let store = MemorySecretStore::new();
        store.insert(resource, payload);
        Arc::new(store)
    }

    #[test]
    fn test_resolve_rejects_invalid_schema() {
        let schema = SettingsSchema::builder()
            .field(FieldSpec::new("token"))
            .field(FieldSpec::new("token"))
            .build();
        let resolver = SettingsResolver::new(schema, Arc::new(MemorySecretStore::new()));

        let err = resolver.resolve().unwrap_err();
        assert!(matches!(err, StrataError::Configuration(_)));
    }

    #[test]
    fn test_override_beats_cloud_secret() {
        let schema = SettingsSchema::builder()
            .field(FieldSpec::new("token").with_cloud_key("TOKEN_SECRET_REF"))
            .build();
        let store = store_with("projects/p/secrets/s/versions/latest", "abc123");

        let resolved = SettingsResolver::new(schema, store)
            .environment(RawEnvironment::from_vars(
                [("TOKEN_SECRET_REF", "projects/p/secrets/s/versions/latest")],
                false,
            ))
            .override_value("token", "override")
            .resolve()
            .unwrap();

        assert_eq!(resolved.get("token"), Some(&json!("override")));
    }

    #[test]
    fn test_resolved_config_accessors() {
        let schema = SettingsSchema::builder().field(FieldSpec::new("token")).build();
        let resolved = SettingsResolver::new(schema, Arc::new(MemorySecretStore::new()))
            .environment(RawEnvironment::from_vars([("token", "abc")], false))
            .resolve()
            .unwrap();

        assert_eq!(resolved.len(), 1);
        assert!(!resolved.is_empty());
        assert_eq!(resolved.as_map()["token"], json!("abc"));
    }

    #[test]
    fn test_into_typed_reports_missing_required_field() {
        #[derive(serde::Deserialize, Debug)]
        struct Settings {
            #[allow(dead_code)]
            token: String,
        }

        let schema = SettingsSchema::builder().field(FieldSpec::new("token")).build();
        let resolved = SettingsResolver::new(schema, Arc::new(MemorySecretStore::new()))
            .environment(RawEnvironment::from_vars(Vec::<(String, String)>::new(), false))
            .resolve()
            .unwrap();

        let err = resolved.into_typed::<Settings>().unwrap_err();
        assert!(matches!(err, StrataError::Deserialize(_)));
    }
}
