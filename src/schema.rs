//! Settings schema types
//!
//! This module defines the statically-typed field descriptors a settings
//! schema is built from. Fields are declared at schema-definition time with
//! builders; resolution never discovers metadata by reflection.
//!
//! # Example
//!
//! ```rust
//! use strata::{FieldSpec, SettingsSchema};
//!
//! let schema = SettingsSchema::builder()
//!     .field(
//!         FieldSpec::new("token")
//!             .with_env_names(["token", "app_token"])
//!             .with_cloud_key("TOKEN_SECRET_REF"),
//!     )
//!     .field(FieldSpec::new("opts").complex())
//!     .cloud_env_file("APP_CLOUD_ENV")
//!     .build();
//!
//! assert_eq!(schema.fields().len(), 2);
//! ```

/// One declared configuration field
///
/// A field resolves from one of its source variable names (first match
/// wins). A field carrying a `cloud_key` additionally participates in the
/// per-field cloud secret layer: the named environment variable holds the
/// resource name of a secret to fetch.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    name: String,
    env_names: Vec<String>,
    is_complex: bool,
    cloud_key: Option<String>,
}

impl FieldSpec {
    /// Creates a field descriptor
    ///
    /// The field's source variable names default to the field name itself;
    /// override them with [`with_env_names`](Self::with_env_names).
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            env_names: vec![name.clone()],
            name,
            is_complex: false,
            cloud_key: None,
        }
    }

    /// Replaces the set of acceptable source variable names
    pub fn with_env_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.env_names = names.into_iter().map(Into::into).collect();
        self
    }

    /// Names the environment variable whose *value* is the resource name of
    /// a secret to fetch for this field
    pub fn with_cloud_key(mut self, variable: impl Into<String>) -> Self {
        self.cloud_key = Some(variable.into());
        self
    }

    /// Marks the field as complex: its raw text value is JSON-decoded before
    /// it participates in the merge
    pub fn complex(mut self) -> Self {
        self.is_complex = true;
        self
    }

    /// The field name, used as the key in the resolved mapping
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Acceptable source variable names, in match order
    pub fn env_names(&self) -> &[String] {
        &self.env_names
    }

    /// Whether the raw value requires JSON decoding
    pub fn is_complex(&self) -> bool {
        self.is_complex
    }

    /// The `cloud_key` variable, if declared
    pub fn cloud_key(&self) -> Option<&str> {
        self.cloud_key.as_deref()
    }
}

/// Schema-level configuration for a settings resolution pass
#[derive(Debug, Clone, Default)]
pub struct SettingsSchema {
    fields: Vec<FieldSpec>,
    case_sensitive: bool,
    cloud_env_file: Option<String>,
    cloud_env_file_encoding: Option<String>,
}

impl SettingsSchema {
    /// Starts building a schema
    pub fn builder() -> SettingsSchemaBuilder {
        SettingsSchemaBuilder::default()
    }

    /// The declared fields
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Whether variable names match case-sensitively
    pub fn case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    /// The environment variable naming the cloud env-file secret, if any
    pub fn cloud_env_file(&self) -> Option<&str> {
        self.cloud_env_file.as_deref()
    }

    /// Encoding label for the cloud env-file payload (UTF-8 when unset)
    pub fn cloud_env_file_encoding(&self) -> Option<&str> {
        self.cloud_env_file_encoding.as_deref()
    }

    /// Normalizes a variable name per the case-sensitivity setting
    pub(crate) fn normalize(&self, name: &str) -> String {
        if self.case_sensitive {
            name.to_string()
        } else {
            name.to_lowercase()
        }
    }

    /// Validates the schema
    ///
    /// # Errors
    ///
    /// Returns an error if a field name is empty or declared twice, or if a
    /// field has no source variable names.
    pub fn validate(&self) -> Result<(), String> {
        let mut seen = std::collections::BTreeSet::new();
        for field in &self.fields {
            if field.name().is_empty() {
                return Err("field name must not be empty".to_string());
            }
            if !seen.insert(field.name()) {
                return Err(format!("field '{}' declared more than once", field.name()));
            }
            if field.env_names().is_empty() {
                return Err(format!("field '{}' has no source variable names", field.name()));
            }
        }
        Ok(())
    }
}

/// Builder for [`SettingsSchema`]
#[derive(Debug, Default)]
pub struct SettingsSchemaBuilder {
    fields: Vec<FieldSpec>,
    case_sensitive: bool,
    cloud_env_file: Option<String>,
    cloud_env_file_encoding: Option<String>,
}

impl SettingsSchemaBuilder {
    /// Declares a field
    pub fn field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    /// Makes variable-name matching case-sensitive (default: insensitive)
    pub fn case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    /// Names the environment variable whose value is the resource name of a
    /// secret holding an entire env-file blob
    pub fn cloud_env_file(mut self, variable: impl Into<String>) -> Self {
        self.cloud_env_file = Some(variable.into());
        self
    }

    /// Encoding label for the cloud env-file payload
    pub fn cloud_env_file_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.cloud_env_file_encoding = Some(encoding.into());
        self
    }

    /// Finishes the schema
    pub fn build(self) -> SettingsSchema {
        SettingsSchema {
            fields: self.fields,
            case_sensitive: self.case_sensitive,
            cloud_env_file: self.cloud_env_file,
            cloud_env_file_encoding: self.cloud_env_file_encoding,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_defaults_to_own_name_as_source() {
        let field = FieldSpec::new("token");
        assert_eq!(field.name(), "token");
        assert_eq!(field.env_names(), ["token".to_string()]);
        assert!(!field.is_complex());
        assert!(field.cloud_key().is_none());
    }

    #[test]
    fn test_field_builder_methods() {
        let field = FieldSpec::new("opts")
            .with_env_names(["opts", "app_opts"])
            .with_cloud_key("OPTS_SECRET_REF")
            .complex();

        assert_eq!(field.env_names().len(), 2);
        assert_eq!(field.cloud_key(), Some("OPTS_SECRET_REF"));
        assert!(field.is_complex());
    }

    #[test]
    fn test_schema_builder() {
        let schema = SettingsSchema::builder()
            .field(FieldSpec::new("token"))
            .cloud_env_file("APP_CLOUD_ENV")
            .cloud_env_file_encoding("latin1")
            .build();

        assert_eq!(schema.fields().len(), 1);
        assert_eq!(schema.cloud_env_file(), Some("APP_CLOUD_ENV"));
        assert_eq!(schema.cloud_env_file_encoding(), Some("latin1"));
        assert!(!schema.case_sensitive());
    }

    #[test]
    fn test_normalize_respects_case_sensitivity() {
        let insensitive = SettingsSchema::builder().build();
        assert_eq!(insensitive.normalize("MY_KEY"), "my_key");

        let sensitive = SettingsSchema::builder().case_sensitive(true).build();
        assert_eq!(sensitive.normalize("MY_KEY"), "MY_KEY");
    }

    #[test]
    fn test_validate_rejects_duplicate_fields() {
        let schema = SettingsSchema::builder()
            .field(FieldSpec::new("token"))
            .field(FieldSpec::new("token"))
            .build();

        let err = schema.validate().unwrap_err();
        assert!(err.contains("token"));
    }

    #[test]
    fn test_validate_rejects_empty_name() {
        let schema = SettingsSchema::builder().field(FieldSpec::new("")).build();
        assert!(schema.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_field_without_sources() {
        let schema = SettingsSchema::builder()
            .field(FieldSpec::new("token").with_env_names(Vec::<String>::new()))
            .build();
        assert!(schema.validate().is_err());
    }
}
