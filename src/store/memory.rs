//! In-memory secret store
//!
//! Test double for the store capability. Seed it with payloads, or switch it
//! into a failure mode to exercise the fail-silently branch of the cloud
//! layers.

use crate::domain::StoreError;

use super::{SecretLookup, SecretStore};

use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory secret store for testing and ephemeral use
///
/// Secrets are lost when the store is dropped. The store uses `RwLock`
/// internally and is safe to use from multiple threads.
///
/// # Example
///
/// ```
/// use strata::store::{MemorySecretStore, SecretLookup, SecretStore};
///
/// let store = MemorySecretStore::new();
/// store.insert("projects/p/secrets/s/versions/latest", "abc123");
/// assert!(matches!(
///     store.access("projects/p/secrets/s/versions/latest"),
///     SecretLookup::Payload(_)
/// ));
/// ```
#[derive(Debug, Default)]
pub struct MemorySecretStore {
    secrets: RwLock<HashMap<String, Vec<u8>>>,
    auth_failure: RwLock<Option<String>>,
}

impl MemorySecretStore {
    /// Creates a new empty memory store
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a memory store with initial values
    pub fn with_secrets<I, K, V>(initial: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Vec<u8>>,
    {
        let secrets = initial
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            secrets: RwLock::new(secrets),
            auth_failure: RwLock::new(None),
        }
    }

    /// Stores a payload under a resource name
    pub fn insert(&self, resource: impl Into<String>, payload: impl Into<Vec<u8>>) {
        let mut secrets = self.secrets.write().unwrap();
        secrets.insert(resource.into(), payload.into());
    }

    /// Makes every subsequent lookup fail with an authentication error
    pub fn fail_with_auth_error(&self, message: impl Into<String>) {
        let mut failure = self.auth_failure.write().unwrap();
        *failure = Some(message.into());
    }

    /// Number of stored secrets
    pub fn len(&self) -> usize {
        self.secrets.read().unwrap().len()
    }

    /// Whether the store holds no secrets
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SecretStore for MemorySecretStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn access(&self, resource: &str) -> SecretLookup {
        if let Some(message) = self.auth_failure.read().unwrap().as_deref() {
            return SecretLookup::Failed(StoreError::Authentication(message.to_string()));
        }

        match self.secrets.read().unwrap().get(resource) {
            Some(payload) => SecretLookup::Payload(payload.clone()),
            None => SecretLookup::Absent,
        }
    }
}
