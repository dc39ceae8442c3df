// Strata - Layered settings resolution with cloud secret fallback
// Copyright (c) 2025 Strata Contributors
// Licensed under the MIT License

//! # Strata - Layered Settings Resolution
//!
//! Strata resolves application settings by merging values from several
//! overlay sources into one raw-value mapping, then handing that mapping to
//! `serde` for typed construction. Alongside the usual local sources
//! (process environment, `.env` files, secret-mounted directories, explicit
//! overrides) it can pull individual values from Google Cloud Secret Manager.
//!
//! ## Overview
//!
//! This library provides the core functionality for:
//! - **Declaring** configuration fields with typed descriptors ([`schema`])
//! - **Collecting** values from overlay sources in precedence order ([`layers`])
//! - **Fetching** secret payloads from a cloud secret store ([`store`])
//! - **Merging** the layers deep, later-wins, into a [`resolver::ResolvedConfig`]
//!
//! ## Architecture
//!
//! Strata follows a layered architecture:
//!
//! - [`schema`] - Field descriptors and schema-level configuration
//! - [`layers`] - One module per overlay source (environment, secrets
//!   directory, cloud)
//! - [`store`] - The secret-store capability and its implementations
//! - [`resolver`] - Precedence merge and orchestration
//! - [`domain`] - Error types and the crate [`Result`](domain::Result) alias
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use serde::Deserialize;
//! use strata::store::GcpSecretStore;
//! use strata::{FieldSpec, SettingsResolver, SettingsSchema};
//!
//! #[derive(Deserialize)]
//! struct AppSettings {
//!     token: String,
//!     #[serde(default)]
//!     opts: serde_json::Map<String, serde_json::Value>,
//! }
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let schema = SettingsSchema::builder()
//!         .field(FieldSpec::new("token").with_cloud_key("TOKEN_SECRET_REF"))
//!         .field(FieldSpec::new("opts").complex())
//!         .build();
//!
//!     let store = Arc::new(GcpSecretStore::new()?);
//!     let settings: AppSettings = SettingsResolver::new(schema, store)
//!         .env_file(".env")
//!         .resolve()?
//!         .into_typed()?;
//!
//!     println!("token is {} bytes", settings.token.len());
//!     Ok(())
//! }
//! ```
//!
//! Run the program with the secret's resource name in the environment:
//!
//! ```bash
//! TOKEN_SECRET_REF=projects/p/secrets/token/versions/latest ./app
//! ```
//!
//! ## Precedence
//!
//! Layers merge lowest to highest priority; later layers win on collision:
//!
//! 1. Cloud env-file blob (if configured)
//! 2. Per-field cloud secrets (`cloud_key`)
//! 3. Local secrets directory
//! 4. Process environment and local `.env` file
//! 5. Explicit overrides passed to the resolver
//!
//! Locally supplied values always beat cloud-fetched ones, so development and
//! testing never require cloud credentials. A secret that cannot be fetched
//! is logged and left unset; it never aborts resolution.
//!
//! ## Error Handling
//!
//! Fallible operations return [`Result<T, StrataError>`](domain::Result):
//!
//! ```rust,no_run
//! use strata::domain::StrataError;
//! use strata::SettingsResolver;
//!
//! # fn example(resolver: SettingsResolver) -> Result<(), StrataError> {
//! let resolved = resolver.resolve()?;
//! # Ok(())
//! # }
//! ```
//!
//! Secret-store failures are deliberately *not* part of that surface: the
//! cloud layers consume them, emit a `tracing` warning, and leave the field
//! unset. The one loud failure is a malformed JSON value for a field declared
//! complex, which names the offending variable.
//!
//! ## Logging
//!
//! Strata emits structured events with the `tracing` crate and leaves
//! subscriber installation to the host application:
//!
//! ```rust,no_run
//! tracing::warn!(resource = "projects/p/secrets/s", "could not fetch secret");
//! ```

pub mod domain;
pub mod layers;
pub mod resolver;
pub mod schema;
pub mod store;

// Re-export the types most adopters touch
pub use domain::{Result, StrataError};
pub use resolver::{ResolvedConfig, SettingsResolver};
pub use schema::{FieldSpec, SettingsSchema};
