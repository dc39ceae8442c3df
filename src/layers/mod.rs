//! Overlay layers
//!
//! Each resolution source contributes one [`OverlayLayer`]: a mapping from
//! field name to raw value. The resolver merges the layers in a fixed
//! precedence order, later layers winning on collision.
//!
//! - [`environment`] - process environment and local `.env` file
//! - [`secrets_dir`] - one file per field from a secret-mounted directory
//! - [`cloud`] - per-field cloud secrets and the cloud env-file blob

pub mod cloud;
pub mod environment;
pub mod secrets_dir;

use serde_json::{Map, Value};

/// One source's contribution: field name to raw value
pub type OverlayLayer = Map<String, Value>;

// Re-export the layer builders
pub use cloud::{cloud_env_file_layer, cloud_secret_layer};
pub use environment::{environment_layer, RawEnvironment};
pub use secrets_dir::secrets_dir_layer;
