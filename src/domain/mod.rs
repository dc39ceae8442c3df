//! Domain types for Strata.
//!
//! This module contains the error taxonomy and the crate-wide [`Result`]
//! alias.
//!
//! # Error Handling
//!
//! All fallible resolution operations return [`Result<T, StrataError>`]:
//!
//! ```rust
//! use strata::domain::{Result, StrataError};
//!
//! fn example() -> Result<()> {
//!     Err(StrataError::Configuration("field declared twice".to_string()))
//! }
//! ```
//!
//! Secret-store failures use the separate [`StoreError`] family, which the
//! cloud layers recover from locally instead of propagating.

pub mod errors;
pub mod result;

// Re-export commonly used types for convenience
pub use errors::{StoreError, StrataError};
pub use result::Result;
