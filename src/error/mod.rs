//! Error types for the runlink client.
//!
//! Provides a unified error handling system using thiserror.

mod types;

pub use types::*;
