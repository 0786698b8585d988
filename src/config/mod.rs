//! Configuration module for the runlink client.
//!
//! Handles loading and validating client configuration from TOML files.

mod settings;

pub use settings::*;
