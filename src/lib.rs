//! Runlink Client Library
//!
//! This crate provides the client-side handshake for the runlink
//! run-tracking daemon: one newline-delimited JSON message over TCP,
//! answered by the first complete response frame.

pub mod client;
pub mod config;
pub mod error;
pub mod protocol;
