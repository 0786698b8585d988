//! Client module.
//!
//! Handles the TCP connection lifecycle, the retrying receive loop, and
//! handshake orchestration.

mod connection;
mod handshake;
mod receive;

pub use connection::{Connection, ConnectionState, ReadOutcome, READ_CHUNK_SIZE};
pub use handshake::{handshake, init_handshake};
pub use receive::{receive_response, RetryPolicy};
