//! Wire protocol module.
//!
//! Defines the message type and line framing for socket communication.
//!
//! ## Wire Format
//!
//! Messages are newline-delimited JSON:
//! ```text
//! {"type": "init"}\n
//! ```

mod message;
mod wire;

pub use message::Message;
pub use wire::{decode, encode, Decoded, DEFAULT_MAX_FRAME_SIZE};
