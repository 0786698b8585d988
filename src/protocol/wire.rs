//! Wire format for message framing.
//!
//! Messages are newline-delimited: one UTF-8 JSON object per line,
//! terminated by exactly one `\n`. There is no length prefix; framing
//! relies entirely on the newline delimiter.

use serde_json::Value;

use crate::error::{ClientError, ClientResult, FramingErrorKind, ValidationErrorKind};
use crate::protocol::Message;

/// Maximum frame size (1 MiB by default, can be overridden via config).
pub const DEFAULT_MAX_FRAME_SIZE: usize = 1_048_576;

/// Outcome of a decode pass over an accumulation buffer.
#[derive(Debug)]
pub enum Decoded {
    /// A complete frame was found. `remainder` holds the bytes after the
    /// newline, to be fed into the next decode call.
    Complete { message: Message, remainder: Vec<u8> },

    /// No newline yet; the caller must accumulate more bytes.
    NeedMoreData,
}

/// Encode a message as a single newline-terminated frame.
///
/// Validates the message first and fails with a validation error before
/// any I/O occurs. The returned frame ends with exactly one `\n` and
/// contains no other newline byte (serde_json escapes newlines inside
/// strings, and `validate` rejects raw ones outright).
pub fn encode(message: &Message) -> ClientResult<Vec<u8>> {
    message.validate()?;

    let mut frame = serde_json::to_vec(message).map_err(|e| ClientError::Validation {
        kind: ValidationErrorKind::NotSerializable {
            message: e.to_string(),
        },
    })?;

    frame.push(b'\n');
    Ok(frame)
}

/// Decode the first complete frame from `buffer`.
///
/// Scans for the first newline. If none is present, signals
/// [`Decoded::NeedMoreData`] unless the buffer has already outgrown
/// `max_frame_size`. If found, the preceding bytes must parse as a JSON
/// object with a non-empty string `type` field.
pub fn decode(buffer: &[u8], max_frame_size: usize) -> ClientResult<Decoded> {
    let newline = match buffer.iter().position(|&b| b == b'\n') {
        Some(pos) => pos,
        None => {
            if buffer.len() > max_frame_size {
                return Err(ClientError::Framing {
                    kind: FramingErrorKind::FrameTooLarge {
                        size: buffer.len(),
                        max: max_frame_size,
                    },
                });
            }
            return Ok(Decoded::NeedMoreData);
        }
    };

    if newline > max_frame_size {
        return Err(ClientError::Framing {
            kind: FramingErrorKind::FrameTooLarge {
                size: newline,
                max: max_frame_size,
            },
        });
    }

    let line = &buffer[..newline];
    let value: Value = serde_json::from_slice(line).map_err(|e| ClientError::Framing {
        kind: FramingErrorKind::InvalidJson {
            message: e.to_string(),
        },
    })?;

    let object = match value {
        Value::Object(map) => map,
        _ => {
            return Err(ClientError::Framing {
                kind: FramingErrorKind::NotAnObject,
            })
        }
    };

    let kind = match object.get("type") {
        None => {
            return Err(ClientError::Framing {
                kind: FramingErrorKind::MissingType,
            })
        }
        Some(Value::String(s)) if s.is_empty() => {
            return Err(ClientError::Framing {
                kind: FramingErrorKind::MissingType,
            })
        }
        Some(Value::String(s)) => s.clone(),
        Some(_) => {
            return Err(ClientError::Framing {
                kind: FramingErrorKind::TypeNotString,
            })
        }
    };

    let mut payload = object;
    payload.remove("type");

    Ok(Decoded::Complete {
        message: Message { kind, payload },
        remainder: buffer[newline + 1..].to_vec(),
    })
}
