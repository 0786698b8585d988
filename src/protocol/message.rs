//! Message type for the handshake protocol.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ClientError, ClientResult, ValidationErrorKind};

/// A protocol message.
///
/// Every message carries a `type` discriminator identifying the message
/// kind (e.g., "init"); any remaining fields are kind-specific payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// The message kind (e.g., "init", "init_ack").
    #[serde(rename = "type")]
    pub kind: String,

    /// Kind-specific payload fields, flattened into the same JSON object.
    #[serde(flatten)]
    pub payload: serde_json::Map<String, Value>,
}

impl Message {
    /// Create a new message with the given kind and no payload.
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            payload: serde_json::Map::new(),
        }
    }

    /// The handshake opener sent by the client.
    pub fn init() -> Self {
        Self::new("init")
    }

    /// Add a payload field (builder pattern).
    pub fn with_field(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.payload.insert(key.to_string(), value.into());
        self
    }

    /// Validate the message against local schema checks.
    ///
    /// A message is never framed without a non-empty `type`, and no string
    /// anywhere in it may contain a raw newline.
    pub fn validate(&self) -> ClientResult<()> {
        if self.kind.is_empty() {
            return Err(ClientError::Validation {
                kind: ValidationErrorKind::MissingType,
            });
        }

        if self.kind.contains('\n') {
            return Err(ClientError::Validation {
                kind: ValidationErrorKind::EmbeddedNewline {
                    field: "type".to_string(),
                },
            });
        }

        for (key, value) in &self.payload {
            check_no_newline(key, value)?;
        }

        Ok(())
    }
}

/// Recursively reject raw newlines in string values.
fn check_no_newline(field: &str, value: &Value) -> ClientResult<()> {
    match value {
        Value::String(s) if s.contains('\n') => Err(ClientError::Validation {
            kind: ValidationErrorKind::EmbeddedNewline {
                field: field.to_string(),
            },
        }),
        Value::Array(items) => {
            for item in items {
                check_no_newline(field, item)?;
            }
            Ok(())
        }
        Value::Object(map) => {
            for (key, inner) in map {
                check_no_newline(key, inner)?;
            }
            Ok(())
        }
        _ => Ok(()),
    }
}
