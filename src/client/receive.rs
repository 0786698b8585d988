//! Receive loop for the handshake response.
//!
//! A small state machine that waits for response bytes, retries on pure
//! read timeouts with a fixed backoff, and surfaces the first complete
//! frame or a terminal failure. Timeouts are the only retried condition;
//! connection and framing errors fail immediately.

use std::time::Duration;

use tokio::sync::Notify;
use tracing::{debug, trace};

use crate::client::connection::{Connection, ReadOutcome};
use crate::error::{ClientError, ClientResult};
use crate::protocol::{decode, Decoded, Message};

/// Retry behavior for one receive operation.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Per-attempt read timeout.
    pub read_timeout: Duration,
    /// Fixed sleep between timed-out attempts.
    pub backoff: Duration,
    /// Attempt bound. `None` retries indefinitely on timeouts;
    /// cancellation still applies between attempts.
    pub max_attempts: Option<u32>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            read_timeout: Duration::from_millis(1000),
            backoff: Duration::from_millis(1000),
            max_attempts: Some(30),
        }
    }
}

/// Transient counters owned by a single receive operation.
#[derive(Debug, Default)]
struct RetryState {
    attempts: u32,
}

/// Wait for the first complete response frame on `conn`.
///
/// Bytes are accumulated across chunk reads until the framer yields a
/// complete message; a partial frame does not count as a timed-out
/// attempt. The `cancel` signal is raced against each read, so a
/// cancellation request takes effect at the next iteration boundary.
pub async fn receive_response(
    conn: &mut Connection,
    policy: &RetryPolicy,
    max_frame_size: usize,
    cancel: &Notify,
) -> ClientResult<Message> {
    let mut state = RetryState::default();
    let mut buffer: Vec<u8> = Vec::new();

    loop {
        let outcome = tokio::select! {
            biased;
            _ = cancel.notified() => {
                debug!(attempts = state.attempts, "Receive cancelled");
                return Err(ClientError::Cancelled);
            }
            outcome = conn.receive_chunk(policy.read_timeout) => outcome?,
        };

        match outcome {
            ReadOutcome::Data(bytes) => {
                trace!(bytes = bytes.len(), buffered = buffer.len(), "Chunk received");
                buffer.extend_from_slice(&bytes);

                match decode(&buffer, max_frame_size)? {
                    Decoded::Complete { message, remainder } => {
                        if !remainder.is_empty() {
                            debug!(bytes = remainder.len(), "Discarding bytes after first frame");
                        }
                        debug!(kind = %message.kind, "Response received");
                        return Ok(message);
                    }
                    Decoded::NeedMoreData => continue,
                }
            }
            ReadOutcome::TimedOut => {
                state.attempts += 1;

                if let Some(max) = policy.max_attempts {
                    if state.attempts >= max {
                        return Err(ClientError::TimeoutExceeded {
                            attempts: state.attempts,
                            per_attempt: policy.read_timeout,
                        });
                    }
                }

                debug!(
                    attempts = state.attempts,
                    backoff_ms = policy.backoff.as_millis() as u64,
                    "No response yet, backing off"
                );
                tokio::time::sleep(policy.backoff).await;
            }
        }
    }
}
