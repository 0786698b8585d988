//! Handshake orchestration.
//!
//! One handshake is one connection: connect, send a single frame, wait
//! for the first response frame, close. The connection is closed on
//! every exit path, successful or not.

use tokio::sync::Notify;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::client::connection::Connection;
use crate::client::receive::receive_response;
use crate::config::Settings;
use crate::error::ClientResult;
use crate::protocol::{encode, Message};

/// Perform a single request/response handshake with the daemon.
///
/// The outbound message is validated and framed before any I/O occurs,
/// so a validation failure never opens a socket. `cancel` is checked
/// between receive attempts via `notify_one`.
pub async fn handshake(
    settings: &Settings,
    message: &Message,
    cancel: &Notify,
) -> ClientResult<Message> {
    let handshake_id = Uuid::new_v4();

    // Fail fast on a malformed message, before the socket is opened
    let frame = encode(message)?;

    let mut conn = Connection::connect(
        &settings.server.host,
        settings.server.port,
        settings.connect_timeout(),
    )
    .await?;

    info!(
        handshake_id = %handshake_id,
        addr = %conn.addr(),
        kind = %message.kind,
        "Handshake started"
    );

    let result = exchange(&mut conn, &frame, settings, cancel).await;

    // Scoped release: the socket never outlives the handshake
    conn.close().await;

    match &result {
        Ok(response) => {
            info!(
                handshake_id = %handshake_id,
                kind = %response.kind,
                "Handshake completed"
            );
        }
        Err(e) => {
            warn!(handshake_id = %handshake_id, error = %e, "Handshake failed");
        }
    }

    result
}

/// Send `{"type":"init"}` and wait for the daemon's acknowledgement.
pub async fn init_handshake(settings: &Settings, cancel: &Notify) -> ClientResult<Message> {
    handshake(settings, &Message::init(), cancel).await
}

async fn exchange(
    conn: &mut Connection,
    frame: &[u8],
    settings: &Settings,
    cancel: &Notify,
) -> ClientResult<Message> {
    conn.send(frame).await?;
    debug!(addr = %conn.addr(), "Awaiting response");
    receive_response(
        conn,
        &settings.retry_policy(),
        settings.limits.max_frame_size,
        cancel,
    )
    .await
}
