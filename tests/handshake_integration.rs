//! Integration tests for the runlink client.
//!
//! These tests run stub TCP servers on ephemeral ports and perform real
//! handshakes against them to verify end-to-end behavior.

use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio::sync::Notify;

use runlink_client::client::{
    handshake, init_handshake, receive_response, Connection, ConnectionState,
};
use runlink_client::config::Settings;
use runlink_client::error::{ClientError, ConnectionErrorKind};
use runlink_client::protocol::{encode, Message, DEFAULT_MAX_FRAME_SIZE};

/// Build settings pointed at a stub server with short test timeouts.
fn test_settings(port: u16, read_ms: u64, backoff_ms: u64, max_attempts: Option<u32>) -> Settings {
    let mut settings = Settings::default();
    settings.server.host = "127.0.0.1".to_string();
    settings.server.port = port;
    settings.timeouts.connect_ms = 1000;
    settings.timeouts.read_ms = read_ms;
    settings.retry.backoff_ms = backoff_ms;
    settings.retry.max_attempts = max_attempts;
    settings
}

/// Bind a stub server on an ephemeral port and return it with its port.
async fn bind_stub() -> (TcpListener, u16) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind stub server");
    let port = listener.local_addr().expect("No local addr").port();
    (listener, port)
}

#[tokio::test]
async fn test_init_handshake_receives_ack() {
    let (listener, port) = bind_stub().await;

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.expect("accept failed");
        let mut reader = BufReader::new(stream);

        let mut line = String::new();
        reader.read_line(&mut line).await.expect("read failed");
        let request: serde_json::Value = serde_json::from_str(line.trim()).expect("bad request");
        assert_eq!(request["type"], "init");

        let stream = reader.get_mut();
        stream
            .write_all(b"{\"type\":\"init_ack\"}\n")
            .await
            .expect("write failed");
    });

    let settings = test_settings(port, 500, 10, Some(5));
    let cancel = Notify::new();

    let response = init_handshake(&settings, &cancel)
        .await
        .expect("handshake failed");
    assert_eq!(response.kind, "init_ack");
}

#[tokio::test]
async fn test_response_split_across_writes() {
    let (listener, port) = bind_stub().await;

    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.expect("accept failed");
        // Respond without waiting for the request; send the frame in two pieces
        stream.write_all(b"{\"type\":\"init").await.expect("write failed");
        stream.flush().await.expect("flush failed");
        tokio::time::sleep(Duration::from_millis(30)).await;
        stream
            .write_all(b"_ack\",\"run_id\":\"r1\"}\n")
            .await
            .expect("write failed");
    });

    let settings = test_settings(port, 500, 10, Some(5));
    let cancel = Notify::new();

    let response = init_handshake(&settings, &cancel)
        .await
        .expect("handshake failed");
    assert_eq!(response.kind, "init_ack");
    assert_eq!(response.payload.get("run_id"), Some(&serde_json::json!("r1")));
}

#[tokio::test]
async fn test_silent_server_times_out_and_closes_socket() {
    let (listener, port) = bind_stub().await;

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.expect("accept failed");
        // Accept but never write anything
        tokio::time::sleep(Duration::from_secs(30)).await;
        drop(stream);
    });

    let settings = test_settings(port, 50, 10, Some(1));
    let cancel = Notify::new();

    // Drive the connection by hand so the closed state can be verified
    let mut conn = Connection::connect("127.0.0.1", port, Duration::from_secs(1))
        .await
        .expect("connect failed");
    let frame = encode(&Message::init()).expect("encode failed");
    conn.send(&frame).await.expect("send failed");

    let result = receive_response(
        &mut conn,
        &settings.retry_policy(),
        DEFAULT_MAX_FRAME_SIZE,
        &cancel,
    )
    .await;
    assert!(matches!(
        result,
        Err(ClientError::TimeoutExceeded { attempts: 1, .. })
    ));

    conn.close().await;
    assert_eq!(conn.state(), ConnectionState::Closed);

    // The handle is unusable after close
    let send_after_close = conn.send(&frame).await;
    assert!(matches!(
        send_after_close,
        Err(ClientError::Connection {
            kind: ConnectionErrorKind::NotConnected
        })
    ));
}

#[tokio::test]
async fn test_retry_bound_is_exact() {
    let (listener, port) = bind_stub().await;

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.expect("accept failed");
        tokio::time::sleep(Duration::from_secs(30)).await;
        drop(stream);
    });

    let settings = test_settings(port, 50, 10, Some(3));
    let cancel = Notify::new();

    let result = init_handshake(&settings, &cancel).await;
    match result {
        Err(ClientError::TimeoutExceeded { attempts, .. }) => assert_eq!(attempts, 3),
        other => panic!("Expected TimeoutExceeded, got {:?}", other.map(|m| m.kind)),
    }
}

#[tokio::test]
async fn test_malformed_response_fails_without_retry() {
    let (listener, port) = bind_stub().await;

    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.expect("accept failed");
        stream.write_all(b"not json\n").await.expect("write failed");
        // Keep the socket open so the failure is framing, not EOF
        tokio::time::sleep(Duration::from_secs(30)).await;
    });

    let settings = test_settings(port, 500, 1000, Some(5));
    let cancel = Notify::new();

    let start = std::time::Instant::now();
    let result = init_handshake(&settings, &cancel).await;
    assert!(matches!(result, Err(ClientError::Framing { .. })));
    // A framing error is terminal; the backoff never runs
    assert!(start.elapsed() < Duration::from_millis(900));
}

#[tokio::test]
async fn test_server_eof_is_connection_error() {
    let (listener, port) = bind_stub().await;

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.expect("accept failed");
        // Close immediately without writing a response
        drop(stream);
    });

    let settings = test_settings(port, 500, 10, Some(5));
    let cancel = Notify::new();

    let result = init_handshake(&settings, &cancel).await;
    assert!(matches!(
        result,
        Err(ClientError::Connection {
            kind: ConnectionErrorKind::ClosedByPeer
        })
    ));
}

#[tokio::test]
async fn test_connection_refused() {
    // Bind and drop to get a port with no listener
    let (listener, port) = bind_stub().await;
    drop(listener);

    let settings = test_settings(port, 100, 10, Some(1));
    let cancel = Notify::new();

    let result = init_handshake(&settings, &cancel).await;
    assert!(matches!(
        result,
        Err(ClientError::Connection {
            kind: ConnectionErrorKind::ConnectFailed { .. }
        })
    ));
}

#[tokio::test]
async fn test_cancellation_stops_unbounded_retry() {
    let (listener, port) = bind_stub().await;

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.expect("accept failed");
        tokio::time::sleep(Duration::from_secs(30)).await;
        drop(stream);
    });

    // No attempt bound: only cancellation can end this receive loop
    let settings = test_settings(port, 50, 10, None);
    let cancel = Arc::new(Notify::new());

    let cancel_later = Arc::clone(&cancel);
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        cancel_later.notify_one();
    });

    let result = init_handshake(&settings, &cancel).await;
    assert!(matches!(result, Err(ClientError::Cancelled)));
}

#[tokio::test]
async fn test_validation_failure_precedes_io() {
    // No listener at all: a connection attempt would fail, so a
    // validation error proves no socket was opened
    let settings = test_settings(1, 100, 10, Some(1));
    let cancel = Notify::new();

    let bad_message = Message::new("");
    let result = handshake(&settings, &bad_message, &cancel).await;
    assert!(matches!(result, Err(ClientError::Validation { .. })));
}
