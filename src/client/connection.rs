//! TCP connection handle with explicit lifecycle.

use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::debug;

use crate::error::{ClientError, ClientResult, ConnectionErrorKind};

/// Size of each socket read.
pub const READ_CHUNK_SIZE: usize = 1024;

/// Lifecycle state of a connection.
///
/// A handle only exists once connected; "disconnected" is the absence of
/// a handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connected,
    AwaitingResponse,
    Closed,
}

/// Outcome of a single chunk read.
#[derive(Debug)]
pub enum ReadOutcome {
    /// Bytes arrived within the read timeout.
    Data(Vec<u8>),
    /// No bytes arrived within the read timeout. Not an error; the
    /// receive loop decides whether to retry.
    TimedOut,
}

/// Exclusive ownership handle over one TCP socket.
///
/// Created at the start of a handshake and closed at the end of it,
/// successful or not. Never reused across handshakes.
#[derive(Debug)]
pub struct Connection {
    stream: Option<TcpStream>,
    state: ConnectionState,
    addr: String,
}

impl Connection {
    /// Establish a TCP connection within `connect_timeout`.
    pub async fn connect(host: &str, port: u16, connect_timeout: Duration) -> ClientResult<Self> {
        let addr = format!("{}:{}", host, port);

        let stream = match timeout(connect_timeout, TcpStream::connect(&addr)).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => {
                return Err(ClientError::Connection {
                    kind: ConnectionErrorKind::ConnectFailed {
                        addr,
                        message: e.to_string(),
                    },
                })
            }
            Err(_) => {
                return Err(ClientError::Connection {
                    kind: ConnectionErrorKind::ConnectTimeout {
                        addr,
                        timeout: connect_timeout,
                    },
                })
            }
        };

        debug!(addr = %addr, "Connected");

        Ok(Self {
            stream: Some(stream),
            state: ConnectionState::Connected,
            addr,
        })
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Remote address this connection was opened against.
    pub fn addr(&self) -> &str {
        &self.addr
    }

    /// Write an encoded frame in full and flush it to the OS send buffer.
    pub async fn send(&mut self, frame: &[u8]) -> ClientResult<()> {
        let stream = self.stream_mut()?;

        stream.write_all(frame).await.map_err(|e| ClientError::Connection {
            kind: ConnectionErrorKind::SendFailed {
                message: e.to_string(),
            },
        })?;
        stream.flush().await.map_err(|e| ClientError::Connection {
            kind: ConnectionErrorKind::SendFailed {
                message: e.to_string(),
            },
        })?;

        debug!(addr = %self.addr, bytes = frame.len(), "Frame sent");
        self.state = ConnectionState::AwaitingResponse;
        Ok(())
    }

    /// Read up to [`READ_CHUNK_SIZE`] bytes, bounded by `read_timeout`.
    ///
    /// An elapsed timeout is reported as [`ReadOutcome::TimedOut`] rather
    /// than an error. A 0-byte read means the peer closed the socket and
    /// is a connection error.
    pub async fn receive_chunk(&mut self, read_timeout: Duration) -> ClientResult<ReadOutcome> {
        let stream = self.stream_mut()?;

        let mut buf = [0u8; READ_CHUNK_SIZE];
        match timeout(read_timeout, stream.read(&mut buf)).await {
            Err(_) => Ok(ReadOutcome::TimedOut),
            Ok(Ok(0)) => Err(ClientError::Connection {
                kind: ConnectionErrorKind::ClosedByPeer,
            }),
            Ok(Ok(n)) => Ok(ReadOutcome::Data(buf[..n].to_vec())),
            Ok(Err(e)) => Err(ClientError::Connection {
                kind: ConnectionErrorKind::ReceiveFailed {
                    message: e.to_string(),
                },
            }),
        }
    }

    /// Close the connection. Idempotent and best-effort; invoked on every
    /// exit path of a handshake.
    pub async fn close(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            // Shutdown failures are irrelevant once we are discarding the handle
            let _ = stream.shutdown().await;
            debug!(addr = %self.addr, "Connection closed");
        }
        self.state = ConnectionState::Closed;
    }

    fn stream_mut(&mut self) -> ClientResult<&mut TcpStream> {
        self.stream.as_mut().ok_or(ClientError::Connection {
            kind: ConnectionErrorKind::NotConnected,
        })
    }
}
