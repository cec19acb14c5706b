use std::io;
use std::time::Duration;
use thiserror::Error;

/// Failures surfaced by the network layer.
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),

    #[error("no handshake from server within {0:?}")]
    HandshakeTimeout(Duration),

    #[error("invalid player id in handshake: {0:?}")]
    InvalidHandshake(String),

    #[error("connection closed by server")]
    PeerClosed,

    #[error("write did not complete within {0:?}")]
    WriteTimeout(Duration),

    #[error("connection already closed")]
    ConnectionClosed,

    #[error("malformed packet: {0}")]
    MalformedPacket(#[from] serde_json::Error),
}

