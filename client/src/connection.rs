//! TCP connect, player-id handshake and the shared connection handle.

use crate::config::ClientConfig;
use crate::error::NetworkError;
use crate::retry::retry;
use log::{debug, info};
use shared::{PlayerId, HANDSHAKE_LEN};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio::time::timeout;

/// Write side of an open connection, shared by the session and the
/// receive task. Closing is idempotent; every write is time-bounded.
#[derive(Debug)]
pub struct Connection {
    peer: SocketAddr,
    writer: Mutex<Option<OwnedWriteHalf>>,
    write_timeout: Duration,
    closed: AtomicBool,
}

impl Connection {
    pub fn new(peer: SocketAddr, writer: OwnedWriteHalf, write_timeout: Duration) -> Self {
        Self {
            peer,
            writer: Mutex::new(Some(writer)),
            write_timeout,
            closed: AtomicBool::new(false),
        }
    }

    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Writes `bytes`, giving up after the write timeout. Waiting for the
    /// writer lock counts against the same bound.
    pub async fn write_all(&self, bytes: &[u8]) -> Result<(), NetworkError> {
        let write = async {
            let mut guard = self.writer.lock().await;
            let writer = guard.as_mut().ok_or(NetworkError::ConnectionClosed)?;
            writer.write_all(bytes).await?;
            Ok::<(), NetworkError>(())
        };

        timeout(self.write_timeout, write)
            .await
            .map_err(|_| NetworkError::WriteTimeout(self.write_timeout))?
    }

    /// Shuts the connection down. Returns `false` if it was already closed.
    pub async fn close(&self) -> bool {
        if self.closed.swap(true, Ordering::SeqCst) {
            return false;
        }

        if let Some(mut writer) = self.writer.lock().await.take() {
            if let Err(e) = writer.shutdown().await {
                debug!("Shutdown of connection to {} failed: {}", self.peer, e);
            }
        }
        info!("Connection to {} closed", self.peer);
        true
    }
}

/// Result of a successful connect + handshake.
#[derive(Debug)]
pub struct Established {
    pub player_id: PlayerId,
    pub connection: Arc<Connection>,
    pub reader: OwnedReadHalf,
    /// Record bytes that arrived in the same read as the player id.
    pub leftover: Vec<u8>,
}

pub struct Connector {
    config: ClientConfig,
}

impl Connector {
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }

    /// Connects and performs the handshake, retrying per the configured
    /// policy. With the default `RetryPolicy::forever` this only resolves
    /// once a server has answered.
    pub async fn connect(&self) -> Result<Established, NetworkError> {
        let address = self.config.address();
        info!("Connecting to {}...", address);

        let established = retry(&self.config.retry, |attempt| {
            debug!("Connect attempt {} to {}", attempt, address);
            self.try_connect()
        })
        .await?;

        info!(
            "Connected to {}. Player ID: {}",
            established.connection.peer(),
            established.player_id
        );
        Ok(established)
    }

    async fn open_stream(&self) -> Result<TcpStream, NetworkError> {
        let stream = TcpStream::connect(self.config.address()).await?;
        stream.set_nodelay(true)?;
        Ok(stream)
    }

    async fn try_connect(&self) -> Result<Established, NetworkError> {
        let mut stream = self.open_stream().await?;
        let peer = stream.peer_addr()?;

        let mut buffer = [0u8; HANDSHAKE_LEN];
        let len = timeout(self.config.handshake_timeout, stream.read(&mut buffer))
            .await
            .map_err(|_| NetworkError::HandshakeTimeout(self.config.handshake_timeout))??;
        if len == 0 {
            return Err(NetworkError::PeerClosed);
        }

        let (player_id, leftover) = parse_handshake(&buffer[..len])?;
        let (reader, writer) = stream.into_split();

        Ok(Established {
            player_id,
            connection: Arc::new(Connection::new(peer, writer, self.config.write_timeout)),
            reader,
            leftover: leftover.to_vec(),
        })
    }
}

/// Parses the player id sent as ASCII digits on connect.
///
/// Bytes after the digits are returned untouched; they belong to the first
/// state record.
pub fn parse_handshake(data: &[u8]) -> Result<(PlayerId, &[u8]), NetworkError> {
    let invalid = || NetworkError::InvalidHandshake(String::from_utf8_lossy(data).into_owned());

    let start = data
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .ok_or_else(invalid)?;
    let digits = data[start..]
        .iter()
        .take_while(|b| b.is_ascii_digit())
        .count();
    if digits == 0 {
        return Err(invalid());
    }

    let end = start + digits;
    let rest = &data[end..];
    match rest.first() {
        None => {}
        Some(b) if b.is_ascii_whitespace() || *b == b'{' => {}
        Some(_) => return Err(invalid()),
    }

    let player_id = std::str::from_utf8(&data[start..end])
        .ok()
        .and_then(|text| text.parse::<PlayerId>().ok())
        .ok_or_else(invalid)?;

    Ok((player_id, rest))
}
