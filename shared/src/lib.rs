use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

pub mod framing;

pub use framing::{split_frames, FrameDecoder};

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 8080;

/// Size of the single read that carries the player id on connect.
pub const HANDSHAKE_LEN: usize = 24;
/// Bound on waiting for the player id. Much longer than the read timeout:
/// a server that is slow to answer a fresh accept should not burn a retry
/// attempt on every connect.
pub const HANDSHAKE_TIMEOUT_MS: u64 = 5000;
pub const READ_TIMEOUT_MS: u64 = 100;
/// Bound on one command write, so a server that stops reading cannot stall
/// the caller.
pub const WRITE_TIMEOUT_MS: u64 = 100;
pub const RETRY_DELAY_MS: u64 = 1000;
pub const READ_CHUNK_SIZE: usize = 1024;

/// Records on the wire are terminated by this byte.
pub const DELIMITER: u8 = b'\n';

/// Whether commands carry a trailing delimiter. Must match the server build.
pub const COMMAND_APPEND_NEWLINE: bool = false;

pub const WORLD_WIDTH: f32 = 800.0;
pub const WORLD_HEIGHT: f32 = 600.0;
pub const PADDLE_WIDTH: f32 = 20.0;
pub const PADDLE_HEIGHT: f32 = 100.0;
pub const BALL_RADIUS: f32 = 10.0;

pub type PlayerId = u32;

/// Control commands understood by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Up,
    Down,
    Restart,
}

impl Command {
    pub fn as_str(&self) -> &'static str {
        match self {
            Command::Up => "UP",
            Command::Down => "DOWN",
            Command::Restart => "RESTART",
        }
    }

    pub fn encode(&self, append_newline: bool) -> Vec<u8> {
        let mut bytes = self.as_str().as_bytes().to_vec();
        if append_newline {
            bytes.push(DELIMITER);
        }
        bytes
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCommand(pub String);

impl fmt::Display for UnknownCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown command {:?}", self.0)
    }
}

impl std::error::Error for UnknownCommand {}

impl FromStr for Command {
    type Err = UnknownCommand;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "UP" => Ok(Command::Up),
            "DOWN" => Ok(Command::Down),
            "RESTART" => Ok(Command::Restart),
            other => Err(UnknownCommand(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    pub x: f32,
    pub y: f32,
}

/// One server record. Every field is optional; absent fields leave the
/// client's copy untouched.
///
/// `winner` and `sound_event` are nullable: `Some(None)` means the server
/// explicitly sent `null` and the field must be cleared.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StateUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paddles: Option<BTreeMap<String, f32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ball: Option<Ball>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scores: Option<[u32; 2]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub countdown: Option<f32>,
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub winner: Option<Option<PlayerId>>,
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub sound_event: Option<Option<String>>,
    /// Fields this client does not know about yet.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl StateUpdate {
    pub fn parse(packet: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(packet)
    }

    pub fn is_empty(&self) -> bool {
        *self == StateUpdate::default()
    }
}

// Present-but-null must stay distinguishable from absent.
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
