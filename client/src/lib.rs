//! # Pong Client Library
//!
//! Client side of a two-player pong game played against an authoritative
//! TCP server. The server owns the simulation; this crate keeps a live copy
//! of its state for the renderer and forwards the player's commands.
//!
//! ## Architecture Overview
//!
//! ### Connection (`connection`)
//! Opens the TCP stream, disables Nagle's algorithm and reads the player id
//! the server sends as its first bytes. Failed attempts are retried with a
//! fixed delay (`retry`) until a server answers.
//!
//! ### Receive Task (`receiver`)
//! Runs on the tokio runtime next to the render loop. Reads with a short
//! timeout so it can notice a stop request, splits the byte stream into
//! newline-delimited records and merges each one into the shared snapshot.
//! Malformed records are logged and skipped; a closed or failed stream marks
//! the snapshot disconnected and ends the task.
//!
//! ### Game Snapshot (`game`)
//! The latest known server state behind an async `RwLock`. Records are
//! merged shallowly, so the server can send only the fields that changed.
//!
//! ### Commands (`sender`)
//! `UP`, `DOWN` and `RESTART` written as plain text. Sending is best effort:
//! failures come back as a `Result` the input loop may ignore.
//!
//! ### Session (`session`)
//! Ties the pieces together for one game: connect, spawn the receive task,
//! send commands, tear down. Ending a session twice is harmless.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use client::config::ClientConfig;
//! use client::session::Session;
//! use shared::Command;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let session = Session::start(ClientConfig::new("127.0.0.1", 8080)).await?;
//!     println!("Playing as {}", session.player_id());
//!
//!     let _ = session.send(Command::Up).await;
//!     let state = session.snapshot().read().await;
//!     if let Some([left, right]) = state.scores {
//!         println!("{} : {}", left, right);
//!     }
//!
//!     session.shutdown().await;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod connection;
pub mod error;
pub mod game;
pub mod input;
pub mod receiver;
pub mod rendering;
pub mod retry;
pub mod sender;
pub mod session;
