//! Client-side copy of the server's game state.
//!
//! The receive task merges records into a [`SharedSnapshot`]; the render
//! loop reads clones of it once per frame. Every merge happens under the
//! write lock after the record has been fully parsed, so a reader sees
//! either the state before a record or after it, never a mix.

use crate::error::NetworkError;
use log::debug;
use shared::{Ball, PlayerId, StateUpdate};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Clone, PartialEq)]
pub struct GameSnapshot {
    /// Paddle vertical positions keyed by player index ("0", "1").
    pub paddles: Option<BTreeMap<String, f32>>,
    pub ball: Option<Ball>,
    pub scores: Option<[u32; 2]>,
    pub countdown: Option<f32>,
    pub winner: Option<PlayerId>,
    /// One-shot; consume with [`SharedSnapshot::take_sound_event`].
    pub sound_event: Option<String>,
    /// Set once the connection fails. Never cleared within a session.
    pub disconnected: bool,
    /// Cleared by the session owner to stop the receive task.
    pub running: bool,
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl GameSnapshot {
    pub fn new() -> Self {
        Self {
            paddles: None,
            ball: None,
            scores: None,
            countdown: None,
            winner: None,
            sound_event: None,
            disconnected: false,
            running: true,
            extra: BTreeMap::new(),
        }
    }

    /// Shallow merge: fields present in `update` replace ours, the rest stay.
    pub fn apply(&mut self, update: StateUpdate) {
        if let Some(paddles) = update.paddles {
            self.paddles = Some(paddles);
        }
        if let Some(ball) = update.ball {
            self.ball = Some(ball);
        }
        if let Some(scores) = update.scores {
            self.scores = Some(scores);
        }
        if let Some(countdown) = update.countdown {
            self.countdown = Some(countdown);
        }
        if let Some(winner) = update.winner {
            self.winner = winner;
        }
        if let Some(sound_event) = update.sound_event {
            self.sound_event = sound_event;
        }
        self.extra.extend(update.extra);
    }

    pub fn paddle(&self, index: usize) -> Option<f32> {
        self.paddles
            .as_ref()
            .and_then(|paddles| paddles.get(&index.to_string()).copied())
    }

    pub fn countdown_active(&self) -> bool {
        self.countdown.map_or(false, |seconds| seconds > 0.0)
    }

    /// True once paddles, ball and scores have all arrived.
    pub fn is_playable(&self) -> bool {
        self.paddles.is_some() && self.ball.is_some() && self.scores.is_some()
    }

    pub fn is_winner(&self, player_id: PlayerId) -> Option<bool> {
        self.winner.map(|winner| winner == player_id)
    }
}

impl Default for GameSnapshot {
    fn default() -> Self {
        Self::new()
    }
}

/// Cloneable handle to the snapshot shared by the receive task and the
/// render loop.
#[derive(Debug, Clone, Default)]
pub struct SharedSnapshot {
    inner: Arc<RwLock<GameSnapshot>>,
}

impl SharedSnapshot {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(GameSnapshot::new())),
        }
    }

    /// Copy of the current state.
    pub async fn read(&self) -> GameSnapshot {
        self.inner.read().await.clone()
    }

    /// Parses one packet and merges it. A packet that does not parse leaves
    /// the snapshot untouched.
    pub async fn merge(&self, packet: &[u8]) -> Result<(), NetworkError> {
        let update = StateUpdate::parse(packet)?;
        self.apply(update).await;
        Ok(())
    }

    pub async fn apply(&self, update: StateUpdate) {
        self.inner.write().await.apply(update);
    }

    pub async fn mark_disconnected(&self) {
        let mut state = self.inner.write().await;
        if !state.disconnected {
            debug!("Snapshot marked disconnected");
        }
        state.disconnected = true;
    }

    pub async fn is_disconnected(&self) -> bool {
        self.inner.read().await.disconnected
    }

    /// Returns the pending sound event and clears it.
    pub async fn take_sound_event(&self) -> Option<String> {
        self.inner.write().await.sound_event.take()
    }

    pub async fn is_running(&self) -> bool {
        self.inner.read().await.running
    }

    /// Asks the receive task to exit at its next liveness check.
    pub async fn stop(&self) {
        self.inner.write().await.running = false;
    }
}
