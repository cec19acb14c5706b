//! Session lifecycle: connect, spawn the receive task, tear down.

use crate::config::ClientConfig;
use crate::connection::{Connection, Connector};
use crate::error::NetworkError;
use crate::game::SharedSnapshot;
use crate::receiver::{ReceiveExit, ReceiveLoop};
use crate::sender::CommandSender;
use log::{debug, info, warn};
use shared::{Command, PlayerId};
use std::sync::Arc;
use tokio::task::JoinHandle;

/// One connection to the server, from handshake to teardown.
///
/// Snapshot and raw buffer are created fresh per session; a new session
/// never inherits a previous session's disconnect flag. Dropping a session
/// without `shutdown` aborts the receive task, which releases the socket.
pub struct Session {
    player_id: PlayerId,
    connection: Arc<Connection>,
    snapshot: SharedSnapshot,
    sender: CommandSender,
    receive_task: Option<JoinHandle<ReceiveExit>>,
}

impl Session {
    /// Connects (retrying per `config.retry`) and starts the receive task.
    pub async fn start(config: ClientConfig) -> Result<Self, NetworkError> {
        let established = Connector::new(config.clone()).connect().await?;

        let snapshot = SharedSnapshot::new();
        let receive_loop = ReceiveLoop::new(snapshot.clone(), config.read_timeout)
            .with_initial_bytes(&established.leftover);

        let connection = Arc::clone(&established.connection);
        let reader = established.reader;
        let receive_task = tokio::spawn(async move {
            let exit = receive_loop.run(reader).await;
            connection.close().await;
            exit
        });

        Ok(Self {
            player_id: established.player_id,
            sender: CommandSender::new(Arc::clone(&established.connection), config.append_newline),
            connection: established.connection,
            snapshot,
            receive_task: Some(receive_task),
        })
    }

    pub fn player_id(&self) -> PlayerId {
        self.player_id
    }

    pub fn snapshot(&self) -> &SharedSnapshot {
        &self.snapshot
    }

    pub async fn send(&self, command: Command) -> Result<(), NetworkError> {
        self.sender.send(command).await
    }

    /// Clears the liveness flag and closes the connection. Safe to call
    /// repeatedly and after the receive task has already stopped.
    pub async fn end(&self) {
        self.snapshot.stop().await;
        if self.connection.close().await {
            info!("Session for player {} ended", self.player_id);
        }
    }

    /// Ends the session and waits for the receive task to exit.
    pub async fn shutdown(mut self) -> Option<ReceiveExit> {
        self.end().await;
        let task = self.receive_task.take()?;
        match task.await {
            Ok(exit) => Some(exit),
            Err(e) => {
                warn!("Receive task did not finish cleanly: {}", e);
                None
            }
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Some(task) = self.receive_task.take() {
            debug!("Session for player {} dropped, aborting receive task", self.player_id);
            task.abort();
        }
    }
}
