use crate::connection::Connection;
use crate::error::NetworkError;
use log::debug;
use shared::Command;
use std::sync::Arc;

/// Best-effort writer for player commands.
///
/// Each send is bounded by the connection's write timeout. A failed or
/// timed-out send is reported through the returned `Result` and logged at
/// debug level only; callers polling input every frame are expected to
/// ignore it. Declaring the connection dead is the receive task's job.
#[derive(Debug, Clone)]
pub struct CommandSender {
    connection: Arc<Connection>,
    append_newline: bool,
}

impl CommandSender {
    pub fn new(connection: Arc<Connection>, append_newline: bool) -> Self {
        Self {
            connection,
            append_newline,
        }
    }

    pub async fn send(&self, command: Command) -> Result<(), NetworkError> {
        let payload = command.encode(self.append_newline);
        if let Err(e) = self.connection.write_all(&payload).await {
            debug!("Dropped {} command: {}", command, e);
            return Err(e);
        }
        Ok(())
    }
}
