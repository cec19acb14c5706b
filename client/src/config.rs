use crate::retry::RetryPolicy;
use shared::{
    COMMAND_APPEND_NEWLINE, DEFAULT_HOST, DEFAULT_PORT, HANDSHAKE_TIMEOUT_MS, READ_TIMEOUT_MS,
    RETRY_DELAY_MS, WRITE_TIMEOUT_MS,
};
use std::time::Duration;

/// Connection settings for one client session.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub host: String,
    pub port: u16,
    /// Upper bound on a single socket read; also how often the receive loop
    /// re-checks its liveness flag.
    pub read_timeout: Duration,
    pub handshake_timeout: Duration,
    /// Upper bound on sending one command.
    pub write_timeout: Duration,
    pub retry: RetryPolicy,
    /// Terminate commands with a newline. Deployment-wide, must match the server.
    pub append_newline: bool,
}

impl ClientConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            read_timeout: Duration::from_millis(READ_TIMEOUT_MS),
            handshake_timeout: Duration::from_millis(HANDSHAKE_TIMEOUT_MS),
            write_timeout: Duration::from_millis(WRITE_TIMEOUT_MS),
            retry: RetryPolicy::forever(Duration::from_millis(RETRY_DELAY_MS)),
            append_newline: COMMAND_APPEND_NEWLINE,
        }
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn with_read_timeout(mut self, read_timeout: Duration) -> Self {
        self.read_timeout = read_timeout;
        self
    }

    pub fn with_handshake_timeout(mut self, handshake_timeout: Duration) -> Self {
        self.handshake_timeout = handshake_timeout;
        self
    }

    pub fn with_write_timeout(mut self, write_timeout: Duration) -> Self {
        self.write_timeout = write_timeout;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_append_newline(mut self, append_newline: bool) -> Self {
        self.append_newline = append_newline;
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_HOST, DEFAULT_PORT)
    }
}
