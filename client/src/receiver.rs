//! Background task feeding server records into the shared snapshot.

use crate::game::SharedSnapshot;
use log::{debug, error, info, warn};
use shared::{FrameDecoder, READ_CHUNK_SIZE};
use std::io::ErrorKind;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::time::timeout;

/// Why the receive loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiveExit {
    /// The owner cleared the liveness flag.
    Stopped,
    /// The server closed the stream.
    PeerClosed,
    /// The read failed with an I/O error.
    Failed,
}

pub struct ReceiveLoop {
    snapshot: SharedSnapshot,
    decoder: FrameDecoder,
    read_timeout: Duration,
    merged: u64,
    dropped: u64,
}

impl ReceiveLoop {
    pub fn new(snapshot: SharedSnapshot, read_timeout: Duration) -> Self {
        Self {
            snapshot,
            decoder: FrameDecoder::new(),
            read_timeout,
            merged: 0,
            dropped: 0,
        }
    }

    /// Seeds the raw buffer with bytes that were read before the loop started.
    pub fn with_initial_bytes(mut self, bytes: &[u8]) -> Self {
        self.decoder.extend(bytes);
        self
    }

    /// Reads until stopped, the peer closes, or the read fails.
    ///
    /// Each read is bounded by the read timeout so the liveness flag is
    /// checked at least that often. Stream end and read failure both mark
    /// the snapshot disconnected unless the owner already asked to stop.
    pub async fn run<R>(mut self, mut reader: R) -> ReceiveExit
    where
        R: AsyncRead + Unpin,
    {
        let mut buffer = [0u8; READ_CHUNK_SIZE];
        self.process_frames().await;

        let exit = loop {
            if !self.snapshot.is_running().await {
                break ReceiveExit::Stopped;
            }

            match timeout(self.read_timeout, reader.read(&mut buffer)).await {
                Err(_) => continue,
                Ok(Ok(0)) => {
                    if !self.snapshot.is_running().await {
                        break ReceiveExit::Stopped;
                    }
                    info!("Server closed the connection");
                    self.snapshot.mark_disconnected().await;
                    break ReceiveExit::PeerClosed;
                }
                Ok(Ok(len)) => {
                    self.decoder.extend(&buffer[..len]);
                    self.process_frames().await;
                }
                Ok(Err(e)) if is_transient(e.kind()) => continue,
                Ok(Err(e)) => {
                    if !self.snapshot.is_running().await {
                        break ReceiveExit::Stopped;
                    }
                    error!("Error receiving data: {}", e);
                    self.snapshot.mark_disconnected().await;
                    break ReceiveExit::Failed;
                }
            }
        };

        debug!(
            "Receive loop exited ({:?}): {} packets merged, {} dropped",
            exit, self.merged, self.dropped
        );
        exit
    }

    async fn process_frames(&mut self) {
        for frame in self.decoder.drain_frames() {
            match self.snapshot.merge(&frame).await {
                Ok(()) => self.merged += 1,
                Err(e) => {
                    self.dropped += 1;
                    warn!(
                        "Dropping malformed packet {:?}: {}",
                        String::from_utf8_lossy(&frame),
                        e
                    );
                }
            }
        }
    }
}

fn is_transient(kind: ErrorKind) -> bool {
    matches!(
        kind,
        ErrorKind::WouldBlock | ErrorKind::TimedOut | ErrorKind::Interrupted
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use std::io;
    use tokio_test::io::Builder;

    const TICK: Duration = Duration::from_millis(20);

    #[tokio::test]
    async fn test_fragmented_record_merged_once_complete() {
        let snapshot = SharedSnapshot::new();
        let reader = Builder::new()
            .read(b"{\"scores\":[0,0]}\n{\"ball\":")
            .read(b"{\"x\":1,\"y\":2}}\n")
            .build();

        let exit = ReceiveLoop::new(snapshot.clone(), TICK).run(reader).await;
        assert_eq!(exit, ReceiveExit::PeerClosed);

        let state = snapshot.read().await;
        assert_eq!(state.scores, Some([0, 0]));
        let ball = state.ball.unwrap();
        assert_approx_eq!(ball.x, 1.0);
        assert_approx_eq!(ball.y, 2.0);
    }

    #[tokio::test]
    async fn test_idle_reads_do_not_lose_data() {
        let snapshot = SharedSnapshot::new();
        let reader = Builder::new()
            .wait(TICK * 5)
            .read(b"{\"sound_event\":\"wall_hit\"}\n")
            .build();

        let exit = ReceiveLoop::new(snapshot.clone(), TICK).run(reader).await;
        assert_eq!(exit, ReceiveExit::PeerClosed);

        assert_eq!(snapshot.take_sound_event().await, Some("wall_hit".into()));
        assert_eq!(snapshot.take_sound_event().await, None);
    }

    #[tokio::test]
    async fn test_malformed_packet_does_not_stop_loop() {
        let snapshot = SharedSnapshot::new();
        let reader = Builder::new()
            .read(b"{\"scores\":[1,0]}\n{not json}\n\n{\"countdown\":2}\n")
            .build();

        let receive_loop = ReceiveLoop::new(snapshot.clone(), TICK);
        assert_eq!(receive_loop.run(reader).await, ReceiveExit::PeerClosed);

        let state = snapshot.read().await;
        assert_eq!(state.scores, Some([1, 0]));
        assert_eq!(state.countdown, Some(2.0));
    }

    #[tokio::test]
    async fn test_peer_close_marks_disconnected() {
        let snapshot = SharedSnapshot::new();
        let reader = Builder::new().read(b"{\"scores\":[3,4]}\n").build();

        ReceiveLoop::new(snapshot.clone(), TICK).run(reader).await;
        assert!(snapshot.is_disconnected().await);
        assert_eq!(snapshot.read().await.scores, Some([3, 4]));
    }

    #[tokio::test]
    async fn test_read_error_marks_disconnected() {
        let snapshot = SharedSnapshot::new();
        let reader = Builder::new()
            .read(b"{\"scores\":[1,1]}\n")
            .read_error(io::Error::new(ErrorKind::ConnectionReset, "reset"))
            .build();

        let exit = ReceiveLoop::new(snapshot.clone(), TICK).run(reader).await;
        assert_eq!(exit, ReceiveExit::Failed);
        assert!(snapshot.is_disconnected().await);
        assert_eq!(snapshot.read().await.scores, Some([1, 1]));
    }

    #[tokio::test]
    async fn test_stop_flag_ends_loop_without_error() {
        let snapshot = SharedSnapshot::new();
        let reader = Builder::new().wait(Duration::from_secs(2)).build();

        let task = tokio::spawn(ReceiveLoop::new(snapshot.clone(), TICK).run(reader));
        tokio::time::sleep(TICK * 3).await;
        snapshot.stop().await;

        let exit = tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .expect("receive loop did not observe the stop flag")
            .unwrap();
        assert_eq!(exit, ReceiveExit::Stopped);
        assert!(!snapshot.is_disconnected().await);
    }

    #[tokio::test]
    async fn test_initial_bytes_are_decoded_first() {
        let snapshot = SharedSnapshot::new();
        let reader = Builder::new().read(b"0]}\n").build();

        ReceiveLoop::new(snapshot.clone(), TICK)
            .with_initial_bytes(b"\n{\"scores\":[2,")
            .run(reader)
            .await;

        assert_eq!(snapshot.read().await.scores, Some([2, 0]));
    }

    #[tokio::test]
    async fn test_eof_after_stop_is_not_a_disconnect() {
        let snapshot = SharedSnapshot::new();
        snapshot.stop().await;
        let reader = Builder::new().build();

        let exit = ReceiveLoop::new(snapshot.clone(), TICK).run(reader).await;
        assert_eq!(exit, ReceiveExit::Stopped);
        assert!(!snapshot.is_disconnected().await);
    }
}
