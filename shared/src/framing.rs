//! Newline framing for the server's record stream.
//!
//! TCP delivers an unstructured byte stream: one read may hold several
//! records, half of one, or a record split in the middle of a UTF-8
//! sequence. [`FrameDecoder`] owns the carried-over bytes between reads and
//! hands back complete frames in arrival order.

use crate::DELIMITER;

/// Splits `buffer` on the delimiter.
///
/// Returns the complete frames in order and the unterminated remainder.
/// Frames that are empty or whitespace-only are dropped.
pub fn split_frames(buffer: &[u8]) -> (Vec<&[u8]>, &[u8]) {
    let mut frames = Vec::new();
    let mut rest = buffer;

    while let Some(pos) = rest.iter().position(|&b| b == DELIMITER) {
        let frame = &rest[..pos];
        if !is_blank(frame) {
            frames.push(frame);
        }
        rest = &rest[pos + 1..];
    }

    (frames, rest)
}

fn is_blank(frame: &[u8]) -> bool {
    frame.iter().all(|b| b.is_ascii_whitespace())
}

/// Accumulates raw bytes and yields complete frames.
#[derive(Debug, Default, Clone)]
pub struct FrameDecoder {
    buffer: Vec<u8>,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self { buffer: Vec::new() }
    }

    pub fn extend(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    /// Removes and returns every complete frame, keeping the remainder.
    pub fn drain_frames(&mut self) -> Vec<Vec<u8>> {
        let (frames, rest) = split_frames(&self.buffer);
        if frames.is_empty() && rest.len() == self.buffer.len() {
            return Vec::new();
        }

        let frames: Vec<Vec<u8>> = frames.into_iter().map(<[u8]>::to_vec).collect();
        let consumed = self.buffer.len() - rest.len();
        self.buffer.drain(..consumed);
        frames
    }

    /// Bytes received but not yet terminated by a delimiter.
    pub fn pending(&self) -> &[u8] {
        &self.buffer
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}
