//! Reassembly of the raw byte stream into protocol frames.
//!
//! The feeder writes one frame per line. Chunks arriving off the transport
//! can split a frame anywhere, including mid-number, so [`FrameReader`]
//! accumulates bytes and only ever yields text that was followed by a
//! `\n` terminator. Blank lines are swallowed; surrounding whitespace
//! (including the `\r` of CRLF-terminating firmware) is trimmed away.
//!
//! A `FrameReader` lives for exactly one connection. When the transport is
//! closed out from under it by `disconnect()`, the blocked read fails and
//! the frame sequence ends; that is the designed cancellation path, not an
//! anomaly.

use std::sync::Arc;

use bytes::BytesMut;
use tracing::debug;

use crate::error::Result;
use crate::transport::Transport;

/// How many bytes to request from the transport per read.
const READ_CHUNK: usize = 1024;

/// Streams trimmed, non-empty frames off a transport.
pub struct FrameReader {
    transport: Arc<dyn Transport>,
    buf: BytesMut,
}

impl FrameReader {
    /// Create a frame reader over an open transport.
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            buf: BytesMut::with_capacity(READ_CHUNK),
        }
    }

    /// Yield the next frame, or `Ok(None)` at end of stream.
    ///
    /// Bytes that were never followed by a terminator are discarded at end
    /// of stream; a partial frame is never delivered.
    pub async fn next_frame(&mut self) -> Result<Option<String>> {
        loop {
            while let Some(pos) = self.buf.iter().position(|&b| b == b'\n') {
                let line = self.buf.split_to(pos + 1);
                let text = String::from_utf8_lossy(&line[..pos]);
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    return Ok(Some(trimmed.to_string()));
                }
            }

            let mut chunk = [0u8; READ_CHUNK];
            let n = self.transport.read(&mut chunk).await?;
            if n == 0 {
                if !self.buf.is_empty() {
                    debug!(
                        pending = self.buf.len(),
                        "stream ended mid-frame, discarding unterminated bytes"
                    );
                }
                return Ok(None);
            }
            self.buf.extend_from_slice(&chunk[..n]);
        }
    }
}

impl std::fmt::Debug for FrameReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameReader")
            .field("buffered", &self.buf.len())
            .finish()
    }
}
