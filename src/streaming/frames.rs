//! Newline-delimited framing of upstream byte streams
//!
//! Upstream chunks do not line up with event boundaries. [`FrameBuffer`]
//! re-cuts them into frames that each end in `\n`, byte for byte: no
//! decoding, no trimming, blank separator lines kept as their own frames.

use bytes::{Bytes, BytesMut};
use futures::{Stream, StreamExt};

use super::{FrameSource, UpstreamReadError};

/// Buffer for accumulating incomplete lines across chunk boundaries
///
/// # Example
/// ```
/// use claude_proxy::streaming::FrameBuffer;
///
/// let mut buffer = FrameBuffer::new();
/// buffer.push(b"event: ping\nda");
/// assert_eq!(buffer.next_frame().unwrap(), "event: ping\n");
/// assert!(buffer.next_frame().is_none());
///
/// buffer.push(b"ta: {}\n");
/// assert_eq!(buffer.next_frame().unwrap(), "data: {}\n");
/// ```
#[derive(Debug, Default)]
pub struct FrameBuffer {
    pending: BytesMut,
}

impl FrameBuffer {
    /// Create a new empty buffer
    pub fn new() -> Self {
        Self {
            pending: BytesMut::new(),
        }
    }

    /// Append raw bytes from the upstream body
    pub fn push(&mut self, chunk: &[u8]) {
        self.pending.extend_from_slice(chunk);
    }

    /// Take the next complete frame, including its trailing `\n`
    pub fn next_frame(&mut self) -> Option<Bytes> {
        let newline = self.pending.iter().position(|b| *b == b'\n')?;
        Some(self.pending.split_to(newline + 1).freeze())
    }

    /// Take whatever is left after the last newline
    ///
    /// Call this at end of stream so an unterminated tail is still delivered.
    pub fn take_remainder(&mut self) -> Option<Bytes> {
        if self.pending.is_empty() {
            None
        } else {
            Some(self.pending.split().freeze())
        }
    }

    pub fn has_incomplete(&self) -> bool {
        !self.pending.is_empty()
    }
}

/// Reads newline-terminated frames from a chunked byte stream
pub struct FrameReader<S> {
    stream: S,
    buffer: FrameBuffer,
    finished: bool,
}

impl<S> FrameReader<S> {
    pub fn new(stream: S) -> Self {
        Self {
            stream,
            buffer: FrameBuffer::new(),
            finished: false,
        }
    }
}

#[async_trait::async_trait]
impl<S, E> FrameSource for FrameReader<S>
where
    S: Stream<Item = Result<Bytes, E>> + Send + Unpin,
    E: std::fmt::Display + Send,
{
    async fn next_frame(&mut self) -> Option<Result<Bytes, UpstreamReadError>> {
        loop {
            if let Some(frame) = self.buffer.next_frame() {
                return Some(Ok(frame));
            }
            if self.finished {
                return None;
            }

            match self.stream.next().await {
                Some(Ok(chunk)) => self.buffer.push(&chunk),
                Some(Err(e)) => {
                    self.finished = true;
                    return Some(Err(UpstreamReadError(e.to_string())));
                }
                None => {
                    self.finished = true;
                    return self.buffer.take_remainder().map(Ok);
                }
            }
        }
    }
}
