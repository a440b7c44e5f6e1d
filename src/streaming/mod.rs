//! Incremental event-stream relay
//!
//! The relay is a bounded loop over two capabilities: a [`FrameSource`] that
//! yields newline-terminated frames from upstream, and a [`FrameSink`] that can
//! write and flush each frame to the caller. Flush support is a trait bound
//! with no runtime fallback.
//!
//! Loop exits map one-to-one onto [`RelayOutcome`]:
//! - end of upstream input → `Completed`
//! - upstream read error → `UpstreamReadFailed` (treated as a normal close)
//! - write or flush failure, or the sink reporting closure → `CallerDisconnected`

mod channel;
mod frames;

pub use channel::{channel_body, ChannelSink};
pub use frames::{FrameBuffer, FrameReader};

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

/// The caller can no longer receive frames
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("caller disconnected")]
pub struct RelayWriteFailure;

/// Reading the upstream body failed mid-stream
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("upstream read failed: {0}")]
pub struct UpstreamReadError(pub String);

/// Upstream side of the relay
#[async_trait]
pub trait FrameSource: Send {
    /// Next frame, `None` at end of input
    async fn next_frame(&mut self) -> Option<Result<Bytes, UpstreamReadError>>;
}

/// Caller side of the relay; must support incremental flushing
#[async_trait]
pub trait FrameSink: Send + Sync {
    async fn write(&mut self, frame: Bytes) -> Result<(), RelayWriteFailure>;

    /// Push everything written so far to the transport
    async fn flush(&mut self) -> Result<(), RelayWriteFailure>;

    /// Resolves once the caller is gone; lets the relay stop waiting on a
    /// silent upstream. Sinks that cannot observe this never resolve.
    async fn closed(&self) {
        futures::future::pending::<()>().await
    }
}

/// How the relay loop ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayOutcome {
    Completed,
    UpstreamReadFailed(String),
    CallerDisconnected,
}

/// Frames and bytes delivered, plus the exit reason
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelaySummary {
    pub frames: usize,
    pub bytes: u64,
    pub outcome: RelayOutcome,
}

/// Relay frames from `source` to `sink` until one side ends
///
/// Each frame is written and flushed before the next one is read, so the
/// caller sees every upstream frame with at most one frame of added latency.
pub async fn relay_frames<R, W>(source: &mut R, sink: &mut W) -> RelaySummary
where
    R: FrameSource,
    W: FrameSink,
{
    let mut frames = 0usize;
    let mut bytes = 0u64;

    let outcome = loop {
        let next = tokio::select! {
            next = source.next_frame() => next,
            _ = sink.closed() => break RelayOutcome::CallerDisconnected,
        };

        let frame = match next {
            None => break RelayOutcome::Completed,
            Some(Err(e)) => break RelayOutcome::UpstreamReadFailed(e.0),
            Some(Ok(frame)) => frame,
        };

        let len = frame.len() as u64;
        if sink.write(frame).await.is_err() || sink.flush().await.is_err() {
            break RelayOutcome::CallerDisconnected;
        }

        frames += 1;
        bytes += len;
    };

    RelaySummary {
        frames,
        bytes,
        outcome,
    }
}
