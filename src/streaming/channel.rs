//! Channel-backed sink feeding an axum response body
//!
//! Every flush hands one body chunk to hyper, which writes it to the socket as
//! its own chunk. The channel holds a single chunk, so the relay never runs
//! more than one frame ahead of the caller's connection. When hyper drops the
//! body (caller disconnected) the receiver goes away and the next flush fails.

use std::convert::Infallible;

use axum::body::Body;
use bytes::{Bytes, BytesMut};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use super::{FrameSink, RelayWriteFailure};

/// Create a connected sink / response body pair
pub fn channel_body() -> (ChannelSink, Body) {
    let (tx, rx) = mpsc::channel::<Result<Bytes, Infallible>>(1);
    let body = Body::from_stream(ReceiverStream::new(rx));
    (ChannelSink::new(tx), body)
}

/// [`FrameSink`] writing into an mpsc channel
#[derive(Debug)]
pub struct ChannelSink {
    tx: mpsc::Sender<Result<Bytes, Infallible>>,
    pending: BytesMut,
}

impl ChannelSink {
    pub fn new(tx: mpsc::Sender<Result<Bytes, Infallible>>) -> Self {
        Self {
            tx,
            pending: BytesMut::new(),
        }
    }
}

#[async_trait::async_trait]
impl FrameSink for ChannelSink {
    async fn write(&mut self, frame: Bytes) -> Result<(), RelayWriteFailure> {
        if self.tx.is_closed() {
            return Err(RelayWriteFailure);
        }
        self.pending.extend_from_slice(&frame);
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), RelayWriteFailure> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let chunk = self.pending.split().freeze();
        self.tx.send(Ok(chunk)).await.map_err(|_| RelayWriteFailure)
    }

    async fn closed(&self) {
        self.tx.closed().await
    }
}
