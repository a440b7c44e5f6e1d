//! Response relay
//!
//! Streaming mode applies only when the client asked for a stream and the
//! upstream answered 200. Everything else, including a streamed request that
//! failed upstream, is copied through once as a buffered response.

use axum::{
    body::Body,
    http::{header, HeaderValue, StatusCode},
    response::Response,
};
use bytes::Bytes;
use futures::{Stream, StreamExt};

use crate::{
    error::AppResult,
    proxy::headers::filter_response_headers,
    proxy::logging::RequestContext,
    streaming::{channel_body, relay_frames, FrameReader, RelayOutcome},
};

/// Which relay mode a response gets
pub fn is_stream_relay(requested_stream: bool, status: StatusCode) -> bool {
    requested_stream && status == StatusCode::OK
}

/// Turn the upstream response into the caller's response
pub async fn relay_response(ctx: RequestContext, upstream: reqwest::Response) -> AppResult<Response> {
    if is_stream_relay(ctx.streaming, upstream.status()) {
        Ok(stream_response(ctx, upstream))
    } else {
        buffered_response(ctx, upstream).await
    }
}

/// Copy status and end-to-end headers, then pass the body through as it arrives
async fn buffered_response(ctx: RequestContext, upstream: reqwest::Response) -> AppResult<Response> {
    let status = upstream.status();
    let headers = filter_response_headers(upstream.headers());

    let body = Body::from_stream(count_body_bytes(ctx, upstream.bytes_stream()));

    let mut response = Response::new(body);
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    Ok(response)
}

/// Logs DONE with the relayed byte count once the body is finished or dropped
struct BodyTally {
    ctx: RequestContext,
    bytes: u64,
}

impl Drop for BodyTally {
    fn drop(&mut self) {
        self.ctx.log_request_complete(self.bytes);
    }
}

/// Count bytes passing through `stream`, logging read errors as they occur
fn count_body_bytes<S>(
    ctx: RequestContext,
    stream: S,
) -> impl Stream<Item = Result<Bytes, reqwest::Error>> + Send + 'static
where
    S: Stream<Item = Result<Bytes, reqwest::Error>> + Send + 'static,
{
    let mut tally = BodyTally { ctx, bytes: 0 };
    stream.map(move |chunk| {
        match &chunk {
            Ok(bytes) => tally.bytes += bytes.len() as u64,
            Err(e) => tally.ctx.log_error("relay", &e.to_string()),
        }
        chunk
    })
}

/// Send 200 with event-stream headers now, then relay frames as they arrive
fn stream_response(ctx: RequestContext, upstream: reqwest::Response) -> Response {
    let (mut sink, body) = channel_body();
    let mut source = FrameReader::new(Box::pin(upstream.bytes_stream()));

    tokio::spawn(async move {
        let summary = relay_frames(&mut source, &mut sink).await;
        match &summary.outcome {
            RelayOutcome::Completed => {}
            RelayOutcome::UpstreamReadFailed(error) => ctx.log_stream_read_error(error),
            RelayOutcome::CallerDisconnected => ctx.log_caller_gone(summary.frames),
        }
        ctx.log_request_complete(summary.bytes);
    });

    let mut response = Response::new(body);
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/event-stream"),
    );
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
    response
}
