//! Shared response envelope types for API handlers.
//!
//! All API responses use a `{ "data": ... }` envelope. Use
//! [`DataResponse`] instead of ad-hoc `serde_json::json!({ "data": ... })`
//! to get compile-time type safety and consistent serialization.
//!
//! [`respond_then`] builds an envelope response whose follow-up closure
//! runs only once the body has been handed to the transport, so work
//! scheduled there can never precede the response on the wire.

use std::pin::Pin;
use std::task::{Context, Poll};

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderValue};
use axum::response::Response;
use http_body::{Frame, SizeHint};
use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

/// Serialize `data` into the standard envelope and invoke `after` once
/// the response body has been fully consumed by the transport.
pub fn respond_then<T: Serialize>(
    data: T,
    after: impl FnOnce() + Send + 'static,
) -> Result<Response, serde_json::Error> {
    let bytes = serde_json::to_vec(&DataResponse { data })?;
    let body = Body::new(ScheduleOnEnd {
        bytes: Some(bytes.into()),
        after: Some(Box::new(after)),
    });

    let mut response = Response::new(body);
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    Ok(response)
}

/// Single-frame body that fires a closure at end of stream.
///
/// The closure runs when the final frame has been polled, inside the
/// connection's runtime context, so it may call `tokio::spawn`.
struct ScheduleOnEnd {
    bytes: Option<Bytes>,
    after: Option<Box<dyn FnOnce() + Send>>,
}

impl http_body::Body for ScheduleOnEnd {
    type Data = Bytes;
    type Error = std::convert::Infallible;

    fn poll_frame(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let this = self.get_mut();
        if let Some(bytes) = this.bytes.take() {
            return Poll::Ready(Some(Ok(Frame::data(bytes))));
        }
        if let Some(after) = this.after.take() {
            after();
        }
        Poll::Ready(None)
    }

    fn is_end_stream(&self) -> bool {
        self.bytes.is_none() && self.after.is_none()
    }

    fn size_hint(&self) -> SizeHint {
        match &self.bytes {
            Some(b) => SizeHint::with_exact(b.len() as u64),
            None => SizeHint::with_exact(0),
        }
    }
}
