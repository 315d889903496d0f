//! Request body type for the transport.

use std::convert::Infallible;

use bytes::Bytes;
use futures::{Stream, TryStreamExt};
use http_body::Frame;
use http_body_util::combinators::BoxBody;
use http_body_util::{BodyExt, Empty, Full, StreamBody};

/// Error type of request bodies.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Body of requests sent through a [`Transport`](crate::Transport).
pub type RequestBody = BoxBody<Bytes, BoxError>;

/// A body with no data.
pub fn empty_body() -> RequestBody {
    Empty::<Bytes>::new()
        .map_err(|never: Infallible| -> BoxError { match never {} })
        .boxed()
}

/// A body with all data available up front.
pub fn full_body(data: impl Into<Bytes>) -> RequestBody {
    Full::new(data.into())
        .map_err(|never: Infallible| -> BoxError { match never {} })
        .boxed()
}

/// A body streamed from chunks of data.
pub fn streaming_body<S>(stream: S) -> RequestBody
where
    S: Stream<Item = Result<Bytes, BoxError>> + Send + Sync + 'static,
{
    StreamBody::new(stream.map_ok(Frame::data)).boxed()
}
