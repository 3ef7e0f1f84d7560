//! Wire message types: the `Request`/`Response` envelopes exchanged over
//! the datagram transport, addressed by a flat request name with no
//! channel layer.

mod message;

pub use message::{Request, RequestBuilder, Response};
