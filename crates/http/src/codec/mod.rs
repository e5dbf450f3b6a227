//! HTTP codec module for decoding requests and encoding responses
//!
//! # Architecture
//!
//! - Request handling:
//!   - [`RequestDecoder`]: Decodes the request line of an incoming request
//!
//! - Response handling:
//!   - [`ResponseEncoder`]: Encodes outgoing HTTP responses
//!   - Header encoding via the `header` module
//!   - Payload framing (content-length or chunked) via the `body` module
//!
//! # Example
//!
//! ```no_run
//! use fileserve_http::codec::{RequestDecoder, ResponseEncoder};
//! use tokio_util::codec::{Decoder, Encoder};
//! use bytes::BytesMut;
//!
//! // Decode incoming request
//! let mut decoder = RequestDecoder::new();
//! let mut request_buffer = BytesMut::from("GET / HTTP/1.1\r\n\r\n");
//! let request = decoder.decode(&mut request_buffer);
//!
//! // Encode outgoing response
//! let mut encoder = ResponseEncoder::new();
//! let mut response_buffer = BytesMut::new();
//! // ... encode response ...
//! ```

mod body;
mod header;
mod request_decoder;
mod response_encoder;

pub use request_decoder::MAX_REQUEST_LINE_BYTES;
pub use request_decoder::RequestDecoder;
pub use request_decoder::parse_request_line;
pub use response_encoder::ResponseEncoder;
