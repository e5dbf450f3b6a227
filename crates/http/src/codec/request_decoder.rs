//! HTTP request decoder module
//!
//! This module decodes the request line of an incoming request. Only the first
//! line is interpreted: whatever arrived in the same reads (usually the header
//! block) is dropped with it and nothing after that is read, since a connection
//! carries at most one request. Nothing is parsed before a `\n` or EOF arrives,
//! so even a non-HTTP line is only rejected once it is terminated.
//!
//! # Rules
//!
//! 1. The request line must contain `HTTP/`, otherwise [`ParseError::NotHttp`]
//! 2. It must start with `GET ` (case-sensitive), otherwise [`ParseError::UnsupportedMethod`]
//! 3. The target must be an origin-form path, otherwise [`ParseError::InvalidTarget`]
//! 4. The version must be `HTTP/1.1` or `HTTP/1.0`, otherwise [`ParseError::InvalidVersion`]
//!
//! # Example
//!
//! ```no_run
//! use fileserve_http::codec::RequestDecoder;
//! use tokio_util::codec::Decoder;
//! use bytes::BytesMut;
//!
//! let mut decoder = RequestDecoder::new();
//! let mut buffer = BytesMut::from("GET /index.html HTTP/1.1\r\n\r\n");
//! let request = decoder.decode(&mut buffer).unwrap().unwrap();
//! assert_eq!(request.path(), "/index.html");
//! ```

use bytes::BytesMut;
use http::uri::PathAndQuery;
use http::{Method, Version};
use tokio_util::codec::Decoder;
use tracing::trace;

use crate::ensure;
use crate::protocol::{ParseError, Request};

/// Maximum size in bytes allowed for the request line
pub const MAX_REQUEST_LINE_BYTES: usize = 8 * 1024;

const PROTOCOL_MARKER: &[u8] = b"HTTP/";
const GET_PREFIX: &[u8] = b"GET ";

/// A decoder for the request line of an HTTP request.
///
/// The decoder yields `Ok(None)` until a full line is buffered. A line longer than
/// [`MAX_REQUEST_LINE_BYTES`] is rejected rather than truncated.
#[derive(Debug)]
pub struct RequestDecoder {
    max_line_bytes: usize,
}

impl RequestDecoder {
    /// Creates a new `RequestDecoder` instance
    pub fn new() -> Self {
        Default::default()
    }

    /// Creates a decoder that rejects request lines longer than `max_line_bytes`
    pub fn with_max_line_bytes(max_line_bytes: usize) -> Self {
        Self { max_line_bytes }
    }
}

impl Default for RequestDecoder {
    fn default() -> Self {
        Self { max_line_bytes: MAX_REQUEST_LINE_BYTES }
    }
}

impl Decoder for RequestDecoder {
    type Item = Request;
    type Error = ParseError;

    /// Attempts to decode a request line from the provided buffer
    ///
    /// # Returns
    ///
    /// - `Ok(Some(request))`: Successfully decoded a `GET` request line
    /// - `Ok(None)`: Need more data to proceed
    /// - `Err(_)`: The request line was rejected
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let Some(line_end) = src.iter().position(|b| *b == b'\n') else {
            ensure!(src.len() <= self.max_line_bytes, ParseError::too_large_request(src.len(), self.max_line_bytes));
            return Ok(None);
        };

        ensure!(line_end <= self.max_line_bytes, ParseError::too_large_request(line_end, self.max_line_bytes));

        // one request per connection: everything after the request line is dropped
        let buffered = src.split();
        trace!(line_size = line_end, buffered_size = buffered.len(), "received request line");
        parse_request_line(&buffered[..line_end]).map(Some)
    }

    fn decode_eof(&mut self, buf: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match self.decode(buf)? {
            Some(request) => Ok(Some(request)),
            None if buf.is_empty() => Ok(None),
            // peer closed its write side without terminating the line
            None => {
                let line = buf.split();
                parse_request_line(&line).map(Some)
            }
        }
    }
}

/// Parses a single request line, with or without its trailing `\r\n`.
pub fn parse_request_line(line: &[u8]) -> Result<Request, ParseError> {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    let line = line.strip_suffix(b"\r").unwrap_or(line);

    ensure!(line.windows(PROTOCOL_MARKER.len()).any(|window| window == PROTOCOL_MARKER), ParseError::NotHttp);

    let Some(rest) = line.strip_prefix(GET_PREFIX) else {
        let method = line.split(|b| *b == b' ').next().unwrap_or_default();
        return Err(ParseError::unsupported_method(String::from_utf8_lossy(method)));
    };

    let rest = std::str::from_utf8(rest).map_err(|_e| ParseError::invalid_target("request line is not valid utf-8"))?;
    let mut tokens = rest.split_ascii_whitespace();

    let target = tokens.next().ok_or_else(|| ParseError::invalid_target("missing request target"))?;
    ensure!(target.starts_with('/'), ParseError::invalid_target(format!("{target} is not an origin-form path")));
    let target = target.parse::<PathAndQuery>().map_err(ParseError::invalid_target)?;

    let version = match tokens.next() {
        Some("HTTP/1.1") => Version::HTTP_11,
        Some("HTTP/1.0") => Version::HTTP_10,
        Some(other) => return Err(ParseError::invalid_version(other)),
        None => return Err(ParseError::invalid_version("missing protocol version")),
    };

    Ok(Request::new(Method::GET, target, version))
}
