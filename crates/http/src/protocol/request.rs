//! The parsed request line.
//!
//! Only the request line of a request is ever interpreted; the header block that
//! follows it is read off the wire and discarded.

use std::fmt;
use std::path::PathBuf;

use http::uri::PathAndQuery;
use http::{Method, Version};

/// The document served for the root target `/`.
pub const INDEX_DOCUMENT: &str = "index.html";

/// A successfully parsed `GET` request line.
///
/// A `Request` only exists for well-formed input: anything else is reported as a
/// [`ParseError`](crate::protocol::ParseError) by the decoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    method: Method,
    target: PathAndQuery,
    version: Version,
}

impl Request {
    pub(crate) fn new(method: Method, target: PathAndQuery, version: Version) -> Self {
        Self { method, target, version }
    }

    /// Returns the request method, always `GET` for a parsed request.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the raw request target, including any query.
    pub fn target(&self) -> &str {
        self.target.as_str()
    }

    /// Returns the path component of the request target.
    pub fn path(&self) -> &str {
        self.target.path()
    }

    /// Returns the protocol version named on the request line.
    pub fn version(&self) -> Version {
        self.version
    }

    /// Maps the request target onto a path relative to the content root.
    ///
    /// `/` becomes `index.html`, every other path gets a literal `.` prefix, so
    /// `/css/site.css` becomes `./css/site.css`.
    pub fn file_path(&self) -> PathBuf {
        match self.path() {
            "/" => PathBuf::from(INDEX_DOCUMENT),
            path => PathBuf::from(format!(".{path}")),
        }
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {:?}", self.method, self.target, self.version)
    }
}
