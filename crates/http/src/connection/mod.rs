//! HTTP connection handling module
//!
//! - [`HttpConnection`]: serves a single request on a connection:
//!   - Reads and decodes the request line
//!   - Answers rejected requests according to [`DiagnosticMode`]
//!   - Streams the handler's response, chunked when its size is unknown
//!   - Closes the connection afterwards (no keep-alive)

mod http_connection;

pub use http_connection::DiagnosticMode;
pub use http_connection::HttpConnection;
