//! HTTP header processing module
//!
//! Only responses carry a header block we produce; request headers are never
//! parsed.
//!
//! - [`HeaderEncoder`]: Encodes the status line and HTTP headers to bytes
//!   - Preserves header insertion order
//!   - Adds `Content-Length` or `Transfer-Encoding` from the payload size

mod header_encoder;

pub use header_encoder::HeaderEncoder;
