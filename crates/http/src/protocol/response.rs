//! HTTP response header handling implementation.
//!
//! This module provides type definitions for HTTP response headers.
//! It uses the standard `http::Response` type with an empty body placeholder
//! to represent response headers before the actual response body is attached.

use http::Response;

/// Type alias for HTTP response headers.
///
/// This type represents the status line and header block of an HTTP response,
/// using `http::Response<()>` with an empty body placeholder. Header order on the
/// wire follows the insertion order of the underlying `HeaderMap`.
pub type ResponseHead = Response<()>;
