//! HTTP body encoding module for response payloads
//!
//! - [`ChunkedEncoder`](chunked_encoder::ChunkedEncoder): chunked transfer encoding,
//!   used for every body whose size is not known upfront
//! - [`LengthEncoder`](length_encoder::LengthEncoder): fixed-length payloads
//! - [`PayloadEncoder`]: selects one of the above from a [`PayloadSize`](crate::protocol::PayloadSize)

mod chunked_encoder;
mod length_encoder;
mod payload_encoder;

pub use payload_encoder::PayloadEncoder;
