//! A minimal concurrent HTTP/1.1 static file server
//!
//! `fileserve` answers `GET` requests with files below a content root. Every
//! response is sent with chunked transfer encoding; file contents are optionally
//! compressed on the fly and announced with `Content-Encoding`.
//!
//! # Example
//!
//! ```no_run
//! use fileserve::{ConnectionLimit, Server, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ServerConfig::builder()
//!         .root("./public")
//!         .connection_limit(ConnectionLimit::Concurrent(64))
//!         .build()?;
//!
//!     Server::bind(config)?.run().await?;
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! - [`server`]: the accept loop and its connection limits
//! - [`service`]: the [`Handler`](fileserve_http::handler::Handler) that serves files
//! - [`resource`] and [`mime`]: resolving a request path to a file and its content type
//! - [`responder`]: building the `200` and `404` responses
//! - [`encoding`]: streaming and one-shot compression
//! - [`config`]: settings, from code or from the environment

pub mod body;
pub mod config;
pub mod encoding;
pub mod mime;
pub mod resource;
pub mod responder;
pub mod server;
pub mod service;

pub use config::{ConfigError, ConnectionLimit, ServerConfig};
pub use encoding::Encoding;
pub use server::{Server, ServerError};
pub use service::FileService;
