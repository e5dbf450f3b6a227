//! Wire protocol for a minimal HTTP/1.1 file server
//!
//! This crate provides the connection-level half of `fileserve`: decoding the
//! request line of a `GET` request, encoding responses with a status line, an
//! ordered header block and a content-length or chunked body, and driving one
//! request/response exchange per connection.
//!
//! # Features
//!
//! - Request-line decoding with bounded buffers
//! - Chunked transfer encoding with lowercase hexadecimal chunk sizes
//! - Streaming response bodies through the `http_body::Body` trait
//! - Raw or status-line diagnostics for rejected requests
//! - Clean error handling
//!
//! # Example
//!
//! ```no_run
//! use bytes::Bytes;
//! use http::{Response, StatusCode};
//! use http_body_util::Full;
//! use std::convert::Infallible;
//! use std::sync::Arc;
//! use tokio::net::TcpListener;
//! use tracing::{error, info, warn, Level};
//! use tracing_subscriber::FmtSubscriber;
//! use fileserve_http::connection::HttpConnection;
//! use fileserve_http::handler::make_handler;
//! use fileserve_http::protocol::Request;
//!
//! #[tokio::main]
//! async fn main() {
//!     let subscriber = FmtSubscriber::builder()
//!         .with_max_level(Level::INFO)
//!         .finish();
//!     tracing::subscriber::set_global_default(subscriber)
//!         .expect("setting default subscriber failed");
//!
//!     info!(port = 3000, "start listening");
//!     let tcp_listener = match TcpListener::bind("127.0.0.1:3000").await {
//!         Ok(tcp_listener) => tcp_listener,
//!         Err(e) => {
//!             error!(cause = %e, "bind server error");
//!             return;
//!         }
//!     };
//!
//!     let handler = Arc::new(make_handler(hello_world));
//!
//!     loop {
//!         let (tcp_stream, _remote_addr) = match tcp_listener.accept().await {
//!             Ok(stream_and_addr) => stream_and_addr,
//!             Err(e) => {
//!                 warn!(cause = %e, "failed to accept");
//!                 continue;
//!             }
//!         };
//!
//!         let handler = handler.clone();
//!
//!         tokio::spawn(async move {
//!             let (reader, writer) = tcp_stream.into_split();
//!             let connection = HttpConnection::new(reader, writer);
//!             if let Err(e) = connection.process(handler).await {
//!                 error!("service has error, cause {}, connection shutdown", e);
//!             }
//!         });
//!     }
//! }
//!
//! async fn hello_world(request: Request) -> Result<Response<Full<Bytes>>, Infallible> {
//!     info!("request path {}", request.path());
//!
//!     let mut response = Response::new(Full::new(Bytes::from_static(b"Hello World!\r\n")));
//!     *response.status_mut() = StatusCode::OK;
//!     Ok(response)
//! }
//! ```
//!
//! # Architecture
//!
//! - [`connection`]: one request/response exchange per connection
//! - [`protocol`]: request, response and error types
//! - [`codec`]: request-line decoding and response encoding
//! - [`handler`]: the [`handler::Handler`] trait and [`handler::make_handler`]
//!
//! # Limitations
//!
//! - Only `GET` requests are accepted
//! - One request per connection, no keep-alive or pipelining
//! - Request headers are never interpreted: bytes buffered together with the
//!   request line are dropped, header bytes arriving later are never read
//! - Maximum request line size: 8KB
//! - No read or write timeouts: a stalled client holds its connection open
//! - A request is only answered once its first line is complete: input without
//!   a `\n` gets no diagnostic, not even `NotHttp`, until the client closes its
//!   write side

pub mod codec;
pub mod connection;
pub mod handler;
pub mod protocol;

mod utils;
pub(crate) use utils::ensure;
