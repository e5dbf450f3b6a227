//! Builds the response for a resolved request.

use std::io;

use fileserve_http::protocol::Request;
use http::{HeaderValue, Response, StatusCode, header};
use http_body_util::BodyExt;
use tracing::debug;

use crate::body::{ResponseBody, static_body};
use crate::config::SERVER_NAME;
use crate::encoding::{EncodedBody, Encoder, Encoding};
use crate::resource::Resolution;

/// The fixed 404 page, sent as two chunks.
pub static NOT_FOUND_CHUNKS: [&[u8]; 2] =
    [b"<html><head><title>404 Not Found</title></head>", b"<body><p>404 File Not Found!</p></body></html>"];

/// Response settings shared by every connection.
#[derive(Debug, Clone)]
pub struct ResponseOptions {
    server_name: HeaderValue,
    compression: Option<Encoding>,
    chunk_size: usize,
}

impl ResponseOptions {
    pub fn new(compression: Option<Encoding>, chunk_size: usize) -> Self {
        Self { server_name: HeaderValue::from_static(SERVER_NAME), compression, chunk_size }
    }

    pub fn compression(&self) -> Option<Encoding> {
        self.compression
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }
}

/// Builds the response for `request`.
///
/// A found resource is answered `200 OK` with its content type and the file
/// content, compressed when `options` enable it. Anything else gets the static
/// 404 page. Both are sent chunked.
///
/// # Errors
///
/// Fails only when the compressor can't be initialised.
pub fn build(request: &Request, resolution: Resolution, options: &ResponseOptions) -> io::Result<Response<ResponseBody>> {
    let Resolution::Found(resource) = resolution else {
        debug!(path = request.path(), "respond not found");
        return Ok(not_found(options));
    };

    let (content_type, source) = resource.into_parts();
    let body = source.into_body(options.chunk_size);

    let mut response = Response::new(body);
    *response.status_mut() = StatusCode::OK;
    response.headers_mut().insert(header::SERVER, options.server_name.clone());
    response.headers_mut().insert(header::CONTENT_TYPE, content_type);

    if let Some(encoding) = options.compression {
        let encoder = Encoder::new(encoding)?;
        response.headers_mut().insert(header::CONTENT_ENCODING, HeaderValue::from_static(encoding.name()));
        response = response.map(|body| EncodedBody::new(body, encoder).boxed_unsync());
    }

    debug!(path = request.path(), compression = ?options.compression, "respond with file");
    Ok(response)
}

fn not_found(options: &ResponseOptions) -> Response<ResponseBody> {
    let mut response = Response::new(static_body(&NOT_FOUND_CHUNKS));
    *response.status_mut() = StatusCode::NOT_FOUND;
    response.headers_mut().insert(header::SERVER, options.server_name.clone());
    response.headers_mut().insert(header::CONTENT_TYPE, HeaderValue::from_static("text/html"));
    response
}
