use std::error::Error;
use std::fmt::Display;

use bytes::Bytes;
use std::sync::Arc;

use futures::{SinkExt, StreamExt};
use http::{HeaderValue, Response, StatusCode, header};
use http_body::Body;
use http_body_util::{BodyExt, Full};
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};

use crate::codec::{RequestDecoder, ResponseEncoder};
use crate::handler::Handler;
use crate::protocol::{HttpError, Message, ParseError, PayloadItem, PayloadSize, Request, ResponseHead, SendError};

use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::{debug, error, info, warn};

/// Read buffer capacity used while waiting for the request line
const READ_BUFFER_SIZE: usize = 8 * 1024;

/// How a rejected request is answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DiagnosticMode {
    /// Write a plain-text diagnostic straight to the socket, without a status line.
    #[default]
    Raw,
    /// Answer with a status response: 400, 405, 414 or 505 depending on the failure.
    Status,
}

/// An HTTP connection serving exactly one request.
///
/// `HttpConnection` reads the request line, hands the parsed [`Request`] to a
/// [`Handler`], streams the response back and then closes the write side. Because
/// `process` consumes the connection, the underlying stream is dropped, and the
/// socket closed, exactly once on every exit path.
///
/// # Type Parameters
///
/// * `R`: The async readable stream type
/// * `W`: The async writable stream type
///
pub struct HttpConnection<R, W> {
    framed_read: FramedRead<R, RequestDecoder>,
    framed_write: FramedWrite<W, ResponseEncoder>,
    diagnostic_mode: DiagnosticMode,
}

impl<R, W> HttpConnection<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            framed_read: FramedRead::with_capacity(reader, RequestDecoder::new(), READ_BUFFER_SIZE),
            framed_write: FramedWrite::new(writer, ResponseEncoder::new()),
            diagnostic_mode: DiagnosticMode::default(),
        }
    }

    pub fn with_diagnostic_mode(mut self, diagnostic_mode: DiagnosticMode) -> Self {
        self.diagnostic_mode = diagnostic_mode;
        self
    }

    pub async fn process<H>(mut self, handler: Arc<H>) -> Result<(), HttpError>
    where
        H: Handler,
        H::RespBody: Body<Data = Bytes> + Unpin,
        <H::RespBody as Body>::Error: Display,
    {
        let result = match self.framed_read.next().await {
            Some(Ok(request)) => self.do_process(request, &handler).await,

            Some(Err(e)) => {
                warn!(cause = %e, "reject request");
                match self.send_diagnostic(&e).await {
                    Ok(()) => Err(e.into()),
                    Err(send_error) => {
                        debug!(cause = %send_error, "can't send diagnostic");
                        Err(e.into())
                    }
                }
            }

            None => {
                info!("connection closed before a request arrived");
                Ok(())
            }
        };

        // flush what is buffered and shut the write side down
        if let Err(e) = SinkExt::<Message<(ResponseHead, PayloadSize), Bytes>>::close(&mut self.framed_write).await {
            debug!(cause = %e, "can't close connection cleanly");
        }

        result
    }

    async fn do_process<H>(&mut self, request: Request, handler: &Arc<H>) -> Result<(), HttpError>
    where
        H: Handler,
        H::RespBody: Body<Data = Bytes> + Unpin,
        <H::RespBody as Body>::Error: Display,
    {
        info!(request = %request, "receive request");
        let response_result = handler.call(request).await;
        self.send_response(response_result).await
    }

    async fn send_response<T, E>(&mut self, response_result: Result<Response<T>, E>) -> Result<(), HttpError>
    where
        T: Body + Unpin,
        T::Error: Display,
        E: Into<Box<dyn Error + Send + Sync>>,
    {
        match response_result {
            Ok(response) => self.do_send_response(response).await,
            Err(e) => {
                let cause: Box<dyn Error + Send + Sync> = e.into();
                error!(cause = %cause, "handle response error");
                let error_response = build_error_response(StatusCode::INTERNAL_SERVER_ERROR, "Error: internal server error");
                self.do_send_response(error_response).await
            }
        }
    }

    async fn send_diagnostic(&mut self, e: &ParseError) -> Result<(), HttpError> {
        match self.diagnostic_mode {
            DiagnosticMode::Status if !matches!(e, ParseError::Io { .. }) => {
                let response = build_rejection_response(e);
                self.do_send_response(response).await
            }
            _ => {
                let writer = self.framed_write.get_mut();
                writer.write_all(e.diagnostic().as_bytes()).await.map_err(SendError::io)?;
                writer.flush().await.map_err(SendError::io)?;
                Ok(())
            }
        }
    }

    async fn do_send_response<T>(&mut self, response: Response<T>) -> Result<(), HttpError>
    where
        T: Body + Unpin,
        T::Error: Display,
    {
        let (header_parts, mut body) = response.into_parts();

        let payload_size = match body.size_hint().exact() {
            Some(length) => PayloadSize::Length(length),
            None => PayloadSize::Chunked,
        };

        let header = Message::<_, T::Data>::Header((ResponseHead::from_parts(header_parts, ()), payload_size));
        self.framed_write.feed(header).await?;

        loop {
            match body.frame().await {
                Some(Ok(frame)) => {
                    let Ok(data) = frame.into_data() else {
                        warn!("skip non-data frame of response body");
                        continue;
                    };

                    self.framed_write
                        .send(Message::Payload(PayloadItem::Chunk(data)))
                        .await
                        .map_err(|e| SendError::invalid_body(format!("can't send response: {e}")))?;
                }
                Some(Err(e)) => {
                    // the header is already on the wire, the client sees a truncated body
                    return Err(SendError::invalid_body(format!("resolve response body error: {e}")).into());
                }
                None => {
                    self.framed_write
                        // using feed instead of send, close() flushes the terminating chunk
                        .feed(Message::Payload(PayloadItem::<T::Data>::Eof))
                        .await
                        .map_err(|e| SendError::invalid_body(format!("can't send eof response: {e}")))?;
                    return Ok(());
                }
            }
        }
    }
}

fn build_error_response(status_code: StatusCode, message: &'static str) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from_static(message.as_bytes())));
    *response.status_mut() = status_code;
    response.headers_mut().insert(header::CONTENT_TYPE, HeaderValue::from_static("text/plain"));
    response
}

fn build_rejection_response(e: &ParseError) -> Response<Full<Bytes>> {
    let status_code = match e {
        ParseError::NotHttp | ParseError::InvalidTarget { .. } | ParseError::Io { .. } => StatusCode::BAD_REQUEST,
        ParseError::UnsupportedMethod { .. } => StatusCode::METHOD_NOT_ALLOWED,
        ParseError::InvalidVersion { .. } => StatusCode::HTTP_VERSION_NOT_SUPPORTED,
        ParseError::TooLargeRequest { .. } => StatusCode::URI_TOO_LONG,
    };

    let mut response = build_error_response(status_code, e.diagnostic());
    if status_code == StatusCode::METHOD_NOT_ALLOWED {
        response.headers_mut().insert(header::ALLOW, HeaderValue::from_static("GET"));
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::make_handler;
    use http_body_util::StreamBody;
    use http_body::Frame;
    use std::convert::Infallible;
    use tokio::io::{AsyncReadExt, DuplexStream, duplex, split};

    async fn hello(request: Request) -> Result<Response<StreamBody<futures::stream::Iter<std::vec::IntoIter<Result<Frame<Bytes>, Infallible>>>>>, Infallible> {
        let frames = vec![
            Ok(Frame::data(Bytes::from(format!("path={}", request.path())))),
            Ok(Frame::data(Bytes::new())),
            Ok(Frame::data(Bytes::from_static(b";done"))),
        ];
        let mut response = Response::new(StreamBody::new(futures::stream::iter(frames)));
        response.headers_mut().insert(header::SERVER, HeaderValue::from_static("test"));
        Ok(response)
    }

    async fn failing(_request: Request) -> Result<Response<Full<Bytes>>, std::io::Error> {
        Err(std::io::Error::other("boom"))
    }

    async fn read_all(mut client: DuplexStream) -> String {
        let mut output = Vec::new();
        client.read_to_end(&mut output).await.unwrap();
        String::from_utf8(output).unwrap()
    }

    #[tokio::test]
    async fn serves_one_chunked_response() {
        let (client, server) = duplex(64 * 1024);
        let connection = HttpConnection::new(&b"GET /a.txt HTTP/1.1\r\nHost: localhost\r\n\r\n"[..], server);

        connection.process(Arc::new(make_handler(hello))).await.unwrap();

        assert_eq!(
            read_all(client).await,
            "HTTP/1.1 200 OK\r\nserver: test\r\ntransfer-encoding: chunked\r\n\r\nb\r\npath=/a.txt\r\n5\r\n;done\r\n0\r\n\r\n"
        );
    }

    #[tokio::test]
    async fn not_http_gets_raw_diagnostic() {
        let (client, server) = duplex(64 * 1024);
        let connection = HttpConnection::new(&b"hello server\r\n"[..], server);

        let result = connection.process(Arc::new(make_handler(hello))).await;

        assert!(matches!(result, Err(HttpError::RequestError { source: ParseError::NotHttp })));
        assert_eq!(read_all(client).await, "Error: not a HTTP request");
    }

    #[tokio::test]
    async fn unsupported_method_gets_status_in_status_mode() {
        let (client, server) = duplex(64 * 1024);
        let connection =
            HttpConnection::new(&b"DELETE /a.txt HTTP/1.1\r\n\r\n"[..], server).with_diagnostic_mode(DiagnosticMode::Status);

        let result = connection.process(Arc::new(make_handler(hello))).await;

        assert!(result.is_err());
        let output = read_all(client).await;
        assert!(output.starts_with("HTTP/1.1 405 Method Not Allowed\r\n"));
        assert!(output.contains("allow: GET\r\n"));
        assert!(output.contains("content-length: 33\r\n"));
        assert!(output.ends_with("\r\n\r\nError: not a valid request method"));
    }

    #[tokio::test]
    async fn handler_error_becomes_internal_server_error() {
        let (client, server) = duplex(64 * 1024);
        let connection = HttpConnection::new(&b"GET / HTTP/1.1\r\n\r\n"[..], server);

        connection.process(Arc::new(make_handler(failing))).await.unwrap();

        assert!(read_all(client).await.starts_with("HTTP/1.1 500 Internal Server Error\r\n"));
    }

    #[tokio::test]
    async fn empty_connection_is_not_an_error() {
        let (client, server) = duplex(1024);
        let connection = HttpConnection::new(&b""[..], server);

        connection.process(Arc::new(make_handler(hello))).await.unwrap();

        assert_eq!(read_all(client).await, "");
    }

    #[tokio::test]
    async fn answers_without_waiting_for_the_header_block() {
        let (mut client, server) = duplex(64 * 1024);
        let (reader, writer) = split(server);

        // the client sends only the request line and keeps its side open
        client.write_all(b"GET /a.txt HTTP/1.1\r\n").await.unwrap();
        HttpConnection::new(reader, writer).process(Arc::new(make_handler(hello))).await.unwrap();

        let mut output = Vec::new();
        client.read_to_end(&mut output).await.unwrap();
        assert!(output.starts_with(b"HTTP/1.1 200 OK\r\n"));
        assert!(output.ends_with(b"0\r\n\r\n"));
    }
}
