use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use fileserve_http::handler::Handler;
use fileserve_http::protocol::Request;
use http::Response;
use tracing::info;

use crate::body::ResponseBody;
use crate::config::ServerConfig;
use crate::mime::MimeTable;
use crate::resource::resolve;
use crate::responder::{ResponseOptions, build};

/// Serves files below a content root, one request per call.
///
/// The service holds no mutable state, so a single instance is shared by every
/// connection.
#[derive(Debug, Clone)]
pub struct FileService {
    root: PathBuf,
    mime_table: MimeTable,
    options: ResponseOptions,
}

impl FileService {
    pub fn new<P: Into<PathBuf>>(root: P, mime_table: MimeTable, options: ResponseOptions) -> Self {
        Self { root: root.into(), mime_table, options }
    }

    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new(
            config.root(),
            config.mime_table().clone(),
            ResponseOptions::new(config.compression(), config.chunk_size()),
        )
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl Handler for FileService {
    type RespBody = ResponseBody;
    type Error = io::Error;

    async fn call(&self, req: Request) -> Result<Response<Self::RespBody>, Self::Error> {
        let resolution = resolve(&self.root, &req.file_path(), &self.mime_table).await;
        let response = build(&req, resolution, &self.options)?;
        info!(path = req.path(), status = response.status().as_u16(), "serve request");
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::Encoding;
    use bytes::Bytes;
    use fileserve_http::connection::HttpConnection;
    use std::sync::Arc;
    use tokio::io::{AsyncReadExt, duplex};

    async fn exchange(service: FileService, request: &'static [u8]) -> String {
        let (mut client, server) = duplex(64 * 1024);
        let connection = HttpConnection::new(request, server);
        connection.process(Arc::new(service)).await.unwrap();

        let mut output = Vec::new();
        client.read_to_end(&mut output).await.unwrap();
        String::from_utf8(output).unwrap()
    }

    #[tokio::test]
    async fn index_is_served_for_root() {
        let root = std::env::temp_dir().join(format!("fileserve-service-{}", std::process::id()));
        tokio::fs::create_dir_all(&root).await.unwrap();
        tokio::fs::write(root.join("index.html"), Bytes::from_static(b"<h1>home</h1>")).await.unwrap();
        let service = FileService::new(&root, MimeTable::default(), ResponseOptions::new(None, 8));

        let output = exchange(service, b"GET / HTTP/1.1\r\n\r\n").await;
        tokio::fs::remove_dir_all(&root).await.unwrap();

        let (head, body) = output.split_once("\r\n\r\n").unwrap();
        assert_eq!(
            head,
            format!("HTTP/1.1 200 OK\r\nserver: {}\r\ncontent-type: text/html\r\ntransfer-encoding: chunked", crate::config::SERVER_NAME)
        );
        assert_eq!(body, "8\r\n<h1>home\r\n5\r\n</h1>\r\n0\r\n\r\n");
    }

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let service = FileService::new("/nonexistent-root", MimeTable::default(), ResponseOptions::new(Some(Encoding::Gzip), 1024));

        let output = exchange(service, b"GET /nothing.txt HTTP/1.1\r\n\r\n").await;

        assert!(output.starts_with("HTTP/1.1 404 Not Found\r\n"));
        assert!(!output.contains("content-encoding"));
        assert!(output.ends_with(
            "\r\n\r\n2f\r\n<html><head><title>404 Not Found</title></head>\r\n2e\r\n<body><p>404 File Not Found!</p></body></html>\r\n0\r\n\r\n"
        ));
    }
}
