//! Fixtures shared by the fileserve benchmarks.

/// A named benchmark input.
#[derive(Debug, Clone)]
pub struct Fixture {
    name: &'static str,
    content: Vec<u8>,
}

impl Fixture {
    pub fn new<C: Into<Vec<u8>>>(name: &'static str, content: C) -> Self {
        Self { name, content: content.into() }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

pub const CURL_REQUEST: &str = "GET /index.html HTTP/1.1\r\nHost: 127.0.0.1:3000\r\nUser-Agent: curl/8.5.0\r\nAccept: */*\r\n\r\n";

pub const BROWSER_REQUEST: &str = "GET /css/site.css?v=20240101 HTTP/1.1\r\n\
Host: localhost:3000\r\n\
Connection: keep-alive\r\n\
User-Agent: Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36\r\n\
Accept: text/css,*/*;q=0.1\r\n\
Referer: http://localhost:3000/\r\n\
Accept-Encoding: gzip, deflate, br, zstd\r\n\
Accept-Language: en-US,en;q=0.9\r\n\r\n";

pub fn request_fixtures() -> Vec<Fixture> {
    vec![Fixture::new("curl_request", CURL_REQUEST), Fixture::new("browser_request", BROWSER_REQUEST)]
}

/// Repetitive markup, the typical content of a served page.
pub fn html_payload(size: usize) -> Vec<u8> {
    let line = b"<div class=\"row\"><span>fileserve</span><a href=\"/index.html\">home</a></div>\n";
    line.iter().copied().cycle().take(size).collect()
}

/// Poorly compressible bytes, standing in for images and archives.
pub fn binary_payload(size: usize) -> Vec<u8> {
    // xorshift, seeded so every run compresses the same input
    let mut state: u32 = 0x9e37_79b9;
    (0..size)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            state.to_le_bytes()[0]
        })
        .collect()
}

pub fn payload_fixtures() -> Vec<Fixture> {
    vec![
        Fixture::new("html_8k", html_payload(8 * 1024)),
        Fixture::new("html_64k", html_payload(64 * 1024)),
        Fixture::new("binary_64k", binary_payload(64 * 1024)),
    ]
}
