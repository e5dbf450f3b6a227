//! Response body compression.
//!
//! - [`Encoding`]: the configured content-coding, announced with `Content-Encoding`
//! - [`EncodedBody`]: compresses a body frame by frame while it is streamed
//! - [`compress`] / [`decompress`]: bounded one-shot variants, used for self checks

mod encoder;
mod oneshot;

use std::fmt;
use std::io;
use std::str::FromStr;

use bytes::{Bytes, BytesMut};

pub use encoder::EncodedBody;
pub(crate) use encoder::Encoder;
pub use oneshot::{CompressError, DEFAULT_MAX_PAYLOAD, compress, decompress};

/// The content-coding applied to served files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// zlib stream, the `deflate` content-coding.
    Deflate,
    Gzip,
    Zstd,
    /// Brotli.
    Br,
}

impl Encoding {
    /// Returns the name of the encoding, as sent in `Content-Encoding`.
    pub fn name(&self) -> &'static str {
        match self {
            Encoding::Deflate => "deflate",
            Encoding::Gzip => "gzip",
            Encoding::Zstd => "zstd",
            Encoding::Br => "br",
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Encoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "deflate" => Ok(Encoding::Deflate),
            "gzip" => Ok(Encoding::Gzip),
            "zstd" => Ok(Encoding::Zstd),
            "br" => Ok(Encoding::Br),
            other => Err(format!("unknown encoding {other}")),
        }
    }
}

/// Sink the compressors write into; compressed bytes are taken out as they appear.
pub(crate) struct Writer {
    buf: BytesMut,
}

impl Writer {
    fn new() -> Self {
        Self { buf: BytesMut::with_capacity(4096) }
    }

    fn take(&mut self) -> Bytes {
        self.buf.split().freeze()
    }
}

impl io::Write for Writer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_encoding_names() {
        assert_eq!("deflate".parse::<Encoding>().unwrap(), Encoding::Deflate);
        assert_eq!(" GZIP ".parse::<Encoding>().unwrap(), Encoding::Gzip);
        assert_eq!("br".parse::<Encoding>().unwrap().to_string(), "br");
        assert!("compress".parse::<Encoding>().is_err());
    }
}
