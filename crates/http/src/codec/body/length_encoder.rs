use crate::protocol::{PayloadItem, SendError};
use bytes::{Buf, BytesMut};
use tokio_util::codec::Encoder;
use tracing::warn;

/// Writes a payload of known size as-is, relying on the `Content-Length` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LengthEncoder {
    length: u64,
    eof: bool,
}

impl LengthEncoder {
    pub fn new(length: u64) -> Self {
        Self { length, eof: false }
    }

    pub fn is_finish(&self) -> bool {
        self.eof
    }
}

impl<D: Buf> Encoder<PayloadItem<D>> for LengthEncoder {
    type Error = SendError;

    fn encode(&mut self, item: PayloadItem<D>, dst: &mut BytesMut) -> Result<(), Self::Error> {
        match item {
            PayloadItem::Chunk(mut bytes) => {
                if !bytes.has_remaining() {
                    return Ok(());
                }

                let size = bytes.remaining() as u64;
                if size > self.length {
                    warn!(remaining = self.length, chunk_size = size, "payload exceeds the declared content-length");
                    return Err(SendError::invalid_body("payload exceeds the declared content-length"));
                }

                while bytes.has_remaining() {
                    let chunk = bytes.chunk();
                    let len = chunk.len();
                    dst.extend_from_slice(chunk);
                    bytes.advance(len);
                }
                self.length -= size;
                Ok(())
            }
            PayloadItem::Eof => {
                if self.length != 0 {
                    warn!(missing = self.length, "payload ends before the declared content-length");
                    return Err(SendError::invalid_body("payload shorter than the declared content-length"));
                }
                self.eof = true;
                Ok(())
            }
        }
    }
}
