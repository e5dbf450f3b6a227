use crate::codec::body::chunked_encoder::ChunkedEncoder;
use crate::codec::body::length_encoder::LengthEncoder;
use crate::protocol::{PayloadItem, PayloadSize, SendError};
use bytes::{Buf, BytesMut};
use tokio_util::codec::Encoder;

/// Body framing of one response, chosen from its [`PayloadSize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadEncoder {
    /// Raw bytes behind a `Content-Length` header
    Length(LengthEncoder),
    /// `Transfer-Encoding: chunked`
    Chunked(ChunkedEncoder),
}

impl PayloadEncoder {
    /// Whether the end of the body has been written.
    pub fn is_finish(&self) -> bool {
        match self {
            PayloadEncoder::Length(encoder) => encoder.is_finish(),
            PayloadEncoder::Chunked(encoder) => encoder.is_finish(),
        }
    }
}

impl From<PayloadSize> for PayloadEncoder {
    fn from(payload_size: PayloadSize) -> Self {
        match payload_size {
            PayloadSize::Length(length) => PayloadEncoder::Length(LengthEncoder::new(length)),
            PayloadSize::Chunked => PayloadEncoder::Chunked(ChunkedEncoder::new()),
        }
    }
}

impl<D: Buf> Encoder<PayloadItem<D>> for PayloadEncoder {
    type Error = SendError;

    fn encode(&mut self, item: PayloadItem<D>, dst: &mut BytesMut) -> Result<(), Self::Error> {
        match self {
            PayloadEncoder::Length(encoder) => encoder.encode(item, dst),
            PayloadEncoder::Chunked(encoder) => encoder.encode(item, dst),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn encode_all(mut encoder: PayloadEncoder, chunks: &[&'static [u8]]) -> (PayloadEncoder, BytesMut) {
        let mut dst = BytesMut::new();
        for chunk in chunks {
            encoder.encode(PayloadItem::Chunk(Bytes::from_static(chunk)), &mut dst).unwrap();
        }
        assert!(!encoder.is_finish());
        encoder.encode(PayloadItem::<Bytes>::Eof, &mut dst).unwrap();
        (encoder, dst)
    }

    #[test]
    fn payload_size_selects_framing() {
        let (encoder, dst) = encode_all(PayloadSize::Chunked.into(), &[b"hello", b"", b" world"]);
        assert!(encoder.is_finish());
        assert_eq!(&dst[..], b"5\r\nhello\r\n6\r\n world\r\n0\r\n\r\n");

        let (encoder, dst) = encode_all(PayloadSize::Length(11).into(), &[b"hello", b" world"]);
        assert!(encoder.is_finish());
        assert_eq!(&dst[..], b"hello world");
    }
}
