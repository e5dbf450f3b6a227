use crate::encoding::{Encoding, Writer};
use bytes::{Buf, Bytes};
use flate2::Compression;
use flate2::write::{GzEncoder, ZlibEncoder};
use http_body::{Body, Frame};
use pin_project_lite::pin_project;
use std::io;
use std::io::Write;
use std::pin::Pin;
use std::task::{Context, Poll, ready};
use tracing::{trace, warn};
use zstd::stream::write::Encoder as ZstdEncoder;

/// zstd compression level
const ZSTD_LEVEL: i32 = 6;

/// A streaming compressor, one per response.
pub(crate) enum Encoder {
    Deflate(ZlibEncoder<Writer>),
    Gzip(GzEncoder<Writer>),
    Zstd(ZstdEncoder<'static, Writer>),
    Br(Box<brotli::CompressorWriter<Writer>>),
}

impl Encoder {
    /// Creates the compressor for `encoding`.
    ///
    /// Only zstd can fail here, when its context can't be initialised.
    pub(crate) fn new(encoding: Encoding) -> io::Result<Self> {
        let encoder = match encoding {
            Encoding::Deflate => Self::Deflate(ZlibEncoder::new(Writer::new(), Compression::default())),
            Encoding::Gzip => Self::Gzip(GzEncoder::new(Writer::new(), Compression::default())),
            Encoding::Zstd => Self::Zstd(ZstdEncoder::new(Writer::new(), ZSTD_LEVEL)?),
            Encoding::Br => Self::Br(Box::new(brotli::CompressorWriter::new(
                Writer::new(),
                32 * 1024, // 32 KiB buffer
                3,         // BROTLI_PARAM_QUALITY
                22,        // BROTLI_PARAM_LGWIN
            ))),
        };
        Ok(encoder)
    }

    /// Feeds `data` to the compressor.
    pub(crate) fn write(&mut self, data: &[u8]) -> io::Result<()> {
        let result = match self {
            Self::Deflate(encoder) => encoder.write_all(data),
            Self::Gzip(encoder) => encoder.write_all(data),
            Self::Zstd(encoder) => encoder.write_all(data),
            Self::Br(encoder) => encoder.write_all(data),
        };

        if let Err(e) = &result {
            trace!(cause = %e, "error while compressing");
        }
        result
    }

    /// Takes the compressed bytes produced so far, possibly none.
    pub(crate) fn take(&mut self) -> Bytes {
        match self {
            Self::Deflate(encoder) => encoder.get_mut().take(),
            Self::Gzip(encoder) => encoder.get_mut().take(),
            Self::Zstd(encoder) => encoder.get_mut().take(),
            Self::Br(encoder) => encoder.get_mut().take(),
        }
    }

    /// Finishes the stream and returns the remaining compressed bytes, trailer included.
    pub(crate) fn finish(self) -> io::Result<Bytes> {
        let mut writer = match self {
            Self::Deflate(encoder) => encoder.finish()?,
            Self::Gzip(encoder) => encoder.finish()?,
            Self::Zstd(encoder) => encoder.finish()?,
            Self::Br(encoder) => encoder.into_inner(),
        };
        Ok(writer.take())
    }
}

pin_project! {
    /// A body that compresses the frames of the inner body as they are polled.
    ///
    /// Compressed bytes are emitted as soon as the compressor produces them, so a
    /// file is never held in memory as a whole. The compressor trailer is emitted
    /// after the inner body ends.
    pub struct EncodedBody<B> {
        #[pin]
        inner: B,
        encoder: Option<Encoder>,
    }
}

impl<B> EncodedBody<B> {
    pub(crate) fn new(inner: B, encoder: Encoder) -> Self {
        Self { inner, encoder: Some(encoder) }
    }
}

impl<B> Body for EncodedBody<B>
where
    B: Body<Error = io::Error>,
    B::Data: Buf,
{
    type Data = Bytes;
    type Error = io::Error;

    fn poll_frame(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let mut this = self.project();

        loop {
            let Some(encoder) = this.encoder.as_mut() else {
                return Poll::Ready(None);
            };

            return match ready!(this.inner.as_mut().poll_frame(cx)) {
                Some(Ok(frame)) => {
                    let mut data = match frame.into_data() {
                        Ok(data) => data,
                        Err(_frame) => {
                            warn!("skip non-data frame while compressing");
                            continue;
                        }
                    };

                    while data.has_remaining() {
                        let chunk = data.chunk();
                        let len = chunk.len();
                        encoder.write(chunk)?;
                        data.advance(len);
                    }

                    let bytes = encoder.take();
                    if bytes.is_empty() {
                        // the compressor is still buffering, pull more input
                        continue;
                    }
                    Poll::Ready(Some(Ok(Frame::data(bytes))))
                }
                Some(Err(e)) => Poll::Ready(Some(Err(e))),
                None => {
                    // runs once, the encoder is gone afterwards
                    let Some(encoder) = this.encoder.take() else {
                        return Poll::Ready(None);
                    };
                    let bytes = encoder.finish()?;
                    if bytes.is_empty() { Poll::Ready(None) } else { Poll::Ready(Some(Ok(Frame::data(bytes)))) }
                }
            };
        }
    }

    fn is_end_stream(&self) -> bool {
        self.encoder.is_none()
    }
}
