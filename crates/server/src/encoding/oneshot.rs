//! Bounded, in-memory compression.
//!
//! Unlike [`EncodedBody`](super::EncodedBody), these functions hold the whole payload
//! in memory, so both refuse payloads larger than the given bound instead of
//! truncating them.

use std::io;
use std::io::Read;

use bytes::Bytes;
use flate2::read::{GzDecoder, ZlibDecoder};
use thiserror::Error;

use crate::encoding::{Encoder, Encoding};

/// Default payload bound for [`compress`] and [`decompress`].
pub const DEFAULT_MAX_PAYLOAD: usize = 100_000;

/// Read buffer used by the brotli decompressor
const BROTLI_BUFFER_SIZE: usize = 4096;

#[derive(Debug, Error)]
pub enum CompressError {
    #[error("payload exceeds the limit {max_size}")]
    PayloadTooLarge { max_size: usize },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

/// Compresses everything `source` yields into a single blob.
///
/// # Errors
///
/// Returns [`CompressError::PayloadTooLarge`] when `source` holds more than
/// `max_payload` bytes.
pub fn compress<R: Read>(source: R, encoding: Encoding, max_payload: usize) -> Result<Bytes, CompressError> {
    let input = read_bounded(source, max_payload)?;

    let mut encoder = Encoder::new(encoding)?;
    encoder.write(&input)?;
    Ok(encoder.finish()?)
}

/// Decompresses a blob produced by [`compress`] or by a streamed response body.
///
/// # Errors
///
/// Returns [`CompressError::PayloadTooLarge`] when the output would exceed
/// `max_payload` bytes, or an io error when `compressed` is not a valid stream.
pub fn decompress(compressed: &[u8], encoding: Encoding, max_payload: usize) -> Result<Bytes, CompressError> {
    let decoder: Box<dyn Read + '_> = match encoding {
        Encoding::Deflate => Box::new(ZlibDecoder::new(compressed)),
        Encoding::Gzip => Box::new(GzDecoder::new(compressed)),
        Encoding::Zstd => Box::new(zstd::stream::read::Decoder::new(compressed)?),
        Encoding::Br => Box::new(brotli::Decompressor::new(compressed, BROTLI_BUFFER_SIZE)),
    };

    read_bounded(decoder, max_payload)
}

fn read_bounded<R: Read>(source: R, max_payload: usize) -> Result<Bytes, CompressError> {
    let limit = u64::try_from(max_payload).unwrap_or(u64::MAX).saturating_add(1);

    let mut buf = Vec::new();
    source.take(limit).read_to_end(&mut buf)?;

    if buf.len() > max_payload {
        return Err(CompressError::PayloadTooLarge { max_size: max_payload });
    }
    Ok(Bytes::from(buf))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Encoding; 4] = [Encoding::Deflate, Encoding::Gzip, Encoding::Zstd, Encoding::Br];

    #[test]
    fn round_trip_up_to_the_bound() {
        let text = b"<html><body>hello hello hello</body></html>\n".repeat(100);
        let binary = (0..=255u8).cycle().take(DEFAULT_MAX_PAYLOAD).collect::<Vec<_>>();

        for encoding in ALL {
            for input in [&b""[..], &b"x"[..], &text[..], &binary[..]] {
                let compressed = compress(input, encoding, DEFAULT_MAX_PAYLOAD).unwrap();
                let output = decompress(&compressed, encoding, DEFAULT_MAX_PAYLOAD).unwrap();
                assert_eq!(&output[..], input, "{encoding} with {} bytes", input.len());
            }
        }
    }

    #[test]
    fn deflate_is_a_zlib_stream() {
        let compressed = compress(&b"hello"[..], Encoding::Deflate, DEFAULT_MAX_PAYLOAD).unwrap();

        // zlib header: deflate method, 32K window
        assert_eq!(compressed[0], 0x78);
        assert_eq!(u16::from_be_bytes([compressed[0], compressed[1]]) % 31, 0);
    }

    #[test]
    fn oversized_source_is_rejected() {
        let input = vec![b'a'; 101];

        let result = compress(&input[..], Encoding::Gzip, 100);
        assert!(matches!(result, Err(CompressError::PayloadTooLarge { max_size: 100 })));

        assert!(compress(&input[..100], Encoding::Gzip, 100).is_ok());
    }

    #[test]
    fn oversized_output_is_rejected() {
        let compressed = compress(&vec![b'a'; 1000][..], Encoding::Deflate, 1000).unwrap();

        let result = decompress(&compressed, Encoding::Deflate, 999);
        assert!(matches!(result, Err(CompressError::PayloadTooLarge { max_size: 999 })));
    }

    #[test]
    fn corrupt_input_is_an_io_error() {
        let result = decompress(b"definitely not zlib", Encoding::Deflate, DEFAULT_MAX_PAYLOAD);
        assert!(matches!(result, Err(CompressError::Io { .. })));
    }
}
