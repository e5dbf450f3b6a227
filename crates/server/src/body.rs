//! Response body types.

use std::io;

use bytes::Bytes;
use futures::{TryStreamExt, stream};
use http_body::Frame;
use http_body_util::combinators::UnsyncBoxBody;
use http_body_util::{BodyExt, StreamBody};
use tokio::fs::File;
use tokio_util::io::ReaderStream;

/// The body of every response the file service produces.
///
/// None of its variants reports an exact size, so they are always sent chunked.
pub type ResponseBody = UnsyncBoxBody<Bytes, io::Error>;

/// Streams `file` in reads of at most `chunk_size` bytes, one frame per read.
pub(crate) fn file_body(file: File, chunk_size: usize) -> ResponseBody {
    let frames = ReaderStream::with_capacity(file, chunk_size).map_ok(Frame::data);
    StreamBody::new(frames).boxed_unsync()
}

/// Sends each of `chunks` as its own frame.
pub(crate) fn static_body(chunks: &'static [&'static [u8]]) -> ResponseBody {
    let frames = stream::iter(chunks.iter().map(|chunk| Ok(Frame::data(Bytes::from_static(chunk)))));
    StreamBody::new(frames).boxed_unsync()
}
