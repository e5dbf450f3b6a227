//! Maps a request path onto a readable file and its content type.

use std::ffi::OsStr;
use std::io;
use std::path::{Component, Path, PathBuf};

use http::HeaderValue;
use tokio::fs::File;
use tracing::debug;

use crate::body::{ResponseBody, file_body};
use crate::mime::MimeTable;

/// An open regular file, read as a stream of chunks.
#[derive(Debug)]
pub struct FileSource {
    path: PathBuf,
    file: File,
}

impl FileSource {
    /// Opens `path` for reading.
    ///
    /// # Errors
    ///
    /// Fails when the file can't be opened or is not a regular file.
    pub async fn open<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).await?;

        let metadata = file.metadata().await?;
        if !metadata.is_file() {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, format!("{} is not a regular file", path.display())));
        }

        Ok(Self { path: path.to_path_buf(), file })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Turns the file into a body yielding reads of at most `chunk_size` bytes.
    ///
    /// The file is closed once the body is dropped.
    pub fn into_body(self, chunk_size: usize) -> ResponseBody {
        file_body(self.file, chunk_size)
    }
}

#[derive(Debug)]
pub struct ResolvedResource {
    content_type: HeaderValue,
    source: FileSource,
}

impl ResolvedResource {
    pub fn content_type(&self) -> &HeaderValue {
        &self.content_type
    }

    pub fn source(&self) -> &FileSource {
        &self.source
    }

    pub fn into_parts(self) -> (HeaderValue, FileSource) {
        (self.content_type, self.source)
    }
}

#[derive(Debug)]
pub enum Resolution {
    Found(ResolvedResource),
    NotFound,
}

impl Resolution {
    pub fn is_found(&self) -> bool {
        matches!(self, Resolution::Found(_))
    }
}

/// Resolves `relative` under `root`.
///
/// The path must stay below `root` and its file name must have an extension in
/// `mime_table`; the file must exist and be a regular file. Anything else is
/// [`Resolution::NotFound`].
pub async fn resolve(root: &Path, relative: &Path, mime_table: &MimeTable) -> Resolution {
    if relative.components().any(|component| !matches!(component, Component::CurDir | Component::Normal(_))) {
        debug!(path = %relative.display(), "path escapes the content root");
        return Resolution::NotFound;
    }

    let Some(file_name) = relative.file_name().and_then(OsStr::to_str) else {
        return Resolution::NotFound;
    };

    let Some(entry) = mime_table.lookup(file_name) else {
        debug!(file_name, "no content type for file");
        return Resolution::NotFound;
    };

    match FileSource::open(root.join(relative)).await {
        Ok(source) => Resolution::Found(ResolvedResource { content_type: entry.header_value().clone(), source }),
        Err(e) => {
            debug!(path = %relative.display(), cause = %e, "can't open file");
            Resolution::NotFound
        }
    }
}
