//! Async byte sources for the stream pump.
//!
//! A byte source is any `Stream<Item = io::Result<Bytes>>` yielding the
//! concatenated contents of every file in manifest order. The adapters here
//! build one from Tokio readers or from files on disk. Dropping a source
//! closes whatever handle it holds, so an abandoned archive stream never keeps
//! reading.
//!
//! # Feature Flag
//!
//! This module is only available when the `async-io` feature is enabled
//! (on by default):
//!
//! ```toml
//! [dependencies]
//! zipstream-core = { version = "0.1.0", features = ["async-io"] }
//! ```

use bytes::{Bytes, BytesMut};
use futures::stream::{self, Stream, StreamExt, TryStreamExt};
use log::debug;
use std::io;
use std::path::PathBuf;
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncReadExt};

/// Default chunk size for source reads (32KB).
pub const DEFAULT_CHUNK_SIZE: usize = 32 * 1024;

/// Turn an async reader into a chunked byte source.
///
/// Each item holds at most `chunk_size` bytes. The reader is dropped as soon
/// as it reports end of file.
///
/// # Example
///
/// ```rust,ignore
/// use zipstream_core::source::{reader_source, DEFAULT_CHUNK_SIZE};
///
/// let file = tokio::fs::File::open("payload.bin").await?;
/// let source = reader_source(file, DEFAULT_CHUNK_SIZE);
/// ```
pub fn reader_source<R>(reader: R, chunk_size: usize) -> impl Stream<Item = io::Result<Bytes>> + Unpin
where
    R: AsyncRead + Unpin,
{
    let chunk_size = chunk_size.max(1);
    Box::pin(stream::try_unfold(reader, move |mut reader| async move {
        let mut buf = BytesMut::zeroed(chunk_size);
        let bytes_read = reader.read(&mut buf).await?;
        if bytes_read == 0 {
            return Ok(None);
        }
        buf.truncate(bytes_read);
        Ok::<_, io::Error>(Some((buf.freeze(), reader)))
    }))
}

/// Concatenate files into one byte source.
///
/// Files are opened lazily, one at a time, in iteration order; at most one
/// handle is open at any moment. Open failures carry the offending path.
pub fn files_source<I>(paths: I, chunk_size: usize) -> impl Stream<Item = io::Result<Bytes>> + Unpin
where
    I: IntoIterator<Item = PathBuf>,
{
    let paths: Vec<PathBuf> = paths.into_iter().collect();
    Box::pin(
        stream::iter(paths)
            .map(move |path| {
                stream::once(async move {
                    debug!("opening source file {}", path.display());
                    File::open(&path)
                        .await
                        .map_err(|e| io::Error::new(e.kind(), format!("{}: {e}", path.display())))
                })
                .map_ok(move |file| reader_source(file, chunk_size))
                .try_flatten()
            })
            .flatten(),
    )
}
