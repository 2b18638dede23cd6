//! # zipstream Archive
//!
//! Turns a manifest of `(name, size)` pairs plus one concatenated byte
//! source into a streamed, uncompressed ZIP archive whose exact length is
//! known before the first byte is produced.
//!
//! - [`manifest`]: the file list and its JSON form
//! - [`zip`]: record layouts, the stream pump, size estimation, and a reader
//!
//! ## Example
//!
//! ```rust
//! use bytes::Bytes;
//! use futures::executor::block_on;
//! use futures::stream::{self, TryStreamExt};
//! use std::io::Cursor;
//! use zipstream_archive::{Manifest, ZipArchive, ZipReader};
//!
//! let manifest = Manifest::from_json(r#"{"files":[{"name":"a.txt","size":5}]}"#).unwrap();
//! let archive = ZipArchive::new(manifest).unwrap();
//! let size = archive.size();
//!
//! let source = stream::iter(vec![Ok::<_, std::io::Error>(Bytes::from_static(b"hello"))]);
//! let chunks: Vec<Bytes> = block_on(archive.into_stream(source).try_collect()).unwrap();
//! let bytes = chunks.concat();
//! assert_eq!(bytes.len() as u64, size);
//!
//! let mut reader = ZipReader::new(Cursor::new(bytes)).unwrap();
//! assert_eq!(reader.extract_by_name("a.txt").unwrap(), b"hello");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod manifest;
pub mod zip;

// Re-exports
pub use manifest::{Manifest, ManifestEntry};
pub use zip::{
    ArchivedEntry, StreamOptions, TruncationPolicy, ZipArchive, ZipReader, ZipStream, archive_size,
};
