//! Archive construction and options.

use super::entry::FileEntry;
use super::size::{archive_size, body_len};
use super::stream::ZipStream;
use crate::manifest::{Manifest, ManifestEntry};
use zipstream_core::{Crc32Rolling, DosDateTime, Result, RollingChecksum, ZipStreamError};

/// Largest entry size the 32-bit size fields can carry (0xFFFFFFFF is the ZIP64 marker).
pub const MAX_ENTRY_SIZE: u64 = u32::MAX as u64 - 1;

/// Largest archive whose offsets still fit 32-bit fields.
pub const MAX_ARCHIVE_SIZE: u64 = u32::MAX as u64;

/// Largest number of entries the end record can count.
pub const MAX_ENTRIES: usize = u16::MAX as usize;

/// What to do when the source ends before an entry reached its declared size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TruncationPolicy {
    /// Treat the entry as finished with the bytes received. Its descriptor and
    /// directory record report the actual size and checksum; every later
    /// entry is written empty.
    #[default]
    Lenient,
    /// Fail the stream with [`ZipStreamError::SourceTruncated`].
    Strict,
}

/// Options for building an archive stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamOptions {
    /// Timestamp for every entry; `None` stamps each entry with the time it was created.
    pub modified: Option<DosDateTime>,
    /// Short-source handling.
    pub truncation: TruncationPolicy,
}

impl StreamOptions {
    /// Default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a fixed timestamp, for reproducible output.
    pub fn modified(mut self, modified: DosDateTime) -> Self {
        self.modified = Some(modified);
        self
    }

    /// Set the short-source policy.
    pub fn truncation(mut self, policy: TruncationPolicy) -> Self {
        self.truncation = policy;
        self
    }
}

/// Check that `files` fits the 32-bit format without a ZIP64 extension.
pub fn check_limits(files: &[ManifestEntry]) -> Result<()> {
    if files.len() > MAX_ENTRIES {
        return Err(ZipStreamError::limit_exceeded(
            "file count",
            files.len() as u64,
            MAX_ENTRIES as u64,
        ));
    }

    for file in files {
        if file.name.len() > u16::MAX as usize {
            return Err(ZipStreamError::limit_exceeded(
                "name length",
                file.name.len() as u64,
                u16::MAX as u64,
            ));
        }
        if file.size > MAX_ENTRY_SIZE {
            return Err(ZipStreamError::limit_exceeded(
                "entry size",
                file.size,
                MAX_ENTRY_SIZE,
            ));
        }
    }

    let total = archive_size(files);
    if total > MAX_ARCHIVE_SIZE {
        return Err(ZipStreamError::limit_exceeded(
            "archive size",
            total,
            MAX_ARCHIVE_SIZE,
        ));
    }

    Ok(())
}

/// A validated manifest ready to be streamed.
///
/// # Example
///
/// ```rust
/// use futures::executor::block_on;
/// use futures::stream::{self, TryStreamExt};
/// use zipstream_archive::{Manifest, ManifestEntry, ZipArchive};
///
/// let manifest = Manifest::new(vec![ManifestEntry::new("a.txt", 5)]);
/// let archive = ZipArchive::new(manifest).unwrap();
/// let expected = archive.size();
///
/// let source = stream::iter(vec![Ok::<_, std::io::Error>(bytes::Bytes::from_static(b"hello"))]);
/// let chunks: Vec<_> = block_on(archive.into_stream(source).try_collect()).unwrap();
/// let total: usize = chunks.iter().map(|c: &bytes::Bytes| c.len()).sum();
/// assert_eq!(total as u64, expected);
/// ```
#[derive(Debug, Clone)]
pub struct ZipArchive {
    entries: Vec<FileEntry>,
    size: u64,
    truncation: TruncationPolicy,
}

impl ZipArchive {
    /// Build an archive with default options.
    pub fn new(manifest: Manifest) -> Result<Self> {
        Self::with_options(manifest, StreamOptions::default())
    }

    /// Build an archive with explicit options.
    pub fn with_options(manifest: Manifest, options: StreamOptions) -> Result<Self> {
        check_limits(&manifest.files)?;
        let size = archive_size(&manifest.files);

        let entries = manifest
            .files
            .into_iter()
            .map(|file| FileEntry::new(file, options.modified.unwrap_or_else(DosDateTime::now)))
            .collect();

        Ok(Self {
            entries,
            size,
            truncation: options.truncation,
        })
    }

    /// Exact number of bytes the stream produces when the source delivers
    /// every declared byte. Available before any byte is produced.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Entries in archive order.
    pub fn entries(&self) -> &[FileEntry] {
        &self.entries
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the archive has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Offset of each entry's local header, assuming a complete source.
    pub fn header_offsets(&self) -> Vec<u64> {
        let mut offset = 0;
        self.entries
            .iter()
            .map(|entry| {
                let start = offset;
                offset += body_len(entry.name().len(), entry.size());
                start
            })
            .collect()
    }

    /// Stream the archive, pulling data from `source`.
    pub fn into_stream<S>(self, source: S) -> ZipStream<S> {
        self.into_stream_with_checksum(source, Crc32Rolling)
    }

    /// Stream the archive with a substitute checksum implementation.
    pub fn into_stream_with_checksum<S, C>(self, source: S, checksum: C) -> ZipStream<S, C>
    where
        C: RollingChecksum,
    {
        ZipStream::new(self.entries, source, checksum, self.truncation, self.size)
    }
}
