//! Per-file encode state.
//!
//! A [`FileEntry`] walks one manifest item through the three records it
//! contributes to the archive body: local header, stored data, data
//! descriptor. Progress is an [`EntryProgress`] value replaced by a pure
//! transition on every append, so each step can be tested in isolation.

use super::header::{
    CentralDirectoryHeader, DATA_DESCRIPTOR_LEN, DataDescriptor, LOCAL_FILE_HEADER_LEN,
    LocalFileHeader,
};
use crate::manifest::ManifestEntry;
use bytes::Bytes;
use zipstream_core::{DosDateTime, RollingChecksum};

/// Bytes consumed so far and the checksum over them.
///
/// `crc32` is `Some` exactly when `bytes_written > 0`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EntryProgress {
    /// Data bytes attributed to the entry so far.
    pub bytes_written: u64,
    /// Running checksum, unset until the first byte.
    pub crc32: Option<u32>,
}

impl EntryProgress {
    /// Fold `data` into the progress. Empty input leaves it unchanged.
    pub fn absorb<C>(self, data: &[u8], checksum: &C) -> Self
    where
        C: RollingChecksum + ?Sized,
    {
        if data.is_empty() {
            return self;
        }
        Self {
            bytes_written: self.bytes_written + data.len() as u64,
            crc32: Some(checksum.update(self.crc32, data)),
        }
    }
}

/// Result of feeding one chunk to an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Appended {
    /// The prefix of the chunk that belongs to this entry, to be emitted as-is.
    pub data: Bytes,
    /// The remainder belonging to later entries, if any.
    pub leftover: Option<Bytes>,
}

/// One manifest item being encoded.
#[derive(Debug, Clone)]
pub struct FileEntry {
    name: String,
    name_bytes: Bytes,
    size: u64,
    modified: DosDateTime,
    progress: EntryProgress,
}

impl FileEntry {
    /// Create an entry stamped with `modified`.
    pub fn new(entry: ManifestEntry, modified: DosDateTime) -> Self {
        let name_bytes = Bytes::copy_from_slice(entry.name.as_bytes());
        Self {
            name: entry.name,
            name_bytes,
            size: entry.size,
            modified,
            progress: EntryProgress::default(),
        }
    }

    /// Entry name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared size from the manifest.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Timestamp written to the header and directory record.
    pub fn modified(&self) -> DosDateTime {
        self.modified
    }

    /// Current progress.
    pub fn progress(&self) -> EntryProgress {
        self.progress
    }

    /// Data bytes consumed so far.
    pub fn bytes_written(&self) -> u64 {
        self.progress.bytes_written
    }

    /// Data bytes still owed by the source.
    pub fn remaining(&self) -> u64 {
        self.size - self.progress.bytes_written
    }

    /// Whether every declared byte has been consumed.
    pub fn is_complete(&self) -> bool {
        self.progress.bytes_written == self.size
    }

    /// Final checksum; the CRC of no data is zero.
    pub fn crc32(&self) -> u32 {
        self.progress.crc32.unwrap_or(0)
    }

    /// Local file header with checksum and sizes deferred.
    pub fn header(&self) -> Bytes {
        LocalFileHeader::deferred(self.name_bytes.clone(), self.modified).encode()
    }

    /// Take this entry's share of `chunk`.
    ///
    /// At most [`remaining`](Self::remaining) bytes are consumed; the rest is
    /// handed back as leftover. Zero-length input is a no-op.
    pub fn append<C>(&mut self, mut chunk: Bytes, checksum: &C) -> Appended
    where
        C: RollingChecksum + ?Sized,
    {
        let take = self.remaining().min(chunk.len() as u64) as usize;
        let data = chunk.split_to(take);
        self.progress = self.progress.absorb(&data, checksum);

        Appended {
            data,
            leftover: (!chunk.is_empty()).then_some(chunk),
        }
    }

    /// Trailing data descriptor.
    ///
    /// Sizes report the bytes actually written, which equal the declared size
    /// unless the source ended early.
    pub fn data_descriptor(&self) -> Bytes {
        let written = self.written_u32();
        DataDescriptor {
            crc32: self.crc32(),
            compressed_size: written,
            uncompressed_size: written,
        }
        .encode()
    }

    /// Central directory record for an entry whose header starts at `offset`.
    pub fn directory_record(&self, offset: u32) -> Bytes {
        CentralDirectoryHeader::stored(
            self.name_bytes.clone(),
            self.modified,
            self.crc32(),
            self.written_u32(),
            offset,
        )
        .encode()
    }

    /// Bytes this entry occupies in the archive body: header, data, descriptor.
    pub fn encoded_len(&self) -> u64 {
        (LOCAL_FILE_HEADER_LEN + self.name_bytes.len() + DATA_DESCRIPTOR_LEN) as u64
            + self.progress.bytes_written
    }

    // Sizes are bounded by the limits checked when the archive is built.
    fn written_u32(&self) -> u32 {
        u32::try_from(self.progress.bytes_written).unwrap_or(u32::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zipstream_core::{Crc32, Crc32Rolling};

    fn entry(name: &str, size: u64) -> FileEntry {
        FileEntry::new(ManifestEntry::new(name, size), DosDateTime::MIN)
    }

    #[test]
    fn test_progress_absorb() {
        let start = EntryProgress::default();
        assert_eq!(start.absorb(b"", &Crc32Rolling), start);

        let next = start.absorb(b"hel", &Crc32Rolling).absorb(b"lo", &Crc32Rolling);
        assert_eq!(next.bytes_written, 5);
        assert_eq!(next.crc32, Some(Crc32::compute(b"hello")));
    }

    #[test]
    fn test_append_exact() {
        let mut file = entry("a.txt", 5);
        let appended = file.append(Bytes::from_static(b"hello"), &Crc32Rolling);

        assert_eq!(appended.data, "hello");
        assert_eq!(appended.leftover, None);
        assert!(file.is_complete());
        assert_eq!(file.crc32(), 0x3610A686);
    }

    #[test]
    fn test_append_returns_leftover() {
        let mut file = entry("a", 3);
        let appended = file.append(Bytes::from_static(b"abcdef"), &Crc32Rolling);

        assert_eq!(appended.data, "abc");
        assert_eq!(appended.leftover, Some(Bytes::from_static(b"def")));
        assert_eq!(file.bytes_written(), 3);
        assert_eq!(file.crc32(), Crc32::compute(b"abc"));
    }

    #[test]
    fn test_append_empty_is_noop() {
        let mut file = entry("a", 3);
        let appended = file.append(Bytes::new(), &Crc32Rolling);

        assert!(appended.data.is_empty());
        assert_eq!(appended.leftover, None);
        assert_eq!(file.progress(), EntryProgress::default());
    }

    #[test]
    fn test_append_to_complete_entry_passes_everything_through() {
        let mut file = entry("empty", 0);
        assert!(file.is_complete());

        let appended = file.append(Bytes::from_static(b"xyz"), &Crc32Rolling);
        assert!(appended.data.is_empty());
        assert_eq!(appended.leftover, Some(Bytes::from_static(b"xyz")));
        assert_eq!(file.progress().crc32, None);
    }

    #[test]
    fn test_records_follow_progress() {
        let mut file = entry("a.txt", 5);
        file.append(Bytes::from_static(b"hello"), &Crc32Rolling);

        let header = file.header();
        assert_eq!(header.len(), 35);
        assert_eq!(&header[30..], b"a.txt");

        let descriptor = file.data_descriptor();
        assert_eq!(&descriptor[4..8], &0x3610A686u32.to_le_bytes());
        assert_eq!(&descriptor[8..12], &5u32.to_le_bytes());
        assert_eq!(&descriptor[12..16], &5u32.to_le_bytes());

        let record = file.directory_record(0);
        assert_eq!(record.len(), 46 + 5);
        assert_eq!(&record[16..20], &0x3610A686u32.to_le_bytes());

        assert_eq!(file.encoded_len(), 30 + 5 + 5 + 16);
    }

    #[test]
    fn test_truncated_entry_reports_actual_bytes() {
        let mut file = entry("short", 5);
        file.append(Bytes::from_static(b"he"), &Crc32Rolling);

        assert!(!file.is_complete());
        assert_eq!(file.remaining(), 3);

        let descriptor = file.data_descriptor();
        assert_eq!(&descriptor[4..8], &Crc32::compute(b"he").to_le_bytes());
        assert_eq!(&descriptor[8..12], &2u32.to_le_bytes());
        assert_eq!(file.encoded_len(), 30 + 5 + 2 + 16);
    }

    #[test]
    fn test_multibyte_name_length() {
        let file = entry("naïve.txt", 0);
        let header = file.header();
        assert_eq!(&header[26..28], &10u16.to_le_bytes());
        assert_eq!(header.len(), 30 + 10);
    }
}
