//! Reading back stored archives.
//!
//! [`ZipReader`] walks an archive through its central directory and
//! extracts stored entries with full checksum verification.

use super::header::{
    CentralDirectoryHeader, DataDescriptor, END_OF_CENTRAL_DIR_LEN, END_OF_CENTRAL_DIR_SIG,
    EndOfCentralDirectory, FLAG_DATA_DESCRIPTOR, LocalFileHeader, METHOD_STORED,
};
use chrono::NaiveDateTime;
use log::debug;
use std::io::{Read, Seek, SeekFrom};
use zipstream_core::{Crc32, DosDateTime, Result, ZipStreamError};

/// Longest trailing comment the end record may be followed by.
const MAX_COMMENT_LEN: u64 = u16::MAX as u64;

/// An entry as recorded in the central directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchivedEntry {
    /// Entry name, lossily decoded when not UTF-8.
    pub name: String,
    /// General purpose flags.
    pub flags: u16,
    /// Compression method.
    pub method: u16,
    /// Modification timestamp.
    pub modified: DosDateTime,
    /// Recorded checksum.
    pub crc32: u32,
    /// Stored size.
    pub compressed_size: u32,
    /// Original size.
    pub size: u32,
    /// Offset of the local header.
    pub header_offset: u64,
    /// Offset of the first data byte.
    pub data_offset: u64,
}

impl ArchivedEntry {
    /// Whether a data descriptor follows the data.
    pub fn has_data_descriptor(&self) -> bool {
        self.flags & FLAG_DATA_DESCRIPTOR != 0
    }

    /// Modification time, if the stored value is a valid date.
    pub fn modified_time(&self) -> Option<NaiveDateTime> {
        self.modified.to_naive()
    }
}

/// ZIP archive reader.
pub struct ZipReader<R: Read + Seek> {
    reader: R,
    entries: Vec<ArchivedEntry>,
}

impl<R: Read + Seek> ZipReader<R> {
    /// Open an archive and read its central directory.
    pub fn new(mut reader: R) -> Result<Self> {
        let entries = Self::read_entries(&mut reader)?;
        debug!("read {} entries from central directory", entries.len());
        Ok(Self { reader, entries })
    }

    fn find_end_record(reader: &mut R) -> Result<EndOfCentralDirectory> {
        let file_size = reader.seek(SeekFrom::End(0))?;
        if file_size < END_OF_CENTRAL_DIR_LEN as u64 {
            return Err(ZipStreamError::unexpected_eof(END_OF_CENTRAL_DIR_LEN));
        }

        let search_start = file_size.saturating_sub(MAX_COMMENT_LEN + END_OF_CENTRAL_DIR_LEN as u64);
        reader.seek(SeekFrom::Start(search_start))?;

        let mut buf = vec![0u8; (file_size - search_start) as usize];
        reader.read_exact(&mut buf)?;

        let signature = END_OF_CENTRAL_DIR_SIG.to_le_bytes();
        let found = buf
            .windows(4)
            .rposition(|w| w == signature)
            .ok_or_else(|| ZipStreamError::invalid_header("end of central directory not found"))?;

        EndOfCentralDirectory::parse(&buf[found..])
    }

    fn read_entries(reader: &mut R) -> Result<Vec<ArchivedEntry>> {
        let end = Self::find_end_record(reader)?;

        reader.seek(SeekFrom::Start(end.directory_offset as u64))?;
        let mut records = Vec::with_capacity(end.entries as usize);
        for _ in 0..end.entries {
            records.push(CentralDirectoryHeader::read(reader)?);
        }

        records
            .into_iter()
            .map(|record| Self::resolve(reader, record))
            .collect()
    }

    // The data offset depends on the local header's own name and extra lengths.
    fn resolve(reader: &mut R, record: CentralDirectoryHeader) -> Result<ArchivedEntry> {
        let header_offset = record.local_header_offset as u64;
        reader.seek(SeekFrom::Start(header_offset))?;
        let local = LocalFileHeader::read(reader)?;

        if local.name != record.name {
            return Err(ZipStreamError::invalid_header(format!(
                "local header name {:?} does not match directory name {:?}",
                String::from_utf8_lossy(&local.name),
                String::from_utf8_lossy(&record.name),
            )));
        }

        Ok(ArchivedEntry {
            name: String::from_utf8_lossy(&record.name).into_owned(),
            flags: record.flags,
            method: record.method,
            modified: record.modified,
            crc32: record.crc32,
            compressed_size: record.compressed_size,
            size: record.uncompressed_size,
            header_offset,
            data_offset: header_offset + local.encoded_len() as u64,
        })
    }

    /// Entries in directory order.
    pub fn entries(&self) -> &[ArchivedEntry] {
        &self.entries
    }

    /// Find an entry by name.
    pub fn entry_by_name(&self, name: &str) -> Option<&ArchivedEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Extract a stored entry, verifying its checksum and, when present,
    /// that its data descriptor agrees with the directory.
    pub fn extract(&mut self, entry: &ArchivedEntry) -> Result<Vec<u8>> {
        if entry.method != METHOD_STORED {
            return Err(ZipStreamError::invalid_header(format!(
                "unsupported compression method {} for {}",
                entry.method, entry.name
            )));
        }

        self.reader.seek(SeekFrom::Start(entry.data_offset))?;
        let expected = entry.compressed_size as u64;
        let mut data = Vec::new();
        (&mut self.reader).take(expected).read_to_end(&mut data)?;
        if (data.len() as u64) < expected {
            return Err(ZipStreamError::unexpected_eof(entry.compressed_size as usize));
        }

        if entry.has_data_descriptor() {
            let (descriptor, _) = DataDescriptor::read(&mut self.reader)?;
            if descriptor.compressed_size != entry.compressed_size
                || descriptor.uncompressed_size != entry.size
                || descriptor.crc32 != entry.crc32
            {
                return Err(ZipStreamError::invalid_header(format!(
                    "data descriptor for {} disagrees with central directory",
                    entry.name
                )));
            }
        }

        let computed = Crc32::compute(&data);
        if computed != entry.crc32 {
            return Err(ZipStreamError::crc_mismatch(entry.crc32, computed));
        }

        Ok(data)
    }

    /// Extract an entry by name.
    pub fn extract_by_name(&mut self, name: &str) -> Result<Vec<u8>> {
        let entry = self
            .entry_by_name(name)
            .cloned()
            .ok_or_else(|| ZipStreamError::entry_not_found(name))?;
        self.extract(&entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::{Manifest, ManifestEntry};
    use crate::zip::archive::{StreamOptions, ZipArchive};
    use bytes::Bytes;
    use futures::executor::block_on;
    use futures::stream::{self, TryStreamExt};
    use std::io::Cursor;

    fn build(files: &[(&str, &'static [u8])]) -> Vec<u8> {
        let manifest: Manifest = files
            .iter()
            .map(|&(name, data)| ManifestEntry::new(name, data.len() as u64))
            .collect();
        let archive =
            ZipArchive::with_options(manifest, StreamOptions::new().modified(DosDateTime::MIN))
                .unwrap();
        let source = stream::iter(
            files
                .iter()
                .map(|&(_, data)| Ok::<_, std::io::Error>(Bytes::from_static(data)))
                .collect::<Vec<_>>(),
        );
        let chunks: Vec<Bytes> = block_on(archive.into_stream(source).try_collect()).unwrap();
        chunks.concat()
    }

    #[test]
    fn test_reads_streamed_archive() {
        let bytes = build(&[("a.txt", b"hello"), ("b.txt", b"world!")]);
        let mut reader = ZipReader::new(Cursor::new(bytes)).unwrap();

        let names: Vec<&str> = reader.entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["a.txt", "b.txt"]);

        let a = reader.entry_by_name("a.txt").cloned().unwrap();
        assert!(a.has_data_descriptor());
        assert_eq!(a.header_offset, 0);
        assert_eq!(a.data_offset, 35);
        assert_eq!(a.modified_time(), DosDateTime::MIN.to_naive());
        assert_eq!(reader.extract(&a).unwrap(), b"hello");
        assert_eq!(reader.extract_by_name("b.txt").unwrap(), b"world!");
    }

    #[test]
    fn test_missing_entry() {
        let bytes = build(&[("a", b"x")]);
        let mut reader = ZipReader::new(Cursor::new(bytes)).unwrap();
        let err = reader.extract_by_name("nope").unwrap_err();
        assert!(matches!(err, ZipStreamError::EntryNotFound { .. }));
    }

    #[test]
    fn test_detects_corrupted_data() {
        let mut bytes = build(&[("a", b"abcdef")]);
        bytes[31] ^= 0xFF;

        let mut reader = ZipReader::new(Cursor::new(bytes)).unwrap();
        let entry = reader.entries()[0].clone();
        let err = reader.extract(&entry).unwrap_err();
        assert!(matches!(err, ZipStreamError::CrcMismatch { .. }));
    }

    #[test]
    fn test_oversized_directory_size_is_eof() {
        let mut bytes = build(&[("a", b"abcdef")]);
        // Directory record starts after header (31), data (6) and descriptor (16).
        let size_field = 31 + 6 + 16 + 20;
        bytes[size_field..size_field + 4].copy_from_slice(&0xFFFF_FFF0u32.to_le_bytes());

        let mut reader = ZipReader::new(Cursor::new(bytes)).unwrap();
        let entry = reader.entries()[0].clone();
        assert_eq!(entry.compressed_size, 0xFFFF_FFF0);
        let err = reader.extract(&entry).unwrap_err();
        assert!(matches!(err, ZipStreamError::UnexpectedEof { .. }));
    }

    #[test]
    fn test_rejects_non_archive() {
        let err = ZipReader::new(Cursor::new(vec![0u8; 64])).err().unwrap();
        assert!(matches!(err, ZipStreamError::InvalidHeader { .. }));

        let err = ZipReader::new(Cursor::new(vec![0u8; 4])).err().unwrap();
        assert!(matches!(err, ZipStreamError::UnexpectedEof { .. }));
    }
}
