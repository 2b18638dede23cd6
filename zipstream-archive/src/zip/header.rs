//! ZIP record layouts.
//!
//! Every record here is written exactly as PKWARE APPNOTE describes it, with
//! all integers little-endian. Entries produced by the stream pump always set
//! bit 3 (sizes deferred to a trailing data descriptor) and bit 11 (UTF-8
//! names), and always use method 0 (stored).

use bytes::{BufMut, Bytes, BytesMut};
use std::io::Read;
use zipstream_core::{DosDateTime, Result, ZipStreamError};

/// ZIP local file header signature.
pub const LOCAL_FILE_HEADER_SIG: u32 = 0x04034B50;

/// Data descriptor signature (PK\x07\x08).
pub const DATA_DESCRIPTOR_SIG: u32 = 0x08074B50;

/// ZIP central directory header signature.
pub const CENTRAL_DIR_HEADER_SIG: u32 = 0x02014B50;

/// ZIP end of central directory signature.
pub const END_OF_CENTRAL_DIR_SIG: u32 = 0x06054B50;

/// Fixed part of a local file header.
pub const LOCAL_FILE_HEADER_LEN: usize = 30;

/// Data descriptor including its signature.
pub const DATA_DESCRIPTOR_LEN: usize = 16;

/// Fixed part of a central directory header.
pub const CENTRAL_DIR_HEADER_LEN: usize = 46;

/// End of central directory record without comment.
pub const END_OF_CENTRAL_DIR_LEN: usize = 22;

/// Version 2.0: data descriptors, stored entries.
pub const VERSION_STREAMING: u16 = 20;

/// Flag bit for data descriptor presence.
pub const FLAG_DATA_DESCRIPTOR: u16 = 0x0008;

/// Flag bit for UTF-8 encoded names.
pub const FLAG_UTF8_NAME: u16 = 0x0800;

/// General purpose flags carried by streamed entries.
pub const STREAMING_FLAGS: u16 = FLAG_DATA_DESCRIPTOR | FLAG_UTF8_NAME;

/// Compression method 0.
pub const METHOD_STORED: u16 = 0;

fn check_signature(found: u32, expected: u32) -> Result<()> {
    if found != expected {
        return Err(ZipStreamError::invalid_magic(
            expected.to_le_bytes().to_vec(),
            found.to_le_bytes().to_vec(),
        ));
    }
    Ok(())
}

fn read_bytes<R: Read>(reader: &mut R, len: usize) -> Result<Bytes> {
    let mut buf = vec![0u8; len];
    reader.read_exact(&mut buf)?;
    Ok(Bytes::from(buf))
}

/// ZIP local file header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFileHeader {
    /// Minimum version needed to extract.
    pub version_needed: u16,
    /// General purpose bit flag.
    pub flags: u16,
    /// Compression method.
    pub method: u16,
    /// Last modification date/time.
    pub modified: DosDateTime,
    /// CRC-32 of uncompressed data (zero when deferred).
    pub crc32: u32,
    /// Compressed size (zero when deferred).
    pub compressed_size: u32,
    /// Uncompressed size (zero when deferred).
    pub uncompressed_size: u32,
    /// Raw file name bytes.
    pub name: Bytes,
    /// Extra field.
    pub extra: Bytes,
}

impl LocalFileHeader {
    /// Header for a stored entry whose checksum and sizes follow in a data descriptor.
    pub fn deferred(name: Bytes, modified: DosDateTime) -> Self {
        Self {
            version_needed: VERSION_STREAMING,
            flags: STREAMING_FLAGS,
            method: METHOD_STORED,
            modified,
            crc32: 0,
            compressed_size: 0,
            uncompressed_size: 0,
            name,
            extra: Bytes::new(),
        }
    }

    /// Size of the encoded record.
    pub fn encoded_len(&self) -> usize {
        LOCAL_FILE_HEADER_LEN + self.name.len() + self.extra.len()
    }

    /// Encode the record.
    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.encoded_len());
        buf.put_u32_le(LOCAL_FILE_HEADER_SIG);
        buf.put_u16_le(self.version_needed);
        buf.put_u16_le(self.flags);
        buf.put_u16_le(self.method);
        buf.put_u16_le(self.modified.time);
        buf.put_u16_le(self.modified.date);
        buf.put_u32_le(self.crc32);
        buf.put_u32_le(self.compressed_size);
        buf.put_u32_le(self.uncompressed_size);
        buf.put_u16_le(self.name.len() as u16);
        buf.put_u16_le(self.extra.len() as u16);
        buf.put_slice(&self.name);
        buf.put_slice(&self.extra);
        buf.freeze()
    }

    /// Read a local file header.
    pub fn read<R: Read>(reader: &mut R) -> Result<Self> {
        let mut buf = [0u8; LOCAL_FILE_HEADER_LEN];
        reader.read_exact(&mut buf)?;

        let signature = u32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]);
        check_signature(signature, LOCAL_FILE_HEADER_SIG)?;

        let name_len = u16::from_le_bytes([buf[26], buf[27]]) as usize;
        let extra_len = u16::from_le_bytes([buf[28], buf[29]]) as usize;

        Ok(Self {
            version_needed: u16::from_le_bytes([buf[4], buf[5]]),
            flags: u16::from_le_bytes([buf[6], buf[7]]),
            method: u16::from_le_bytes([buf[8], buf[9]]),
            modified: DosDateTime::from_parts(
                u16::from_le_bytes([buf[12], buf[13]]),
                u16::from_le_bytes([buf[10], buf[11]]),
            ),
            crc32: u32::from_le_bytes([buf[14], buf[15], buf[16], buf[17]]),
            compressed_size: u32::from_le_bytes([buf[18], buf[19], buf[20], buf[21]]),
            uncompressed_size: u32::from_le_bytes([buf[22], buf[23], buf[24], buf[25]]),
            name: read_bytes(reader, name_len)?,
            extra: read_bytes(reader, extra_len)?,
        })
    }

    /// Check if this entry has a data descriptor following the data.
    pub fn has_data_descriptor(&self) -> bool {
        self.flags & FLAG_DATA_DESCRIPTOR != 0
    }
}

/// ZIP data descriptor (follows the data when [`FLAG_DATA_DESCRIPTOR`] is set).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataDescriptor {
    /// CRC-32 of uncompressed data.
    pub crc32: u32,
    /// Compressed size.
    pub compressed_size: u32,
    /// Uncompressed size.
    pub uncompressed_size: u32,
}

impl DataDescriptor {
    /// Encode the record, always with its signature.
    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(DATA_DESCRIPTOR_LEN);
        buf.put_u32_le(DATA_DESCRIPTOR_SIG);
        buf.put_u32_le(self.crc32);
        buf.put_u32_le(self.compressed_size);
        buf.put_u32_le(self.uncompressed_size);
        buf.freeze()
    }

    /// Read a data descriptor.
    /// The descriptor may optionally start with a signature (0x08074B50).
    /// Returns (descriptor, bytes_consumed).
    pub fn read<R: Read>(reader: &mut R) -> Result<(Self, usize)> {
        let mut word = [0u8; 4];
        reader.read_exact(&mut word)?;
        let mut bytes_consumed = 4;

        let first_word = u32::from_le_bytes(word);
        let crc32 = if first_word == DATA_DESCRIPTOR_SIG {
            reader.read_exact(&mut word)?;
            bytes_consumed += 4;
            u32::from_le_bytes(word)
        } else {
            first_word
        };

        let mut sizes = [0u8; 8];
        reader.read_exact(&mut sizes)?;
        bytes_consumed += 8;

        Ok((
            Self {
                crc32,
                compressed_size: u32::from_le_bytes([sizes[0], sizes[1], sizes[2], sizes[3]]),
                uncompressed_size: u32::from_le_bytes([sizes[4], sizes[5], sizes[6], sizes[7]]),
            },
            bytes_consumed,
        ))
    }
}

/// ZIP central directory header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CentralDirectoryHeader {
    /// Version made by.
    pub version_made_by: u16,
    /// Version needed to extract.
    pub version_needed: u16,
    /// General purpose bit flag.
    pub flags: u16,
    /// Compression method.
    pub method: u16,
    /// Last modification date/time.
    pub modified: DosDateTime,
    /// CRC-32 of uncompressed data.
    pub crc32: u32,
    /// Compressed size.
    pub compressed_size: u32,
    /// Uncompressed size.
    pub uncompressed_size: u32,
    /// Disk number start.
    pub disk_start: u16,
    /// Internal file attributes.
    pub internal_attr: u16,
    /// External file attributes.
    pub external_attr: u32,
    /// Relative offset of the local header.
    pub local_header_offset: u32,
    /// Raw file name bytes.
    pub name: Bytes,
    /// Extra field.
    pub extra: Bytes,
    /// File comment.
    pub comment: Bytes,
}

impl CentralDirectoryHeader {
    /// Directory record for a streamed, stored entry.
    pub fn stored(
        name: Bytes,
        modified: DosDateTime,
        crc32: u32,
        size: u32,
        local_header_offset: u32,
    ) -> Self {
        Self {
            version_made_by: VERSION_STREAMING,
            version_needed: VERSION_STREAMING,
            flags: STREAMING_FLAGS,
            method: METHOD_STORED,
            modified,
            crc32,
            compressed_size: size,
            uncompressed_size: size,
            disk_start: 0,
            internal_attr: 0,
            external_attr: 0,
            local_header_offset,
            name,
            extra: Bytes::new(),
            comment: Bytes::new(),
        }
    }

    /// Size of the encoded record.
    pub fn encoded_len(&self) -> usize {
        CENTRAL_DIR_HEADER_LEN + self.name.len() + self.extra.len() + self.comment.len()
    }

    /// Encode the record.
    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.encoded_len());
        buf.put_u32_le(CENTRAL_DIR_HEADER_SIG);
        buf.put_u16_le(self.version_made_by);
        buf.put_u16_le(self.version_needed);
        buf.put_u16_le(self.flags);
        buf.put_u16_le(self.method);
        buf.put_u16_le(self.modified.time);
        buf.put_u16_le(self.modified.date);
        buf.put_u32_le(self.crc32);
        buf.put_u32_le(self.compressed_size);
        buf.put_u32_le(self.uncompressed_size);
        buf.put_u16_le(self.name.len() as u16);
        buf.put_u16_le(self.extra.len() as u16);
        buf.put_u16_le(self.comment.len() as u16);
        buf.put_u16_le(self.disk_start);
        buf.put_u16_le(self.internal_attr);
        buf.put_u32_le(self.external_attr);
        buf.put_u32_le(self.local_header_offset);
        buf.put_slice(&self.name);
        buf.put_slice(&self.extra);
        buf.put_slice(&self.comment);
        buf.freeze()
    }

    /// Read a central directory header.
    pub fn read<R: Read>(reader: &mut R) -> Result<Self> {
        let mut buf = [0u8; CENTRAL_DIR_HEADER_LEN];
        reader.read_exact(&mut buf)?;

        let signature = u32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]);
        check_signature(signature, CENTRAL_DIR_HEADER_SIG)?;

        let name_len = u16::from_le_bytes([buf[28], buf[29]]) as usize;
        let extra_len = u16::from_le_bytes([buf[30], buf[31]]) as usize;
        let comment_len = u16::from_le_bytes([buf[32], buf[33]]) as usize;

        Ok(Self {
            version_made_by: u16::from_le_bytes([buf[4], buf[5]]),
            version_needed: u16::from_le_bytes([buf[6], buf[7]]),
            flags: u16::from_le_bytes([buf[8], buf[9]]),
            method: u16::from_le_bytes([buf[10], buf[11]]),
            modified: DosDateTime::from_parts(
                u16::from_le_bytes([buf[14], buf[15]]),
                u16::from_le_bytes([buf[12], buf[13]]),
            ),
            crc32: u32::from_le_bytes([buf[16], buf[17], buf[18], buf[19]]),
            compressed_size: u32::from_le_bytes([buf[20], buf[21], buf[22], buf[23]]),
            uncompressed_size: u32::from_le_bytes([buf[24], buf[25], buf[26], buf[27]]),
            disk_start: u16::from_le_bytes([buf[34], buf[35]]),
            internal_attr: u16::from_le_bytes([buf[36], buf[37]]),
            external_attr: u32::from_le_bytes([buf[38], buf[39], buf[40], buf[41]]),
            local_header_offset: u32::from_le_bytes([buf[42], buf[43], buf[44], buf[45]]),
            name: read_bytes(reader, name_len)?,
            extra: read_bytes(reader, extra_len)?,
            comment: read_bytes(reader, comment_len)?,
        })
    }
}

/// ZIP end of central directory record (single disk, no comment).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndOfCentralDirectory {
    /// Number of central directory records.
    pub entries: u16,
    /// Total size of the central directory in bytes.
    pub directory_size: u32,
    /// Offset of the first central directory record.
    pub directory_offset: u32,
}

impl EndOfCentralDirectory {
    /// Encode the record.
    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(END_OF_CENTRAL_DIR_LEN);
        buf.put_u32_le(END_OF_CENTRAL_DIR_SIG);
        // Disk number, disk with central directory
        buf.put_u16_le(0);
        buf.put_u16_le(0);
        // Entries on this disk, total entries
        buf.put_u16_le(self.entries);
        buf.put_u16_le(self.entries);
        buf.put_u32_le(self.directory_size);
        buf.put_u32_le(self.directory_offset);
        // Comment length
        buf.put_u16_le(0);
        buf.freeze()
    }

    /// Parse a record starting at the signature.
    pub fn parse(buf: &[u8]) -> Result<Self> {
        if buf.len() < END_OF_CENTRAL_DIR_LEN {
            return Err(ZipStreamError::invalid_header("EOCD too short"));
        }

        let signature = u32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]);
        check_signature(signature, END_OF_CENTRAL_DIR_SIG)?;

        let disk = u16::from_le_bytes([buf[4], buf[5]]);
        let directory_disk = u16::from_le_bytes([buf[6], buf[7]]);
        if disk != 0 || directory_disk != 0 {
            return Err(ZipStreamError::invalid_header(
                "multi-volume archives are not supported",
            ));
        }

        Ok(Self {
            entries: u16::from_le_bytes([buf[10], buf[11]]),
            directory_size: u32::from_le_bytes([buf[12], buf[13], buf[14], buf[15]]),
            directory_offset: u32::from_le_bytes([buf[16], buf[17], buf[18], buf[19]]),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn stamp() -> DosDateTime {
        DosDateTime::from_parts(0x5867, 0x6DAF)
    }

    #[test]
    fn test_local_header_layout() {
        let header = LocalFileHeader::deferred(Bytes::from_static(b"a.txt"), stamp());
        let bytes = header.encode();

        assert_eq!(bytes.len(), 30 + 5);
        assert_eq!(&bytes[0..4], &[0x50, 0x4B, 0x03, 0x04]);
        assert_eq!(&bytes[4..6], &20u16.to_le_bytes());
        assert_eq!(&bytes[6..8], &0x0808u16.to_le_bytes());
        assert_eq!(&bytes[8..10], &[0, 0]);
        assert_eq!(&bytes[10..12], &0x6DAFu16.to_le_bytes());
        assert_eq!(&bytes[12..14], &0x5867u16.to_le_bytes());
        assert_eq!(&bytes[14..26], &[0u8; 12]);
        assert_eq!(&bytes[26..28], &5u16.to_le_bytes());
        assert_eq!(&bytes[28..30], &[0, 0]);
        assert_eq!(&bytes[30..], b"a.txt");

        let parsed = LocalFileHeader::read(&mut Cursor::new(bytes)).unwrap();
        assert_eq!(parsed, header);
        assert!(parsed.has_data_descriptor());
    }

    #[test]
    fn test_local_header_bad_signature() {
        let mut bytes = LocalFileHeader::deferred(Bytes::from_static(b"x"), stamp())
            .encode()
            .to_vec();
        bytes[0] = 0x51;
        let err = LocalFileHeader::read(&mut Cursor::new(bytes)).unwrap_err();
        assert!(matches!(err, ZipStreamError::InvalidMagic { .. }));
    }

    #[test]
    fn test_data_descriptor_with_signature() {
        let descriptor = DataDescriptor {
            crc32: 0x3610A686,
            compressed_size: 5,
            uncompressed_size: 5,
        };
        let bytes = descriptor.encode();
        assert_eq!(bytes.len(), DATA_DESCRIPTOR_LEN);
        assert_eq!(&bytes[0..4], &[0x50, 0x4B, 0x07, 0x08]);
        assert_eq!(&bytes[4..8], &0x3610A686u32.to_le_bytes());
        assert_eq!(&bytes[8..12], &5u32.to_le_bytes());
        assert_eq!(&bytes[12..16], &5u32.to_le_bytes());

        let (parsed, consumed) = DataDescriptor::read(&mut Cursor::new(bytes)).unwrap();
        assert_eq!(parsed, descriptor);
        assert_eq!(consumed, 16);
    }

    #[test]
    fn test_data_descriptor_without_signature() {
        let mut data = Vec::new();
        data.extend_from_slice(&0xDEADBEEFu32.to_le_bytes());
        data.extend_from_slice(&100u32.to_le_bytes());
        data.extend_from_slice(&200u32.to_le_bytes());

        let (parsed, consumed) = DataDescriptor::read(&mut Cursor::new(data)).unwrap();
        assert_eq!(parsed.crc32, 0xDEADBEEF);
        assert_eq!(parsed.compressed_size, 100);
        assert_eq!(parsed.uncompressed_size, 200);
        assert_eq!(consumed, 12);
    }

    #[test]
    fn test_central_directory_layout() {
        let record =
            CentralDirectoryHeader::stored(Bytes::from_static(b"b"), stamp(), 0xCAFEBABE, 3, 34);
        let bytes = record.encode();

        assert_eq!(bytes.len(), 46 + 1);
        assert_eq!(&bytes[0..4], &[0x50, 0x4B, 0x01, 0x02]);
        assert_eq!(&bytes[4..6], &20u16.to_le_bytes());
        assert_eq!(&bytes[6..8], &20u16.to_le_bytes());
        assert_eq!(&bytes[8..10], &0x0808u16.to_le_bytes());
        assert_eq!(&bytes[10..12], &[0, 0]);
        assert_eq!(&bytes[12..14], &0x6DAFu16.to_le_bytes());
        assert_eq!(&bytes[14..16], &0x5867u16.to_le_bytes());
        assert_eq!(&bytes[16..20], &0xCAFEBABEu32.to_le_bytes());
        assert_eq!(&bytes[20..24], &3u32.to_le_bytes());
        assert_eq!(&bytes[24..28], &3u32.to_le_bytes());
        assert_eq!(&bytes[28..30], &1u16.to_le_bytes());
        assert_eq!(&bytes[30..42], &[0u8; 12]);
        assert_eq!(&bytes[42..46], &34u32.to_le_bytes());
        assert_eq!(&bytes[46..], b"b");

        let parsed = CentralDirectoryHeader::read(&mut Cursor::new(bytes)).unwrap();
        assert_eq!(parsed, record);
    }

    #[test]
    fn test_end_of_central_directory_layout() {
        let eocd = EndOfCentralDirectory {
            entries: 2,
            directory_size: 94,
            directory_offset: 102,
        };
        let bytes = eocd.encode();

        assert_eq!(bytes.len(), END_OF_CENTRAL_DIR_LEN);
        assert_eq!(&bytes[0..4], &[0x50, 0x4B, 0x05, 0x06]);
        assert_eq!(&bytes[4..8], &[0, 0, 0, 0]);
        assert_eq!(&bytes[8..10], &2u16.to_le_bytes());
        assert_eq!(&bytes[10..12], &2u16.to_le_bytes());
        assert_eq!(&bytes[12..16], &94u32.to_le_bytes());
        assert_eq!(&bytes[16..20], &102u32.to_le_bytes());
        assert_eq!(&bytes[20..22], &[0, 0]);

        assert_eq!(EndOfCentralDirectory::parse(&bytes).unwrap(), eocd);
    }

    #[test]
    fn test_end_of_central_directory_too_short() {
        let err = EndOfCentralDirectory::parse(&[0x50, 0x4B, 0x05, 0x06]).unwrap_err();
        assert!(matches!(err, ZipStreamError::InvalidHeader { .. }));
    }
}
