//! Central directory and end-of-directory trailer.

use super::entry::FileEntry;
use super::header::EndOfCentralDirectory;
use bytes::{Bytes, BytesMut};
use zipstream_core::{Result, ZipStreamError};

fn to_u32(field: &'static str, value: u64) -> Result<u32> {
    u32::try_from(value).map_err(|_| ZipStreamError::limit_exceeded(field, value, u32::MAX as u64))
}

/// Encode the central directory followed by its end record.
///
/// Records are emitted in `entries` order. Each record points at the offset
/// where that entry's local header begins, the running sum of the
/// [`encoded_len`](FileEntry::encoded_len) of every entry before it; that sum
/// after the last entry is where the directory itself starts.
pub fn central_directory(entries: &[FileEntry]) -> Result<Bytes> {
    let mut out = BytesMut::new();
    let mut directory_offset = 0u64;

    for entry in entries {
        let record = entry.directory_record(to_u32("entry offset", directory_offset)?);
        out.extend_from_slice(&record);
        directory_offset += entry.encoded_len();
    }

    let entry_count = u16::try_from(entries.len()).map_err(|_| {
        ZipStreamError::limit_exceeded("file count", entries.len() as u64, u16::MAX as u64)
    })?;

    let end = EndOfCentralDirectory {
        entries: entry_count,
        directory_size: to_u32("directory size", out.len() as u64)?,
        directory_offset: to_u32("directory offset", directory_offset)?,
    };
    out.extend_from_slice(&end.encode());

    Ok(out.freeze())
}
