//! Exact output length from a manifest alone.

use super::header::{
    CENTRAL_DIR_HEADER_LEN, DATA_DESCRIPTOR_LEN, END_OF_CENTRAL_DIR_LEN, LOCAL_FILE_HEADER_LEN,
};
use crate::manifest::ManifestEntry;

/// Bytes one entry contributes to the archive body (header, data, descriptor).
pub fn entry_body_len(entry: &ManifestEntry) -> u64 {
    body_len(entry.name.len(), entry.size)
}

pub(crate) fn body_len(name_len: usize, size: u64) -> u64 {
    (LOCAL_FILE_HEADER_LEN + name_len + DATA_DESCRIPTOR_LEN) as u64 + size
}

/// Total archive length for `files`, provided the source delivers exactly the
/// declared bytes.
///
/// Per entry: local header + name, data, descriptor, and a directory record
/// repeating the name; plus the fixed end record.
pub fn archive_size(files: &[ManifestEntry]) -> u64 {
    let entries: u64 = files
        .iter()
        .map(|f| entry_body_len(f) + (CENTRAL_DIR_HEADER_LEN + f.name.len()) as u64)
        .sum();
    entries + END_OF_CENTRAL_DIR_LEN as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_manifest() {
        assert_eq!(archive_size(&[]), 22);
    }

    #[test]
    fn test_single_entry() {
        let files = [ManifestEntry::new("a.txt", 5)];
        assert_eq!(archive_size(&files), (30 + 5) + 5 + 16 + (46 + 5) + 22);
        assert_eq!(archive_size(&files), 30 + 2 * 5 + 5 + 16 + 46 + 22);
    }

    #[test]
    fn test_name_length_is_in_bytes() {
        let ascii = archive_size(&[ManifestEntry::new("e", 0)]);
        let accented = archive_size(&[ManifestEntry::new("é", 0)]);
        assert_eq!(accented - ascii, 2);
    }

    #[test]
    fn test_idempotent() {
        let files = vec![ManifestEntry::new("a", 3), ManifestEntry::new("b", 1 << 20)];
        assert_eq!(archive_size(&files), archive_size(&files));
    }
}
