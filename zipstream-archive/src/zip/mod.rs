//! Streaming ZIP assembly.
//!
//! Entries are always stored (method 0) with sizes and checksum deferred to
//! a data descriptor, so nothing needs to be known about the data before it
//! starts flowing. Records follow the PKWARE APPNOTE.

mod archive;
mod directory;
mod entry;
pub mod header;
mod reader;
mod size;
mod stream;

pub use archive::{
    MAX_ARCHIVE_SIZE, MAX_ENTRIES, MAX_ENTRY_SIZE, StreamOptions, TruncationPolicy, ZipArchive,
    check_limits,
};
pub use directory::central_directory;
pub use entry::{Appended, EntryProgress, FileEntry};
pub use reader::{ArchivedEntry, ZipReader};
pub use size::{archive_size, entry_body_len};
pub use stream::ZipStream;
