//! Error types for zipstream operations.
//!
//! A single error enum covers the streaming encoder, the archive reader and
//! the byte-source adapters. Upstream read failures surface as [`ZipStreamError::Io`].

use std::io;
use thiserror::Error;

/// The main error type for zipstream operations.
#[derive(Debug, Error)]
pub enum ZipStreamError {
    /// I/O error from the upstream byte source or an underlying reader/writer.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Invalid signature in an archive record.
    #[error("Invalid magic number: expected {expected:02x?}, found {found:02x?}")]
    InvalidMagic {
        /// Expected signature bytes.
        expected: Vec<u8>,
        /// Actual bytes found.
        found: Vec<u8>,
    },

    /// Invalid or unsupported record layout.
    #[error("Invalid header: {message}")]
    InvalidHeader {
        /// Description of the header error.
        message: String,
    },

    /// CRC checksum mismatch.
    #[error("CRC mismatch: expected {expected:#x}, computed {computed:#x}")]
    CrcMismatch {
        /// Expected CRC value from archive.
        expected: u32,
        /// Computed CRC value from data.
        computed: u32,
    },

    /// Unexpected end of archive data.
    #[error("Unexpected end of file: expected {expected} more bytes")]
    UnexpectedEof {
        /// Number of bytes that were expected but not available.
        expected: usize,
    },

    /// A value does not fit the fixed-width field the format reserves for it.
    #[error("{field} of {value} exceeds the format limit of {limit}")]
    LimitExceeded {
        /// The record field that overflowed.
        field: &'static str,
        /// The offending value.
        value: u64,
        /// Largest value the field can carry.
        limit: u64,
    },

    /// The byte source ended before an entry reached its declared size.
    #[error("Source ended early for {name}: declared {expected} bytes, received {actual}")]
    SourceTruncated {
        /// Name of the truncated entry.
        name: String,
        /// Declared size from the manifest.
        expected: u64,
        /// Bytes actually received.
        actual: u64,
    },

    /// The manifest could not be parsed or is inconsistent.
    #[error("Invalid manifest: {message}")]
    InvalidManifest {
        /// Description of the manifest problem.
        message: String,
    },

    /// Entry not found in archive.
    #[error("Entry not found: {name}")]
    EntryNotFound {
        /// Name of the missing entry.
        name: String,
    },
}

/// Result type alias for zipstream operations.
pub type Result<T> = std::result::Result<T, ZipStreamError>;

impl ZipStreamError {
    /// Create an invalid magic error.
    pub fn invalid_magic(expected: impl Into<Vec<u8>>, found: impl Into<Vec<u8>>) -> Self {
        Self::InvalidMagic {
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Create an invalid header error.
    pub fn invalid_header(message: impl Into<String>) -> Self {
        Self::InvalidHeader {
            message: message.into(),
        }
    }

    /// Create a CRC mismatch error.
    pub fn crc_mismatch(expected: u32, computed: u32) -> Self {
        Self::CrcMismatch { expected, computed }
    }

    /// Create an unexpected EOF error.
    pub fn unexpected_eof(expected: usize) -> Self {
        Self::UnexpectedEof { expected }
    }

    /// Create a format limit error.
    pub fn limit_exceeded(field: &'static str, value: u64, limit: u64) -> Self {
        Self::LimitExceeded {
            field,
            value,
            limit,
        }
    }

    /// Create a truncated source error.
    pub fn source_truncated(name: impl Into<String>, expected: u64, actual: u64) -> Self {
        Self::SourceTruncated {
            name: name.into(),
            expected,
            actual,
        }
    }

    /// Create an invalid manifest error.
    pub fn invalid_manifest(message: impl Into<String>) -> Self {
        Self::InvalidManifest {
            message: message.into(),
        }
    }

    /// Create an entry not found error.
    pub fn entry_not_found(name: impl Into<String>) -> Self {
        Self::EntryNotFound { name: name.into() }
    }
}

impl From<ZipStreamError> for io::Error {
    fn from(err: ZipStreamError) -> Self {
        match err {
            ZipStreamError::Io(inner) => inner,
            other => io::Error::new(io::ErrorKind::InvalidData, other),
        }
    }
}
