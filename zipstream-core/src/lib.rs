//! # zipstream Core
//!
//! Core components for the zipstream archive assembler.
//!
//! - [`crc`]: CRC-32 and the pluggable [`RollingChecksum`] capability
//! - [`dostime`]: MS-DOS date/time encoding
//! - [`error`]: Error types
//! - [`source`]: Async byte sources (feature `async-io`)
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ L3: CLI                                                 │
//! │     create, bundle, size, list, test                    │
//! ├─────────────────────────────────────────────────────────┤
//! │ L2: Container                                           │
//! │     ZIP records, central directory, stream pump, reader │
//! ├─────────────────────────────────────────────────────────┤
//! │ L1: Core (this crate)                                   │
//! │     CRC-32, DOS timestamps, byte sources, errors        │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use zipstream_core::crc::{Crc32, Crc32Rolling, RollingChecksum};
//!
//! let acc = Crc32Rolling.update(None, b"Hello, ");
//! let acc = Crc32Rolling.update(Some(acc), b"World!");
//! assert_eq!(acc, Crc32::compute(b"Hello, World!"));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod crc;
pub mod dostime;
pub mod error;
#[cfg(feature = "async-io")]
pub mod source;

// Re-exports for convenience
pub use crc::{Crc32, Crc32Rolling, RollingChecksum};
pub use dostime::DosDateTime;
pub use error::{Result, ZipStreamError};
#[cfg(feature = "async-io")]
pub use source::{DEFAULT_CHUNK_SIZE, files_source, reader_source};
