//! Command implementations for the zipstream CLI.

pub mod bundle;
pub mod create;
pub mod list;
pub mod size;
pub mod test;

pub use bundle::cmd_bundle;
pub use create::cmd_create;
pub use list::cmd_list;
pub use size::cmd_size;
pub use test::cmd_test;

use crate::utils::parse_mtime;
use clap::Args;
use zipstream_archive::{StreamOptions, TruncationPolicy};
use zipstream_core::{DEFAULT_CHUNK_SIZE, DosDateTime};

/// Result type shared by every command.
pub type CmdResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

/// Options shared by the commands that write archives.
#[derive(Debug, Clone, Args)]
pub struct StreamArgs {
    /// Bytes per source read
    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
    pub chunk_size: usize,

    /// Fail if the source ends before every declared byte arrives
    #[arg(long)]
    pub strict: bool,

    /// Timestamp for every entry (RFC 3339), for reproducible output
    #[arg(long, value_parser = parse_mtime)]
    pub mtime: Option<DosDateTime>,

    /// Show progress bar
    #[arg(short = 'P', long)]
    pub progress: bool,
}

impl StreamArgs {
    /// Library options for these flags.
    pub fn options(&self) -> StreamOptions {
        let policy = if self.strict {
            TruncationPolicy::Strict
        } else {
            TruncationPolicy::Lenient
        };
        let options = StreamOptions::new().truncation(policy);
        match self.mtime {
            Some(mtime) => options.modified(mtime),
            None => options,
        }
    }
}
