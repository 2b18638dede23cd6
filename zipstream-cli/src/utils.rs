//! Utility functions for the CLI.

use crate::commands::CmdResult;
use bytes::Bytes;
use futures::stream::{Stream, StreamExt};
use glob::Pattern;
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, warn};
use std::io;
use std::path::Path;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use zipstream_archive::{ArchivedEntry, ZipStream};
use zipstream_core::DosDateTime;

/// Create a byte-count progress bar with standard styling.
pub fn create_progress_bar(len: u64, enable: bool) -> ProgressBar {
    if !enable {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(len);
    let style = ProgressStyle::default_bar()
        .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▓▒░ ");
    pb.set_style(style);
    pb
}

/// Parse an RFC 3339 timestamp into DOS form, keeping its local wall time.
pub fn parse_mtime(value: &str) -> Result<DosDateTime, String> {
    chrono::DateTime::parse_from_rfc3339(value)
        .map(|moment| DosDateTime::from_datetime(&moment))
        .map_err(|e| format!("invalid RFC 3339 timestamp {value:?}: {e}"))
}

/// Whether `path` means stdin/stdout.
pub fn is_stdio(path: &Path) -> bool {
    path == Path::new("-")
}

/// Check if a name matches the filter patterns.
/// - If include patterns are specified, the name must match at least one
/// - If exclude patterns are specified, the name must not match any
pub fn matches_filters(name: &str, include: &[String], exclude: &[String]) -> bool {
    let matches = |pattern: &String| Pattern::new(pattern).is_ok_and(|p| p.matches(name));

    if exclude.iter().any(matches) {
        return false;
    }
    include.is_empty() || include.iter().any(matches)
}

/// Filter entries based on include/exclude patterns.
pub fn filter_entries(
    entries: &[ArchivedEntry],
    include: &[String],
    exclude: &[String],
) -> Vec<ArchivedEntry> {
    entries
        .iter()
        .filter(|e| matches_filters(&e.name, include, exclude))
        .cloned()
        .collect()
}

/// Print entries, as a table when `verbose`.
pub fn print_entries(entries: &[ArchivedEntry], verbose: bool) {
    if !verbose {
        for entry in entries {
            println!("{}", entry.name);
        }
        return;
    }

    println!("{:>10} {:>8} {:>19}  Name", "Size", "CRC-32", "Modified");
    println!("{}", "-".repeat(60));

    let mut total_size = 0u64;
    for entry in entries {
        let modified = entry
            .modified_time()
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:>10} {:08x} {:>19}  {}",
            entry.size, entry.crc32, modified, entry.name
        );
        total_size += entry.size as u64;
    }

    println!("{}", "-".repeat(60));
    println!("{:>10} {:>8} {:>19}  {} files", total_size, "", "", entries.len());
}

/// Drive an archive stream into `output` (a path, or `-` for stdout).
///
/// A partially written output file is removed when the stream fails.
/// Returns the number of bytes written.
pub async fn write_archive<S>(stream: ZipStream<S>, output: &Path, progress: bool) -> CmdResult<u64>
where
    S: Stream<Item = io::Result<Bytes>> + Unpin,
{
    let mut sink: Box<dyn AsyncWrite + Unpin> = if is_stdio(output) {
        Box::new(tokio::io::stdout())
    } else {
        Box::new(tokio::fs::File::create(output).await?)
    };

    let pb = create_progress_bar(stream.expected_len(), progress);
    let result = pump(stream, &mut sink, &pb).await;
    pb.finish_and_clear();

    if result.is_err() && !is_stdio(output) {
        drop(sink);
        if let Err(e) = tokio::fs::remove_file(output).await {
            warn!("could not remove partial archive {}: {e}", output.display());
        }
    }
    result
}

async fn pump<S, W>(mut stream: ZipStream<S>, sink: &mut W, pb: &ProgressBar) -> CmdResult<u64>
where
    S: Stream<Item = io::Result<Bytes>> + Unpin,
    W: AsyncWrite + Unpin + ?Sized,
{
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        sink.write_all(&chunk).await?;
        pb.inc(chunk.len() as u64);
    }
    sink.flush().await?;

    let written = stream.bytes_emitted();
    if written != stream.expected_len() {
        warn!(
            "archive is {written} bytes, {} were announced",
            stream.expected_len()
        );
    }
    debug!("wrote {written} archive bytes");
    Ok(written)
}
