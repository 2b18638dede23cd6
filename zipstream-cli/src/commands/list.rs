//! List command implementation.

use super::CmdResult;
use crate::utils::{filter_entries, print_entries};
use serde::Serialize;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use zipstream_archive::{ArchivedEntry, ZipReader};

#[derive(Debug, Serialize)]
struct EntryJson<'a> {
    name: &'a str,
    size: u32,
    compressed_size: u32,
    crc32: u32,
    modified: Option<String>,
    offset: u64,
    data_descriptor: bool,
}

impl<'a> From<&'a ArchivedEntry> for EntryJson<'a> {
    fn from(entry: &'a ArchivedEntry) -> Self {
        Self {
            name: &entry.name,
            size: entry.size,
            compressed_size: entry.compressed_size,
            crc32: entry.crc32,
            modified: entry
                .modified_time()
                .map(|t| t.format("%Y-%m-%dT%H:%M:%S").to_string()),
            offset: entry.header_offset,
            data_descriptor: entry.has_data_descriptor(),
        }
    }
}

pub fn cmd_list(
    archive: &Path,
    json: bool,
    include: &[String],
    exclude: &[String],
    verbose: bool,
) -> CmdResult {
    let reader = ZipReader::new(BufReader::new(File::open(archive)?))?;
    let entries = filter_entries(reader.entries(), include, exclude);

    if json {
        let rows: Vec<EntryJson<'_>> = entries.iter().map(EntryJson::from).collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    println!("Archive: {}", archive.display());
    println!();
    print_entries(&entries, verbose);
    Ok(())
}
