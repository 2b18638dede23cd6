//! Create command implementation.

use super::{CmdResult, StreamArgs};
use crate::utils::{is_stdio, write_archive};
use log::{info, warn};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use zipstream_archive::{Manifest, ZipArchive};
use zipstream_core::files_source;

// Names come from the final path component, so inputs from different
// directories can collide.
fn warn_duplicates(manifest: &Manifest) {
    let mut seen = HashSet::new();
    for entry in &manifest.files {
        if !seen.insert(entry.name.as_str()) {
            warn!("duplicate entry name {} in archive", entry.name);
        }
    }
}

pub async fn cmd_create(archive: &Path, files: &[PathBuf], args: &StreamArgs) -> CmdResult {
    let manifest = Manifest::from_paths(files)?;
    warn_duplicates(&manifest);

    let file_count = manifest.len();
    let zip = ZipArchive::with_options(manifest, args.options())?;
    info!(
        "streaming {} files into {} ({} bytes)",
        file_count,
        archive.display(),
        zip.size()
    );

    let source = files_source(files.iter().cloned(), args.chunk_size);
    let written = write_archive(zip.into_stream(source), archive, args.progress).await?;

    if !is_stdio(archive) {
        println!(
            "Created {} ({} files, {} bytes)",
            archive.display(),
            file_count,
            written
        );
    }
    Ok(())
}
