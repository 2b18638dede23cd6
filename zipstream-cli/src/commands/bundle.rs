//! Bundle command implementation: manifest plus one concatenated source.

use super::{CmdResult, StreamArgs};
use crate::utils::{is_stdio, write_archive};
use futures::stream::StreamExt;
use log::{info, warn};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use zipstream_archive::{Manifest, ZipArchive};
use zipstream_core::reader_source;

pub async fn cmd_bundle(
    manifest_path: &Path,
    source_path: &Path,
    archive: &Path,
    args: &StreamArgs,
) -> CmdResult {
    let manifest = Manifest::from_reader(BufReader::new(File::open(manifest_path)?))?;
    let declared = manifest.total_size();
    let file_count = manifest.len();
    let zip = ZipArchive::with_options(manifest, args.options())?;

    let source = if is_stdio(source_path) {
        reader_source(tokio::io::stdin(), args.chunk_size).boxed()
    } else {
        let file = tokio::fs::File::open(source_path).await?;
        let actual = file.metadata().await?.len();
        if actual != declared {
            warn!(
                "{} holds {} bytes but the manifest declares {}",
                source_path.display(),
                actual,
                declared
            );
        }
        reader_source(file, args.chunk_size).boxed()
    };

    info!(
        "bundling {} files from {} ({} bytes)",
        file_count,
        source_path.display(),
        zip.size()
    );
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
