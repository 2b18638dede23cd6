//! Size command implementation.

use super::CmdResult;
use serde::Serialize;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use zipstream_archive::zip::check_limits;
use zipstream_archive::{Manifest, archive_size};

#[derive(Debug, Serialize)]
struct SizeReport {
    files: usize,
    data_bytes: u64,
    archive_bytes: u64,
}

fn load(manifest: Option<&Path>, files: &[PathBuf]) -> CmdResult<Manifest> {
    match manifest {
        Some(path) => Ok(Manifest::from_reader(BufReader::new(File::open(path)?))?),
        None => Ok(Manifest::from_paths(files)?),
    }
}

pub fn cmd_size(manifest: Option<&Path>, files: &[PathBuf], json: bool) -> CmdResult {
    let manifest = load(manifest, files)?;
    check_limits(&manifest.files)?;

    let report = SizeReport {
        files: manifest.len(),
        data_bytes: manifest.total_size(),
        archive_bytes: archive_size(&manifest.files),
    };

    if json {
        println!("{}", serde_json::to_string(&report)?);
    } else {
        println!("{}", report.archive_bytes);
    }
    Ok(())
}
